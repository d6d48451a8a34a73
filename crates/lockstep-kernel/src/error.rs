//! Kernel errors.
//!
//! # Error Code Convention
//!
//! All kernel errors use the `KERNEL_` prefix:
//!
//! | Error | Code | When |
//! |-------|------|------|
//! | [`KernelError::NotAtomic`] | `KERNEL_NOT_ATOMIC` | transition/output on a network |
//! | [`KernelError::NotNetwork`] | `KERNEL_NOT_NETWORK` | route on an atomic |
//! | [`KernelError::ModelGone`] | `KERNEL_MODEL_GONE` | model task no longer running |
//! | [`KernelError::EventsGone`] | `KERNEL_EVENTS_GONE` | event manager task gone |
//! | [`KernelError::SimulatorGone`] | `KERNEL_SIMULATOR_GONE` | simulator task gone |
//! | [`KernelError::ListenerRejected`] | `KERNEL_LISTENER_REJECTED` | listener init failed |
//!
//! The two contract violations (`NotAtomic`, `NotNetwork`) are
//! uniformly recoverable-with-error-return at the model server: the
//! misused server mutates nothing and keeps running. Only the routing
//! path escalates a `NotNetwork` into an aborted step, because a
//! coupling result that routes through an atomic breaks the tree
//! invariant the step algorithm is built on.

use lockstep_event::ListenerError;
use lockstep_types::{ErrorCode, ModelId};
use thiserror::Error;

/// Error surfaced by kernel operations.
#[derive(Debug, Clone, Error)]
pub enum KernelError {
    /// `apply_transition` or `produce_output` was invoked on a
    /// network model. No state is mutated.
    #[error("{op} is not valid on network model {id}")]
    NotAtomic {
        /// The misused model.
        id: ModelId,
        /// The operation that was attempted.
        op: &'static str,
    },

    /// `route` was invoked on an atomic model. When this happens
    /// mid-step it aborts the in-flight step.
    #[error("route is not valid on atomic model {id}")]
    NotNetwork {
        /// The misused model.
        id: ModelId,
    },

    /// The model's task has stopped; its mailbox is closed.
    #[error("model {id} is no longer running")]
    ModelGone {
        /// The unreachable model.
        id: ModelId,
    },

    /// The event manager task has stopped.
    #[error("event manager is no longer running")]
    EventsGone,

    /// The simulator task has stopped.
    #[error("simulator is no longer running")]
    SimulatorGone,

    /// A listener's `init` rejected the registration.
    #[error("listener rejected: {0}")]
    ListenerRejected(#[source] ListenerError),
}

impl ErrorCode for KernelError {
    fn code(&self) -> &'static str {
        match self {
            Self::NotAtomic { .. } => "KERNEL_NOT_ATOMIC",
            Self::NotNetwork { .. } => "KERNEL_NOT_NETWORK",
            Self::ModelGone { .. } => "KERNEL_MODEL_GONE",
            Self::EventsGone => "KERNEL_EVENTS_GONE",
            Self::SimulatorGone => "KERNEL_SIMULATOR_GONE",
            Self::ListenerRejected(_) => "KERNEL_LISTENER_REJECTED",
        }
    }

    fn is_recoverable(&self) -> bool {
        false
    }
}
