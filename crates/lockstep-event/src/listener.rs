//! The [`Listener`] capability contract.
//!
//! Listeners are stateful observers registered with a simulation's
//! event manager. Their state is exclusively owned by the manager's
//! list entry; callbacks take `&mut self` and run one at a time, so a
//! listener never needs internal synchronization.

use crate::ListenerError;
use lockstep_types::ModelId;
use serde_json::Value;

/// Why a listener is being terminated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminateReason {
    /// The event manager is shutting down normally.
    Normal,
    /// A callback of this listener reported a failure.
    Failure(String),
}

impl std::fmt::Display for TerminateReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Normal => write!(f, "normal"),
            Self::Failure(reason) => write!(f, "failure: {}", reason),
        }
    }
}

/// Stateful observer of simulation events.
///
/// # Contract
///
/// | Method | When | On `Err` |
/// |--------|------|----------|
/// | [`init`](Self::init) | at registration | not registered |
/// | [`on_state_change`](Self::on_state_change) | after each transition | terminated + dropped |
/// | [`on_output`](Self::on_output) | per output event | terminated + dropped |
/// | [`terminate`](Self::terminate) | shutdown or failure | — |
///
/// Notifications arrive in the order the kernel produced them, each
/// stamped with the event manager's clock at delivery time. Callbacks
/// must not block: they run on the event manager's task and stall the
/// whole notification queue while they execute.
///
/// # Example
///
/// ```
/// use lockstep_event::{Listener, ListenerError};
/// use lockstep_types::ModelId;
/// use serde_json::Value;
///
/// /// Counts output events, refusing nulls.
/// struct OutputCounter {
///     seen: usize,
/// }
///
/// impl Listener for OutputCounter {
///     fn on_state_change(
///         &mut self,
///         _model: &ModelId,
///         _state: &Value,
///         _time: u64,
///     ) -> Result<(), ListenerError> {
///         Ok(())
///     }
///
///     fn on_output(
///         &mut self,
///         source: &ModelId,
///         value: &Value,
///         _time: u64,
///     ) -> Result<(), ListenerError> {
///         if value.is_null() {
///             return Err(ListenerError::Callback(format!(
///                 "null output from {source}"
///             )));
///         }
///         self.seen += 1;
///         Ok(())
///     }
/// }
/// ```
pub trait Listener: Send + 'static {
    /// Called once when the listener is registered.
    ///
    /// Returning an error rejects the registration; the listener is
    /// dropped without a [`terminate`](Self::terminate) call.
    fn init(&mut self) -> Result<(), ListenerError> {
        Ok(())
    }

    /// A model applied its state transition.
    ///
    /// `state` is the model's observable snapshot; the kernel never
    /// interprets it, it is whatever the atomic model's `observe`
    /// returned.
    fn on_state_change(
        &mut self,
        model: &ModelId,
        state: &Value,
        time: u64,
    ) -> Result<(), ListenerError>;

    /// A value crossed a model boundary upward (an output event).
    ///
    /// `source` is the model whose output the value is; a value that
    /// bubbles through several network levels produces one event per
    /// level it is re-emitted from, each attributed to that level.
    fn on_output(&mut self, source: &ModelId, value: &Value, time: u64)
        -> Result<(), ListenerError>;

    /// Final call before the listener is dropped.
    ///
    /// Invoked with [`TerminateReason::Normal`] on manager shutdown,
    /// or [`TerminateReason::Failure`] after a failed callback. Best
    /// effort: the manager ignores anything this does.
    fn terminate(&mut self, reason: TerminateReason) {
        let _ = reason;
    }
}
