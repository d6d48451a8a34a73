//! Commands processed by a model server's mailbox.
//!
//! Two shapes, matching the concurrency model:
//!
//! - **casts** (no reply): [`AddInput`](ModelCommand::AddInput),
//!   [`SetParent`](ModelCommand::SetParent),
//!   [`SetEventManager`](ModelCommand::SetEventManager),
//!   [`Stop`](ModelCommand::Stop) — the sender does not block; the
//!   server processes them in strict arrival order.
//! - **calls** (oneshot reply): everything else — the caller blocks
//!   until the server answers, which is what makes the simulator's
//!   step sequencing deterministic.

use crate::error::KernelError;
use crate::events::EventManagerHandle;
use crate::server::ModelHandle;
use serde_json::Value;
use tokio::sync::oneshot;

/// Commands for one model server.
#[derive(Debug)]
pub enum ModelCommand {
    /// Append a value to the pending-input buffer. No acknowledgement;
    /// the buffer keeps stable arrival order.
    AddInput(Value),

    /// Apply the state transition against the buffered inputs, clear
    /// the buffer, and emit a state-change event.
    ///
    /// Valid on atomic models only; a network replies with
    /// [`KernelError::NotAtomic`] and mutates nothing.
    ApplyTransition {
        /// Completion reply.
        reply: oneshot::Sender<Result<(), KernelError>>,
    },

    /// Run the output function and return this step's output values.
    ///
    /// Valid on atomic models only.
    ProduceOutput {
        /// Output values, or the contract violation.
        reply: oneshot::Sender<Result<Vec<Value>, KernelError>>,
    },

    /// Run the coupling function for `(source, value)`.
    ///
    /// Valid on network models only; an atomic replies with
    /// [`KernelError::NotNetwork`].
    Route {
        /// Where the value comes from: this network itself (external
        /// arrival) or one of its direct children.
        source: ModelHandle,
        /// The routed value.
        value: Value,
        /// Ordered `(target, value)` deliveries, or the violation.
        reply: oneshot::Sender<Result<Vec<(ModelHandle, Value)>, KernelError>>,
    },

    /// Enumerate every atomic leaf under this model, in pre-order.
    AllAtomics {
        /// The flattened leaf list.
        reply: oneshot::Sender<Result<Vec<ModelHandle>, KernelError>>,
    },

    /// Query the parent link.
    GetParent {
        /// `None` for the root.
        reply: oneshot::Sender<Option<ModelHandle>>,
    },

    /// Assign the parent link. Sent by the parent network at
    /// construction time, once per child.
    SetParent(ModelHandle),

    /// Bind the event manager that receives this model's
    /// state-change events.
    SetEventManager(EventManagerHandle),

    /// Stop the server task. The model is dropped with it.
    Stop,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_input_is_a_cast() {
        let cmd = ModelCommand::AddInput(Value::Bool(true));
        assert!(matches!(cmd, ModelCommand::AddInput(_)));
    }

    #[test]
    fn call_commands_carry_reply_channels() {
        let (tx, _rx) = oneshot::channel();
        let cmd = ModelCommand::ApplyTransition { reply: tx };
        assert!(matches!(cmd, ModelCommand::ApplyTransition { .. }));

        let (tx, _rx) = oneshot::channel();
        let cmd = ModelCommand::AllAtomics { reply: tx };
        assert!(matches!(cmd, ModelCommand::AllAtomics { .. }));
    }
}
