//! Commands processed by the simulator's mailbox.

use crate::error::KernelError;
use lockstep_event::Listener;
use lockstep_types::ListenerId;
use serde_json::Value;
use tokio::sync::oneshot;

/// Commands for the simulator.
///
/// `Step` is a cast so callers can queue several steps back to back;
/// `Time` doubles as a barrier because the mailbox is FIFO — a time
/// query answered means every step queued before it has run.
pub enum SimCommand {
    /// Run one lockstep step with these externally injected values.
    Step {
        /// Values routed into the root as external input.
        inputs: Vec<Value>,
    },

    /// Register a listener with the simulation's event manager.
    AddListener {
        /// The listener; its `init` runs before registration.
        listener: Box<dyn Listener>,
        /// The assigned id, or the rejection.
        reply: oneshot::Sender<Result<ListenerId, KernelError>>,
    },

    /// Query the number of committed steps.
    Time {
        /// Steps committed so far.
        reply: oneshot::Sender<u64>,
    },

    /// Stop the simulator and its event manager.
    ///
    /// Model servers are left running; whoever spawned them winds
    /// them down.
    Stop {
        /// Acknowledged once the event manager terminated its
        /// listeners.
        reply: oneshot::Sender<()>,
    },
}

impl std::fmt::Debug for SimCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Step { inputs } => write!(f, "Step({} inputs)", inputs.len()),
            Self::AddListener { .. } => write!(f, "AddListener"),
            Self::Time { .. } => write!(f, "Time"),
            Self::Stop { .. } => write!(f, "Stop"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn debug_counts_step_inputs() {
        let cmd = SimCommand::Step {
            inputs: vec![json!(1), json!(2)],
        };
        assert_eq!(format!("{cmd:?}"), "Step(2 inputs)");
    }
}
