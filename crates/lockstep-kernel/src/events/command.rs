//! Commands processed by the event manager's mailbox.

use crate::error::KernelError;
use lockstep_event::Listener;
use lockstep_types::{ListenerId, ModelId};
use serde_json::Value;
use tokio::sync::oneshot;

/// Commands for the event manager.
///
/// `Tick` and the two notifications are casts from the simulator and
/// the model servers; registration, time queries and shutdown are
/// calls.
pub enum EventCommand {
    /// Advance the logical clock by one. Does not notify anyone; the
    /// clock only stamps subsequent notifications.
    Tick,

    /// A model applied its transition; fan out to listeners.
    StateChange {
        /// The model that advanced.
        model: ModelId,
        /// Its observable snapshot.
        state: Value,
    },

    /// A value crossed a model boundary; fan out to listeners.
    Output {
        /// The model whose output the value is.
        source: ModelId,
        /// The crossing value.
        value: Value,
    },

    /// Register a listener (prepended on success).
    AddListener {
        /// The listener; `init` runs before registration.
        listener: Box<dyn Listener>,
        /// The assigned id, or the rejection.
        reply: oneshot::Sender<Result<ListenerId, KernelError>>,
    },

    /// Query the logical clock.
    Time {
        /// Current clock value.
        reply: oneshot::Sender<u64>,
    },

    /// Terminate all remaining listeners and stop the task.
    Stop {
        /// Acknowledged once cleanup ran.
        reply: oneshot::Sender<()>,
    },
}

impl std::fmt::Debug for EventCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Tick => write!(f, "Tick"),
            Self::StateChange { model, .. } => write!(f, "StateChange({model})"),
            Self::Output { source, .. } => write!(f, "Output({source})"),
            Self::AddListener { .. } => write!(f, "AddListener"),
            Self::Time { .. } => write!(f, "Time"),
            Self::Stop { .. } => write!(f, "Stop"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_names_the_subject() {
        let id = ModelId::new("mem");
        let cmd = EventCommand::StateChange {
            model: id,
            state: Value::Null,
        };
        assert!(format!("{cmd:?}").starts_with("StateChange(model:mem@"));
        assert_eq!(format!("{:?}", EventCommand::Tick), "Tick");
    }
}
