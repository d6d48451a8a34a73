//! The event manager task.

use crate::error::KernelError;
use crate::events::EventCommand;
use lockstep_event::{Listener, ListenerError, TerminateReason};
use lockstep_types::{ListenerId, ModelId};
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

/// Mailbox capacity for the event manager.
///
/// Sized for the burst a single step produces: every atomic's
/// state-change cast plus every boundary crossing's output cast.
const MAILBOX_BUFFER_SIZE: usize = 256;

/// One registered listener with its assigned id.
struct Entry {
    id: ListenerId,
    listener: Box<dyn Listener>,
}

/// Cloneable reference to a running [`EventManager`].
#[derive(Debug, Clone)]
pub struct EventManagerHandle {
    tx: mpsc::Sender<EventCommand>,
}

impl EventManagerHandle {
    /// Advances the logical clock by one (cast).
    pub async fn tick(&self) -> Result<(), KernelError> {
        self.cast(EventCommand::Tick).await
    }

    /// Fans a state-change notification out to all listeners (cast).
    pub async fn notify_state_change(
        &self,
        model: ModelId,
        state: Value,
    ) -> Result<(), KernelError> {
        self.cast(EventCommand::StateChange { model, state }).await
    }

    /// Fans an output notification out to all listeners (cast).
    pub async fn notify_output(&self, source: ModelId, value: Value) -> Result<(), KernelError> {
        self.cast(EventCommand::Output { source, value }).await
    }

    /// Registers a listener.
    ///
    /// Runs the listener's `init`; on success the listener is
    /// **prepended**, so the most recently registered listener
    /// observes events first. That ordering is deliberate and
    /// observable — later diagnostics see events before the listeners
    /// they are diagnosing.
    pub async fn add_listener(&self, listener: impl Listener) -> Result<ListenerId, KernelError> {
        self.add_boxed(Box::new(listener)).await
    }

    pub(crate) async fn add_boxed(
        &self,
        listener: Box<dyn Listener>,
    ) -> Result<ListenerId, KernelError> {
        let (tx, rx) = oneshot::channel();
        self.cast(EventCommand::AddListener {
            listener,
            reply: tx,
        })
        .await?;
        rx.await.map_err(|_| KernelError::EventsGone)?
    }

    /// Queries the logical clock.
    pub async fn time(&self) -> Result<u64, KernelError> {
        let (tx, rx) = oneshot::channel();
        self.cast(EventCommand::Time { reply: tx }).await?;
        rx.await.map_err(|_| KernelError::EventsGone)
    }

    /// Stops the manager: every remaining listener gets
    /// `terminate(Normal)`, then the task exits.
    pub async fn stop(&self) -> Result<(), KernelError> {
        let (tx, rx) = oneshot::channel();
        self.cast(EventCommand::Stop { reply: tx }).await?;
        rx.await.map_err(|_| KernelError::EventsGone)
    }

    async fn cast(&self, cmd: EventCommand) -> Result<(), KernelError> {
        self.tx.send(cmd).await.map_err(|_| KernelError::EventsGone)
    }
}

/// Task owning the listener list and the logical clock.
///
/// # Failure Isolation
///
/// Notifications are delivered synchronously, in current-list order,
/// one listener at a time. A callback returning `Err` gets that
/// listener a `terminate(Failure)` call and removal from the list for
/// this and all future notifications; delivery then continues with
/// the next listener. One bad listener never blocks or corrupts
/// delivery to the rest.
pub struct EventManager {
    listeners: Vec<Entry>,
    time: u64,
    rx: mpsc::Receiver<EventCommand>,
}

impl EventManager {
    /// Spawns the manager task and returns its handle.
    #[must_use]
    pub fn spawn() -> EventManagerHandle {
        let (tx, rx) = mpsc::channel(MAILBOX_BUFFER_SIZE);
        let manager = Self {
            listeners: Vec::new(),
            time: 0,
            rx,
        };
        tokio::spawn(manager.run());
        EventManagerHandle { tx }
    }

    async fn run(mut self) {
        info!("event manager started");

        while let Some(cmd) = self.rx.recv().await {
            if let EventCommand::Stop { reply } = cmd {
                self.terminate_all();
                let _ = reply.send(());
                info!("event manager stopped");
                return;
            }
            self.apply_command(cmd);
        }

        // Every handle dropped without an explicit stop: still give
        // listeners their terminate call.
        self.terminate_all();
        info!("event manager stopped (handles dropped)");
    }

    fn apply_command(&mut self, cmd: EventCommand) {
        match cmd {
            EventCommand::Tick => {
                self.time += 1;
                debug!(time = self.time, "tick");
            }

            EventCommand::StateChange { model, state } => {
                let time = self.time;
                self.deliver("state-change", |listener| {
                    listener.on_state_change(&model, &state, time)
                });
            }

            EventCommand::Output { source, value } => {
                let time = self.time;
                self.deliver("output", |listener| {
                    listener.on_output(&source, &value, time)
                });
            }

            EventCommand::AddListener { mut listener, reply } => {
                let result = match listener.init() {
                    Ok(()) => {
                        let id = ListenerId::new();
                        debug!(listener = %id, "listener registered");
                        self.listeners.insert(0, Entry { id, listener });
                        Ok(id)
                    }
                    Err(err) => {
                        warn!(error = %err, "listener rejected at init");
                        Err(KernelError::ListenerRejected(err))
                    }
                };
                let _ = reply.send(result);
            }

            EventCommand::Time { reply } => {
                let _ = reply.send(self.time);
            }

            EventCommand::Stop { .. } => {
                // Handled in run().
            }
        }
    }

    /// Delivers one notification to every listener in list order,
    /// dropping the ones that fail.
    fn deliver<F>(&mut self, what: &str, mut call: F)
    where
        F: FnMut(&mut dyn Listener) -> Result<(), ListenerError>,
    {
        let mut idx = 0;
        while idx < self.listeners.len() {
            match call(self.listeners[idx].listener.as_mut()) {
                Ok(()) => idx += 1,
                Err(err) => {
                    let mut entry = self.listeners.remove(idx);
                    warn!(
                        listener = %entry.id,
                        error = %err,
                        "{what} delivery failed; listener dropped"
                    );
                    entry
                        .listener
                        .terminate(TerminateReason::Failure(err.to_string()));
                }
            }
        }
    }

    fn terminate_all(&mut self) {
        for mut entry in self.listeners.drain(..) {
            entry.listener.terminate(TerminateReason::Normal);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{EventKind, FlakyListener, RecordingListener};

    #[tokio::test]
    async fn tick_only_moves_the_clock() {
        let events = EventManager::spawn();
        assert_eq!(events.time().await.unwrap(), 0);

        events.tick().await.unwrap();
        events.tick().await.unwrap();
        assert_eq!(events.time().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn notifications_are_stamped_with_the_clock() {
        let events = EventManager::spawn();
        let (listener, log) = RecordingListener::new("obs");
        events.add_listener(listener).await.unwrap();

        let m = ModelId::new("cell");
        events
            .notify_output(m.clone(), Value::Bool(true))
            .await
            .unwrap();
        events.tick().await.unwrap();
        events
            .notify_state_change(m, Value::Bool(false))
            .await
            .unwrap();

        // Time query doubles as a barrier: casts are FIFO.
        events.time().await.unwrap();

        let recorded = log.events();
        assert_eq!(recorded.len(), 2);
        assert_eq!(recorded[0].kind, EventKind::Output);
        assert_eq!(recorded[0].time, 0);
        assert_eq!(recorded[1].kind, EventKind::StateChange);
        assert_eq!(recorded[1].time, 1);
    }

    #[tokio::test]
    async fn most_recent_listener_observes_first() {
        let events = EventManager::spawn();
        let (first, log) = RecordingListener::new("first");
        let (second, _) = RecordingListener::with_log("second", log.clone());
        events.add_listener(first).await.unwrap();
        events.add_listener(second).await.unwrap();

        events
            .notify_output(ModelId::new("m"), Value::Null)
            .await
            .unwrap();
        events.time().await.unwrap();

        let order: Vec<String> = log.events().iter().map(|e| e.listener.clone()).collect();
        assert_eq!(order, vec!["second", "first"]);
    }

    #[tokio::test]
    async fn failing_listener_is_isolated() {
        let events = EventManager::spawn();
        let (survivor, log) = RecordingListener::new("survivor");
        let flaky = FlakyListener::fails_on(3);
        let flaky_probe = flaky.probe();
        events.add_listener(survivor).await.unwrap();
        events.add_listener(flaky).await.unwrap();

        let m = ModelId::new("m");
        for step in 0..5u64 {
            events
                .notify_output(m.clone(), Value::from(step))
                .await
                .unwrap();
        }
        events.time().await.unwrap();

        // The flaky listener saw exactly 3 notifications, then one
        // failure-terminate; the survivor saw all 5.
        assert_eq!(flaky_probe.notifications(), 3);
        assert_eq!(flaky_probe.terminations(), 1);
        assert!(flaky_probe.terminated_with_failure());
        assert_eq!(log.events().len(), 5);
    }

    #[tokio::test]
    async fn rejected_listener_is_not_registered() {
        let events = EventManager::spawn();
        let err = events
            .add_listener(FlakyListener::rejects_init())
            .await
            .unwrap_err();
        assert!(matches!(err, KernelError::ListenerRejected(_)));

        // Notifications still flow to nobody without error.
        events
            .notify_output(ModelId::new("m"), Value::Null)
            .await
            .unwrap();
        assert_eq!(events.time().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn stop_terminates_remaining_listeners_normally() {
        let events = EventManager::spawn();
        let flaky = FlakyListener::fails_on(usize::MAX);
        let probe = flaky.probe();
        events.add_listener(flaky).await.unwrap();

        events.stop().await.unwrap();

        assert_eq!(probe.terminations(), 1);
        assert!(!probe.terminated_with_failure());

        let err = events.tick().await.unwrap_err();
        assert!(matches!(err, KernelError::EventsGone));
    }
}
