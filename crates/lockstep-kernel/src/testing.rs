//! Test fixtures for model and listener implementations.
//!
//! Engine-independent building blocks used by the kernel's own tests
//! and reusable by downstream crates: observable atomic models, a
//! routing-free network, and listeners that record or fail on demand.
//!
//! Everything here observes through shared `Arc<Mutex<_>>` logs so a
//! test can keep a probe after moving the fixture into a spawned
//! task.

use crate::model::{AtomicModel, NetworkModel};
use crate::server::ModelHandle;
use lockstep_event::{Listener, ListenerError, TerminateReason};
use lockstep_types::ModelId;
use serde_json::Value;
use std::sync::{Arc, Mutex};

// ── Atomic fixtures ──────────────────────────────────────────────────

#[derive(Default)]
struct ProbeState {
    transitions: Vec<Vec<Value>>,
    output_calls: usize,
}

/// Shared view into a [`Probe`]'s history.
#[derive(Clone, Default)]
pub struct ProbeLog(Arc<Mutex<ProbeState>>);

impl ProbeLog {
    /// Input snapshots seen by each transition, in order.
    pub fn transitions(&self) -> Vec<Vec<Value>> {
        self.0.lock().expect("probe log poisoned").transitions.clone()
    }

    /// How many times the output function ran.
    pub fn output_calls(&self) -> usize {
        self.0.lock().expect("probe log poisoned").output_calls
    }
}

/// Atomic model that records every transition's inputs and counts
/// output invocations. Emits nothing.
pub struct Probe {
    log: ProbeLog,
}

impl Probe {
    /// Creates a probe and the log observing it.
    pub fn new() -> (Self, ProbeLog) {
        let log = ProbeLog::default();
        (Self { log: log.clone() }, log)
    }
}

impl AtomicModel for Probe {
    fn transition(&mut self, inputs: Vec<Value>) {
        self.log
            .0
            .lock()
            .expect("probe log poisoned")
            .transitions
            .push(inputs);
    }

    fn output(&mut self) -> Vec<Value> {
        self.log.0.lock().expect("probe log poisoned").output_calls += 1;
        vec![]
    }

    fn observe(&self) -> Value {
        Value::from(self.log.output_calls() as u64)
    }
}

/// Atomic model that emits one fixed value every step and ignores
/// its inputs.
pub struct Emitter {
    value: Value,
}

impl Emitter {
    /// Emits `value` each step.
    #[must_use]
    pub fn new(value: Value) -> Self {
        Self { value }
    }
}

impl AtomicModel for Emitter {
    fn transition(&mut self, _inputs: Vec<Value>) {}

    fn output(&mut self) -> Vec<Value> {
        vec![self.value.clone()]
    }
}

// ── Network fixture ──────────────────────────────────────────────────

/// Network with a fixed child list and a coupling function that
/// drops everything. Good enough for topology tests.
pub struct StaticNetwork {
    children: Vec<ModelHandle>,
}

impl StaticNetwork {
    /// Wraps the given children.
    #[must_use]
    pub fn new(children: Vec<ModelHandle>) -> Self {
        Self { children }
    }
}

impl NetworkModel for StaticNetwork {
    fn children(&self) -> Vec<ModelHandle> {
        self.children.clone()
    }

    fn route(
        &self,
        _own: &ModelHandle,
        _source: &ModelHandle,
        _value: &Value,
    ) -> Vec<(ModelHandle, Value)> {
        vec![]
    }
}

// ── Listener fixtures ────────────────────────────────────────────────

/// What kind of notification a [`RecordedEvent`] is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// `on_state_change`.
    StateChange,
    /// `on_output`.
    Output,
}

/// One recorded notification.
///
/// Subjects are recorded by *name*, not id, so event sequences from
/// independently built trees can be compared for determinism.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedEvent {
    /// Label of the recording listener.
    pub listener: String,
    /// Notification kind.
    pub kind: EventKind,
    /// Name of the model the event is about.
    pub subject: String,
    /// The payload (snapshot or output value).
    pub value: Value,
    /// Event-manager clock at delivery.
    pub time: u64,
}

/// Shared, append-only log of recorded notifications.
#[derive(Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<RecordedEvent>>>);

impl EventLog {
    /// Everything recorded so far, in delivery order.
    pub fn events(&self) -> Vec<RecordedEvent> {
        self.0.lock().expect("event log poisoned").clone()
    }

    /// Output-event payloads for the model named `subject`.
    pub fn outputs_of(&self, subject: &str) -> Vec<Value> {
        self.events()
            .into_iter()
            .filter(|e| e.kind == EventKind::Output && e.subject == subject)
            .map(|e| e.value)
            .collect()
    }
}

/// Listener that appends every notification to an [`EventLog`].
pub struct RecordingListener {
    name: String,
    log: EventLog,
}

impl RecordingListener {
    /// Creates a recorder and a fresh log.
    pub fn new(name: impl Into<String>) -> (Self, EventLog) {
        let log = EventLog::default();
        (Self::with_log(name, log.clone()).0, log)
    }

    /// Creates a recorder appending to an existing log, so several
    /// listeners can interleave into one sequence.
    pub fn with_log(name: impl Into<String>, log: EventLog) -> (Self, EventLog) {
        (
            Self {
                name: name.into(),
                log: log.clone(),
            },
            log,
        )
    }

    fn record(&self, kind: EventKind, subject: &ModelId, value: &Value, time: u64) {
        self.log
            .0
            .lock()
            .expect("event log poisoned")
            .push(RecordedEvent {
                listener: self.name.clone(),
                kind,
                subject: subject.name().to_string(),
                value: value.clone(),
                time,
            });
    }
}

impl Listener for RecordingListener {
    fn on_state_change(
        &mut self,
        model: &ModelId,
        state: &Value,
        time: u64,
    ) -> Result<(), ListenerError> {
        self.record(EventKind::StateChange, model, state, time);
        Ok(())
    }

    fn on_output(
        &mut self,
        source: &ModelId,
        value: &Value,
        time: u64,
    ) -> Result<(), ListenerError> {
        self.record(EventKind::Output, source, value, time);
        Ok(())
    }
}

#[derive(Default)]
struct FlakyState {
    notifications: usize,
    terminations: usize,
    failure_terminate: bool,
}

/// Shared view into a [`FlakyListener`]'s fate.
#[derive(Clone)]
pub struct FlakyProbe(Arc<Mutex<FlakyState>>);

impl FlakyProbe {
    /// Notifications received, including the failing one.
    pub fn notifications(&self) -> usize {
        self.0.lock().expect("flaky probe poisoned").notifications
    }

    /// How often `terminate` ran (expected: at most once).
    pub fn terminations(&self) -> usize {
        self.0.lock().expect("flaky probe poisoned").terminations
    }

    /// `true` if the terminate reason was a failure.
    pub fn terminated_with_failure(&self) -> bool {
        self.0.lock().expect("flaky probe poisoned").failure_terminate
    }
}

/// Listener that fails on its nth notification (or at init).
pub struct FlakyListener {
    fail_on: usize,
    reject_init: bool,
    state: Arc<Mutex<FlakyState>>,
}

impl FlakyListener {
    /// Fails the `nth` notification (1-based), counting state-change
    /// and output notifications together.
    #[must_use]
    pub fn fails_on(nth: usize) -> Self {
        Self {
            fail_on: nth,
            reject_init: false,
            state: Arc::default(),
        }
    }

    /// Rejects registration in `init`.
    #[must_use]
    pub fn rejects_init() -> Self {
        Self {
            fail_on: usize::MAX,
            reject_init: true,
            state: Arc::default(),
        }
    }

    /// Probe observing this listener's fate.
    #[must_use]
    pub fn probe(&self) -> FlakyProbe {
        FlakyProbe(Arc::clone(&self.state))
    }

    fn notified(&mut self) -> Result<(), ListenerError> {
        let mut state = self.state.lock().expect("flaky state poisoned");
        state.notifications += 1;
        if state.notifications == self.fail_on {
            Err(ListenerError::Callback(format!(
                "planned failure on notification {}",
                self.fail_on
            )))
        } else {
            Ok(())
        }
    }
}

impl Listener for FlakyListener {
    fn init(&mut self) -> Result<(), ListenerError> {
        if self.reject_init {
            Err(ListenerError::Init("planned init rejection".into()))
        } else {
            Ok(())
        }
    }

    fn on_state_change(
        &mut self,
        _model: &ModelId,
        _state: &Value,
        _time: u64,
    ) -> Result<(), ListenerError> {
        self.notified()
    }

    fn on_output(
        &mut self,
        _source: &ModelId,
        _value: &Value,
        _time: u64,
    ) -> Result<(), ListenerError> {
        self.notified()
    }

    fn terminate(&mut self, reason: TerminateReason) {
        let mut state = self.state.lock().expect("flaky state poisoned");
        state.terminations += 1;
        if matches!(reason, TerminateReason::Failure(_)) {
            state.failure_terminate = true;
        }
    }
}
