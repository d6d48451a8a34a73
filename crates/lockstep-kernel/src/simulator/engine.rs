//! The simulator task: the sole driver of simulation steps.

use crate::error::KernelError;
use crate::events::{EventManager, EventManagerHandle};
use crate::server::ModelHandle;
use crate::simulator::routing::{self, StepPlan};
use crate::simulator::SimCommand;
use lockstep_event::Listener;
use lockstep_types::ListenerId;
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

/// Mailbox capacity for the simulator.
///
/// Callers typically queue a batch of steps and then a time barrier;
/// 64 queued steps is ample headroom for that pattern.
const MAILBOX_BUFFER_SIZE: usize = 64;

/// Cloneable reference to a running [`Simulator`].
#[derive(Debug, Clone)]
pub struct SimulatorHandle {
    tx: mpsc::Sender<SimCommand>,
}

impl SimulatorHandle {
    /// Queues one step with the given external inputs (cast).
    ///
    /// Each value is routed into the root via its coupling function
    /// (or delivered directly when the root is atomic). Steps run in
    /// the order they were queued; a failed step logs, leaves all
    /// state untouched, and does not advance time.
    pub async fn compute_next_state(&self, inputs: Vec<Value>) -> Result<(), KernelError> {
        self.cast(SimCommand::Step { inputs }).await
    }

    /// Registers a listener with the simulation's event manager.
    pub async fn add_listener(&self, listener: impl Listener) -> Result<ListenerId, KernelError> {
        let (tx, rx) = oneshot::channel();
        self.cast(SimCommand::AddListener {
            listener: Box::new(listener),
            reply: tx,
        })
        .await?;
        rx.await.map_err(|_| KernelError::SimulatorGone)?
    }

    /// Queries the number of committed steps.
    ///
    /// Because the mailbox is FIFO, awaiting this after a batch of
    /// [`compute_next_state`](Self::compute_next_state) casts also
    /// acts as a completion barrier for those steps.
    pub async fn time(&self) -> Result<u64, KernelError> {
        let (tx, rx) = oneshot::channel();
        self.cast(SimCommand::Time { reply: tx }).await?;
        rx.await.map_err(|_| KernelError::SimulatorGone)
    }

    /// Stops the simulator; its event manager terminates every
    /// remaining listener with a normal reason. Model servers are not
    /// stopped.
    pub async fn stop(&self) -> Result<(), KernelError> {
        let (tx, rx) = oneshot::channel();
        self.cast(SimCommand::Stop { reply: tx }).await?;
        rx.await.map_err(|_| KernelError::SimulatorGone)
    }

    async fn cast(&self, cmd: SimCommand) -> Result<(), KernelError> {
        self.tx
            .send(cmd)
            .await
            .map_err(|_| KernelError::SimulatorGone)
    }
}

/// Task driving one model tree through lockstep steps.
///
/// # Step Algorithm
///
/// Each step runs in two phases:
///
/// 1. **Plan** — every atomic's output function runs once, in the
///    fixed pre-order enumeration; each produced value and each
///    external input is routed through the coupling functions into a
///    [`StepPlan`]. No deliveries, events or transitions happen in
///    this phase, though the output calls themselves take `&mut` and
///    any bookkeeping they do is not rolled back.
/// 2. **Commit** — output events are emitted, planned deliveries land
///    in input buffers, the event clock ticks, and every atomic
///    applies its transition (emitting its state-change event), again
///    in enumeration order. Time advances by one.
///
/// A routing failure in the plan phase aborts the step before any
/// commit: no deliveries, no events, no tick. An infrastructure
/// failure during the commit (a model task gone mid-loop) stops the
/// step where it stands. Either way time does not advance and the
/// simulator logs the error and keeps serving subsequent commands.
///
/// # Determinism
///
/// The simulator awaits every exchange before issuing the next, so a
/// step is one strictly sequential chain of request/response pairs.
/// With a fixed topology, fixed couplings and the same input
/// sequence, two runs produce identical event sequences.
pub struct Simulator {
    root: ModelHandle,
    atomics: Vec<ModelHandle>,
    events: EventManagerHandle,
    time: u64,
    rx: mpsc::Receiver<SimCommand>,
}

impl Simulator {
    /// Spawns the simulator for the tree rooted at `root`.
    ///
    /// Enumerates the atomic leaves once (the enumeration stays fixed
    /// for the simulator's lifetime), spawns a dedicated event
    /// manager and binds it to every atomic so transitions report
    /// their state changes.
    pub async fn start(root: ModelHandle) -> Result<SimulatorHandle, KernelError> {
        let events = EventManager::spawn();
        let atomics = root.all_atomics().await?;
        for model in &atomics {
            model.set_event_manager(events.clone()).await?;
        }

        let (tx, rx) = mpsc::channel(MAILBOX_BUFFER_SIZE);
        let simulator = Self {
            root,
            atomics,
            events,
            time: 0,
            rx,
        };
        tokio::spawn(simulator.run());
        Ok(SimulatorHandle { tx })
    }

    async fn run(mut self) {
        info!(root = %self.root, atomics = self.atomics.len(), "simulator started");

        while let Some(cmd) = self.rx.recv().await {
            match cmd {
                SimCommand::Step { inputs } => {
                    if let Err(err) = self.step(inputs).await {
                        error!(time = self.time, error = %err, "step failed; time not advanced");
                    }
                }

                SimCommand::AddListener { listener, reply } => {
                    let _ = reply.send(self.events.add_boxed(listener).await);
                }

                SimCommand::Time { reply } => {
                    let _ = reply.send(self.time);
                }

                SimCommand::Stop { reply } => {
                    self.shutdown().await;
                    let _ = reply.send(());
                    info!(time = self.time, "simulator stopped");
                    return;
                }
            }
        }

        // Every handle dropped without an explicit stop.
        self.shutdown().await;
        info!(time = self.time, "simulator stopped (handles dropped)");
    }

    async fn shutdown(&mut self) {
        if let Err(err) = self.events.stop().await {
            warn!(error = %err, "event manager already gone at shutdown");
        }
    }

    /// One step: plan, then commit.
    async fn step(&mut self, inputs: Vec<Value>) -> Result<(), KernelError> {
        let mut plan = StepPlan::default();

        // Plan: outputs first, in enumeration order.
        for model in &self.atomics {
            let outputs = model.produce_output().await?;
            if outputs.is_empty() {
                continue;
            }
            let parent = model.parent().await?;
            for value in outputs {
                routing::collect(parent.clone(), model.clone(), value, &mut plan).await?;
            }
        }

        // Plan: external inputs enter through the root.
        for value in inputs {
            if self.root.is_atomic() {
                plan.deliveries.push((self.root.clone(), value));
            } else {
                routing::collect(Some(self.root.clone()), self.root.clone(), value, &mut plan)
                    .await?;
            }
        }

        // Commit. Output events carry this step's time; the tick in
        // between stamps the transition-driven state changes with the
        // advanced clock.
        for (source, value) in plan.outputs {
            self.events.notify_output(source.id().clone(), value).await?;
        }
        for (target, value) in plan.deliveries {
            target.add_input(value).await?;
        }
        self.events.tick().await?;
        for model in &self.atomics {
            model.apply_transition().await?;
        }

        self.time += 1;
        debug!(time = self.time, "step committed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AtomicModel, NetworkModel};
    use crate::server::ModelServer;
    use crate::testing::{Emitter, Probe, RecordingListener, StaticNetwork};
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    /// Emits a pulse each step and counts how often it was asked.
    struct Pulse {
        calls: Arc<Mutex<usize>>,
    }

    impl AtomicModel for Pulse {
        fn transition(&mut self, _inputs: Vec<Value>) {}

        fn output(&mut self) -> Vec<Value> {
            *self.calls.lock().expect("pulse counter poisoned") += 1;
            vec![json!(1)]
        }
    }

    /// Network that declares every child value its own output.
    struct PassThrough {
        child: ModelHandle,
    }

    impl NetworkModel for PassThrough {
        fn children(&self) -> Vec<ModelHandle> {
            vec![self.child.clone()]
        }

        fn route(
            &self,
            own: &ModelHandle,
            source: &ModelHandle,
            value: &Value,
        ) -> Vec<(ModelHandle, Value)> {
            if source == own {
                vec![]
            } else {
                vec![(own.clone(), value.clone())]
            }
        }
    }

    #[tokio::test]
    async fn atomic_root_receives_external_inputs_directly() {
        let (probe, log) = Probe::new();
        let root = ModelServer::spawn_atomic("root", probe);
        let sim = Simulator::start(root).await.unwrap();

        sim.compute_next_state(vec![json!(1), json!(2)]).await.unwrap();
        sim.compute_next_state(vec![]).await.unwrap();
        assert_eq!(sim.time().await.unwrap(), 2);

        let transitions = log.transitions();
        assert_eq!(transitions[0], vec![json!(1), json!(2)]);
        assert_eq!(transitions[1], Vec::<Value>::new());
    }

    #[tokio::test]
    async fn output_runs_once_per_atomic_per_step() {
        let (probe, log) = Probe::new();
        let leaf = ModelServer::spawn_atomic("leaf", probe);
        let root = ModelServer::spawn_network("root", StaticNetwork::new(vec![leaf]))
            .await
            .unwrap();
        let sim = Simulator::start(root).await.unwrap();

        for _ in 0..3 {
            sim.compute_next_state(vec![]).await.unwrap();
        }
        sim.time().await.unwrap();

        assert_eq!(log.output_calls(), 3);
    }

    #[tokio::test]
    async fn broken_parent_link_aborts_without_advancing_time() {
        let (probe, _) = Probe::new();
        let not_a_network = ModelServer::spawn_atomic("bad-parent", probe);
        let root = ModelServer::spawn_atomic("root", Emitter::new(json!(true)));
        root.set_parent(not_a_network).await.unwrap();

        let sim = Simulator::start(root).await.unwrap();
        let (listener, log) = RecordingListener::new("obs");
        sim.add_listener(listener).await.unwrap();

        sim.compute_next_state(vec![]).await.unwrap();
        sim.compute_next_state(vec![]).await.unwrap();

        // Both steps abort; the simulator still answers and nothing
        // was delivered or emitted.
        assert_eq!(sim.time().await.unwrap(), 0);
        assert!(log.events().is_empty());
    }

    #[tokio::test]
    async fn aborted_step_keeps_plan_phase_output_bookkeeping() {
        let calls = Arc::new(Mutex::new(0));
        let pulse = ModelServer::spawn_atomic(
            "pulse",
            Pulse {
                calls: Arc::clone(&calls),
            },
        );
        let net = ModelServer::spawn_network("net", PassThrough { child: pulse })
            .await
            .unwrap();
        let (trap, _) = Probe::new();
        let trap = ModelServer::spawn_atomic("trap", trap);
        net.set_parent(trap).await.unwrap();

        let sim = Simulator::start(net).await.unwrap();
        sim.compute_next_state(vec![]).await.unwrap();

        // The step aborts when the bubble reaches the atomic parent,
        // after the output function already ran; time stays put, the
        // output call does not.
        assert_eq!(sim.time().await.unwrap(), 0);
        assert_eq!(*calls.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn stop_winds_down_the_event_manager() {
        let (probe, _) = Probe::new();
        let root = ModelServer::spawn_atomic("root", probe);
        let sim = Simulator::start(root.clone()).await.unwrap();

        sim.stop().await.unwrap();

        let err = sim.time().await.unwrap_err();
        assert!(matches!(err, KernelError::SimulatorGone));

        // Model servers stay up; their owner stops them.
        assert!(root.parent().await.unwrap().is_none());
    }
}
