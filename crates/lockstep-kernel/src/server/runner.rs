//! The model server task.

use crate::error::KernelError;
use crate::events::EventManagerHandle;
use crate::model::{AtomicModel, ModelKind, NetworkModel};
use crate::server::{ModelCommand, ModelHandle};
use lockstep_types::ModelId;
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Mailbox capacity per model server.
///
/// A step delivers at most a handful of commands to any one model;
/// 64 absorbs bursts of fan-in `add_input` casts without the
/// simulator ever waiting on a full mailbox in practice.
const MAILBOX_BUFFER_SIZE: usize = 64;

/// The model variant a server wraps.
enum Variant {
    Atomic(Box<dyn AtomicModel>),
    Network(Box<dyn NetworkModel>),
}

/// Task wrapping exactly one model instance.
///
/// Owns the model state, the pending-input buffer, the parent link,
/// and the event-manager binding; nothing else ever touches them.
/// Spawn with [`spawn_atomic`](Self::spawn_atomic) or
/// [`spawn_network`](Self::spawn_network) and talk to the returned
/// [`ModelHandle`].
pub struct ModelServer {
    handle: ModelHandle,
    variant: Variant,
    parent: Option<ModelHandle>,
    pending: Vec<Value>,
    events: Option<EventManagerHandle>,
    rx: mpsc::Receiver<ModelCommand>,
}

impl ModelServer {
    /// Spawns a server task around an atomic model.
    ///
    /// `name` is a debugging label carried in the model's id.
    #[must_use]
    pub fn spawn_atomic(name: impl Into<String>, model: impl AtomicModel) -> ModelHandle {
        Self::spawn(name, Variant::Atomic(Box::new(model)), ModelKind::Atomic)
    }

    /// Spawns a server task around a network model and wires the
    /// parent link of each *direct* child to the new network.
    ///
    /// Only direct children are wired — grandchildren were already
    /// wired when their own parent network was spawned. The wiring
    /// casts fail only if a child task has already stopped.
    pub async fn spawn_network(
        name: impl Into<String>,
        model: impl NetworkModel,
    ) -> Result<ModelHandle, KernelError> {
        let children = model.children();
        let handle = Self::spawn(name, Variant::Network(Box::new(model)), ModelKind::Network);
        for child in children {
            child.set_parent(handle.clone()).await?;
        }
        Ok(handle)
    }

    fn spawn(name: impl Into<String>, variant: Variant, kind: ModelKind) -> ModelHandle {
        let (tx, rx) = mpsc::channel(MAILBOX_BUFFER_SIZE);
        let handle = ModelHandle::new(ModelId::new(name), kind, tx);
        let server = Self {
            handle: handle.clone(),
            variant,
            parent: None,
            pending: Vec::new(),
            events: None,
            rx,
        };
        tokio::spawn(server.run());
        handle
    }

    /// The mailbox loop. Runs until `Stop` or until every handle is
    /// dropped.
    async fn run(mut self) {
        info!(model = %self.handle, "model server started");

        while let Some(cmd) = self.rx.recv().await {
            if matches!(cmd, ModelCommand::Stop) {
                break;
            }
            self.apply_command(cmd).await;
        }

        info!(model = %self.handle, "model server stopped");
    }

    async fn apply_command(&mut self, cmd: ModelCommand) {
        match cmd {
            ModelCommand::AddInput(value) => {
                self.pending.push(value);
            }

            ModelCommand::ApplyTransition { reply } => {
                let _ = reply.send(self.apply_transition().await);
            }

            ModelCommand::ProduceOutput { reply } => {
                let result = match &mut self.variant {
                    Variant::Atomic(model) => Ok(model.output()),
                    Variant::Network(_) => {
                        warn!(model = %self.handle, "produce_output on a network");
                        Err(KernelError::NotAtomic {
                            id: self.handle.id().clone(),
                            op: "produce_output",
                        })
                    }
                };
                let _ = reply.send(result);
            }

            ModelCommand::Route {
                source,
                value,
                reply,
            } => {
                let result = match &self.variant {
                    Variant::Network(model) => Ok(model.route(&self.handle, &source, &value)),
                    Variant::Atomic(_) => {
                        warn!(model = %self.handle, source = %source, "route on an atomic");
                        Err(KernelError::NotNetwork {
                            id: self.handle.id().clone(),
                        })
                    }
                };
                let _ = reply.send(result);
            }

            ModelCommand::AllAtomics { reply } => {
                let _ = reply.send(self.all_atomics().await);
            }

            ModelCommand::GetParent { reply } => {
                let _ = reply.send(self.parent.clone());
            }

            ModelCommand::SetParent(parent) => {
                if self.parent.is_some() {
                    warn!(model = %self.handle, "parent link reassigned");
                }
                debug!(model = %self.handle, parent = %parent, "parent assigned");
                self.parent = Some(parent);
            }

            ModelCommand::SetEventManager(events) => {
                self.events = Some(events);
            }

            ModelCommand::Stop => {
                // Handled in run().
            }
        }
    }

    /// Transition: snapshot the buffer, clear it, advance the model,
    /// emit a state-change event.
    async fn apply_transition(&mut self) -> Result<(), KernelError> {
        let model = match &mut self.variant {
            Variant::Atomic(model) => model,
            Variant::Network(_) => {
                warn!(model = %self.handle, "apply_transition on a network");
                return Err(KernelError::NotAtomic {
                    id: self.handle.id().clone(),
                    op: "apply_transition",
                });
            }
        };

        let inputs = std::mem::take(&mut self.pending);
        debug!(model = %self.handle, inputs = inputs.len(), "transition");
        model.transition(inputs);

        if let Some(events) = &self.events {
            let snapshot = model.observe();
            if let Err(err) = events
                .notify_state_change(self.handle.id().clone(), snapshot)
                .await
            {
                warn!(model = %self.handle, error = %err, "state-change event dropped");
            }
        }

        Ok(())
    }

    /// Pre-order leaf enumeration: a leaf is itself; a network is the
    /// concatenation of each child's leaves. The recursion terminates
    /// on leaves because the topology is a finite tree.
    async fn all_atomics(&self) -> Result<Vec<ModelHandle>, KernelError> {
        match &self.variant {
            Variant::Atomic(_) => Ok(vec![self.handle.clone()]),
            Variant::Network(model) => {
                let mut leaves = Vec::new();
                for child in model.children() {
                    leaves.extend(child.all_atomics().await?);
                }
                Ok(leaves)
            }
        }
    }
}
