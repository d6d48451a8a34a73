//! [`ModelHandle`] — the opaque identity of a model server.

use crate::error::KernelError;
use crate::events::EventManagerHandle;
use crate::model::ModelKind;
use crate::server::ModelCommand;
use lockstep_types::ModelId;
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};

/// Cloneable reference to one model server.
///
/// The handle is the only way other components refer to a model:
/// coupling functions receive and return handles, parents hold child
/// handles, the simulator holds the flattened atomics list as
/// handles.
///
/// # Equality Semantics
///
/// Handles compare and hash by [`ModelId`] alone, so clones of the
/// same handle are equal and coupling functions can rely on plain
/// `==` against an explicit `own`/`source` handle.
///
/// # Kind
///
/// The wrapped variant is fixed at spawn time and readable without a
/// round-trip via [`kind`](Self::kind) — the routing algorithm
/// classifies targets with it.
#[derive(Debug, Clone)]
pub struct ModelHandle {
    id: ModelId,
    kind: ModelKind,
    tx: mpsc::Sender<ModelCommand>,
}

impl ModelHandle {
    pub(crate) fn new(id: ModelId, kind: ModelKind, tx: mpsc::Sender<ModelCommand>) -> Self {
        Self { id, kind, tx }
    }

    /// The model's identity.
    #[must_use]
    pub fn id(&self) -> &ModelId {
        &self.id
    }

    /// The wrapped variant.
    #[must_use]
    pub fn kind(&self) -> ModelKind {
        self.kind
    }

    /// `true` if this handle refers to an atomic (leaf) model.
    #[must_use]
    pub fn is_atomic(&self) -> bool {
        self.kind == ModelKind::Atomic
    }

    /// `true` if this handle refers to a network (composite) model.
    #[must_use]
    pub fn is_network(&self) -> bool {
        self.kind == ModelKind::Network
    }

    /// Appends a value to the model's pending-input buffer.
    ///
    /// Fire-and-forget: the server acknowledges nothing. The buffer
    /// keeps stable arrival order; positionally tagged inputs can be
    /// sorted inside the transition with
    /// [`sort_indexed_inputs`](crate::sort_indexed_inputs).
    pub async fn add_input(&self, value: Value) -> Result<(), KernelError> {
        self.cast(ModelCommand::AddInput(value)).await
    }

    /// Applies the state transition against the buffered inputs.
    ///
    /// Atomic models only; a network answers
    /// [`KernelError::NotAtomic`] and mutates nothing.
    pub async fn apply_transition(&self) -> Result<(), KernelError> {
        let (tx, rx) = oneshot::channel();
        self.call(ModelCommand::ApplyTransition { reply: tx }, rx)
            .await?
    }

    /// Runs the output function and returns this step's values.
    ///
    /// Atomic models only. The simulator invokes this exactly once
    /// per model per step; other callers should treat mid-step use as
    /// off-contract.
    pub async fn produce_output(&self) -> Result<Vec<Value>, KernelError> {
        let (tx, rx) = oneshot::channel();
        self.call(ModelCommand::ProduceOutput { reply: tx }, rx)
            .await?
    }

    /// Runs the coupling function for `(source, value)`.
    ///
    /// Network models only; an atomic answers
    /// [`KernelError::NotNetwork`].
    pub async fn route(
        &self,
        source: &ModelHandle,
        value: &Value,
    ) -> Result<Vec<(ModelHandle, Value)>, KernelError> {
        let (tx, rx) = oneshot::channel();
        self.call(
            ModelCommand::Route {
                source: source.clone(),
                value: value.clone(),
                reply: tx,
            },
            rx,
        )
        .await?
    }

    /// Enumerates every atomic leaf under this model, in pre-order.
    pub async fn all_atomics(&self) -> Result<Vec<ModelHandle>, KernelError> {
        let (tx, rx) = oneshot::channel();
        self.call(ModelCommand::AllAtomics { reply: tx }, rx).await?
    }

    /// Queries the parent link (`None` for the root).
    pub async fn parent(&self) -> Result<Option<ModelHandle>, KernelError> {
        let (tx, rx) = oneshot::channel();
        self.call(ModelCommand::GetParent { reply: tx }, rx).await
    }

    /// Assigns the parent link.
    ///
    /// Called by [`ModelServer::spawn_network`](crate::ModelServer::spawn_network)
    /// for each direct child; assigned once before simulation begins.
    pub async fn set_parent(&self, parent: ModelHandle) -> Result<(), KernelError> {
        self.cast(ModelCommand::SetParent(parent)).await
    }

    /// Binds the event manager receiving this model's state-change
    /// events.
    pub async fn set_event_manager(&self, events: EventManagerHandle) -> Result<(), KernelError> {
        self.cast(ModelCommand::SetEventManager(events)).await
    }

    /// Stops the server task.
    ///
    /// Model servers are not owned by the simulator; whoever spawned
    /// them winds them down.
    pub async fn stop(&self) -> Result<(), KernelError> {
        self.cast(ModelCommand::Stop).await
    }

    /// Sends a cast; the mailbox being closed means the task is gone.
    async fn cast(&self, cmd: ModelCommand) -> Result<(), KernelError> {
        self.tx
            .send(cmd)
            .await
            .map_err(|_| KernelError::ModelGone {
                id: self.id.clone(),
            })
    }

    /// Sends a call and awaits the oneshot reply.
    async fn call<R>(&self, cmd: ModelCommand, rx: oneshot::Receiver<R>) -> Result<R, KernelError> {
        self.cast(cmd).await?;
        rx.await.map_err(|_| KernelError::ModelGone {
            id: self.id.clone(),
        })
    }
}

impl PartialEq for ModelHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ModelHandle {}

impl std::hash::Hash for ModelHandle {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl std::fmt::Display for ModelHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.id, self.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dummy(kind: ModelKind) -> ModelHandle {
        let (tx, _rx) = mpsc::channel(1);
        ModelHandle::new(ModelId::new("dummy"), kind, tx)
    }

    #[test]
    fn equality_is_by_id() {
        let a = dummy(ModelKind::Atomic);
        let clone = a.clone();
        let other = dummy(ModelKind::Atomic);

        assert_eq!(a, clone);
        assert_ne!(a, other);
    }

    #[test]
    fn kind_accessors() {
        let atomic = dummy(ModelKind::Atomic);
        let network = dummy(ModelKind::Network);

        assert!(atomic.is_atomic());
        assert!(!atomic.is_network());
        assert!(network.is_network());
    }

    #[tokio::test]
    async fn closed_mailbox_reports_model_gone() {
        let handle = dummy(ModelKind::Atomic);
        // _rx dropped immediately, so every send fails.
        let err = handle.add_input(Value::Null).await.unwrap_err();
        assert!(matches!(err, KernelError::ModelGone { .. }));

        let err = handle.parent().await.unwrap_err();
        assert!(matches!(err, KernelError::ModelGone { .. }));
    }
}
