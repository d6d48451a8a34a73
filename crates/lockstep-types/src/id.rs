//! Identifier types for LOCKSTEP.
//!
//! All identifiers are UUID-based: a simulation may hold thousands of
//! model tasks across several trees, and ids must stay unique and
//! cheaply comparable across all of them.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of one model in a simulation tree.
///
/// A `ModelId` names exactly one model server for the lifetime of the
/// process. The `name` field is a human-readable label carried along
/// for logging and test assertions; identity is the UUID alone.
///
/// # Equality Semantics
///
/// `PartialEq`/`Eq`/`Hash` compare the UUID only. Two models built
/// with the same label are still distinct:
///
/// ```
/// use lockstep_types::ModelId;
///
/// let a = ModelId::new("xor");
/// let b = ModelId::new("xor");
/// assert_ne!(a, b);          // distinct identities
/// assert_eq!(a.name(), b.name());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelId {
    uuid: Uuid,
    name: String,
}

impl ModelId {
    /// Creates a new [`ModelId`] with a random UUID v4.
    ///
    /// # Example
    ///
    /// ```
    /// use lockstep_types::ModelId;
    ///
    /// let id = ModelId::new("memory-cell");
    /// assert_eq!(id.name(), "memory-cell");
    /// ```
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: name.into(),
        }
    }

    /// Returns the inner UUID.
    #[must_use]
    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    /// Returns the human-readable label.
    ///
    /// Labels are not unique; use them for logs and assertions, never
    /// for routing.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl PartialEq for ModelId {
    fn eq(&self, other: &Self) -> bool {
        self.uuid == other.uuid
    }
}

impl Eq for ModelId {}

impl std::hash::Hash for ModelId {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.uuid.hash(state);
    }
}

impl std::fmt::Display for ModelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "model:{}@{}", self.name, self.uuid)
    }
}

/// Identifier of one registered listener.
///
/// Assigned by the event manager when a listener is registered; used
/// to attribute termination and failure logs to a concrete listener.
///
/// # Example
///
/// ```
/// use lockstep_types::ListenerId;
///
/// let a = ListenerId::new();
/// let b = ListenerId::new();
/// assert_ne!(a, b);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListenerId(pub Uuid);

#[allow(clippy::new_without_default)] // ListenerId is handed out by the event manager, not defaulted
impl ListenerId {
    /// Creates a new [`ListenerId`] with a random UUID v4.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the inner UUID.
    #[must_use]
    pub fn uuid(&self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for ListenerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "listener:{}", self.0)
    }
}
