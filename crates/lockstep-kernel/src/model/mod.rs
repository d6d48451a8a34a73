//! Model capability contracts.
//!
//! These are the polymorphism points user code implements to
//! participate in a simulation. The kernel treats model state as an
//! opaque payload: it only ever calls the functions below and routes
//! the [`serde_json::Value`]s they produce.
//!
//! # The Two Variants
//!
//! | Variant | Trait | Role |
//! |---------|-------|------|
//! | Atomic | [`AtomicModel`] | leaf: private state + transition + output |
//! | Network | [`NetworkModel`] | composite: fixed children + coupling rule |
//!
//! Leaves hold all simulation state; networks hold only topology and
//! routing rules. The kernel's correctness depends on both traits
//! being total functions over the inputs described on each method.

mod input;
mod traits;

pub use input::sort_indexed_inputs;
pub use traits::{AtomicModel, NetworkModel};

/// Which variant a model server wraps.
///
/// Fixed at spawn time and carried in every
/// [`ModelHandle`](crate::server::ModelHandle), so routing can
/// classify targets without an extra round-trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelKind {
    /// Leaf model with transition and output functions.
    Atomic,
    /// Composite model with children and a coupling function.
    Network,
}

impl std::fmt::Display for ModelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Atomic => write!(f, "atomic"),
            Self::Network => write!(f, "network"),
        }
    }
}
