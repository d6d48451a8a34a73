//! Model servers — one concurrent unit per model.
//!
//! A [`ModelServer`] task wraps exactly one model instance (atomic or
//! network) and owns its mutable record: the model state, the
//! pending-input buffer, the parent link, and the event-manager
//! binding. All operations against one model serialize through its
//! mailbox; no two operations on the same model ever run concurrently.
//!
//! ```text
//! Simulator ──┐
//!             │   ModelCommand    ┌──────────────────────────────┐
//! parent   ───┼─────────────────► │ ModelServer task             │
//! network     │  (mpsc, FIFO)     │  variant · pending · parent  │
//!             │                   └──────────────────────────────┘
//! other    ───┘                        │ oneshot reply / none
//! handles
//! ```
//!
//! [`ModelHandle`] is the opaque, comparable identity other
//! components hold; it is the only way to refer to a model.

mod command;
mod handle;
mod runner;

pub use command::ModelCommand;
pub use handle::ModelHandle;
pub use runner::ModelServer;
