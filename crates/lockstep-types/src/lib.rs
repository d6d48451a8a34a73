//! Core types for the LOCKSTEP simulation kernel.
//!
//! This crate is the bottom of the dependency stack and carries the
//! vocabulary shared by every other LOCKSTEP crate:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      SDK Layer                              │
//! ├─────────────────────────────────────────────────────────────┤
//! │  lockstep-types : ModelId, ListenerId, ErrorCode  ◄── HERE  │
//! │  lockstep-event : Listener contract, ListenerError          │
//! └─────────────────────────────────────────────────────────────┘
//!                               ↓
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Kernel Layer                            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  lockstep-kernel : model servers, event manager, simulator  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Identity
//!
//! Every model and listener in a running simulation is referred to by
//! an opaque, comparable identifier ([`ModelId`], [`ListenerId`]).
//! Identifiers are UUID-based so they stay unique no matter how many
//! trees or managers coexist in one process.
//!
//! # Error Convention
//!
//! All LOCKSTEP error types implement [`ErrorCode`]: a stable
//! machine-readable code plus a recoverability flag. The
//! [`assert_error_code`]/[`assert_error_codes`] helpers let each crate
//! verify its codes exhaustively in unit tests.

mod error;
mod id;

pub use error::{assert_error_code, assert_error_codes, ErrorCode};
pub use id::{ListenerId, ModelId};
