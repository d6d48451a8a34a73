//! Listener contract for LOCKSTEP simulations.
//!
//! This crate defines the observer side of the kernel boundary: the
//! [`Listener`] trait external code implements to watch a running
//! simulation, and the error/termination vocabulary the event manager
//! uses around it.
//!
//! # Notification Flow
//!
//! ```text
//! ┌──────────────┐  state-change / output / tick  ┌───────────────┐
//! │  Simulator   │ ─────────────────────────────► │ EventManager  │
//! │  + models    │                                │ (clock + list)│
//! └──────────────┘                                └───────────────┘
//!                                                   │ in list order,
//!                                                   │ one at a time
//!                      ┌─────────────┬──────────────┤
//!                      ▼             ▼              ▼
//!                 ┌─────────┐   ┌─────────┐   ┌─────────┐
//!                 │Listener │   │Listener │   │Listener │
//!                 └─────────┘   └─────────┘   └─────────┘
//! ```
//!
//! # Failure Isolation
//!
//! A listener callback returning [`ListenerError`] gets that listener
//! terminated and dropped from the list; the remaining listeners keep
//! receiving every notification. One bad listener never blocks or
//! corrupts delivery to the rest.

mod error;
mod listener;

pub use error::ListenerError;
pub use listener::{Listener, TerminateReason};
