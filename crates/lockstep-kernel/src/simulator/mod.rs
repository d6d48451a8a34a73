//! Simulator — lockstep driver for one model tree.
//!
//! One task per simulation owns the step loop: it enumerates the
//! atomic leaves once at start, then serves queued steps. Every step
//! plans (outputs and routing, no mutation) and then commits
//! (events, deliveries, tick, transitions), so a mid-step routing
//! failure leaves the simulation exactly where it was.

mod command;
mod engine;
mod routing;

pub use command::SimCommand;
pub use engine::{Simulator, SimulatorHandle};
