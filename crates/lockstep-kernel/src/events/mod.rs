//! Event manager — fault-isolated notification fan-out.
//!
//! One task per simulation holds the ordered listener list and a
//! logical clock. Ticks advance the clock; state-change and output
//! notifications are delivered to every listener in current-list
//! order, one at a time, stamped with the clock. A failing listener
//! is terminated and dropped without disturbing the rest.

mod command;
mod manager;

pub use command::EventCommand;
pub use manager::{EventManager, EventManagerHandle};
