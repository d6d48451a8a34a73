//! LOCKSTEP kernel — actor-based hierarchical discrete-time simulation.
//!
//! Models (atomic leaves and network composites) form a rooted tree.
//! Each model runs as its own tokio task owning its state exclusively;
//! a [`Simulator`](simulator::Simulator) task drives the whole tree
//! through lockstep steps; an [`EventManager`](events::EventManager)
//! task fans out notifications to fault-isolated listeners.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                          Simulator                             │
//! │   fixed atomics list · step loop · routing work-stack · time   │
//! └────────────────────────────────────────────────────────────────┘
//!       │ produce_output / route / apply_transition (call)
//!       │ add_input (cast)
//!       ▼
//! ┌──────────────┐   parent    ┌──────────────┐
//! │ ModelServer  │ ──────────► │ ModelServer  │    one task per
//! │  (network)   │   children  │   (atomic)   │    model, mailbox
//! └──────────────┘ ◄────────── └──────────────┘    serialized
//!       │ state-change / output / tick (cast)
//!       ▼
//! ┌────────────────────────────────────────────────────────────────┐
//! │                        EventManager                            │
//! │   ordered listener list · logical clock · failure isolation    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Determinism
//!
//! The Simulator is the sole driver of a step. Within one step it
//! issues one strictly sequential chain of request/response exchanges
//! to model tasks; casts are processed in arrival order per mailbox.
//! Fixed topology + fixed coupling + fixed inputs therefore yield an
//! identical event sequence on every run.
//!
//! # Minimal Usage
//!
//! ```ignore
//! let xor = ModelServer::spawn_atomic("xor", Xor::default());
//! let root = ModelServer::spawn_network("root", PairNet::new(vec![xor])).await?;
//! let sim = Simulator::start(root).await?;
//! sim.add_listener(ConsolePrinter::default()).await?;
//! sim.compute_next_state(vec![json!([1, 0])]).await?;   // cast
//! let t = sim.time().await?;                            // barrier
//! sim.stop().await?;
//! ```

pub mod error;
pub mod events;
pub mod model;
pub mod server;
pub mod simulator;
pub mod testing;

pub use error::KernelError;
pub use events::{EventManager, EventManagerHandle};
pub use model::{sort_indexed_inputs, AtomicModel, ModelKind, NetworkModel};
pub use server::{ModelHandle, ModelServer};
pub use simulator::{Simulator, SimulatorHandle};

// Re-export the SDK layer so downstream users need only this crate.
pub use lockstep_event::{Listener, ListenerError, TerminateReason};
pub use lockstep_types::{ListenerId, ModelId};
