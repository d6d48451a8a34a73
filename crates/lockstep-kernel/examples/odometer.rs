//! Odometer Example
//!
//! Demonstrates the simulation kernel end to end:
//! - a clock atomic pulsing once per step
//! - two digit atomics chained through a network's coupling function
//! - overflow pulses crossing the network boundary as output events
//! - a console listener observing state changes and outputs
//!
//! # Usage
//!
//! ```bash
//! cargo run --example odometer
//! ```

use lockstep_kernel::{
    AtomicModel, KernelError, Listener, ListenerError, ModelHandle, ModelId, ModelServer,
    NetworkModel, Simulator, TerminateReason,
};
use serde_json::{json, Value};

/// Emits one pulse every step.
struct Clock;

impl AtomicModel for Clock {
    fn transition(&mut self, _inputs: Vec<Value>) {}

    fn output(&mut self) -> Vec<Value> {
        vec![json!("pulse")]
    }
}

/// Counts pulses modulo `base`; wrapping emits a carry pulse on the
/// next step.
struct Digit {
    base: u64,
    value: u64,
    carry: u64,
}

impl Digit {
    fn new(base: u64) -> Self {
        Self {
            base,
            value: 0,
            carry: 0,
        }
    }
}

impl AtomicModel for Digit {
    fn transition(&mut self, inputs: Vec<Value>) {
        self.value += inputs.len() as u64;
        self.carry = self.value / self.base;
        self.value %= self.base;
    }

    fn output(&mut self) -> Vec<Value> {
        let carry = std::mem::take(&mut self.carry);
        (0..carry).map(|_| json!("carry")).collect()
    }

    fn observe(&self) -> Value {
        json!(self.value)
    }
}

/// Chains clock → ones → tens; the tens digit's carry leaves the
/// board as an overflow output.
struct Board {
    clock: ModelHandle,
    ones: ModelHandle,
    tens: ModelHandle,
}

impl NetworkModel for Board {
    fn children(&self) -> Vec<ModelHandle> {
        vec![self.clock.clone(), self.ones.clone(), self.tens.clone()]
    }

    fn route(
        &self,
        own: &ModelHandle,
        source: &ModelHandle,
        value: &Value,
    ) -> Vec<(ModelHandle, Value)> {
        if source == &self.clock {
            vec![(self.ones.clone(), value.clone())]
        } else if source == &self.ones {
            vec![(self.tens.clone(), value.clone())]
        } else if source == &self.tens {
            vec![(own.clone(), value.clone())]
        } else {
            vec![]
        }
    }
}

/// Prints every notification to stdout.
struct ConsolePrinter;

impl Listener for ConsolePrinter {
    fn on_state_change(
        &mut self,
        model: &ModelId,
        state: &Value,
        time: u64,
    ) -> Result<(), ListenerError> {
        println!("  t={time:>2}  {:>5} = {state}", model.name());
        Ok(())
    }

    fn on_output(
        &mut self,
        source: &ModelId,
        value: &Value,
        time: u64,
    ) -> Result<(), ListenerError> {
        println!("  t={time:>2}  {:>5} ! {value}", source.name());
        Ok(())
    }

    fn terminate(&mut self, reason: TerminateReason) {
        println!("  listener terminated: {reason}");
    }
}

#[tokio::main]
async fn main() -> Result<(), KernelError> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .with_target(false)
        .init();

    println!("=== Odometer Example ===\n");
    println!("A mod-12 odometer: ones wraps at 3, tens at 4; a tens");
    println!("carry crosses the board boundary as an output event.\n");

    let clock = ModelServer::spawn_atomic("clock", Clock);
    let ones = ModelServer::spawn_atomic("ones", Digit::new(3));
    let tens = ModelServer::spawn_atomic("tens", Digit::new(4));

    let board = ModelServer::spawn_network(
        "board",
        Board {
            clock: clock.clone(),
            ones: ones.clone(),
            tens: tens.clone(),
        },
    )
    .await?;

    let sim = Simulator::start(board.clone()).await?;
    sim.add_listener(ConsolePrinter).await?;

    for _ in 0..26 {
        sim.compute_next_state(vec![]).await?;
    }
    let elapsed = sim.time().await?;
    println!("\n{elapsed} steps committed");

    sim.stop().await?;
    for model in [clock, ones, tens, board] {
        model.stop().await?;
    }

    println!("=== Example Complete ===");
    Ok(())
}
