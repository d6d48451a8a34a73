//! Shared model implementations for the integration scenarios.
//!
//! Two topologies:
//!
//! - a feedback circuit: two XOR gates and a memory cell spread over
//!   two network levels, with the memory feeding back into the inner
//!   network;
//! - a ring of shift cells whose coupling tags deliveries by
//!   neighbor position.

#![allow(dead_code)]

use lockstep_kernel::{
    sort_indexed_inputs, AtomicModel, KernelError, ModelHandle, ModelServer, NetworkModel,
};
use serde_json::{json, Value};

/// Payload of a positionally tagged input `[index, bool]`.
fn tagged_bool(value: &Value) -> bool {
    value.get(1).and_then(Value::as_bool).unwrap_or(false)
}

// ── Feedback circuit ─────────────────────────────────────────────────
//
//   root ── inner ── xor1, xor2
//        └─ mem
//
// External input {"pair": [a, b]} lands on xor1; xor1 feeds xor2;
// xor2's output is the inner network's output, which root fans out to
// mem and to its own boundary; mem's output loops back into xor2.

/// XOR gate over its tagged boolean inputs.
#[derive(Default)]
pub struct Xor {
    bit: bool,
}

impl AtomicModel for Xor {
    fn transition(&mut self, inputs: Vec<Value>) {
        self.bit = inputs.iter().fold(false, |acc, v| acc ^ tagged_bool(v));
    }

    fn output(&mut self) -> Vec<Value> {
        vec![json!(self.bit)]
    }

    fn observe(&self) -> Value {
        json!(self.bit)
    }
}

/// One-step delay cell: remembers the last boolean it was given.
#[derive(Default)]
pub struct Memory {
    bit: bool,
}

impl AtomicModel for Memory {
    fn transition(&mut self, inputs: Vec<Value>) {
        if let Some(last) = inputs.last() {
            self.bit = last.as_bool().unwrap_or(false);
        }
    }

    fn output(&mut self) -> Vec<Value> {
        vec![json!(self.bit)]
    }

    fn observe(&self) -> Value {
        json!(self.bit)
    }
}

/// Inner network: splits pairs onto xor1, chains xor1 into xor2, and
/// declares xor2's output its own.
pub struct XorStage {
    pub xor1: ModelHandle,
    pub xor2: ModelHandle,
}

impl NetworkModel for XorStage {
    fn children(&self) -> Vec<ModelHandle> {
        vec![self.xor1.clone(), self.xor2.clone()]
    }

    fn route(
        &self,
        own: &ModelHandle,
        source: &ModelHandle,
        value: &Value,
    ) -> Vec<(ModelHandle, Value)> {
        if source == own {
            if let Some(pair) = value.get("pair") {
                return vec![
                    (self.xor1.clone(), json!([0, pair.get(0)])),
                    (self.xor1.clone(), json!([1, pair.get(1)])),
                ];
            }
            if let Some(fed_back) = value.get("mem") {
                return vec![(self.xor2.clone(), json!([1, fed_back]))];
            }
            return vec![];
        }
        if source == &self.xor1 {
            return vec![(self.xor2.clone(), json!([0, value]))];
        }
        // xor2's output becomes this network's output.
        vec![(own.clone(), value.clone())]
    }
}

/// Root network: external pairs descend into the stage; the stage's
/// output goes to the memory cell and out the boundary; the memory's
/// output loops back into the stage.
pub struct FeedbackRoot {
    pub inner: ModelHandle,
    pub mem: ModelHandle,
}

impl NetworkModel for FeedbackRoot {
    fn children(&self) -> Vec<ModelHandle> {
        vec![self.inner.clone(), self.mem.clone()]
    }

    fn route(
        &self,
        own: &ModelHandle,
        source: &ModelHandle,
        value: &Value,
    ) -> Vec<(ModelHandle, Value)> {
        if source == own {
            return vec![(self.inner.clone(), value.clone())];
        }
        if source == &self.inner {
            return vec![(self.mem.clone(), value.clone()), (own.clone(), value.clone())];
        }
        vec![(self.inner.clone(), json!({ "mem": value }))]
    }
}

/// Spawns the whole feedback circuit and returns its root.
pub async fn spawn_circuit() -> Result<ModelHandle, KernelError> {
    let xor1 = ModelServer::spawn_atomic("xor1", Xor::default());
    let xor2 = ModelServer::spawn_atomic("xor2", Xor::default());
    let mem = ModelServer::spawn_atomic("mem", Memory::default());

    let inner = ModelServer::spawn_network(
        "inner",
        XorStage {
            xor1,
            xor2,
        },
    )
    .await?;
    let root = ModelServer::spawn_network(
        "root",
        FeedbackRoot {
            inner,
            mem,
        },
    )
    .await?;
    Ok(root)
}

// ── Ring of shift cells ──────────────────────────────────────────────

/// Cell that becomes whatever its left neighbor held.
///
/// Inputs arrive tagged `[0, right]`, `[1, own]`, `[2, left]` in
/// whatever order the step delivered them; the transition sorts by
/// tag and reads the left slot.
pub struct ShiftCell {
    bit: bool,
}

impl ShiftCell {
    pub fn new(bit: bool) -> Self {
        Self { bit }
    }
}

impl AtomicModel for ShiftCell {
    fn transition(&mut self, mut inputs: Vec<Value>) {
        sort_indexed_inputs(&mut inputs);
        self.bit = inputs.get(2).map(tagged_bool).unwrap_or(false);
    }

    fn output(&mut self) -> Vec<Value> {
        vec![json!(self.bit)]
    }

    fn observe(&self) -> Value {
        json!(self.bit)
    }
}

/// Closed ring: each cell's output reaches its right neighbor as
/// "left", itself as "own" and its left neighbor as "right". Nothing
/// leaves the ring and external input is dropped.
pub struct Ring {
    pub cells: Vec<ModelHandle>,
}

impl NetworkModel for Ring {
    fn children(&self) -> Vec<ModelHandle> {
        self.cells.clone()
    }

    fn route(
        &self,
        own: &ModelHandle,
        source: &ModelHandle,
        value: &Value,
    ) -> Vec<(ModelHandle, Value)> {
        if source == own {
            return vec![];
        }
        let Some(i) = self.cells.iter().position(|c| c == source) else {
            return vec![];
        };
        let n = self.cells.len();
        vec![
            (self.cells[(i + 1) % n].clone(), json!([2, value])),
            (self.cells[i].clone(), json!([1, value])),
            (self.cells[(i + n - 1) % n].clone(), json!([0, value])),
        ]
    }
}

/// Spawns a ring initialized with the given cell states.
pub async fn spawn_ring(initial: &[bool]) -> Result<ModelHandle, KernelError> {
    let cells: Vec<ModelHandle> = initial
        .iter()
        .enumerate()
        .map(|(i, &bit)| ModelServer::spawn_atomic(format!("cell{i}"), ShiftCell::new(bit)))
        .collect();
    ModelServer::spawn_network("ring", Ring { cells }).await
}
