//! The [`AtomicModel`] and [`NetworkModel`] capability traits.

use crate::server::ModelHandle;
use serde_json::Value;

/// Leaf model: private state, a state-transition function, and an
/// output function.
///
/// The wrapping model server owns the implementation exclusively;
/// methods take `&mut self` and never need internal synchronization.
/// `Sync` is still required: the server's tree enumeration holds a
/// shared borrow of itself across child awaits.
///
/// # Step Timing
///
/// Within one simulation step the kernel calls [`output`](Self::output)
/// first (from pre-step state, exactly once), and
/// [`transition`](Self::transition) last, with every input buffered
/// for this model during the step. Outputs therefore always reflect
/// the state *before* the step's inputs are absorbed.
///
/// # Example
///
/// ```
/// use lockstep_kernel::AtomicModel;
/// use serde_json::{json, Value};
///
/// /// One-bit memory: stores the last input bit, emits the stored bit.
/// struct Memory {
///     bit: bool,
/// }
///
/// impl AtomicModel for Memory {
///     fn transition(&mut self, inputs: Vec<Value>) {
///         if let Some(last) = inputs.last().and_then(Value::as_bool) {
///             self.bit = last;
///         }
///     }
///
///     fn output(&mut self) -> Vec<Value> {
///         vec![json!(self.bit)]
///     }
///
///     fn observe(&self) -> Value {
///         json!(self.bit)
///     }
/// }
/// ```
pub trait AtomicModel: Send + Sync + 'static {
    /// Applies one state transition against the inputs buffered since
    /// the previous transition, in stable arrival order.
    ///
    /// An empty `inputs` is a normal occurrence (no value was routed
    /// here this step) and must be handled.
    fn transition(&mut self, inputs: Vec<Value>);

    /// Produces this step's output values from the current state.
    ///
    /// Called exactly once per step by the simulator, before any
    /// transition of that step. May update internal bookkeeping, but
    /// anything observable should wait for
    /// [`transition`](Self::transition).
    fn output(&mut self) -> Vec<Value>;

    /// Observable snapshot delivered with state-change events.
    ///
    /// The kernel never interprets the snapshot; it goes verbatim to
    /// listeners. Defaults to `null` for models with nothing worth
    /// observing.
    fn observe(&self) -> Value {
        Value::Null
    }
}

/// Composite model: a fixed ordered child set plus a coupling rule.
///
/// Networks hold no simulation state of their own; they define the
/// tree shape and how values move across it.
pub trait NetworkModel: Send + Sync + 'static {
    /// The fixed, ordered list of direct children.
    ///
    /// Pure: must return the same handles in the same order on every
    /// call. Defines the tree shape and the pre-order used for the
    /// simulator's flattened atomics list.
    fn children(&self) -> Vec<ModelHandle>;

    /// The coupling function: classifies `(source, value)` and says
    /// where the value goes next.
    ///
    /// Must be total over two source classes:
    ///
    /// - `source == own` — the value arrives from outside this
    ///   network; transform it into inputs for children.
    /// - `source` is a direct child — transform the child's output
    ///   into inputs for siblings, deliveries to children, or —
    ///   by returning a pair with `target == own` — "this becomes my
    ///   own output", which the kernel keeps bubbling upward.
    ///
    /// Returned pairs are honored in order. Totality is this
    /// implementation's responsibility; the kernel does not defend
    /// against unclassifiable sources or targets.
    fn route(&self, own: &ModelHandle, source: &ModelHandle, value: &Value)
        -> Vec<(ModelHandle, Value)>;
}
