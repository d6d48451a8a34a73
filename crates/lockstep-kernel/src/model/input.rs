//! Buffered-input helpers.
//!
//! The pending-input buffer of a model server preserves stable
//! arrival order: values appear in a transition's `inputs` exactly in
//! the order their `add_input` casts reached the server. Coupling
//! functions that care about *position* rather than arrival (a gate
//! with distinct left/right pins, a cell with neighbor slots) tag
//! values as two-element arrays `[index, value]` and sort before use.

use serde_json::Value;

/// Sorts positionally tagged inputs `[index, value]` by index.
///
/// The sort is stable: equal indices keep their arrival order, and
/// values that are not `[index, value]` arrays (or whose index is not
/// a non-negative integer) sort after all tagged values, also keeping
/// arrival order.
///
/// # Example
///
/// ```
/// use lockstep_kernel::sort_indexed_inputs;
/// use serde_json::json;
///
/// let mut inputs = vec![json!([2, "right"]), json!([0, "left"]), json!([1, "mid"])];
/// sort_indexed_inputs(&mut inputs);
/// assert_eq!(
///     inputs,
///     vec![json!([0, "left"]), json!([1, "mid"]), json!([2, "right"])]
/// );
/// ```
pub fn sort_indexed_inputs(inputs: &mut [Value]) {
    inputs.sort_by_key(|v| index_of(v).unwrap_or(u64::MAX));
}

/// Extracts the index of a `[index, value]` tagged input.
fn index_of(value: &Value) -> Option<u64> {
    match value {
        Value::Array(parts) if parts.len() == 2 => parts[0].as_u64(),
        _ => None,
    }
}
