//! Cross-level routing: the central algorithm of the kernel.
//!
//! A value produced by (or injected into) the tree is walked through
//! ancestor networks' coupling functions until every copy has either
//! landed in an atomic model's input buffer or escaped the top of the
//! tree. The walk is depth-first in the exact order coupling
//! functions return their pairs.
//!
//! Implemented as an explicit LIFO work-stack rather than recursion,
//! so the kernel's stack depth is independent of the model tree's
//! depth and every suspension point (a `route` or `parent` RPC) is
//! explicit.
//!
//! Nothing here mutates simulation state: the walk only *plans*.
//! Deliveries and output events are collected into a [`StepPlan`]
//! that the simulator commits after the whole step routed cleanly,
//! so a mid-step routing failure aborts with no partial deliveries.

use crate::error::KernelError;
use crate::server::ModelHandle;
use serde_json::Value;

/// Everything one step wants to do to the outside world, in order.
#[derive(Debug, Default)]
pub(crate) struct StepPlan {
    /// Output events to emit: `(source, value)` per boundary crossing.
    pub outputs: Vec<(ModelHandle, Value)>,
    /// Buffered-input deliveries: `(target atomic, value)`.
    pub deliveries: Vec<(ModelHandle, Value)>,
}

/// One pending unit of routing work.
enum Hop {
    /// Value has found its atomic target.
    Deliver { target: ModelHandle, value: Value },
    /// Value sits at `source`, about to cross into `parent` (or
    /// escape, if `parent` is `None`).
    Bubble {
        parent: Option<ModelHandle>,
        source: ModelHandle,
        value: Value,
    },
}

/// Routes one value from `(parent, source)` until fully planned.
///
/// Classification per coupling-returned pair, honored in order:
///
/// - atomic target → planned delivery;
/// - network target ≠ the routing parent → descend into that subtree,
///   arriving there as external-style input (`source = target`);
/// - target == the routing parent → "this becomes my own output";
///   keep bubbling toward the grandparent with `source = parent`.
///
/// Every boundary crossing that is not "a network routing to itself"
/// additionally plans an output event, including the final escape
/// from the root.
///
/// # Errors
///
/// A `route` RPC hitting an atomic model (a broken parent link or an
/// off-contract coupling result) surfaces [`KernelError::NotNetwork`]
/// and aborts the walk; the plan built so far is discarded by the
/// caller.
pub(crate) async fn collect(
    parent: Option<ModelHandle>,
    source: ModelHandle,
    value: Value,
    plan: &mut StepPlan,
) -> Result<(), KernelError> {
    let mut stack = vec![Hop::Bubble {
        parent,
        source,
        value,
    }];

    while let Some(hop) = stack.pop() {
        match hop {
            Hop::Deliver { target, value } => {
                plan.deliveries.push((target, value));
            }

            Hop::Bubble {
                parent,
                source,
                value,
            } => {
                if parent.as_ref() != Some(&source) {
                    plan.outputs.push((source.clone(), value.clone()));
                }

                // No parent: the value escaped the top of the tree.
                let Some(parent) = parent else {
                    continue;
                };

                let pairs = parent.route(&source, &value).await?;

                let mut next = Vec::with_capacity(pairs.len());
                for (target, value) in pairs {
                    if target.is_atomic() {
                        next.push(Hop::Deliver { target, value });
                    } else if target != parent {
                        next.push(Hop::Bubble {
                            parent: Some(target.clone()),
                            source: target,
                            value,
                        });
                    } else {
                        let grandparent = parent.parent().await?;
                        next.push(Hop::Bubble {
                            parent: grandparent,
                            source: parent.clone(),
                            value,
                        });
                    }
                }

                // LIFO stack: push in reverse to process pairs in the
                // order the coupling function returned them.
                stack.extend(next.into_iter().rev());
            }
        }
    }

    Ok(())
}
