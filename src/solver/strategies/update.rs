use std::collections::{BTreeMap, BTreeSet};

use crate::graph::{EdgeKey, Graph};
use crate::numerics::{approx_eq, approx_zero};
use crate::solver::state::CycleEdge;
use crate::solver::strategies::{FlowUpdate, FlowUpdateStrategy};
use crate::TransportError;

/// Default flow updater: applies the signed theta along the cycle, snaps
/// flows that land within `EPSILON` of a bound onto it, and swaps the
/// entering edge for the leaving one. When entering and leaving coincide the
/// pivot is a bound flip and the basis stays unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct FlowUpdater;

impl FlowUpdateStrategy for FlowUpdater {
    #[allow(clippy::too_many_arguments)]
    fn execute(
        &self,
        graph: &Graph,
        cycle: &[CycleEdge],
        theta: f64,
        entering: &EdgeKey,
        leaving: Option<&EdgeKey>,
        basis: &BTreeSet<EdgeKey>,
        flows: &BTreeMap<EdgeKey, f64>,
    ) -> Result<FlowUpdate, TransportError> {
        let mut new_flows = flows.clone();
        for cycle_edge in cycle {
            let edge = graph.edge(&cycle_edge.key).ok_or_else(|| {
                TransportError::InvariantViolation(format!(
                    "cycle edge {} is not part of the graph",
                    cycle_edge.key
                ))
            })?;
            let current = new_flows.get(&cycle_edge.key).copied().unwrap_or(0.0);
            let mut next = current + f64::from(cycle_edge.sign) * theta;
            if approx_zero(next) {
                next = 0.0;
            } else if approx_eq(next, edge.capacity) {
                next = edge.capacity;
            }
            new_flows.insert(cycle_edge.key.clone(), next);
        }

        let mut new_basis = basis.clone();
        if let Some(leaving) = leaving {
            if leaving != entering {
                new_basis.remove(leaving);
                new_basis.insert(entering.clone());
            }
        }
        let non_basis = graph
            .edge_keys()
            .filter(|key| !new_basis.contains(*key))
            .cloned()
            .collect();

        Ok(FlowUpdate {
            basis_edges: new_basis,
            non_basis_edges: non_basis,
            flows: new_flows,
        })
    }
}
