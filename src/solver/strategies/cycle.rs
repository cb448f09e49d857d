use std::collections::{BTreeMap, BTreeSet};

use crate::graph::{BasisNeighbor, BasisView, Edge, EdgeKey, Graph};
use crate::solver::state::{CycleEdge, Direction};
use crate::solver::strategies::CycleStrategy;
use crate::TransportError;

/// Default cycle finder: depth-first search through the basis tree from the
/// entering edge's head back to its tail. The entering edge plus the tree
/// path forms the unique cycle; each edge gets a sign and a theta limit from
/// its orientation along the walk and the improvement direction.
#[derive(Debug, Default, Clone, Copy)]
pub struct CycleFinder;

impl CycleStrategy for CycleFinder {
    fn execute(
        &self,
        graph: &Graph,
        basis: &BTreeSet<EdgeKey>,
        entering: &EdgeKey,
        direction: Direction,
        flows: &BTreeMap<EdgeKey, f64>,
    ) -> Result<Vec<CycleEdge>, TransportError> {
        let (entering_key, entering_edge) = graph.edge_entry(entering).ok_or_else(|| {
            TransportError::InvariantViolation(format!(
                "entering edge {entering} is not part of the graph"
            ))
        })?;

        let view = BasisView::new(graph, basis)?;
        let path = tree_path(&view, entering_edge.to.as_str(), entering_edge.from.as_str())
            .ok_or_else(|| {
                TransportError::InvariantViolation(format!(
                    "basis tree has no path closing a cycle for {entering}"
                ))
            })?;

        let mut cycle = Vec::with_capacity(path.len() + 1);
        cycle.push(make_cycle_edge(
            entering_key,
            entering_edge,
            true,
            direction,
            flows,
        ));
        for step in path {
            cycle.push(make_cycle_edge(step.key, step.edge, step.forward, direction, flows));
        }
        Ok(cycle)
    }
}

/// Unique path between two nodes of the basis tree, as traversal steps in
/// order from `start` to `target`. `None` when the basis does not connect
/// them.
fn tree_path<'a>(
    view: &BasisView<'a>,
    start: &'a str,
    target: &'a str,
) -> Option<Vec<BasisNeighbor<'a>>> {
    if start == target {
        return Some(Vec::new());
    }

    let mut parents: BTreeMap<&str, BasisNeighbor<'a>> = BTreeMap::new();
    let mut stack = vec![start];

    while let Some(current) = stack.pop() {
        for neighbor in view.neighbors(current) {
            if neighbor.node == start || parents.contains_key(neighbor.node) {
                continue;
            }
            parents.insert(neighbor.node, *neighbor);
            if neighbor.node == target {
                let mut path = Vec::new();
                let mut node = target;
                while node != start {
                    let step = *parents.get(node)?;
                    node = if step.forward {
                        step.edge.from.as_str()
                    } else {
                        step.edge.to.as_str()
                    };
                    path.push(step);
                }
                path.reverse();
                return Some(path);
            }
            stack.push(neighbor.node);
        }
    }
    None
}

fn make_cycle_edge(
    key: &EdgeKey,
    edge: &Edge,
    along_walk: bool,
    direction: Direction,
    flows: &BTreeMap<EdgeKey, f64>,
) -> CycleEdge {
    let flow = flows.get(key).copied().unwrap_or(0.0);
    let (sign, theta_limit) = match (direction, along_walk) {
        (Direction::Increase, true) => (1, edge.residual(flow)),
        (Direction::Increase, false) => (-1, flow),
        (Direction::Decrease, true) => (-1, flow),
        (Direction::Decrease, false) => (1, edge.residual(flow)),
    };
    CycleEdge {
        key: key.clone(),
        sign,
        theta_limit,
    }
}
