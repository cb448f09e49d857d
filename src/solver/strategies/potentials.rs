use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crate::graph::{BasisView, EdgeKey, Graph};
use crate::solver::strategies::PotentialStrategy;
use crate::TransportError;

/// Default potential calculator: breadth-first traversal of the basis tree
/// from the lexicographically smallest node, which sits at potential zero.
#[derive(Debug, Default, Clone, Copy)]
pub struct PotentialCalculator;

impl PotentialStrategy for PotentialCalculator {
    fn execute(
        &self,
        graph: &Graph,
        basis: &BTreeSet<EdgeKey>,
    ) -> Result<BTreeMap<String, f64>, TransportError> {
        if graph.node_count() == 0 {
            return Err(TransportError::InvariantViolation(
                "cannot assign potentials on an empty graph".to_string(),
            ));
        }
        if basis.len() + 1 != graph.node_count() {
            return Err(TransportError::InvariantViolation(format!(
                "basis has {} edges, a spanning tree over {} nodes needs {}",
                basis.len(),
                graph.node_count(),
                graph.node_count() - 1
            )));
        }

        let view = BasisView::new(graph, basis)?;
        let mut potentials: BTreeMap<String, f64> = BTreeMap::new();
        let mut queue: VecDeque<(&str, f64)> = VecDeque::new();

        if let Some(root) = graph.node_ids().next() {
            potentials.insert(root.to_string(), 0.0);
            queue.push_back((root, 0.0));
        }

        while let Some((current, potential)) = queue.pop_front() {
            for neighbor in view.neighbors(current) {
                if !potentials.contains_key(neighbor.node) {
                    let value = if neighbor.forward {
                        potential + neighbor.edge.cost
                    } else {
                        potential - neighbor.edge.cost
                    };
                    potentials.insert(neighbor.node.to_string(), value);
                    queue.push_back((neighbor.node, value));
                }
            }
        }

        if potentials.len() != graph.node_count() {
            return Err(TransportError::InvariantViolation(format!(
                "basis tree reaches {} of {} nodes",
                potentials.len(),
                graph.node_count()
            )));
        }
        Ok(potentials)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn potentials_follow_basis_costs() {
        let mut graph = Graph::new();
        graph.add_node("a", 5.0).unwrap();
        graph.add_node("b", 0.0).unwrap();
        graph.add_node("c", -5.0).unwrap();
        graph.add_edge("a", "b", 2.0, f64::INFINITY).unwrap();
        graph.add_edge("c", "b", 3.0, f64::INFINITY).unwrap();

        let basis: BTreeSet<EdgeKey> =
            [EdgeKey::new("a", "b"), EdgeKey::new("c", "b")].into_iter().collect();
        let potentials = PotentialCalculator.execute(&graph, &basis).unwrap();

        assert_eq!(potentials["a"], 0.0);
        assert_eq!(potentials["b"], 2.0);
        // reached against the edge direction: u[c] = u[b] - cost
        assert_eq!(potentials["c"], -1.0);
    }

    #[test]
    fn rejects_non_spanning_basis() {
        let mut graph = Graph::new();
        graph.add_node("a", 1.0).unwrap();
        graph.add_node("b", -1.0).unwrap();
        graph.add_node("c", 0.0).unwrap();
        graph.add_edge("a", "b", 1.0, f64::INFINITY).unwrap();
        graph.add_edge("b", "c", 1.0, f64::INFINITY).unwrap();

        let too_small: BTreeSet<EdgeKey> = [EdgeKey::new("a", "b")].into_iter().collect();
        assert!(matches!(
            PotentialCalculator.execute(&graph, &too_small),
            Err(TransportError::InvariantViolation(_))
        ));
    }

    #[test]
    fn rejects_disconnected_basis_of_right_size() {
        let mut graph = Graph::new();
        graph.add_node("a", 1.0).unwrap();
        graph.add_node("b", -1.0).unwrap();
        graph.add_node("c", 1.0).unwrap();
        graph.add_node("d", -1.0).unwrap();
        graph.add_edge("a", "b", 1.0, f64::INFINITY).unwrap();
        graph.add_edge("b", "a", 1.0, f64::INFINITY).unwrap();
        graph.add_edge("c", "d", 1.0, f64::INFINITY).unwrap();

        // three edges over four nodes, but {a,b} and {c,d} stay separate
        let basis: BTreeSet<EdgeKey> = [
            EdgeKey::new("a", "b"),
            EdgeKey::new("b", "a"),
            EdgeKey::new("c", "d"),
        ]
        .into_iter()
        .collect();
        assert!(matches!(
            PotentialCalculator.execute(&graph, &basis),
            Err(TransportError::InvariantViolation(_))
        ));
    }
}
