use std::collections::{BTreeMap, BTreeSet};

use crate::graph::{Edge, EdgeKey, Graph};
use crate::TransportError;

/// One traversal step over a basis edge, ignoring its direction.
/// `forward` is true when the step leaves the edge's tail.
#[derive(Debug, Clone, Copy)]
pub struct BasisNeighbor<'a> {
    pub node: &'a str,
    pub key: &'a EdgeKey,
    pub edge: &'a Edge,
    pub forward: bool,
}

/// Undirected adjacency over the subset of edges forming the current basis.
/// The potential calculator and the cycle finder both walk the basis tree
/// through this view.
#[derive(Debug)]
pub struct BasisView<'a> {
    adjacency: BTreeMap<&'a str, Vec<BasisNeighbor<'a>>>,
}

impl<'a> BasisView<'a> {
    pub fn new(graph: &'a Graph, basis: &BTreeSet<EdgeKey>) -> Result<Self, TransportError> {
        let mut adjacency: BTreeMap<&str, Vec<BasisNeighbor>> =
            graph.node_ids().map(|id| (id, Vec::new())).collect();
        for key in basis {
            let (key, edge) = graph.edge_entry(key).ok_or_else(|| {
                TransportError::InvariantViolation(format!(
                    "basis edge {key} is not part of the graph"
                ))
            })?;
            if edge.from == edge.to {
                continue;
            }
            match adjacency.get_mut(edge.from.as_str()) {
                Some(list) => list.push(BasisNeighbor {
                    node: edge.to.as_str(),
                    key,
                    edge,
                    forward: true,
                }),
                None => {
                    return Err(TransportError::InvariantViolation(format!(
                        "basis edge {key} references unknown node '{}'",
                        edge.from
                    )))
                }
            }
            match adjacency.get_mut(edge.to.as_str()) {
                Some(list) => list.push(BasisNeighbor {
                    node: edge.from.as_str(),
                    key,
                    edge,
                    forward: false,
                }),
                None => {
                    return Err(TransportError::InvariantViolation(format!(
                        "basis edge {key} references unknown node '{}'",
                        edge.to
                    )))
                }
            }
        }
        Ok(Self { adjacency })
    }

    pub fn neighbors(&self, node: &str) -> &[BasisNeighbor<'a>] {
        self.adjacency.get(node).map(Vec::as_slice).unwrap_or(&[])
    }
}
