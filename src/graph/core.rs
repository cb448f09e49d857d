use std::collections::BTreeMap;
use std::fmt;

use crate::numerics::approx_zero;
use crate::TransportError;

/// Node kind, derived from the sign of the balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Source,
    Sink,
    Transit,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: String,
    pub balance: f64,
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        if self.balance > 0.0 {
            NodeKind::Source
        } else if self.balance < 0.0 {
            NodeKind::Sink
        } else {
            NodeKind::Transit
        }
    }
}

/// Identity of a directed edge. The derived `Ord` is lexicographic on
/// `(from, to)`, which is the tie-break order used throughout the solver.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EdgeKey {
    pub from: String,
    pub to: String,
}

impl EdgeKey {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }

    pub fn touches(&self, node: &str) -> bool {
        self.from == node || self.to == node
    }
}

impl fmt::Display for EdgeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}->{}", self.from, self.to)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub from: String,
    pub to: String,
    pub cost: f64,
    pub capacity: f64,
}

impl Edge {
    pub fn key(&self) -> EdgeKey {
        EdgeKey::new(self.from.clone(), self.to.clone())
    }

    pub fn is_unbounded(&self) -> bool {
        self.capacity.is_infinite()
    }

    /// Remaining headroom below the capacity at the given flow.
    pub fn residual(&self, flow: f64) -> f64 {
        self.capacity - flow
    }
}

/// Transport network: nodes with signed balances and directed capacitated
/// edges. Read-only while a solver runs. Keys are kept in `BTreeMap`s so that
/// every scan over nodes or edges is in lexicographic order.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: BTreeMap<String, Node>,
    edges: BTreeMap<EdgeKey, Edge>,
    outgoing: BTreeMap<String, Vec<EdgeKey>>,
    incoming: BTreeMap<String, Vec<EdgeKey>>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Adds a node. Positive balance marks a source, negative a sink.
    pub fn add_node(&mut self, id: impl Into<String>, balance: f64) -> Result<(), TransportError> {
        let id = id.into();
        if self.nodes.contains_key(&id) {
            return Err(TransportError::InvalidInput(format!(
                "node '{id}' already exists"
            )));
        }
        self.outgoing.insert(id.clone(), Vec::new());
        self.incoming.insert(id.clone(), Vec::new());
        self.nodes.insert(id.clone(), Node { id, balance });
        Ok(())
    }

    /// Adds a directed edge. Both endpoints must exist, the pair must be
    /// unique and the capacity non-negative (`f64::INFINITY` for unbounded).
    pub fn add_edge(
        &mut self,
        from: impl Into<String>,
        to: impl Into<String>,
        cost: f64,
        capacity: f64,
    ) -> Result<(), TransportError> {
        let from = from.into();
        let to = to.into();
        if !self.nodes.contains_key(&from) {
            return Err(TransportError::InvalidInput(format!(
                "node '{from}' does not exist"
            )));
        }
        if !self.nodes.contains_key(&to) {
            return Err(TransportError::InvalidInput(format!(
                "node '{to}' does not exist"
            )));
        }
        if capacity < 0.0 || capacity.is_nan() {
            return Err(TransportError::InvalidInput(format!(
                "edge {from}->{to} has invalid capacity {capacity}"
            )));
        }
        let key = EdgeKey::new(from.clone(), to.clone());
        if self.edges.contains_key(&key) {
            return Err(TransportError::InvalidInput(format!(
                "edge {key} already exists"
            )));
        }
        if let Some(list) = self.outgoing.get_mut(&from) {
            list.push(key.clone());
        }
        if let Some(list) = self.incoming.get_mut(&to) {
            list.push(key.clone());
        }
        self.edges.insert(
            key,
            Edge {
                from,
                to,
                cost,
                capacity,
            },
        );
        Ok(())
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn edge(&self, key: &EdgeKey) -> Option<&Edge> {
        self.edges.get(key)
    }

    pub fn edge_between(&self, from: &str, to: &str) -> Option<&Edge> {
        self.edges.get(&EdgeKey::new(from, to))
    }

    pub(crate) fn edge_entry(&self, key: &EdgeKey) -> Option<(&EdgeKey, &Edge)> {
        self.edges.get_key_value(key)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn node_ids(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    pub fn edges(&self) -> impl Iterator<Item = (&EdgeKey, &Edge)> {
        self.edges.iter()
    }

    pub fn edge_keys(&self) -> impl Iterator<Item = &EdgeKey> {
        self.edges.keys()
    }

    pub fn nodes_of_kind(&self, kind: NodeKind) -> Vec<&Node> {
        self.nodes.values().filter(|n| n.kind() == kind).collect()
    }

    pub fn outgoing_edges(&self, node: &str) -> &[EdgeKey] {
        self.outgoing.get(node).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn incoming_edges(&self, node: &str) -> &[EdgeKey] {
        self.incoming.get(node).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn adjacent_edges(&self, node: &str) -> Vec<&EdgeKey> {
        self.outgoing_edges(node)
            .iter()
            .chain(self.incoming_edges(node).iter())
            .collect()
    }

    pub fn total_balance(&self) -> f64 {
        self.nodes.values().map(|n| n.balance).sum()
    }

    /// Necessary condition for a feasible flow: supply matches demand.
    pub fn check_balance_feasibility(&self) -> bool {
        approx_zero(self.total_balance())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_kinds_follow_balance_sign() {
        let mut graph = Graph::new();
        graph.add_node("s", 4.0).unwrap();
        graph.add_node("t", -4.0).unwrap();
        graph.add_node("m", 0.0).unwrap();
        assert_eq!(graph.node("s").unwrap().kind(), NodeKind::Source);
        assert_eq!(graph.node("t").unwrap().kind(), NodeKind::Sink);
        assert_eq!(graph.node("m").unwrap().kind(), NodeKind::Transit);
        assert_eq!(graph.nodes_of_kind(NodeKind::Source).len(), 1);
    }

    #[test]
    fn rejects_duplicates_and_missing_endpoints() {
        let mut graph = Graph::new();
        graph.add_node("a", 1.0).unwrap();
        graph.add_node("b", -1.0).unwrap();
        assert!(matches!(
            graph.add_node("a", 0.0),
            Err(TransportError::InvalidInput(_))
        ));
        graph.add_edge("a", "b", 1.0, f64::INFINITY).unwrap();
        assert!(matches!(
            graph.add_edge("a", "b", 2.0, 5.0),
            Err(TransportError::InvalidInput(_))
        ));
        assert!(matches!(
            graph.add_edge("a", "c", 1.0, 1.0),
            Err(TransportError::InvalidInput(_))
        ));
        assert!(matches!(
            graph.add_edge("b", "a", 1.0, -2.0),
            Err(TransportError::InvalidInput(_))
        ));
    }

    #[test]
    fn adjacency_indices_track_edges() {
        let mut graph = Graph::new();
        graph.add_node("a", 2.0).unwrap();
        graph.add_node("b", 0.0).unwrap();
        graph.add_node("c", -2.0).unwrap();
        graph.add_edge("a", "b", 1.0, f64::INFINITY).unwrap();
        graph.add_edge("b", "c", 1.0, f64::INFINITY).unwrap();
        assert_eq!(graph.outgoing_edges("a"), &[EdgeKey::new("a", "b")]);
        assert_eq!(graph.incoming_edges("b"), &[EdgeKey::new("a", "b")]);
        assert_eq!(graph.adjacent_edges("b").len(), 2);
        assert!(graph.edge_between("a", "b").is_some());
        assert!(graph.edge_between("b", "a").is_none());
    }

    #[test]
    fn balance_feasibility_sums_to_zero() {
        let mut graph = Graph::new();
        graph.add_node("a", 5.0).unwrap();
        graph.add_node("b", -5.0).unwrap();
        assert!(graph.check_balance_feasibility());
        graph.add_node("c", 0.5).unwrap();
        assert!(!graph.check_balance_feasibility());
    }

    #[test]
    fn edge_key_order_is_lexicographic() {
        let mut keys = vec![
            EdgeKey::new("b", "a"),
            EdgeKey::new("a", "c"),
            EdgeKey::new("a", "b"),
        ];
        keys.sort();
        assert_eq!(keys[0], EdgeKey::new("a", "b"));
        assert_eq!(keys[1], EdgeKey::new("a", "c"));
        assert_eq!(keys[2], EdgeKey::new("b", "a"));
    }
}
