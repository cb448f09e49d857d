use std::collections::{BTreeMap, BTreeSet, HashMap};

use log::{debug, info};

use crate::graph::{EdgeKey, Graph};
use crate::numerics::EPSILON;
use crate::solver::strategies::{BasisResult, InitializationStrategy};
use crate::solver::{SolverStrategies, TransportSolver};
use crate::TransportError;

pub const ARTIFICIAL_ROOT: &str = "__artificial_root__";

const ARTIFICIAL_COST: f64 = 1.0;
const ORIGINAL_COST: f64 = 0.0;

/// Hands a precomputed basis and flow assignment straight to the solver.
/// The nested Phase 1 solve uses this to seed the auxiliary problem without
/// recursing into another Phase 1.
#[derive(Debug, Clone)]
pub struct PrebuiltInitializer {
    basis: BTreeSet<EdgeKey>,
    flows: BTreeMap<EdgeKey, f64>,
}

impl PrebuiltInitializer {
    pub fn new(basis: BTreeSet<EdgeKey>, flows: BTreeMap<EdgeKey, f64>) -> Self {
        Self { basis, flows }
    }
}

impl InitializationStrategy for PrebuiltInitializer {
    fn execute(&self, graph: &Graph) -> Result<BasisResult, TransportError> {
        let non_basis = graph
            .edge_keys()
            .filter(|key| !self.basis.contains(*key))
            .cloned()
            .collect();
        Ok(BasisResult {
            basis_edges: self.basis.clone(),
            non_basis_edges: non_basis,
            flows: self.flows.clone(),
        })
    }
}

/// Two-phase initialization, Phase 1.
///
/// An artificial root node is wired to every original node: sources point at
/// the root, everything else is pointed at by it. Artificial edges cost one,
/// original edges are re-costed to zero, so minimizing the auxiliary
/// objective drives all flow off the artificial star. The auxiliary problem
/// starts from the star itself (a spanning tree carrying each node's
/// absolute balance) and is solved by a nested solver seeded through
/// `PrebuiltInitializer`. A positive auxiliary objective at optimality means
/// the original problem has no feasible flow.
#[derive(Debug, Default, Clone, Copy)]
pub struct PhaseOneInitializer;

impl InitializationStrategy for PhaseOneInitializer {
    fn execute(&self, graph: &Graph) -> Result<BasisResult, TransportError> {
        let total_balance = graph.total_balance();
        if total_balance.abs() > EPSILON {
            return Err(TransportError::Infeasible(format!(
                "balance: node balances sum to {total_balance}, supply must equal demand"
            )));
        }

        let aux_graph = build_auxiliary_graph(graph)?;
        let (basis, flows) = artificial_star_state(graph);
        debug!(
            "phase one: auxiliary problem with {} nodes and {} edges",
            aux_graph.node_count(),
            aux_graph.edge_count()
        );

        let mut aux_solver = TransportSolver::with_strategies(
            aux_graph,
            SolverStrategies {
                initializer: Box::new(PrebuiltInitializer::new(basis, flows)),
                ..SolverStrategies::default()
            },
        );
        aux_solver.solve_step_by_step()?;

        let result = extract_original_solution(graph, aux_solver.current_state())?;
        debug!(
            "phase one: extracted feasible basis with {} edges",
            result.basis_edges.len()
        );
        Ok(result)
    }
}

fn build_auxiliary_graph(graph: &Graph) -> Result<Graph, TransportError> {
    let mut aux = Graph::new();
    aux.add_node(ARTIFICIAL_ROOT, 0.0)?;
    for node in graph.nodes() {
        aux.add_node(node.id.clone(), node.balance)?;
    }
    for (_, edge) in graph.edges() {
        aux.add_edge(edge.from.clone(), edge.to.clone(), ORIGINAL_COST, edge.capacity)?;
    }
    for node in graph.nodes() {
        if node.balance > EPSILON {
            aux.add_edge(node.id.clone(), ARTIFICIAL_ROOT, ARTIFICIAL_COST, f64::INFINITY)?;
        } else {
            aux.add_edge(ARTIFICIAL_ROOT, node.id.clone(), ARTIFICIAL_COST, f64::INFINITY)?;
        }
    }
    Ok(aux)
}

/// The artificial star is the initial auxiliary basis; each artificial edge
/// carries the absolute balance of its non-root endpoint.
fn artificial_star_state(graph: &Graph) -> (BTreeSet<EdgeKey>, BTreeMap<EdgeKey, f64>) {
    let mut basis = BTreeSet::new();
    let mut flows: BTreeMap<EdgeKey, f64> = BTreeMap::new();

    for key in graph.edge_keys() {
        flows.insert(key.clone(), 0.0);
    }
    for node in graph.nodes() {
        if node.balance > EPSILON {
            let key = EdgeKey::new(node.id.clone(), ARTIFICIAL_ROOT);
            flows.insert(key.clone(), node.balance);
            basis.insert(key);
        } else {
            let key = EdgeKey::new(ARTIFICIAL_ROOT, node.id.clone());
            flows.insert(key.clone(), node.balance.abs());
            basis.insert(key);
        }
    }
    (basis, flows)
}

fn extract_original_solution(
    graph: &Graph,
    aux_state: &crate::solver::SolutionState,
) -> Result<BasisResult, TransportError> {
    let artificial_flow: f64 = aux_state
        .flows
        .iter()
        .filter(|(key, _)| key.touches(ARTIFICIAL_ROOT))
        .map(|(_, flow)| flow)
        .sum();
    if artificial_flow > EPSILON {
        info!("phase one: residual artificial flow {artificial_flow}, problem is infeasible");
        return Err(TransportError::Infeasible(format!(
            "no feasible flow: {artificial_flow} units remain on artificial edges"
        )));
    }

    let mut flows = BTreeMap::new();
    for key in graph.edge_keys() {
        flows.insert(key.clone(), aux_state.flows.get(key).copied().unwrap_or(0.0));
    }

    let surviving: BTreeSet<EdgeKey> = aux_state
        .basis_edges
        .iter()
        .filter(|key| !key.touches(ARTIFICIAL_ROOT) && graph.edge(key).is_some())
        .cloned()
        .collect();
    let basis_edges = rebuild_basis(graph, &surviving, &flows)?;
    let non_basis_edges = graph
        .edge_keys()
        .filter(|key| !basis_edges.contains(*key))
        .cloned()
        .collect();

    Ok(BasisResult {
        basis_edges,
        non_basis_edges,
        flows,
    })
}

/// Completes a partial basis into a spanning tree of the original graph:
/// the surviving edges first, then edges already carrying flow, then
/// anything that still connects two components.
fn rebuild_basis(
    graph: &Graph,
    partial: &BTreeSet<EdgeKey>,
    flows: &BTreeMap<EdgeKey, f64>,
) -> Result<BTreeSet<EdgeKey>, TransportError> {
    let required = graph.node_count().saturating_sub(1);
    let mut components = DisjointSet::new(graph.node_ids());
    let mut basis = BTreeSet::new();

    for key in partial {
        if components.union(&key.from, &key.to) {
            basis.insert(key.clone());
        }
    }
    if basis.len() < required {
        for key in graph.edge_keys() {
            if basis.len() >= required {
                break;
            }
            if flows.get(key).copied().unwrap_or(0.0) > EPSILON
                && components.union(&key.from, &key.to)
            {
                basis.insert(key.clone());
            }
        }
    }
    if basis.len() < required {
        for key in graph.edge_keys() {
            if basis.len() >= required {
                break;
            }
            if components.union(&key.from, &key.to) {
                basis.insert(key.clone());
            }
        }
    }
    if basis.len() < required {
        return Err(TransportError::Infeasible(format!(
            "no feasible flow: graph cannot carry a spanning basis ({} of {} edges found)",
            basis.len(),
            required
        )));
    }
    Ok(basis)
}

/// Union-find over node ids, used to keep the rebuilt basis acyclic.
struct DisjointSet {
    parent: HashMap<String, String>,
}

impl DisjointSet {
    fn new<'a, I: IntoIterator<Item = &'a str>>(ids: I) -> Self {
        Self {
            parent: ids
                .into_iter()
                .map(|id| (id.to_string(), id.to_string()))
                .collect(),
        }
    }

    fn find(&mut self, id: &str) -> Option<String> {
        let mut root = self.parent.get(id)?.clone();
        loop {
            let next = self.parent.get(&root)?.clone();
            if next == root {
                break;
            }
            root = next;
        }
        // path compression
        let mut current = id.to_string();
        while current != root {
            let next = self.parent.get(&current)?.clone();
            self.parent.insert(current, root.clone());
            current = next;
        }
        Some(root)
    }

    /// Joins the two components; false when already joined or unknown.
    fn union(&mut self, a: &str, b: &str) -> bool {
        match (self.find(a), self.find(b)) {
            (Some(root_a), Some(root_b)) if root_a != root_b => {
                self.parent.insert(root_a, root_b);
                true
            }
            _ => false,
        }
    }
}
