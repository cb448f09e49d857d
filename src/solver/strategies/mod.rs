use std::collections::{BTreeMap, BTreeSet};

use crate::graph::{EdgeKey, Graph};
use crate::solver::state::{CycleEdge, Direction};
use crate::TransportError;

mod cycle;
mod initialize;
mod optimality;
mod potentials;
mod theta;
mod update;

pub use cycle::CycleFinder;
pub use initialize::{PhaseOneInitializer, PrebuiltInitializer, ARTIFICIAL_ROOT};
pub use optimality::OptimalityChecker;
pub use potentials::PotentialCalculator;
pub use theta::ThetaCalculator;
pub use update::FlowUpdater;

/// Feasible starting point produced by an initialization strategy.
#[derive(Debug, Clone, PartialEq)]
pub struct BasisResult {
    pub basis_edges: BTreeSet<EdgeKey>,
    pub non_basis_edges: BTreeSet<EdgeKey>,
    pub flows: BTreeMap<EdgeKey, f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OptimalityResult {
    pub is_optimal: bool,
    pub deltas: BTreeMap<EdgeKey, f64>,
    pub entering_edge: Option<EdgeKey>,
    pub improvement_direction: Option<Direction>,
    pub violation_score: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ThetaResult {
    pub theta: f64,
    pub leaving_edge: Option<EdgeKey>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlowUpdate {
    pub basis_edges: BTreeSet<EdgeKey>,
    pub non_basis_edges: BTreeSet<EdgeKey>,
    pub flows: BTreeMap<EdgeKey, f64>,
}

/// Builds a feasible basis, flows and non-basis partition for the graph.
pub trait InitializationStrategy {
    fn execute(&self, graph: &Graph) -> Result<BasisResult, TransportError>;
}

/// Assigns node potentials over the basis tree: `u[to] = u[from] + cost` for
/// every basis edge, root at zero.
pub trait PotentialStrategy {
    fn execute(
        &self,
        graph: &Graph,
        basis: &BTreeSet<EdgeKey>,
    ) -> Result<BTreeMap<String, f64>, TransportError>;
}

/// Computes reduced costs for the non-basis edges and selects the entering
/// edge when a bound-aware violation exists.
pub trait OptimalityStrategy {
    fn execute(
        &self,
        graph: &Graph,
        non_basis: &BTreeSet<EdgeKey>,
        potentials: &BTreeMap<String, f64>,
        flows: &BTreeMap<EdgeKey, f64>,
    ) -> Result<OptimalityResult, TransportError>;
}

/// Finds the unique cycle created by adding the entering edge to the basis
/// tree, with signs and per-edge theta limits.
pub trait CycleStrategy {
    fn execute(
        &self,
        graph: &Graph,
        basis: &BTreeSet<EdgeKey>,
        entering: &EdgeKey,
        direction: Direction,
        flows: &BTreeMap<EdgeKey, f64>,
    ) -> Result<Vec<CycleEdge>, TransportError>;
}

/// Computes the bottleneck step size and the leaving edge.
pub trait ThetaStrategy {
    fn execute(
        &self,
        cycle: &[CycleEdge],
        basis: &BTreeSet<EdgeKey>,
    ) -> Result<ThetaResult, TransportError>;
}

/// Applies theta along the cycle and swaps basis membership.
pub trait FlowUpdateStrategy {
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
    ) -> Result<FlowUpdate, TransportError>;
}
