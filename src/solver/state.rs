use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::graph::EdgeKey;

/// Phase of the pivot state machine a snapshot was produced in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepType {
    InitialState,
    InitialBasis,
    CalculatePotentials,
    CheckOptimality,
    FindCycle,
    CalculateTheta,
    UpdateFlows,
    Optimal,
}

impl fmt::Display for StepType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            StepType::InitialState => "initial_state",
            StepType::InitialBasis => "initial_basis",
            StepType::CalculatePotentials => "calculate_potentials",
            StepType::CheckOptimality => "check_optimality",
            StepType::FindCycle => "find_cycle",
            StepType::CalculateTheta => "calculate_theta",
            StepType::UpdateFlows => "update_flows",
            StepType::Optimal => "optimal",
        };
        f.write_str(label)
    }
}

/// How pushing flow onto the entering edge improves the objective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Increase,
    Decrease,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Increase => f.write_str("increase"),
            Direction::Decrease => f.write_str("decrease"),
        }
    }
}

/// Edge of the improvement cycle. `sign` is +1 when theta is added to the
/// edge's flow and -1 when subtracted; `theta_limit` is how far the flow can
/// move before hitting a bound.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleEdge {
    pub key: EdgeKey,
    pub sign: i8,
    pub theta_limit: f64,
}

/// Immutable snapshot of the full pivot context, one per state-machine
/// transition. States are appended to the solver history and never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct SolutionState {
    pub step_type: StepType,
    pub iteration: usize,
    pub basis_edges: BTreeSet<EdgeKey>,
    pub non_basis_edges: BTreeSet<EdgeKey>,
    pub potentials: BTreeMap<String, f64>,
    pub deltas: BTreeMap<EdgeKey, f64>,
    pub flows: BTreeMap<EdgeKey, f64>,
    pub entering_edge: Option<EdgeKey>,
    pub leaving_edge: Option<EdgeKey>,
    pub improvement_direction: Option<Direction>,
    pub cycle: Vec<CycleEdge>,
    pub theta: Option<f64>,
    pub description: String,
    pub objective_value: f64,
}

impl SolutionState {
    /// The pristine pre-initialization snapshot.
    pub fn initial() -> Self {
        Self {
            step_type: StepType::InitialState,
            iteration: 0,
            basis_edges: BTreeSet::new(),
            non_basis_edges: BTreeSet::new(),
            potentials: BTreeMap::new(),
            deltas: BTreeMap::new(),
            flows: BTreeMap::new(),
            entering_edge: None,
            leaving_edge: None,
            improvement_direction: None,
            cycle: Vec::new(),
            theta: None,
            description: String::new(),
            objective_value: 0.0,
        }
    }
}

impl Default for SolutionState {
    fn default() -> Self {
        Self::initial()
    }
}
