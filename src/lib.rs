pub mod graph;
pub mod numerics;
pub mod solver;

use std::fmt;

pub use graph::{Edge, EdgeKey, Graph, Node, NodeKind};
pub use numerics::EPSILON;
pub use solver::{
    CycleEdge, Direction, SolutionState, SolverController, SolverStrategies, StepType,
    TransportSolver,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    InvalidInput(String),
    Infeasible(String),
    IterationLimit(usize),
    InvariantViolation(String),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::InvalidInput(message) => write!(f, "invalid input: {message}"),
            TransportError::Infeasible(message) => write!(f, "infeasible: {message}"),
            TransportError::IterationLimit(limit) => {
                write!(
                    f,
                    "iteration limit of {limit} exceeded without reaching optimality"
                )
            }
            TransportError::InvariantViolation(message) => {
                write!(f, "invariant violation: {message}")
            }
        }
    }
}

impl std::error::Error for TransportError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolverOptions {
    pub max_iterations: usize,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
        }
    }
}
