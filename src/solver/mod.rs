use std::collections::BTreeMap;

use log::{debug, info};

use crate::graph::{EdgeKey, Graph};
use crate::{SolverOptions, TransportError};

mod controller;
mod state;
pub mod strategies;

pub use controller::SolverController;
pub use state::{CycleEdge, Direction, SolutionState, StepType};
pub use strategies::{
    BasisResult, CycleFinder, CycleStrategy, FlowUpdate, FlowUpdateStrategy, FlowUpdater,
    InitializationStrategy, OptimalityChecker, OptimalityResult, OptimalityStrategy,
    PhaseOneInitializer, PotentialCalculator, PotentialStrategy, PrebuiltInitializer,
    ThetaCalculator, ThetaResult, ThetaStrategy, ARTIFICIAL_ROOT,
};

/// The six pivot strategies driving a solve. Every field has a zero-size
/// default; callers override individual stages through struct update syntax.
pub struct SolverStrategies {
    pub initializer: Box<dyn InitializationStrategy>,
    pub potential_calculator: Box<dyn PotentialStrategy>,
    pub optimality_checker: Box<dyn OptimalityStrategy>,
    pub cycle_finder: Box<dyn CycleStrategy>,
    pub theta_calculator: Box<dyn ThetaStrategy>,
    pub flow_updater: Box<dyn FlowUpdateStrategy>,
}

impl Default for SolverStrategies {
    fn default() -> Self {
        Self {
            initializer: Box::new(PhaseOneInitializer),
            potential_calculator: Box::new(PotentialCalculator),
            optimality_checker: Box::new(OptimalityChecker),
            cycle_finder: Box::new(CycleFinder),
            theta_calculator: Box::new(ThetaCalculator),
            flow_updater: Box::new(FlowUpdater),
        }
    }
}

/// Network simplex solver over one transport graph.
///
/// Drives the pivot state machine
///
/// ```text
/// initial_state -> initial_basis -> calculate_potentials -> check_optimality
///     -> (optimal) | (find_cycle -> calculate_theta -> update_flows
///     -> calculate_potentials -> ...)
/// ```
///
/// and appends one immutable [`SolutionState`] to its history per
/// transition. The graph is read-only for the lifetime of the solver.
pub struct TransportSolver {
    graph: Graph,
    options: SolverOptions,
    strategies: SolverStrategies,
    history: Vec<SolutionState>,
    iteration: usize,
}

impl TransportSolver {
    pub fn new(graph: Graph) -> Self {
        Self::with_strategies(graph, SolverStrategies::default())
    }

    pub fn with_strategies(graph: Graph, strategies: SolverStrategies) -> Self {
        Self::with_options(graph, strategies, SolverOptions::default())
    }

    pub fn with_options(
        graph: Graph,
        strategies: SolverStrategies,
        options: SolverOptions,
    ) -> Self {
        Self {
            graph,
            options,
            strategies,
            history: vec![SolutionState::initial()],
            iteration: 0,
        }
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn current_state(&self) -> &SolutionState {
        match self.history.last() {
            Some(state) => state,
            // the constructor seeds the history with the initial state
            None => unreachable!("solver history is never empty"),
        }
    }

    pub fn history(&self) -> &[SolutionState] {
        &self.history
    }

    pub fn iteration(&self) -> usize {
        self.iteration
    }

    pub fn is_optimal(&self) -> bool {
        self.current_state().step_type == StepType::Optimal
    }

    /// Performs exactly one state-machine transition. Returns false when the
    /// solver already sits in the terminal state.
    pub fn step(&mut self) -> Result<bool, TransportError> {
        let step_type = self.current_state().step_type;
        if step_type == StepType::Optimal {
            return Ok(false);
        }
        if self.iteration >= self.options.max_iterations {
            return Err(TransportError::IterationLimit(self.options.max_iterations));
        }

        match step_type {
            StepType::InitialState => self.run_initialization()?,
            StepType::InitialBasis | StepType::UpdateFlows => self.run_potentials()?,
            StepType::CalculatePotentials => self.run_optimality()?,
            StepType::CheckOptimality => self.run_cycle()?,
            StepType::FindCycle => self.run_theta()?,
            StepType::CalculateTheta => {
                self.run_update()?;
                self.iteration += 1;
            }
            StepType::Optimal => {}
        }
        Ok(true)
    }

    /// Runs the machine until the terminal state or a failure.
    pub fn solve_step_by_step(&mut self) -> Result<(), TransportError> {
        while !self.is_optimal() {
            self.step()?;
        }
        Ok(())
    }

    fn run_initialization(&mut self) -> Result<(), TransportError> {
        let result = self.strategies.initializer.execute(&self.graph)?;
        let objective_value = self.objective_value(&result.flows)?;
        let state = SolutionState {
            step_type: StepType::InitialBasis,
            iteration: self.iteration,
            basis_edges: result.basis_edges,
            non_basis_edges: result.non_basis_edges,
            flows: result.flows,
            description: "initial feasible basis constructed".to_string(),
            objective_value,
            ..SolutionState::initial()
        };
        self.push_state(state);
        Ok(())
    }

    fn run_potentials(&mut self) -> Result<(), TransportError> {
        let previous = self.current_state().clone();
        let potentials = self
            .strategies
            .potential_calculator
            .execute(&self.graph, &previous.basis_edges)?;
        let objective_value = self.objective_value(&previous.flows)?;
        let state = SolutionState {
            step_type: StepType::CalculatePotentials,
            iteration: self.iteration,
            potentials,
            deltas: BTreeMap::new(),
            entering_edge: None,
            leaving_edge: None,
            improvement_direction: None,
            cycle: Vec::new(),
            theta: None,
            description: "node potentials calculated".to_string(),
            objective_value,
            ..previous
        };
        self.push_state(state);
        Ok(())
    }

    fn run_optimality(&mut self) -> Result<(), TransportError> {
        let previous = self.current_state().clone();
        let result = self.strategies.optimality_checker.execute(
            &self.graph,
            &previous.non_basis_edges,
            &previous.potentials,
            &previous.flows,
        )?;
        let objective_value = self.objective_value(&previous.flows)?;

        let state = if result.is_optimal {
            info!(
                "optimal solution found after {} iterations, objective {}",
                self.iteration, objective_value
            );
            SolutionState {
                step_type: StepType::Optimal,
                iteration: self.iteration,
                deltas: result.deltas,
                description: "optimal solution found".to_string(),
                objective_value,
                ..previous
            }
        } else {
            let description = match (&result.entering_edge, &result.improvement_direction) {
                (Some(edge), Some(direction)) => {
                    let delta = result.deltas.get(edge).copied().unwrap_or(0.0);
                    format!("violation detected: {edge} (delta {delta:.2}, {direction})")
                }
                _ => "violation detected".to_string(),
            };
            SolutionState {
                step_type: StepType::CheckOptimality,
                iteration: self.iteration,
                deltas: result.deltas,
                entering_edge: result.entering_edge,
                improvement_direction: result.improvement_direction,
                description,
                objective_value,
                ..previous
            }
        };
        self.push_state(state);
        Ok(())
    }

    fn run_cycle(&mut self) -> Result<(), TransportError> {
        let previous = self.current_state().clone();
        let entering = previous.entering_edge.clone().ok_or_else(|| {
            TransportError::InvariantViolation(
                "cycle search requested without an entering edge".to_string(),
            )
        })?;
        let direction = previous.improvement_direction.ok_or_else(|| {
            TransportError::InvariantViolation(
                "cycle search requested without an improvement direction".to_string(),
            )
        })?;
        let cycle = self.strategies.cycle_finder.execute(
            &self.graph,
            &previous.basis_edges,
            &entering,
            direction,
            &previous.flows,
        )?;
        let objective_value = self.objective_value(&previous.flows)?;
        let state = SolutionState {
            step_type: StepType::FindCycle,
            iteration: self.iteration,
            description: format!("improvement cycle found ({} edges)", cycle.len()),
            cycle,
            objective_value,
            ..previous
        };
        self.push_state(state);
        Ok(())
    }

    fn run_theta(&mut self) -> Result<(), TransportError> {
        let previous = self.current_state().clone();
        let result = self
            .strategies
            .theta_calculator
            .execute(&previous.cycle, &previous.basis_edges)?;
        let objective_value = self.objective_value(&previous.flows)?;
        if result.theta == 0.0 {
            debug!("degenerate pivot: theta is zero");
        }
        let state = SolutionState {
            step_type: StepType::CalculateTheta,
            iteration: self.iteration,
            leaving_edge: result.leaving_edge,
            description: format!("maximum flow adjustment: theta = {:.2}", result.theta),
            theta: Some(result.theta),
            objective_value,
            ..previous
        };
        self.push_state(state);
        Ok(())
    }

    fn run_update(&mut self) -> Result<(), TransportError> {
        let previous = self.current_state().clone();
        let entering = previous.entering_edge.clone().ok_or_else(|| {
            TransportError::InvariantViolation(
                "flow update requested without an entering edge".to_string(),
            )
        })?;
        let theta = previous.theta.ok_or_else(|| {
            TransportError::InvariantViolation("flow update requested without theta".to_string())
        })?;
        let update = self.strategies.flow_updater.execute(
            &self.graph,
            &previous.cycle,
            theta,
            &entering,
            previous.leaving_edge.as_ref(),
            &previous.basis_edges,
            &previous.flows,
        )?;
        let objective_value = self.objective_value(&update.flows)?;
        let state = SolutionState {
            step_type: StepType::UpdateFlows,
            iteration: self.iteration,
            basis_edges: update.basis_edges,
            non_basis_edges: update.non_basis_edges,
            potentials: BTreeMap::new(),
            deltas: BTreeMap::new(),
            flows: update.flows,
            cycle: Vec::new(),
            description: "flows updated, basis swapped".to_string(),
            objective_value,
            ..previous
        };
        self.push_state(state);
        Ok(())
    }

    fn push_state(&mut self, state: SolutionState) {
        debug!(
            "step {} [{}] {}",
            self.history.len(),
            state.step_type,
            state.description
        );
        self.history.push(state);
    }

    fn objective_value(&self, flows: &BTreeMap<EdgeKey, f64>) -> Result<f64, TransportError> {
        let mut total = 0.0;
        for (key, flow) in flows {
            let edge = self.graph.edge(key).ok_or_else(|| {
                TransportError::InvariantViolation(format!(
                    "flow recorded for unknown edge {key}"
                ))
            })?;
            total += edge.cost * flow;
        }
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_edge_graph() -> Graph {
        let mut graph = Graph::new();
        graph.add_node("a", 10.0).unwrap();
        graph.add_node("b", -10.0).unwrap();
        graph.add_edge("a", "b", 2.0, f64::INFINITY).unwrap();
        graph
    }

    #[test]
    fn state_machine_visits_phases_in_order() {
        let mut solver = TransportSolver::new(single_edge_graph());
        assert_eq!(solver.current_state().step_type, StepType::InitialState);

        assert!(solver.step().unwrap());
        assert_eq!(solver.current_state().step_type, StepType::InitialBasis);
        assert!(solver.step().unwrap());
        assert_eq!(
            solver.current_state().step_type,
            StepType::CalculatePotentials
        );
        assert!(solver.step().unwrap());
        assert_eq!(solver.current_state().step_type, StepType::Optimal);
    }

    #[test]
    fn step_after_optimal_is_a_no_op() {
        let mut solver = TransportSolver::new(single_edge_graph());
        solver.solve_step_by_step().unwrap();
        let states_before = solver.history().len();
        assert!(!solver.step().unwrap());
        assert_eq!(solver.history().len(), states_before);
    }

    #[test]
    fn history_is_append_only_and_starts_pristine() {
        let mut solver = TransportSolver::new(single_edge_graph());
        assert_eq!(solver.history().len(), 1);
        solver.solve_step_by_step().unwrap();
        assert_eq!(solver.history()[0].step_type, StepType::InitialState);
        assert!(solver.history().len() > 1);
    }

    #[test]
    fn iteration_cap_is_enforced() {
        let mut solver = TransportSolver::with_options(
            single_edge_graph(),
            SolverStrategies::default(),
            SolverOptions { max_iterations: 0 },
        );
        // a zero cap refuses even the first transition
        assert!(matches!(
            solver.step(),
            Err(TransportError::IterationLimit(0))
        ));
        assert_eq!(solver.history().len(), 1);
    }
}
