use crate::graph::Graph;
use crate::solver::state::{SolutionState, StepType};
use crate::solver::TransportSolver;
use crate::TransportError;

/// Cursor over a solver's computed states.
///
/// Moving forward at the tail advances the engine by one transition; moving
/// forward inside history, and moving backward anywhere, is pure navigation
/// over the immutable snapshots and re-executes nothing.
pub struct SolverController {
    graph: Graph,
    solver: TransportSolver,
    states: Vec<SolutionState>,
    cursor: Option<usize>,
}

impl SolverController {
    pub fn new(graph: Graph) -> Self {
        let solver = TransportSolver::new(graph.clone());
        Self {
            graph,
            solver,
            states: Vec::new(),
            cursor: None,
        }
    }

    pub fn is_started(&self) -> bool {
        self.cursor.is_some()
    }

    pub fn is_solved(&self) -> bool {
        self.states
            .last()
            .is_some_and(|state| state.step_type == StepType::Optimal)
    }

    pub fn can_go_next(&self) -> bool {
        if !self.at_tail() {
            return true;
        }
        !self.is_solved()
    }

    pub fn can_go_previous(&self) -> bool {
        self.cursor.is_some()
    }

    /// Advances the cursor, computing a new state when already at the tail.
    /// Returns whether the cursor moved.
    pub fn next_step(&mut self) -> Result<bool, TransportError> {
        if !self.can_go_next() {
            return Ok(false);
        }
        if self.at_tail() {
            if !self.solver.step()? {
                return Ok(false);
            }
            self.states.push(self.solver.current_state().clone());
            self.cursor = Some(self.states.len() - 1);
        } else {
            self.cursor = Some(match self.cursor {
                None => 0,
                Some(index) => index + 1,
            });
        }
        Ok(true)
    }

    /// Moves the cursor one state back. Rewinding past the first computed
    /// state parks the cursor on the pristine initial snapshot.
    pub fn previous_step(&mut self) -> bool {
        match self.cursor {
            None => false,
            Some(0) => {
                self.cursor = None;
                true
            }
            Some(index) => {
                self.cursor = Some(index - 1);
                true
            }
        }
    }

    /// Runs the solver to completion; the cursor lands on the terminal state.
    pub fn solve_all(&mut self) -> Result<(), TransportError> {
        while self.can_go_next() {
            if !self.next_step()? {
                break;
            }
        }
        Ok(())
    }

    /// Discards the solver and every computed state.
    pub fn reset(&mut self) {
        self.states.clear();
        self.cursor = None;
        self.solver = TransportSolver::new(self.graph.clone());
    }

    pub fn get_current_state(&self) -> SolutionState {
        match self.cursor {
            Some(index) => self.states[index].clone(),
            None => SolutionState::initial(),
        }
    }

    pub fn get_all_states(&self) -> &[SolutionState] {
        &self.states
    }

    pub fn step_count(&self) -> usize {
        self.states.len()
    }

    pub fn solver(&self) -> &TransportSolver {
        &self.solver
    }

    fn at_tail(&self) -> bool {
        match self.cursor {
            None => self.states.is_empty(),
            Some(index) => index + 1 >= self.states.len(),
        }
    }
}
