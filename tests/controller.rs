use transport_simplex::{
    Graph, SolutionState, SolverController, StepType, TransportError,
};

fn triangle() -> Graph {
    let mut graph = Graph::new();
    graph.add_node("A", 10.0).unwrap();
    graph.add_node("B", 0.0).unwrap();
    graph.add_node("C", -10.0).unwrap();
    graph.add_edge("A", "B", 1.0, f64::INFINITY).unwrap();
    graph.add_edge("B", "C", 1.0, f64::INFINITY).unwrap();
    graph.add_edge("A", "C", 3.0, f64::INFINITY).unwrap();
    graph
}

#[test]
fn starts_before_the_first_state() {
    let controller = SolverController::new(triangle());
    assert!(!controller.is_started());
    assert!(!controller.is_solved());
    assert!(controller.can_go_next());
    assert!(!controller.can_go_previous());
    assert_eq!(
        controller.get_current_state().step_type,
        StepType::InitialState
    );
    assert_eq!(controller.step_count(), 0);
}

#[test]
fn next_step_computes_states_one_at_a_time() {
    let mut controller = SolverController::new(triangle());
    assert!(controller.next_step().unwrap());
    assert!(controller.is_started());
    assert_eq!(
        controller.get_current_state().step_type,
        StepType::InitialBasis
    );
    assert_eq!(controller.step_count(), 1);

    assert!(controller.next_step().unwrap());
    assert_eq!(
        controller.get_current_state().step_type,
        StepType::CalculatePotentials
    );
    assert_eq!(controller.step_count(), 2);
}

#[test]
fn rewind_then_forward_replays_the_same_state() {
    let mut controller = SolverController::new(triangle());
    for _ in 0..4 {
        controller.next_step().unwrap();
    }
    let here = controller.get_current_state();
    let computed = controller.step_count();

    assert!(controller.previous_step());
    assert_ne!(controller.get_current_state(), here);
    assert!(controller.next_step().unwrap());

    // pure navigation: same state, nothing recomputed
    assert_eq!(controller.get_current_state(), here);
    assert_eq!(controller.step_count(), computed);
}

#[test]
fn rewind_to_the_very_beginning() {
    let mut controller = SolverController::new(triangle());
    controller.next_step().unwrap();
    controller.next_step().unwrap();

    assert!(controller.previous_step());
    assert!(controller.previous_step());
    assert!(!controller.is_started());
    assert_eq!(controller.get_current_state(), SolutionState::initial());
    assert!(!controller.previous_step());

    // forward again walks the recorded history
    assert!(controller.next_step().unwrap());
    assert_eq!(
        controller.get_current_state().step_type,
        StepType::InitialBasis
    );
}

#[test]
fn solve_all_lands_on_the_terminal_state() {
    let mut controller = SolverController::new(triangle());
    controller.solve_all().unwrap();
    assert!(controller.is_solved());
    assert_eq!(controller.get_current_state().step_type, StepType::Optimal);
    assert!(!controller.can_go_next());
    assert!(!controller.next_step().unwrap());

    // every recorded state stays reachable
    let recorded = controller.step_count();
    while controller.can_go_previous() {
        controller.previous_step();
    }
    assert_eq!(controller.step_count(), recorded);
}

#[test]
fn reset_discards_history_and_resolves() {
    let mut controller = SolverController::new(triangle());
    controller.solve_all().unwrap();
    let objective = controller.get_all_states().last().unwrap().objective_value;

    controller.reset();
    assert!(!controller.is_started());
    assert!(!controller.is_solved());
    assert_eq!(controller.step_count(), 0);

    controller.solve_all().unwrap();
    assert!(controller.is_solved());
    assert_eq!(
        controller.get_all_states().last().unwrap().objective_value,
        objective
    );
}

#[test]
fn infeasible_problems_surface_through_next_step() {
    let mut graph = Graph::new();
    graph.add_node("A", 5.0).unwrap();
    graph.add_node("B", -4.0).unwrap();
    graph.add_edge("A", "B", 1.0, f64::INFINITY).unwrap();

    let mut controller = SolverController::new(graph);
    assert!(matches!(
        controller.next_step(),
        Err(TransportError::Infeasible(_))
    ));
    assert!(!controller.is_started());
    assert_eq!(controller.step_count(), 0);
}
