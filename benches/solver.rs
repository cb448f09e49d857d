use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use transport_simplex::{Graph, TransportSolver};

/// Grid transportation instance: supply in one corner, demand in the other,
/// rightward and downward edges with uneven costs.
fn grid_graph(side: usize) -> Graph {
    let mut graph = Graph::new();
    let supply = (side * side) as f64;
    for r in 0..side {
        for c in 0..side {
            let balance = if (r, c) == (0, 0) {
                supply
            } else if (r, c) == (side - 1, side - 1) {
                -supply
            } else {
                0.0
            };
            graph.add_node(format!("N{r:02}{c:02}"), balance).unwrap();
        }
    }
    for r in 0..side {
        for c in 0..side {
            let here = format!("N{r:02}{c:02}");
            if c + 1 < side {
                let right = format!("N{r:02}{:02}", c + 1);
                graph
                    .add_edge(here.clone(), right, 1.0 + (r % 3) as f64, f64::INFINITY)
                    .unwrap();
            }
            if r + 1 < side {
                let down = format!("N{:02}{c:02}", r + 1);
                graph
                    .add_edge(here, down, 2.0 + (c % 2) as f64, f64::INFINITY)
                    .unwrap();
            }
        }
    }
    graph
}

fn bench_solve(c: &mut Criterion) {
    let mut group = c.benchmark_group("grid_solve");
    for &side in &[3usize, 4, 5] {
        let graph = grid_graph(side);
        group.bench_with_input(BenchmarkId::from_parameter(side), &side, |b, _| {
            b.iter(|| {
                let mut solver = TransportSolver::new(graph.clone());
                solver.solve_step_by_step().unwrap();
                solver.current_state().objective_value
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_solve);
criterion_main!(benches);
