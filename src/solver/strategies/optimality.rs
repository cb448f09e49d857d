use std::collections::{BTreeMap, BTreeSet};

use crate::graph::{EdgeKey, Graph};
use crate::numerics::EPSILON;
use crate::solver::state::Direction;
use crate::solver::strategies::{OptimalityResult, OptimalityStrategy};
use crate::TransportError;

/// Default optimality check: Dantzig's rule over the non-basis edges.
///
/// A non-basis edge sits at one of its bounds. At the lower bound a positive
/// reduced cost means pushing flow onto the edge improves the objective; at
/// the upper bound a negative reduced cost means pulling flow off does. The
/// entering edge is the violation with the largest magnitude, ties resolved
/// by the lexicographic edge order.
#[derive(Debug, Default, Clone, Copy)]
pub struct OptimalityChecker;

impl OptimalityStrategy for OptimalityChecker {
    fn execute(
        &self,
        graph: &Graph,
        non_basis: &BTreeSet<EdgeKey>,
        potentials: &BTreeMap<String, f64>,
        flows: &BTreeMap<EdgeKey, f64>,
    ) -> Result<OptimalityResult, TransportError> {
        let mut deltas = BTreeMap::new();
        let mut best: Option<(f64, EdgeKey, Direction)> = None;

        for key in non_basis {
            let edge = graph.edge(key).ok_or_else(|| {
                TransportError::InvariantViolation(format!(
                    "non-basis edge {key} is not part of the graph"
                ))
            })?;
            let u_from = potential_of(potentials, &edge.from)?;
            let u_to = potential_of(potentials, &edge.to)?;
            let delta = u_to - u_from - edge.cost;
            deltas.insert(key.clone(), delta);

            let flow = flows.get(key).copied().unwrap_or(0.0);
            let at_lower = flow <= EPSILON;
            let at_upper = edge.capacity - flow <= EPSILON;

            let violation = if at_lower && delta > EPSILON {
                Some((delta, Direction::Increase))
            } else if at_upper && delta < -EPSILON {
                Some((-delta, Direction::Decrease))
            } else {
                None
            };

            if let Some((score, direction)) = violation {
                // keys arrive in lexicographic order, so a strict comparison
                // keeps the smallest key among equal scores
                let replace = match &best {
                    None => true,
                    Some((best_score, _, _)) => score > *best_score,
                };
                if replace {
                    best = Some((score, key.clone(), direction));
                }
            }
        }

        Ok(match best {
            None => OptimalityResult {
                is_optimal: true,
                deltas,
                entering_edge: None,
                improvement_direction: None,
                violation_score: 0.0,
            },
            Some((score, key, direction)) => OptimalityResult {
                is_optimal: false,
                deltas,
                entering_edge: Some(key),
                improvement_direction: Some(direction),
                violation_score: score,
            },
        })
    }
}

fn potential_of(potentials: &BTreeMap<String, f64>, node: &str) -> Result<f64, TransportError> {
    potentials.get(node).copied().ok_or_else(|| {
        TransportError::InvariantViolation(format!("node '{node}' has no potential assigned"))
    })
}
