use std::collections::BTreeSet;

use crate::graph::EdgeKey;
use crate::numerics::approx_eq;
use crate::solver::state::CycleEdge;
use crate::solver::strategies::{ThetaResult, ThetaStrategy};
use crate::TransportError;

/// Default theta calculator: theta is the minimum limit over the cycle, the
/// leaving edge the one attaining it. Among ties, basis edges win before the
/// lexicographic edge order.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThetaCalculator;

impl ThetaStrategy for ThetaCalculator {
    fn execute(
        &self,
        cycle: &[CycleEdge],
        basis: &BTreeSet<EdgeKey>,
    ) -> Result<ThetaResult, TransportError> {
        if cycle.is_empty() {
            return Ok(ThetaResult {
                theta: 0.0,
                leaving_edge: None,
            });
        }

        let mut theta = f64::INFINITY;
        for edge in cycle {
            theta = theta.min(edge.theta_limit);
        }
        // a cycle of unbounded limits gives no finite step; pivot in place
        if theta.is_infinite() {
            theta = 0.0;
        }

        let mut candidates: Vec<&CycleEdge> = cycle
            .iter()
            .filter(|edge| approx_eq(edge.theta_limit, theta))
            .collect();
        candidates.sort_by(|a, b| {
            let a_rank = (!basis.contains(&a.key), &a.key);
            let b_rank = (!basis.contains(&b.key), &b.key);
            a_rank.cmp(&b_rank)
        });

        Ok(ThetaResult {
            theta,
            leaving_edge: candidates.first().map(|edge| edge.key.clone()),
        })
    }
}
