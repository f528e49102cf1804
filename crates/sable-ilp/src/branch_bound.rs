//! LP-relaxation branch-and-bound over the oracle seam.
//!
//! This is a feasibility search, not optimization: the objective exists only
//! because the oracle requires one, and the first integer-feasible point
//! wins. The recursion is
//!
//! 1. solve the relaxation at the current bounds (infeasible ⇒ dead branch);
//! 2. if every component is integral, return the rounded point;
//! 3. otherwise take the first fractional component `x_i` and recurse on
//!    `(lo_i, ⌊x_i⌋)` then `(⌈x_i⌉, hi_i)`, down branch first.
//!
//! Bounds stay integral on every call and every branch strictly shrinks an
//! integral interval; since the translator gives every column (slacks
//! included) finite bounds, the recursion terminates.

use crate::error::IlpError;
use crate::oracle::{LpOracle, LpRequest, LpStatus};
use crate::translate::IlpSystem;
use tracing::debug;

/// Integrality tolerance: interior-point oracles return `4.999999…` for
/// integral vertices.
const INT_TOL: f64 = 1e-6;

fn is_integral(x: f64) -> bool {
    (x - x.round()).abs() <= INT_TOL
}

/// Find an integer-feasible point of the system, or `None` when there is
/// none. Oracle failures other than infeasibility propagate.
pub fn solve_ilp(oracle: &dyn LpOracle, system: &IlpSystem) -> Result<Option<Vec<i64>>, IlpError> {
    branch(oracle, system, system.bounds.clone(), 0)
}

fn branch(
    oracle: &dyn LpOracle,
    system: &IlpSystem,
    bounds: Vec<(f64, f64)>,
    depth: usize,
) -> Result<Option<Vec<i64>>, IlpError> {
    let request = LpRequest {
        objective: &system.objective,
        a_ub: &system.a_ub,
        b_ub: &system.b_ub,
        a_eq: &system.a_eq,
        b_eq: &system.b_eq,
        bounds: &bounds,
    };
    let x = match oracle.solve_lp(&request)? {
        LpStatus::Infeasible => return Ok(None),
        LpStatus::Solved(x) => x,
    };

    for (i, &xi) in x.iter().enumerate() {
        if is_integral(xi) {
            continue;
        }
        debug!(column = i, value = xi, depth, "branching on fractional column");

        let mut down = bounds.clone();
        down[i] = (bounds[i].0, xi.floor());
        if let Some(solution) = branch(oracle, system, down, depth + 1)? {
            return Ok(Some(solution));
        }

        let hi = bounds[i].1;
        let mut up = bounds;
        up[i] = (xi.ceil(), hi);
        return branch(oracle, system, up, depth + 1);
    }

    Ok(Some(x.iter().map(|v| v.round() as i64).collect()))
}
