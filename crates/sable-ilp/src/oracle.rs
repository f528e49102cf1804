//! The LP oracle seam.
//!
//! Branch-and-bound treats the numeric LP kernel as a black box behind the
//! [`LpOracle`] trait: hand it `(c, A_ub, b_ub, A_eq, b_eq, bounds)`, get back
//! a real-valued point or infeasibility. The default implementation models
//! the request with `good_lp` and solves with Clarabel, a pure-Rust
//! interior-point solver. Interior-point solutions may sit anywhere in the
//! optimal face — in particular they can be fractional even when integer
//! vertices exist — which is exactly why the driver above this seam relies
//! only on bound tightening.

use crate::error::IlpError;
use good_lp::solvers::clarabel::clarabel;
use good_lp::{constraint, variable, variables, Expression, ResolutionError, Solution, SolverModel};
use tracing::trace;

/// One LP relaxation: minimize `c·x` subject to `A_ub·x ≤ b_ub`,
/// `A_eq·x = b_eq`, `bounds[i].0 ≤ x_i ≤ bounds[i].1`.
#[derive(Debug, Clone)]
pub struct LpRequest<'a> {
    pub objective: &'a [f64],
    pub a_ub: &'a [Vec<f64>],
    pub b_ub: &'a [f64],
    pub a_eq: &'a [Vec<f64>],
    pub b_eq: &'a [f64],
    pub bounds: &'a [(f64, f64)],
}

/// Outcome of one oracle call. Infeasibility is a normal answer, not an
/// error.
#[derive(Debug, Clone, PartialEq)]
pub enum LpStatus {
    Solved(Vec<f64>),
    Infeasible,
}

/// A black-box LP solver over real-valued, per-column-bounded variables.
pub trait LpOracle {
    fn solve_lp(&self, request: &LpRequest<'_>) -> Result<LpStatus, IlpError>;
}

/// The default oracle: `good_lp` modeling over the Clarabel backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClarabelOracle;

impl LpOracle for ClarabelOracle {
    fn solve_lp(&self, request: &LpRequest<'_>) -> Result<LpStatus, IlpError> {
        let mut vars = variables!();
        let cols: Vec<_> = request
            .bounds
            .iter()
            .map(|&(lo, hi)| vars.add(variable().min(lo).max(hi)))
            .collect();

        let mut objective = Expression::from(0.0);
        for (c, v) in request.objective.iter().zip(&cols) {
            objective += *c * *v;
        }

        let mut model = vars.minimise(objective).using(clarabel);
        for (row, rhs) in request.a_ub.iter().zip(request.b_ub) {
            let mut lhs = Expression::from(0.0);
            for (a, v) in row.iter().zip(&cols) {
                if *a != 0.0 {
                    lhs += *a * *v;
                }
            }
            model = model.with(constraint!(lhs <= *rhs));
        }
        for (row, rhs) in request.a_eq.iter().zip(request.b_eq) {
            let mut lhs = Expression::from(0.0);
            for (a, v) in row.iter().zip(&cols) {
                if *a != 0.0 {
                    lhs += *a * *v;
                }
            }
            model = model.with(constraint!(lhs == *rhs));
        }

        match model.solve() {
            Ok(solution) => {
                let x: Vec<f64> = cols.iter().map(|v| solution.value(*v)).collect();
                trace!(?x, "lp relaxation solved");
                Ok(LpStatus::Solved(x))
            }
            Err(ResolutionError::Infeasible) => Ok(LpStatus::Infeasible),
            Err(other) => Err(IlpError::Oracle(format!("{:?}", other))),
        }
    }
}
