//! The bit-vector front end: accumulate conjuncts, translate, search.

use crate::branch_bound::solve_ilp;
use crate::error::IlpError;
use crate::oracle::{ClarabelOracle, LpOracle};
use crate::translate::translate;
use sable_core::expr::ExprNode;
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

/// Outcome of a bit-vector solve: values for the original variables, all
/// non-negative and below `2^w`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "model", rename_all = "snake_case")]
pub enum BvOutcome {
    Sat(HashMap<String, u64>),
    Unsat,
}

impl BvOutcome {
    pub fn is_sat(&self) -> bool {
        matches!(self, BvOutcome::Sat(_))
    }
}

/// Decides satisfiability of conjunctions of bit-vector constraints.
///
/// Conjuncts accumulate through [`add`](BvSolver::add); [`solve`](BvSolver::solve)
/// normalizes them, translates to an ILP and runs branch-and-bound over the
/// LP oracle. The oracle defaults to [`ClarabelOracle`] and can be swapped
/// through [`with_oracle`](BvSolver::with_oracle).
pub struct BvSolver {
    conjuncts: Vec<ExprNode>,
    oracle: Box<dyn LpOracle>,
}

impl BvSolver {
    pub fn new() -> Self {
        Self::with_oracle(Box::new(ClarabelOracle))
    }

    pub fn with_oracle(oracle: Box<dyn LpOracle>) -> Self {
        Self {
            conjuncts: Vec::new(),
            oracle,
        }
    }

    /// Add one conjunct (a comparison over bit-vector terms).
    pub fn add(&mut self, conjunct: ExprNode) {
        self.conjuncts.push(conjunct);
    }

    pub fn conjuncts(&self) -> &[ExprNode] {
        &self.conjuncts
    }

    /// Decide the accumulated conjunction.
    ///
    /// Normalization and translation errors abort the solve; oracle failures
    /// other than infeasibility propagate out of branch-and-bound.
    pub fn solve(&self) -> Result<BvOutcome, IlpError> {
        let Some(system) = translate(&self.conjuncts)? else {
            return Ok(BvOutcome::Unsat);
        };
        if system.num_cols() == 0 {
            // no variables and nothing contradictory: vacuously satisfiable
            return Ok(BvOutcome::Sat(HashMap::new()));
        }
        debug!(
            columns = system.num_cols(),
            originals = system.num_original(),
            "searching for an integer point"
        );
        match solve_ilp(self.oracle.as_ref(), &system)? {
            Some(point) => {
                let model = system
                    .columns
                    .iter()
                    .zip(&point)
                    .map(|(name, &v)| (name.clone(), v.max(0) as u64))
                    .collect();
                Ok(BvOutcome::Sat(model))
            }
            None => Ok(BvOutcome::Unsat),
        }
    }
}

impl Default for BvSolver {
    fn default() -> Self {
        Self::new()
    }
}
