//! The propositional front end: Tseitin encode, run CDCL, project the model.

use crate::cdcl::{CdclSolver, SatResult};
use crate::tseitin;
use sable_core::prop::PropNode;
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

/// Outcome of a propositional solve, projected onto the user's variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "model", rename_all = "snake_case")]
pub enum SatOutcome {
    Sat(HashMap<String, bool>),
    Unsat,
}

impl SatOutcome {
    pub fn is_sat(&self) -> bool {
        matches!(self, SatOutcome::Sat(_))
    }
}

/// Decides satisfiability of propositional formulas.
#[derive(Debug, Clone, Copy, Default)]
pub struct PropSolver;

impl PropSolver {
    pub fn new() -> Self {
        PropSolver
    }

    /// Encode the formula, decide it, and project a model (if any) back onto
    /// the original variable names. The projection is total over the
    /// formula's variables.
    pub fn submit(&self, root: &PropNode) -> SatOutcome {
        let encoding = tseitin::encode(root);
        debug!(
            vars = encoding.num_vars(),
            clauses = encoding.formula().clauses().len(),
            "submitting to cdcl"
        );
        match CdclSolver::new(encoding.formula()).solve() {
            SatResult::Sat(model) => SatOutcome::Sat(encoding.project(&model)),
            SatResult::Unsat => SatOutcome::Unsat,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_serialization() {
        let outcome = PropSolver::new().submit(&PropNode::var("a"));
        let json = serde_json::to_string(&outcome).unwrap();
        assert!(json.contains("\"status\":\"sat\""));
        assert!(json.contains("\"a\":true"));
    }

    #[test]
    fn test_unsat_serialization() {
        let a = PropNode::var("a");
        let outcome = PropSolver::new().submit(&a.clone().and(a.not()));
        assert_eq!(
            serde_json::to_string(&outcome).unwrap(),
            "{\"status\":\"unsat\"}"
        );
    }
}
