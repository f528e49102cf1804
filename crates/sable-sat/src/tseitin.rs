//! Tseitin encoding: propositional trees to equisatisfiable CNF.
//!
//! A single post-order walk allocates a fresh auxiliary variable for every
//! internal node and emits the clauses equating the auxiliary with its
//! subformula:
//!
//! | node         | clauses emitted                       |
//! |--------------|---------------------------------------|
//! | `NOT p → a`  | `(a ∨ p)`, `(¬a ∨ ¬p)`                |
//! | `AND(p,q) → a` | `(a ∨ ¬p ∨ ¬q)`, `(¬a ∨ p)`, `(¬a ∨ q)` |
//! | `OR(p,q) → a`  | `(¬a ∨ p ∨ q)`, `(a ∨ ¬p)`, `(a ∨ ¬q)`  |
//!
//! The unit clause for the root auxiliary is appended last. Original
//! variables intern their name in the shared [`VarTable`], so ids are dense
//! and deterministic; auxiliaries take fresh reserved ids. Constant leaves
//! are pinned by a unit clause of the matching polarity so that `true` and
//! `false` mean what they say.
//!
//! The resulting [`Encoding`] keeps the *match* map from CNF variable id back
//! to the original variable name, which is what projects a CNF model onto the
//! user's variables.

use sable_core::cnf::{Clause, CnfFormula, Lit};
use sable_core::intern::VarTable;
use sable_core::prop::{PropNode, PropOp};
use std::collections::HashMap;
use tracing::debug;

/// Reserved prefix for Tseitin auxiliaries.
pub const AUX_PREFIX: &str = "__t";

/// The CNF produced for a propositional tree, with the bookkeeping needed to
/// decode a model.
#[derive(Debug, Clone)]
pub struct Encoding {
    formula: CnfFormula,
    table: VarTable,
    matches: HashMap<usize, String>,
}

impl Encoding {
    pub fn formula(&self) -> &CnfFormula {
        &self.formula
    }

    /// Id → original-variable-name map for the user-visible subset of ids.
    pub fn matches(&self) -> &HashMap<usize, String> {
        &self.matches
    }

    pub fn num_vars(&self) -> usize {
        self.formula.num_vars()
    }

    pub fn table(&self) -> &VarTable {
        &self.table
    }

    /// Project a total CNF model (indexed `var - 1`) onto the original
    /// variables.
    pub fn project(&self, model: &[bool]) -> HashMap<String, bool> {
        self.matches
            .iter()
            .filter_map(|(&id, name)| model.get(id - 1).map(|&v| (name.clone(), v)))
            .collect()
    }
}

/// Encode a propositional tree as equisatisfiable CNF.
pub fn encode(root: &PropNode) -> Encoding {
    let mut encoder = Encoder {
        formula: CnfFormula::new(),
        table: VarTable::new(),
        matches: HashMap::new(),
        pinned_true: None,
        pinned_false: None,
    };
    let root_lit = encoder.walk(root);
    encoder.formula.push(Clause::new([root_lit]));
    encoder.formula.reserve_vars(encoder.table.len());
    debug!(
        vars = encoder.table.len(),
        clauses = encoder.formula.clauses().len(),
        "tseitin encoding complete"
    );
    Encoding {
        formula: encoder.formula,
        table: encoder.table,
        matches: encoder.matches,
    }
}

struct Encoder {
    formula: CnfFormula,
    table: VarTable,
    matches: HashMap<usize, String>,
    pinned_true: Option<usize>,
    pinned_false: Option<usize>,
}

impl Encoder {
    fn walk(&mut self, node: &PropNode) -> Lit {
        match node {
            PropNode::Variable { name } => {
                let id = self.table.intern(name);
                self.matches.entry(id).or_insert_with(|| name.clone());
                Lit::positive(id)
            }
            PropNode::Constant { value } => self.pin_constant(*value),
            PropNode::Op { op, left, right } => {
                let p = self.walk(left);
                let q = right.as_ref().map(|r| self.walk(r));
                let a = Lit::positive(self.table.fresh(AUX_PREFIX));
                match (op, q) {
                    (PropOp::Not, _) => {
                        self.push([a, p]);
                        self.push([a.negated(), p.negated()]);
                    }
                    (PropOp::And, Some(q)) => {
                        self.push([a, p.negated(), q.negated()]);
                        self.push([a.negated(), p]);
                        self.push([a.negated(), q]);
                    }
                    (PropOp::Or, Some(q)) => {
                        self.push([a.negated(), p, q]);
                        self.push([a, p.negated()]);
                        self.push([a, q.negated()]);
                    }
                    // a binary connective missing an operand degrades to the
                    // identity on its only child
                    (_, None) => {
                        self.push([a, p.negated()]);
                        self.push([a.negated(), p]);
                    }
                }
                a
            }
        }
    }

    /// Constants map to a reserved variable forced by a unit clause.
    fn pin_constant(&mut self, value: bool) -> Lit {
        let slot = if value {
            &mut self.pinned_true
        } else {
            &mut self.pinned_false
        };
        if let Some(id) = *slot {
            return Lit::positive(id);
        }
        let id = self.table.fresh(if value { "__true" } else { "__false" });
        *slot = Some(id);
        let lit = Lit::positive(id);
        self.formula
            .push(Clause::new([if value { lit } else { lit.negated() }]));
        lit
    }

    fn push(&mut self, lits: impl IntoIterator<Item = Lit>) {
        self.formula.push(Clause::new(lits));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_gate_clause_count() {
        let encoding = encode(&PropNode::var("a").not());
        // two gate clauses plus the root unit
        assert_eq!(encoding.formula().clauses().len(), 3);
        assert_eq!(encoding.num_vars(), 2);
    }

    #[test]
    fn test_and_gate_clause_count() {
        let encoding = encode(&PropNode::var("a").and(PropNode::var("b")));
        assert_eq!(encoding.formula().clauses().len(), 4);
        assert_eq!(encoding.num_vars(), 3);
    }

    #[test]
    fn test_match_map_covers_only_originals() {
        let encoding = encode(&PropNode::var("a").and(PropNode::var("b")).not());
        let mut names: Vec<&str> = encoding.matches().values().map(String::as_str).collect();
        names.sort_unstable();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_ids_are_dense_and_deterministic() {
        let encoding = encode(&PropNode::var("x").or(PropNode::var("y")));
        assert_eq!(encoding.table().lookup("x"), Some(1));
        assert_eq!(encoding.table().lookup("y"), Some(2));
    }

    #[test]
    fn test_constants_are_pinned() {
        let encoding = encode(&PropNode::var("a").and(PropNode::constant(false)));
        // some unit clause forces the reserved constant variable to false
        let pinned = encoding
            .formula()
            .clauses()
            .iter()
            .any(|c| c.len() == 1 && c.lits()[0].is_negative());
        assert!(pinned);
    }

    #[test]
    fn test_projection_reads_model() {
        let encoding = encode(&PropNode::var("a").and(PropNode::var("b")));
        let model = vec![true, false, false];
        let projected = encoding.project(&model);
        assert_eq!(projected.get("a"), Some(&true));
        assert_eq!(projected.get("b"), Some(&false));
        assert_eq!(projected.len(), 2);
    }
}
