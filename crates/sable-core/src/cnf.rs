//! CNF building blocks: literals, clauses and formulas.
//!
//! Literals are signed nonzero integers (positive = the variable, negative =
//! its negation) over densely numbered variables `1..=V`. Clauses are literal
//! sets stored sorted by variable so that structurally equal clauses hash
//! equally regardless of construction order; this is what lets learnt clauses
//! be deduplicated in a hash set.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A literal: a signed nonzero variable reference.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Lit(i32);

impl Lit {
    /// Build a literal from DIMACS-style signed code; `None` for 0.
    pub fn new(code: i32) -> Option<Lit> {
        (code != 0).then_some(Lit(code))
    }

    #[inline]
    pub fn positive(var: usize) -> Lit {
        Lit(var as i32)
    }

    #[inline]
    pub fn negative(var: usize) -> Lit {
        Lit(-(var as i32))
    }

    /// The variable this literal refers to.
    #[inline]
    pub fn var(self) -> usize {
        self.0.unsigned_abs() as usize
    }

    #[inline]
    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    #[inline]
    pub fn negated(self) -> Lit {
        Lit(-self.0)
    }

    /// The raw signed code.
    #[inline]
    pub fn code(self) -> i32 {
        self.0
    }
}

impl fmt::Display for Lit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A clause: a deduplicated set of literals.
///
/// Literals are kept sorted by `(variable, sign)`, so `Hash`/`Eq` are
/// insensitive to the order literals were supplied in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Clause {
    lits: Vec<Lit>,
}

impl Clause {
    pub fn new(lits: impl IntoIterator<Item = Lit>) -> Self {
        let mut lits: Vec<Lit> = lits.into_iter().collect();
        lits.sort_by_key(|l| (l.var(), l.is_negative()));
        lits.dedup();
        Clause { lits }
    }

    pub fn lits(&self) -> &[Lit] {
        &self.lits
    }

    pub fn len(&self) -> usize {
        self.lits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lits.is_empty()
    }

    pub fn contains_var(&self, var: usize) -> bool {
        self.lits.iter().any(|l| l.var() == var)
    }

    pub fn iter(&self) -> impl Iterator<Item = Lit> + '_ {
        self.lits.iter().copied()
    }

    /// Largest variable id mentioned, or 0 for the empty clause.
    pub fn max_var(&self) -> usize {
        self.lits.iter().map(|l| l.var()).max().unwrap_or(0)
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, lit) in self.lits.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{lit}")?;
        }
        write!(f, ")")
    }
}

/// A CNF formula: the original clause set `δ` plus its variable count.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CnfFormula {
    clauses: Vec<Clause>,
    num_vars: usize,
}

impl CnfFormula {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a clause, growing the variable count to cover it.
    pub fn push(&mut self, clause: Clause) {
        self.num_vars = self.num_vars.max(clause.max_var());
        self.clauses.push(clause);
    }

    /// Force the variable count (e.g. from a DIMACS header) even when the
    /// trailing variables appear in no clause.
    pub fn reserve_vars(&mut self, num_vars: usize) {
        self.num_vars = self.num_vars.max(num_vars);
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn num_vars(&self) -> usize {
        self.num_vars
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Check a total model (indexed `var - 1`) against every clause.
    pub fn satisfied_by(&self, model: &[bool]) -> bool {
        self.clauses.iter().all(|clause| {
            clause
                .iter()
                .any(|lit| model.get(lit.var() - 1).copied().unwrap_or(false) != lit.is_negative())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    fn lit(code: i32) -> Lit {
        Lit::new(code).unwrap()
    }

    fn hash_of<T: Hash>(value: &T) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_literal_accessors() {
        let l = lit(-3);
        assert_eq!(l.var(), 3);
        assert!(l.is_negative());
        assert_eq!(l.negated(), lit(3));
        assert!(Lit::new(0).is_none());
    }

    #[test]
    fn test_clause_hash_is_order_insensitive() {
        let a = Clause::new([lit(3), lit(-1), lit(2)]);
        let b = Clause::new([lit(-1), lit(2), lit(3)]);
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
    }

    #[test]
    fn test_clause_deduplicates() {
        let c = Clause::new([lit(1), lit(1), lit(-2)]);
        assert_eq!(c.len(), 2);
    }

    #[test]
    fn test_formula_tracks_num_vars() {
        let mut formula = CnfFormula::new();
        formula.push(Clause::new([lit(1), lit(-4)]));
        assert_eq!(formula.num_vars(), 4);
        formula.reserve_vars(7);
        assert_eq!(formula.num_vars(), 7);
    }

    #[test]
    fn test_satisfied_by() {
        let mut formula = CnfFormula::new();
        formula.push(Clause::new([lit(1), lit(2)]));
        formula.push(Clause::new([lit(-1), lit(2)]));
        assert!(formula.satisfied_by(&[false, true]));
        assert!(!formula.satisfied_by(&[true, false]));
    }

    #[test]
    fn test_literal_serialization_is_transparent() {
        let json = serde_json::to_string(&Clause::new([lit(1), lit(-2)])).unwrap();
        assert!(json.contains("[1,-2]"));
    }
}
