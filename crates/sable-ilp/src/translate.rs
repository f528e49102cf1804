//! Bit-vector conjunctions to integer linear programs.
//!
//! Each conjunct is normalized to `Σ k_i·v_i ◇ K` and becomes one matrix row.
//! Original variables take the leading columns in first-occurrence order with
//! bounds `[0, 2^w − 1]`. Every *equality* of width `w` gets a fresh slack
//! column with coefficient `2^w`,
//!
//! ```text
//! Σ k_i·v_i + 2^w·s = K
//! ```
//!
//! so any overflow is absorbed by an integer multiple of `2^w`: the row holds
//! exactly when the bit-vector equation holds mod `2^w`. The slack bound is
//! symmetric and finite, `⌈(Σ|k_i|·(2^w−1) + |K|) / 2^w⌉ + 1`, large enough
//! for every reachable wrap yet finite so branch-and-bound terminates.
//!
//! Inequalities carry no slack (they constrain the non-wrapped value) and are
//! emitted as `≤` rows: `< K` tightens to `≤ K−1`, and `≥`/`>` rows are
//! negated. At the width boundary this can leave an empty feasible region
//! (`x < 0` over unsigned `x`), which is the intended reading.
//!
//! The objective is the all-ones vector over original columns; the ILP is a
//! feasibility problem cast as a minimization whose optimum is irrelevant.

use crate::error::IlpError;
use sable_core::expr::{ExprNode, ExprOp};
use sable_core::intern::VarTable;
use std::collections::HashMap;
use tracing::debug;

/// A dense integer linear program, entries held in `f64`.
///
/// With widths capped at 32 bits every coefficient, constant and bound is
/// exactly representable.
#[derive(Debug, Clone, Default)]
pub struct IlpSystem {
    /// Names of the original (non-slack) columns, in column order.
    pub columns: Vec<String>,
    pub objective: Vec<f64>,
    pub a_eq: Vec<Vec<f64>>,
    pub b_eq: Vec<f64>,
    pub a_ub: Vec<Vec<f64>>,
    pub b_ub: Vec<f64>,
    pub bounds: Vec<(f64, f64)>,
}

impl IlpSystem {
    pub fn num_cols(&self) -> usize {
        self.bounds.len()
    }

    pub fn num_original(&self) -> usize {
        self.columns.len()
    }

    /// Check an integer point against every row and every bound.
    pub fn satisfied_by(&self, x: &[i64]) -> bool {
        if x.len() != self.num_cols() {
            return false;
        }
        let dot = |row: &[f64]| -> f64 {
            row.iter().zip(x).map(|(a, &v)| a * v as f64).sum()
        };
        self.bounds
            .iter()
            .zip(x)
            .all(|(&(lo, hi), &v)| lo <= v as f64 && v as f64 <= hi)
            && self
                .a_eq
                .iter()
                .zip(&self.b_eq)
                .all(|(row, &b)| dot(row) == b)
            && self
                .a_ub
                .iter()
                .zip(&self.b_ub)
                .all(|(row, &b)| dot(row) <= b)
    }
}

struct Row {
    op: ExprOp,
    coeffs: HashMap<String, i64>,
    rhs: i64,
    width: u32,
}

/// Translate a conjunction into an [`IlpSystem`].
///
/// Returns `Ok(None)` when some conjunct is a trivially false constant
/// relation (the conjunction is UNSAT without consulting the oracle).
pub fn translate(conjuncts: &[ExprNode]) -> Result<Option<IlpSystem>, IlpError> {
    // column assignment: originals first, in first-occurrence order
    let mut table = VarTable::new();
    let mut widths: Vec<u32> = Vec::new();
    for conjunct in conjuncts {
        for (name, width) in conjunct.variables() {
            let id = table.intern(&name);
            if id > widths.len() {
                widths.push(width);
            } else if widths[id - 1] != width {
                return Err(sable_core::expr::ExprError::WidthMismatch(widths[id - 1], width).into());
            }
        }
    }
    let n_original = table.len();

    let mut rows = Vec::new();
    for conjunct in conjuncts {
        let normalized = conjunct.normalize()?;
        debug!(conjunct = %normalized, "normalized");
        let coeffs = normalized.coefficients()?;
        let rhs = normalized.rhs_constant()?;
        let (op, _, _) = normalized.relation()?;
        let width = normalized.width()?;
        if coeffs.values().all(|&k| k == 0) {
            // constant relation 0 ◇ K: decide it here
            let holds = match op {
                ExprOp::Eq => rhs == 0,
                ExprOp::Lt => rhs > 0,
                ExprOp::Le => rhs >= 0,
                ExprOp::Gt => rhs < 0,
                ExprOp::Ge => rhs <= 0,
                _ => false,
            };
            if !holds {
                return Ok(None);
            }
            continue;
        }
        rows.push(Row {
            op,
            coeffs,
            rhs,
            width,
        });
    }

    let n_eq = rows.iter().filter(|r| r.op == ExprOp::Eq).count();
    let n_cols = n_original + n_eq;

    let mut system = IlpSystem {
        columns: (1..=n_original)
            .map(|id| table.name(id).unwrap_or_default().to_string())
            .collect(),
        objective: (0..n_cols).map(|i| if i < n_original { 1.0 } else { 0.0 }).collect(),
        bounds: (0..n_original)
            .map(|i| (0.0, ((1u64 << widths[i]) - 1) as f64))
            .collect(),
        ..IlpSystem::default()
    };

    let mut next_slack = n_original;
    for row in &rows {
        let mut dense = vec![0.0; n_cols];
        for (name, &k) in &row.coeffs {
            if let Some(id) = table.lookup(name) {
                dense[id - 1] = k as f64;
            }
        }
        match row.op {
            ExprOp::Eq => {
                let modulus = 1i128 << row.width;
                dense[next_slack] = modulus as f64;
                system.bounds.push(slack_bound(row, modulus));
                next_slack += 1;
                system.a_eq.push(dense);
                system.b_eq.push(row.rhs as f64);
            }
            ExprOp::Le => {
                system.a_ub.push(dense);
                system.b_ub.push(row.rhs as f64);
            }
            ExprOp::Lt => {
                system.a_ub.push(dense);
                system.b_ub.push((row.rhs - 1) as f64);
            }
            ExprOp::Ge => {
                system.a_ub.push(dense.iter().map(|a| -a).collect());
                system.b_ub.push(-row.rhs as f64);
            }
            ExprOp::Gt => {
                system.a_ub.push(dense.iter().map(|a| -a).collect());
                system.b_ub.push(-(row.rhs + 1) as f64);
            }
            _ => {}
        }
    }

    debug!(
        columns = system.num_cols(),
        equalities = system.a_eq.len(),
        inequalities = system.a_ub.len(),
        "translation complete"
    );
    Ok(Some(system))
}

/// Symmetric finite slack bound covering every wrap the row can reach.
fn slack_bound(row: &Row, modulus: i128) -> (f64, f64) {
    let reach: i128 = row
        .coeffs
        .values()
        .map(|&k| (k.unsigned_abs() as i128) * (modulus - 1))
        .sum::<i128>()
        + row.rhs.unsigned_abs() as i128;
    let magnitude = (reach / modulus + 1) as f64;
    (-magnitude, magnitude)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sable_core::expr::ExprNode;

    fn bv(name: &str, w: u32) -> ExprNode {
        ExprNode::bitvec(name, w)
    }

    fn con(v: u64, w: u32) -> ExprNode {
        ExprNode::constant(v, w)
    }

    fn system_for(conjuncts: &[ExprNode]) -> IlpSystem {
        translate(conjuncts).unwrap().expect("not trivially unsat")
    }

    #[test]
    fn test_equality_gets_modulus_slack() {
        // A·7 = 3 over 4 bits → [7, 16]·[A, s] = 3
        let system = system_for(&[bv("A", 4).mul(con(7, 4)).eq(con(3, 4))]);
        assert_eq!(system.num_cols(), 2);
        assert_eq!(system.num_original(), 1);
        assert_eq!(system.a_eq, vec![vec![7.0, 16.0]]);
        assert_eq!(system.b_eq, vec![3.0]);
        assert_eq!(system.bounds[0], (0.0, 15.0));
        // slack must reach the wrap of 7·15 = 105 ≥ 6·16
        assert!(system.bounds[1].0 <= -6.0 && system.bounds[1].1 >= 6.0);
    }

    #[test]
    fn test_inequalities_have_no_slack() {
        let system = system_for(&[
            bv("A", 32).add(bv("B", 32)).le(con(5, 32)),
            bv("A", 32).add(bv("B", 32)).ge(con(2, 32)),
        ]);
        assert_eq!(system.num_cols(), 2);
        assert_eq!(system.a_eq.len(), 0);
        assert_eq!(system.a_ub.len(), 2);
        // ≥ is negated into ≤
        assert_eq!(system.a_ub[1], vec![-1.0, -1.0]);
        assert_eq!(system.b_ub[1], -2.0);
    }

    #[test]
    fn test_strict_inequalities_tighten() {
        let system = system_for(&[
            bv("A", 8).lt(con(5, 8)),
            bv("B", 8).gt(con(7, 8)),
        ]);
        assert_eq!(system.b_ub[0], 4.0);
        assert_eq!(system.b_ub[1], -8.0);
    }

    #[test]
    fn test_unsigned_below_zero_is_empty_region() {
        // A < 0 tightens to A ≤ -1, unreachable for A ≥ 0
        let system = system_for(&[bv("A", 8).lt(con(0, 8))]);
        assert_eq!(system.b_ub[0], -1.0);
        assert!(!system.satisfied_by(&[0]));
    }

    #[test]
    fn test_columns_follow_first_occurrence() {
        let system = system_for(&[
            bv("B", 8).add(bv("A", 8)).le(con(5, 8)),
            bv("C", 8).le(con(5, 8)),
        ]);
        assert_eq!(system.columns, vec!["B", "A", "C"]);
    }

    #[test]
    fn test_width_conflict_across_conjuncts() {
        let result = translate(&[
            bv("A", 4).le(con(1, 4)),
            bv("A", 8).le(con(1, 8)),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_trivially_false_constant_relation() {
        // 0 = 1 after normalization
        let result = translate(&[con(0, 4).eq(con(1, 4))]).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_trivially_true_constant_relation_is_dropped() {
        let system = system_for(&[
            con(1, 4).le(con(3, 4)),
            bv("A", 4).le(con(2, 4)),
        ]);
        assert_eq!(system.a_ub.len(), 1);
    }

    #[test]
    fn test_satisfied_by_checks_rows_and_bounds() {
        let system = system_for(&[bv("A", 4).mul(con(7, 4)).eq(con(3, 4))]);
        // 7·5 + 16·(-2) = 3
        assert!(system.satisfied_by(&[5, -2]));
        assert!(!system.satisfied_by(&[9, -2]));
        assert!(!system.satisfied_by(&[16, 0]));
    }
}
