//! Arithmetic expression trees over fixed-width unsigned bit-vectors.
//!
//! An [`ExprNode`] is an immutable tree of variables, constants and operators.
//! Conjuncts handed to the bit-vector solver are comparisons (`=`, `<`, `<=`,
//! `>`, `>=`) whose operands are built from `+`, `-` and variable-by-constant
//! `*`. Before coefficient extraction, each conjunct is put into a normal form
//! by four rewrite passes applied in order:
//!
//! 1. [`equation_skew`](ExprNode::equation_skew) — `L ◇ R` becomes
//!    `(L - R) ◇ 0`, so every variable term sits on the left and the right is
//!    a single constant of the common width.
//! 2. [`distribute_constants`](ExprNode::distribute_constants) — pushes
//!    `c * (a ± b)` down to `(c*a) ± (c*b)` and orients every product as
//!    `(variable, constant)`.
//! 3. [`tree_rotation`](ExprNode::tree_rotation) — left-associates the
//!    additive spine so each monomial is the right child of some `+`/`-`.
//! 4. [`constant_simplify`](ExprNode::constant_simplify) — folds constant
//!    subtrees and migrates constant monomials into the single right-hand
//!    constant.
//!
//! The pipeline is exposed as [`ExprNode::normalize`] and is idempotent. A
//! normalized conjunct has the shape `Σ k_i * v_i ◇ K`;
//! [`coefficients`](ExprNode::coefficients) and
//! [`rhs_constant`](ExprNode::rhs_constant) read the two sides off.
//!
//! Atomic constants reduce mod 2^width when built, but all arithmetic inside
//! normalization is plain integer arithmetic over ℤ — the skew pass
//! introduces subtractions that are relation rewriting, not bit-vector
//! arithmetic, and must not wrap. Equalities recover the modular semantics
//! through the translator's slack columns; inequalities constrain the
//! non-wrapped value. Widths of 1..=32 bits are supported.

use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Errors raised by expression rewriting and extraction.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExprError {
    /// An operator outside the supported set, or a shape the rewrites cannot
    /// handle (e.g. a product of two non-constant terms).
    #[error("unsupported operation: {0}")]
    Unsupported(String),

    /// Arithmetic subtrees disagree on bit width.
    #[error("width mismatch between subexpressions: {0} and {1} bits")]
    WidthMismatch(u32, u32),
}

/// Operator kinds carried by [`ExprNode::Op`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExprOp {
    Add,
    Sub,
    Mul,
    Eq,
    Lt,
    Le,
    Gt,
    Ge,
}

impl ExprOp {
    /// Whether this operator is a comparison (legal only at a conjunct root).
    pub fn is_relation(self) -> bool {
        matches!(self, ExprOp::Eq | ExprOp::Lt | ExprOp::Le | ExprOp::Gt | ExprOp::Ge)
    }

    pub fn symbol(self) -> &'static str {
        match self {
            ExprOp::Add => "+",
            ExprOp::Sub => "-",
            ExprOp::Mul => "*",
            ExprOp::Eq => "=",
            ExprOp::Lt => "<",
            ExprOp::Le => "<=",
            ExprOp::Gt => ">",
            ExprOp::Ge => ">=",
        }
    }
}

/// A node of an arithmetic expression tree.
///
/// Constants built through [`ExprNode::constant`] are reduced mod 2^width;
/// constants produced during normalization live in ℤ and may be negative.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ExprNode {
    Variable { name: String, width: u32 },
    Constant { value: i64, width: u32 },
    Op { op: ExprOp, children: Vec<ExprNode> },
}

fn mask(value: i64, width: u32) -> i64 {
    let m = (1i128 << width) - 1;
    ((value as i128) & m) as i64
}

/// Plain integer arithmetic on folded constants, guarded against overflow.
fn checked(value: i128) -> Result<i64, ExprError> {
    i64::try_from(value)
        .map_err(|_| ExprError::Unsupported(format!("constant {value} overflows 64 bits")))
}

fn binary(op: ExprOp, left: ExprNode, right: ExprNode) -> ExprNode {
    ExprNode::Op {
        op,
        children: vec![left, right],
    }
}

impl ExprNode {
    /// A bit-vector variable of the given width.
    pub fn bitvec(name: impl Into<String>, width: u32) -> Self {
        ExprNode::Variable {
            name: name.into(),
            width,
        }
    }

    /// A bit-vector constant, reduced mod 2^width.
    pub fn constant(value: u64, width: u32) -> Self {
        ExprNode::Constant {
            value: mask(value as i64, width),
            width,
        }
    }

    pub fn add(self, rhs: ExprNode) -> Self {
        binary(ExprOp::Add, self, rhs)
    }

    pub fn sub(self, rhs: ExprNode) -> Self {
        binary(ExprOp::Sub, self, rhs)
    }

    pub fn mul(self, rhs: ExprNode) -> Self {
        binary(ExprOp::Mul, self, rhs)
    }

    pub fn eq(self, rhs: ExprNode) -> Self {
        binary(ExprOp::Eq, self, rhs)
    }

    pub fn lt(self, rhs: ExprNode) -> Self {
        binary(ExprOp::Lt, self, rhs)
    }

    pub fn le(self, rhs: ExprNode) -> Self {
        binary(ExprOp::Le, self, rhs)
    }

    pub fn gt(self, rhs: ExprNode) -> Self {
        binary(ExprOp::Gt, self, rhs)
    }

    pub fn ge(self, rhs: ExprNode) -> Self {
        binary(ExprOp::Ge, self, rhs)
    }

    /// The common bit width of this subtree.
    ///
    /// Errors with [`ExprError::WidthMismatch`] when two children disagree.
    pub fn width(&self) -> Result<u32, ExprError> {
        match self {
            ExprNode::Variable { width, .. } | ExprNode::Constant { width, .. } => Ok(*width),
            ExprNode::Op { children, .. } => {
                let mut found = None;
                for child in children {
                    let w = child.width()?;
                    match found {
                        None => found = Some(w),
                        Some(prev) if prev != w => return Err(ExprError::WidthMismatch(prev, w)),
                        Some(_) => {}
                    }
                }
                found.ok_or_else(|| ExprError::Unsupported("operator with no operands".into()))
            }
        }
    }

    /// Destructure a conjunct root into `(relation, lhs, rhs)`.
    pub fn relation(&self) -> Result<(ExprOp, &ExprNode, &ExprNode), ExprError> {
        match self {
            ExprNode::Op { op, children } if op.is_relation() && children.len() == 2 => {
                Ok((*op, &children[0], &children[1]))
            }
            other => Err(ExprError::Unsupported(format!(
                "conjunct root is not a comparison: {other}"
            ))),
        }
    }

    /// Every variable reachable from this node, in first-occurrence order.
    pub fn variables(&self) -> Vec<(String, u32)> {
        fn walk(node: &ExprNode, out: &mut Vec<(String, u32)>) {
            match node {
                ExprNode::Variable { name, width } => {
                    if !out.iter().any(|(n, _)| n == name) {
                        out.push((name.clone(), *width));
                    }
                }
                ExprNode::Constant { .. } => {}
                ExprNode::Op { children, .. } => {
                    for child in children {
                        walk(child, out);
                    }
                }
            }
        }
        let mut out = Vec::new();
        walk(self, &mut out);
        out
    }

    /// Pass 1: rewrite `L ◇ R` as `(L - R) ◇ 0`.
    ///
    /// Verifies that the root is a comparison and that both sides agree on
    /// width.
    pub fn equation_skew(&self) -> Result<ExprNode, ExprError> {
        let (op, lhs, rhs) = self.relation()?;
        let width = self.width()?;
        Ok(binary(
            op,
            binary(ExprOp::Sub, lhs.clone(), rhs.clone()),
            ExprNode::Constant { value: 0, width },
        ))
    }

    /// Pass 2: push constant multipliers through `+`/`-` until every product
    /// is `(variable, constant)`.
    pub fn distribute_constants(&self) -> Result<ExprNode, ExprError> {
        match self {
            ExprNode::Variable { .. } | ExprNode::Constant { .. } => Ok(self.clone()),
            ExprNode::Op { op: ExprOp::Mul, children } if children.len() == 2 => {
                let left = children[0].distribute_constants()?;
                let right = children[1].distribute_constants()?;
                distribute_mul(left, right)
            }
            ExprNode::Op { op, children } => {
                let children = children
                    .iter()
                    .map(|c| c.distribute_constants())
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(ExprNode::Op { op: *op, children })
            }
        }
    }

    /// Pass 3: left-associate the additive spine.
    ///
    /// `a + (b + c)` becomes `(a + b) + c`; subtraction flips the sign of the
    /// hoisted operator, e.g. `a - (b - c)` becomes `(a - b) + c`. After this
    /// pass the right child of every `+`/`-` is a monomial.
    pub fn tree_rotation(&self) -> ExprNode {
        match self {
            ExprNode::Op { op, children }
                if matches!(op, ExprOp::Add | ExprOp::Sub) && children.len() == 2 =>
            {
                let left = children[0].tree_rotation();
                let right = children[1].tree_rotation();
                if let ExprNode::Op { op: inner, children: rc } = &right {
                    if matches!(inner, ExprOp::Add | ExprOp::Sub) && rc.len() == 2 {
                        let hoisted = if *op == ExprOp::Sub {
                            match inner {
                                ExprOp::Add => ExprOp::Sub,
                                _ => ExprOp::Add,
                            }
                        } else {
                            *inner
                        };
                        let joined = binary(*op, left, rc[0].clone());
                        return binary(hoisted, joined, rc[1].clone()).tree_rotation();
                    }
                }
                binary(*op, left, right)
            }
            ExprNode::Op { op, children } => ExprNode::Op {
                op: *op,
                children: children.iter().map(|c| c.tree_rotation()).collect(),
            },
            leaf => leaf.clone(),
        }
    }

    /// Pass 4: fold constant subtrees and merge the right-hand side into one
    /// constant per relation.
    ///
    /// All arithmetic here is plain integer arithmetic; the migrated
    /// right-hand constant may be negative (equalities recover wrap through
    /// the slack column, inequalities constrain the non-wrapped value).
    pub fn constant_simplify(&self) -> Result<ExprNode, ExprError> {
        let (op, lhs, rhs) = self.relation()?;
        let width = self.width()?;
        let lhs = fold(lhs)?;
        let rhs = fold(rhs)?;
        let ExprNode::Constant { value: rhs0, .. } = rhs else {
            return Err(ExprError::Unsupported(
                "right-hand side did not fold to a constant".into(),
            ));
        };

        let mut terms = Vec::new();
        collect_terms(&lhs, false, &mut terms);

        let mut rhs_value = rhs0 as i128;
        let mut spine = Vec::new();
        for (negated, term) in terms {
            match term {
                ExprNode::Constant { value, .. } => {
                    // moving s·c across the relation subtracts it from both sides
                    rhs_value -= if negated { -(value as i128) } else { value as i128 };
                }
                other => spine.push((negated, other)),
            }
        }

        Ok(binary(
            op,
            rebuild_spine(spine, width),
            ExprNode::Constant {
                value: checked(rhs_value)?,
                width,
            },
        ))
    }

    /// The full four-pass normalization pipeline.
    pub fn normalize(&self) -> Result<ExprNode, ExprError> {
        self.equation_skew()?
            .distribute_constants()?
            .tree_rotation()
            .constant_simplify()
    }

    /// Coefficient extraction on a normalized conjunct: `Σ k_i * v_i ◇ K`
    /// yields `{v_i: k_i}`.
    pub fn coefficients(&self) -> Result<HashMap<String, i64>, ExprError> {
        let (_, lhs, _) = self.relation()?;
        let mut out = HashMap::new();
        coeff_walk(lhs, 1, &mut out)?;
        Ok(out)
    }

    /// The folded right-hand constant of a normalized conjunct.
    pub fn rhs_constant(&self) -> Result<i64, ExprError> {
        let (_, _, rhs) = self.relation()?;
        match rhs {
            ExprNode::Constant { value, .. } => Ok(*value),
            other => Err(ExprError::Unsupported(format!(
                "unsimplified right-hand side: {other}"
            ))),
        }
    }
}

/// Distribute an already-distributed product `left * right`.
fn distribute_mul(left: ExprNode, right: ExprNode) -> Result<ExprNode, ExprError> {
    match (left, right) {
        (
            ExprNode::Constant { value: a, width },
            ExprNode::Constant { value: b, .. },
        ) => Ok(ExprNode::Constant {
            value: checked(a as i128 * b as i128)?,
            width,
        }),
        // orient the constant to the right
        (constant @ ExprNode::Constant { .. }, other) => distribute_mul(other, constant),
        (other, ExprNode::Constant { value, width }) => match other {
            var @ ExprNode::Variable { .. } => {
                Ok(binary(ExprOp::Mul, var, ExprNode::Constant { value, width }))
            }
            ExprNode::Op { op, children }
                if matches!(op, ExprOp::Add | ExprOp::Sub) && children.len() == 2 =>
            {
                // c * (a ± b) → (c*a) ± (c*b)
                Ok(binary(
                    op,
                    distribute_mul(children[0].clone(), ExprNode::Constant { value, width })?,
                    distribute_mul(children[1].clone(), ExprNode::Constant { value, width })?,
                ))
            }
            ExprNode::Op { op: ExprOp::Mul, children } => match children.as_slice() {
                // (v * c2) * c → v * (c2·c)
                [var @ ExprNode::Variable { .. }, ExprNode::Constant { value: inner, .. }] => {
                    Ok(binary(
                        ExprOp::Mul,
                        var.clone(),
                        ExprNode::Constant {
                            value: checked(*inner as i128 * value as i128)?,
                            width,
                        },
                    ))
                }
                _ => Err(ExprError::Unsupported(
                    "nested product is not variable-by-constant".into(),
                )),
            },
            other => Err(ExprError::Unsupported(format!(
                "cannot distribute a constant over {other}"
            ))),
        },
        _ => Err(ExprError::Unsupported(
            "multiplication of two non-constant terms".into(),
        )),
    }
}

/// Fold purely-constant `+`/`-`/`*` subtrees into single constants (plain
/// integer arithmetic) and strip multiplicative/additive units.
fn fold(node: &ExprNode) -> Result<ExprNode, ExprError> {
    match node {
        ExprNode::Op { op, children }
            if matches!(op, ExprOp::Add | ExprOp::Sub | ExprOp::Mul) && children.len() == 2 =>
        {
            let a = fold(&children[0])?;
            let b = fold(&children[1])?;
            let folded = match (op, &a, &b) {
                (
                    _,
                    ExprNode::Constant { value: x, width },
                    ExprNode::Constant { value: y, .. },
                ) => {
                    let value = match op {
                        ExprOp::Add => checked(*x as i128 + *y as i128)?,
                        ExprOp::Sub => checked(*x as i128 - *y as i128)?,
                        _ => checked(*x as i128 * *y as i128)?,
                    };
                    ExprNode::Constant {
                        value,
                        width: *width,
                    }
                }
                (ExprOp::Mul, ExprNode::Constant { value: 0, width }, _)
                | (ExprOp::Mul, _, ExprNode::Constant { value: 0, width }) => {
                    ExprNode::Constant {
                        value: 0,
                        width: *width,
                    }
                }
                (ExprOp::Mul, _, ExprNode::Constant { value: 1, .. }) => a,
                (ExprOp::Mul, ExprNode::Constant { value: 1, .. }, _) => b,
                (ExprOp::Add, _, ExprNode::Constant { value: 0, .. }) => a,
                (ExprOp::Add, ExprNode::Constant { value: 0, .. }, _) => b,
                (ExprOp::Sub, _, ExprNode::Constant { value: 0, .. }) => a,
                _ => binary(*op, a, b),
            };
            Ok(folded)
        }
        other => Ok(other.clone()),
    }
}

/// Flatten an additive tree into signed monomials, in left-to-right order.
fn collect_terms(node: &ExprNode, negated: bool, out: &mut Vec<(bool, ExprNode)>) {
    match node {
        ExprNode::Op { op: ExprOp::Add, children } if children.len() == 2 => {
            collect_terms(&children[0], negated, out);
            collect_terms(&children[1], negated, out);
        }
        ExprNode::Op { op: ExprOp::Sub, children } if children.len() == 2 => {
            collect_terms(&children[0], negated, out);
            collect_terms(&children[1], !negated, out);
        }
        other => out.push((negated, other.clone())),
    }
}

/// Rebuild a left-associated spine from signed monomials. An empty term list
/// becomes the zero constant; a leading negative term is anchored on zero so
/// the spine needs no unary negation.
fn rebuild_spine(terms: Vec<(bool, ExprNode)>, width: u32) -> ExprNode {
    let mut iter = terms.into_iter();
    let Some((first_negated, first)) = iter.next() else {
        return ExprNode::Constant { value: 0, width };
    };
    let mut spine = if first_negated {
        binary(ExprOp::Sub, ExprNode::Constant { value: 0, width }, first)
    } else {
        first
    };
    for (negated, term) in iter {
        let op = if negated { ExprOp::Sub } else { ExprOp::Add };
        spine = binary(op, spine, term);
    }
    spine
}

fn coeff_walk(
    node: &ExprNode,
    sign: i64,
    out: &mut HashMap<String, i64>,
) -> Result<(), ExprError> {
    match node {
        ExprNode::Variable { name, .. } => {
            *out.entry(name.clone()).or_insert(0) += sign;
            Ok(())
        }
        ExprNode::Constant { .. } => Ok(()),
        ExprNode::Op { op: ExprOp::Mul, children } => match children.as_slice() {
            [ExprNode::Variable { name, .. }, ExprNode::Constant { value, .. }] => {
                *out.entry(name.clone()).or_insert(0) += sign * value;
                Ok(())
            }
            _ => Err(ExprError::Unsupported(
                "product is not variable-by-constant".into(),
            )),
        },
        ExprNode::Op { op: ExprOp::Add, children } if children.len() == 2 => {
            coeff_walk(&children[0], sign, out)?;
            coeff_walk(&children[1], sign, out)
        }
        ExprNode::Op { op: ExprOp::Sub, children } if children.len() == 2 => {
            coeff_walk(&children[0], sign, out)?;
            coeff_walk(&children[1], -sign, out)
        }
        ExprNode::Op { op, .. } => Err(ExprError::Unsupported(format!(
            "{} inside additive spine",
            op.symbol()
        ))),
    }
}

impl fmt::Display for ExprNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExprNode::Variable { name, .. } => write!(f, "{name}"),
            ExprNode::Constant { value, .. } => write!(f, "{value}"),
            ExprNode::Op { op, children } => {
                write!(f, "(")?;
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        write!(f, " {} ", op.symbol())?;
                    }
                    write!(f, "{child}")?;
                }
                write!(f, ")")
            }
        }
    }
}
