//! # sable-ilp: Bit-Vector Arithmetic over Integer Linear Programming
//!
//! Decides conjunctions of linear constraints over fixed-width unsigned
//! bit-vectors. The pipeline is
//!
//! ```text
//! ExprNode ──normalize──▶ Σ k_i·v_i ◇ K ──translate──▶ (A, b, bounds)
//!          ──branch & bound over the LP oracle──▶ integer model
//! ```
//!
//! - [`translate`] turns normalized conjuncts into a dense ILP; equalities
//!   get a slack column with coefficient `2^w` that absorbs modular wrap.
//! - [`oracle`] is the seam to the numeric LP kernel: the [`LpOracle`] trait
//!   with a `good_lp`/Clarabel default.
//! - [`branch_bound`] searches for an integer point by LP relaxation plus
//!   bound tightening on fractional columns.
//! - [`BvSolver`] is the accumulate-then-solve facade.
//!
//! ## Example
//!
//! ```rust,no_run
//! use sable_core::expr::ExprNode;
//! use sable_ilp::{BvOutcome, BvSolver};
//!
//! // A·7 = 3 over 4-bit vectors: satisfied by A = 5 since 35 ≡ 3 (mod 16)
//! let mut solver = BvSolver::new();
//! solver.add(
//!     ExprNode::bitvec("A", 4)
//!         .mul(ExprNode::constant(7, 4))
//!         .eq(ExprNode::constant(3, 4)),
//! );
//! match solver.solve().unwrap() {
//!     BvOutcome::Sat(model) => assert_eq!(model["A"] * 7 % 16, 3),
//!     BvOutcome::Unsat => unreachable!(),
//! }
//! ```
//!
//! The search is single-threaded, synchronous and deterministic (column
//! order is first occurrence, branching always takes the first fractional
//! column, down branch before up).

pub mod branch_bound;
pub mod error;
pub mod oracle;
pub mod solver;
pub mod translate;

pub use branch_bound::solve_ilp;
pub use error::IlpError;
pub use oracle::{ClarabelOracle, LpOracle, LpRequest, LpStatus};
pub use solver::{BvOutcome, BvSolver};
pub use translate::{translate, IlpSystem};
