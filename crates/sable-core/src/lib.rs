//! # sable-core: Shared Data Model for the SABLE Decision Procedures
//!
//! Provides the data structures both solving pipelines are built on:
//!
//! - [`expr`] — arithmetic expression trees over fixed-width bit-vectors and
//!   the four-pass rewriting pipeline that puts conjuncts into the
//!   `Σ k_i·v_i ◇ K` normal form consumed by the ILP translator.
//! - [`prop`] — propositional formula trees (NOT/AND/OR) consumed by the
//!   Tseitin encoder.
//! - [`cnf`] — literals, clauses and CNF formulas as the CDCL engine sees
//!   them.
//! - [`intern`] — the name ↔ dense-id table shared by the encoder and the
//!   translator.
//! - [`error`] — the unified [`SableError`] for API boundaries.
//!
//! ## Quick Start
//!
//! ```rust
//! use sable_core::expr::ExprNode;
//!
//! // A * 7 = 3 over 4-bit vectors
//! let conjunct = ExprNode::bitvec("A", 4)
//!     .mul(ExprNode::constant(7, 4))
//!     .eq(ExprNode::constant(3, 4));
//!
//! let normalized = conjunct.normalize().unwrap();
//! assert_eq!(normalized.coefficients().unwrap()["A"], 7);
//! assert_eq!(normalized.rhs_constant().unwrap(), 3);
//! ```
//!
//! All structures here are plain values: they are created when a problem is
//! submitted, passed by reference into the engines, and dropped when the
//! solve returns. Nothing is global and nothing outlives a solve call.

pub mod cnf;
pub mod error;
pub mod expr;
pub mod intern;
pub mod prop;

pub use cnf::{Clause, CnfFormula, Lit};
pub use error::{SableError, SableResult};
pub use expr::{ExprError, ExprNode, ExprOp};
pub use intern::VarTable;
pub use prop::{PropNode, PropOp};
