//! # sable-sat: Tseitin Encoding and CDCL Satisfiability
//!
//! Decides satisfiability of propositional formulas. The pipeline is
//!
//! ```text
//! PropNode ──tseitin──▶ CNF ──cdcl──▶ model ──match map──▶ name → bool
//! ```
//!
//! - [`tseitin`] converts a formula tree into equisatisfiable CNF over fresh
//!   auxiliary variables and keeps the projection map back to the original
//!   names.
//! - [`cdcl`] decides CNF with unit propagation, an implication graph,
//!   1-UIP-style conflict analysis, clause learning and non-chronological
//!   backtracking.
//! - [`PropSolver`] ties the two together behind a one-call facade.
//!
//! ## Example
//!
//! ```rust
//! use sable_core::prop::PropNode;
//! use sable_sat::{PropSolver, SatOutcome};
//!
//! // ¬(a ∧ b) is satisfiable
//! let formula = PropNode::var("a").and(PropNode::var("b")).not();
//! let outcome = PropSolver::new().submit(&formula);
//! assert!(outcome.is_sat());
//! ```
//!
//! The engine is single-threaded, synchronous and deterministic; see the
//! module docs of [`cdcl`] for the tie-break policy.

pub mod cdcl;
pub mod solver;
pub mod tseitin;

pub use cdcl::{CdclSolver, SatResult};
pub use solver::{PropSolver, SatOutcome};
pub use tseitin::{encode, Encoding};
