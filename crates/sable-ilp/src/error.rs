//! Error types for the bit-vector pipeline.

use sable_core::expr::ExprError;
use thiserror::Error;

/// Errors that abort a bit-vector solve.
///
/// Infeasibility is never an error: the oracle reports it as
/// [`LpStatus::Infeasible`](crate::oracle::LpStatus) and the solver returns
/// `Unsat`.
#[derive(Debug, Error)]
pub enum IlpError {
    /// Normalization or extraction failed (unsupported shape, mixed widths).
    #[error(transparent)]
    Expr(#[from] ExprError),

    /// The LP oracle failed for a reason other than infeasibility.
    #[error("LP oracle failure: {0}")]
    Oracle(String),
}
