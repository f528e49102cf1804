//! Unified error types for the SABLE ecosystem
//!
//! This module provides a common error type [`SableError`] that can represent
//! errors from any part of the system. Domain-specific error types (such as
//! [`ExprError`]) convert into `SableError` for uniform handling at API
//! boundaries.
//!
//! # Example
//!
//! ```ignore
//! use sable_core::{SableError, SableResult};
//!
//! fn decide(path: &str) -> SableResult<()> {
//!     let formula = load_formula(path)?;
//!     solve(&formula)?;
//!     Ok(())
//! }
//! ```

use crate::expr::ExprError;
use thiserror::Error;

/// Unified error type for all SABLE operations.
///
/// Allows errors from I/O, parsing, expression rewriting, and solving to be
/// handled uniformly.
#[derive(Error, Debug)]
pub enum SableError {
    /// I/O errors (file access, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Parsing errors (DIMACS, constraint files)
    #[error("Parse error: {0}")]
    Parse(String),

    /// Expression rewriting and extraction errors
    #[error(transparent)]
    Expr(#[from] ExprError),

    /// Solver/algorithm errors
    #[error("Solver error: {0}")]
    Solver(String),

    /// Generic errors (for wrapping external errors)
    #[error("{0}")]
    Other(String),
}

/// Convenience type alias for Results using SableError.
pub type SableResult<T> = Result<T, SableError>;

// Conversion from anyhow::Error
impl From<anyhow::Error> for SableError {
    fn from(err: anyhow::Error) -> Self {
        SableError::Other(err.to_string())
    }
}

// Conversion from string-like types for convenience
impl From<String> for SableError {
    fn from(s: String) -> Self {
        SableError::Other(s)
    }
}

impl From<&str> for SableError {
    fn from(s: &str) -> Self {
        SableError::Other(s.to_string())
    }
}
