//! Engine error type.
//!
//! The running engine maps routine exceptional conditions (unknown IDs,
//! isolated sends, unreachable forwards) to inert observable outcomes, so
//! the error surface is construction-time configuration problems only.

use thiserror::Error;

/// The top-level error type for the `foors-*` crates.
#[derive(Debug, Error)]
pub enum FoorsError {
    #[error("configuration error: {0}")]
    Config(String),
}

/// Shorthand result type for all `foors-*` crates.
pub type FoorsResult<T> = Result<T, FoorsError>;
