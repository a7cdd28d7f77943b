//! Placement errors.

use thiserror::Error;

/// Errors raised while building, running or persisting a placement.
#[derive(Debug, Error)]
pub enum PlacementError {
    #[error("Template is out of range")]
    OutOfRange,
    #[error("Template has zero size")]
    ZeroSize,
    #[error("Template was rejected while finalizing")]
    FinalizeRejected,
    #[error("Placement was cancelled")]
    Cancelled,
    #[error("Invalid placement variant: {0}")]
    InvalidVariant(String),
    #[error("No active scene")]
    NoScene,
    #[error("Persistence error: {0}")]
    Persistence(String),
    #[error("Settings error: {0}")]
    Settings(String),
}

/// Result type for placement operations.
pub type PlacementResult<T> = Result<T, PlacementError>;

/// A placement session ended without placing anything.
///
/// The rejection reason is only logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Template placement cancelled")]
pub struct Cancelled;
