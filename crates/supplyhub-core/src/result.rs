//! Convenience result type alias for SupplyHub.

use crate::error::AppError;

/// A specialized `Result` type for SupplyHub operations.
pub type AppResult<T> = Result<T, AppError>;
