//! Convenience result type alias for PayWatch.

use crate::error::AppError;

/// A specialized `Result` type for PayWatch operations.
pub type AppResult<T> = Result<T, AppError>;
