//! Convenience result type alias for Inkpress.

use crate::error::AppError;

/// A specialized `Result` type for Inkpress operations.
pub type AppResult<T> = Result<T, AppError>;
