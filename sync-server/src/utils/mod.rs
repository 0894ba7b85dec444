//! Utility module - error re-exports and logging

pub mod logger;

// Re-export error types from shared so server code has one import path
pub use shared::error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
