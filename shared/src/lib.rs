//! Shared types for the invoice sync bridge
//!
//! Domain models, the unified error system, pure status mapping tables,
//! and small utilities used by the sync server and its tests.

pub mod error;
pub mod models;
pub mod status;
pub mod util;

// Re-exports
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
pub use models::{Order, OrderStatus, SyncField, SyncState, SyncStatus};
