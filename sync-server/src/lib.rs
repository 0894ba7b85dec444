//! Invoice Sync Bridge - CRM/storefront reconciliation server
//!
//! # Architecture Overview
//!
//! The bridge keeps invoice/order state reconciled between the CRM's
//! invoicing backend and the storefront order store:
//!
//! - **Ingest** (`ingest`): inbound invoices become storefront orders,
//!   idempotent by external invoice id
//! - **Reconciliation** (`sync`): field-change detection, outbound webhook
//!   notification, and per-order sync bookkeeping
//! - **Collaborators** (`store`, `catalog`): the order store and product
//!   catalog behind narrow traits
//! - **HTTP API** (`api`): axum routes for the CRM and fulfillment system
//!
//! # Module Structure
//!
//! ```text
//! sync-server/src/
//! ├── core/          # Configuration, state, server
//! ├── auth/          # API-key middleware
//! ├── api/           # HTTP routes and handlers
//! ├── store/         # Order store collaborator
//! ├── catalog/       # Product catalog collaborator
//! ├── ingest/        # Invoice ingest handler
//! ├── sync/          # Reconciliation engine
//! └── utils/         # Logger, error re-exports
//! ```

pub mod api;
pub mod auth;
pub mod catalog;
pub mod core;
pub mod ingest;
pub mod store;
pub mod sync;
pub mod utils;

// Re-export common types
pub use crate::core::{Config, Server, ServerState};
pub use utils::{AppError, AppResult};

// Re-export unified error types from shared
pub use utils::{ApiResponse, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};
