//! API routing
//!
//! # Structure
//!
//! - [`health`] - liveness check (no auth)
//! - [`invoice`] - inbound invoice ingest from the CRM
//! - [`sync`] - inbound field sync, forced resync, reporting

pub mod health;
pub mod invoice;
pub mod sync;

use axum::Router;

use crate::core::ServerState;

/// Assemble the full application router.
///
/// `state` is passed in so the auth middleware can be attached per module;
/// the caller still finishes the router with `.with_state(state)`.
pub fn router(state: ServerState) -> Router<ServerState> {
    Router::new()
        .merge(health::router())
        .merge(invoice::router(state.clone()))
        .merge(sync::router(state))
}
