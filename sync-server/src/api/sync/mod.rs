//! Sync API module
//!
//! | Path | Method | Description |
//! |------|--------|-------------|
//! | /api/sync | POST | Inbound field sync from the fulfillment system |
//! | /api/sync/orders/{order_id}/resync | POST | Operator-forced full resync |
//! | /api/sync/report | GET | Sync statistics and failed orders |

mod handler;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::auth::require_api_key;
use crate::core::ServerState;

pub fn router(state: ServerState) -> Router<ServerState> {
    Router::new()
        .route("/api/sync", post(handler::sync))
        .route("/api/sync/orders/{order_id}/resync", post(handler::resync))
        .route("/api/sync/report", get(handler::report))
        .layer(middleware::from_fn_with_state(state, require_api_key))
}
