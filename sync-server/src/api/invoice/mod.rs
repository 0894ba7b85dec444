//! Invoice ingest API module

mod handler;

use axum::{middleware, routing::post, Router};

use crate::auth::require_api_key;
use crate::core::ServerState;

pub fn router(state: ServerState) -> Router<ServerState> {
    Router::new()
        .route("/api/invoice", post(handler::ingest))
        .layer(middleware::from_fn_with_state(state, require_api_key))
}
