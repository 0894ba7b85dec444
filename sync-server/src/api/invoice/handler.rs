//! Invoice ingest handler

use axum::{extract::State, Json};

use shared::error::AppResult;
use shared::models::{IngestResponse, InvoicePayload};

use crate::core::ServerState;

/// POST /api/invoice - create or update an order from a CRM invoice
///
/// Ingest is inbound-only: the CRM already holds these values, so no
/// outbound notification is triggered here (the seeded markers make any
/// later save sweep a no-op for them).
pub async fn ingest(
    State(state): State<ServerState>,
    Json(payload): Json<InvoicePayload>,
) -> AppResult<Json<IngestResponse>> {
    tracing::info!(invoice_id = %payload.invoice_id, "Invoice received");

    let outcome = state.ingest.ingest(&payload)?;

    let message = if outcome.created {
        "Order created from digital invoice"
    } else {
        "Order updated from digital invoice"
    };

    Ok(Json(IngestResponse {
        success: true,
        order_id: outcome.order.id,
        order_number: outcome.order.order_number.clone(),
        order_status: outcome.order.status.as_str().to_string(),
        invoice_id: outcome.order.invoice_id.clone(),
        message: message.to_string(),
        warnings: outcome.warnings,
    }))
}
