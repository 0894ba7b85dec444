//! Sync API handlers

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;

use shared::error::{AppError, AppResult};
use shared::models::{SyncRequest, SyncResponse, SyncField, SyncStatus};
use shared::status::order_status_from_external;
use shared::util::now_millis;

use crate::core::ServerState;
use crate::sync::ResyncReport;

/// Orders failing at least this often show up in the report's
/// high-error section
const HIGH_ERROR_THRESHOLD: u32 = 3;

/// POST /api/sync - apply field updates pushed by the fulfillment system
///
/// Applies the requested fields in one store write, then drives the
/// matching reconciliation trigger. A webhook failure is recorded on the
/// order but never fails this request; the fulfillment system's push
/// succeeded regardless of what the CRM does next.
pub async fn sync(
    State(state): State<ServerState>,
    Json(request): Json<SyncRequest>,
) -> AppResult<Json<SyncResponse>> {
    if request.invoice_id.is_empty() {
        return Err(AppError::required_field("invoiceId"));
    }

    let order = state
        .store
        .find_by_invoice_id(&request.invoice_id)
        .ok_or_else(|| {
            AppError::not_found(format!("Order for invoiceId {}", request.invoice_id))
        })?;
    let order_id = order.id;

    let mut updated: Vec<String> = Vec::new();
    let mut completion = false;

    state.store.update(order_id, &mut |order| {
        if request.update_customer_number {
            if let Some(value) = request.customer_number.as_deref().filter(|v| !v.is_empty()) {
                order.customer_number = value.to_string();
                updated.push("pogCustomerNumber".to_string());
            }
        }
        if let Some(kid) = request.kid_number.as_deref().filter(|v| !v.is_empty()) {
            order.kid_number = kid.to_string();
            updated.push("kid".to_string());
        }
        if let Some(number) = request.invoice_number.as_deref().filter(|v| !v.is_empty()) {
            order.invoice_number = number.to_string();
            updated.push("pogInvoiceNumber".to_string());
        }
        if let Some(status_field) = request.status_field.as_deref().filter(|v| !v.is_empty()) {
            order.status_field = status_field.to_string();
            updated.push("pogStatus".to_string());
        }
        if request.update_invoice_status {
            if let Some(status) = request.status.as_deref().filter(|v| !v.is_empty()) {
                order.status = order_status_from_external(status);
                if status == "paid" && !order.is_paid() {
                    order.paid_at = Some(now_millis());
                    order.amount_paid = request.amount_paid.or(Some(order.total));
                    completion = true;
                }
                updated.push("status".to_string());
            }
        }
    })?;

    tracing::info!(
        order_id,
        invoice_id = %request.invoice_id,
        updated = ?updated,
        "Fulfillment sync applied"
    );

    // One trigger per logical operation: the completion hook replaces the
    // generic sweep for a paid transition, and a lone customer-number
    // change takes the direct-update path
    let outcome = if completion {
        state.orchestrator.status_completed(order_id).await
    } else if updated == ["pogCustomerNumber"] {
        state
            .orchestrator
            .field_updated(order_id, SyncField::CustomerNumber)
            .await
    } else if !updated.is_empty() {
        state.orchestrator.order_saved(order_id).await
    } else {
        Ok(())
    };

    if let Err(err) = outcome {
        tracing::warn!(order_id, "Outbound sync failed: {}", err.message);
    }

    Ok(Json(SyncResponse {
        success: true,
        order_id,
        updated,
    }))
}

/// POST /api/sync/orders/{order_id}/resync - operator-forced resync
///
/// Always 200; the body's success flag carries the aggregate outcome.
pub async fn resync(
    State(state): State<ServerState>,
    Path(order_id): Path<i64>,
) -> Json<ResyncReport> {
    Json(state.orchestrator.force_resync(order_id).await)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    pub stats: SyncStats,
    pub failed: Vec<SyncReportEntry>,
    pub high_error: Vec<SyncReportEntry>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncStats {
    pub total_orders: usize,
    pub success_count: usize,
    pub failed_count: usize,
    /// Percentage over orders that attempted a sync, one decimal
    pub success_rate: f64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReportEntry {
    pub order_id: i64,
    pub order_number: String,
    pub invoice_id: String,
    pub last_error: Option<String>,
    pub last_attempt_at: Option<i64>,
    pub error_count: u32,
}

/// GET /api/sync/report - sync statistics and problem orders
pub async fn report(State(state): State<ServerState>) -> Json<SyncReport> {
    let orders = state.store.all_syncable();

    let success_count = orders
        .iter()
        .filter(|o| o.sync.status == SyncStatus::Success)
        .count();
    let failed_count = orders
        .iter()
        .filter(|o| o.sync.status == SyncStatus::Failed)
        .count();
    let attempted = success_count + failed_count;
    let success_rate = if attempted > 0 {
        (success_count as f64 / attempted as f64 * 1000.0).round() / 10.0
    } else {
        0.0
    };

    let entry = |order: &shared::models::Order| SyncReportEntry {
        order_id: order.id,
        order_number: order.order_number.clone(),
        invoice_id: order.invoice_id.clone(),
        last_error: order.sync.last_error.clone(),
        last_attempt_at: order.sync.last_attempt_at,
        error_count: order.sync.error_count,
    };

    let failed = orders
        .iter()
        .filter(|o| o.sync.status == SyncStatus::Failed)
        .map(entry)
        .collect();
    let high_error = orders
        .iter()
        .filter(|o| o.sync.error_count >= HIGH_ERROR_THRESHOLD)
        .map(entry)
        .collect();

    Json(SyncReport {
        stats: SyncStats {
            total_orders: orders.len(),
            success_count,
            failed_count,
            success_rate,
        },
        failed,
        high_error,
    })
}
