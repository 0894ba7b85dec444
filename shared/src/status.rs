//! Status mapping tables
//!
//! Pure, total mapping functions between the CRM's invoice status
//! vocabulary, the local order status, and the webhook status vocabulary.
//! No side effects; unmapped webhook values are an explicit omit signal.

use crate::models::OrderStatus;

/// Map a CRM invoice status onto the local order status.
///
/// Unknown values fall back to `Pending` rather than erroring; the CRM
/// occasionally grows new draft-like states and a stalled order is safer
/// than a rejected invoice.
pub fn order_status_from_external(external: &str) -> OrderStatus {
    match external {
        "draft" => OrderStatus::Pending,
        "unpaid" => OrderStatus::OnHold,
        "paid" => OrderStatus::Completed,
        "cancelled" => OrderStatus::Cancelled,
        "refunded" => OrderStatus::Refunded,
        _ => OrderStatus::Pending,
    }
}

/// Map a fulfillment status-field value onto the webhook status vocabulary.
///
/// Values are normalized (trim + lowercase) before lookup. `None` means
/// the webhook payload must omit its `status` key entirely; the receiver
/// treats a guessed status as worse than no status.
pub fn webhook_status(status_field: &str) -> Option<&'static str> {
    match status_field.trim().to_ascii_lowercase().as_str() {
        "order" => Some("pending"),
        "transferred" => Some("transferred"),
        "invoice" => Some("unpaid"),
        _ => None,
    }
}
