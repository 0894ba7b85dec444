//! Wire types for the inbound CRM/fulfillment HTTP surface
//!
//! Key names mirror what the CRM and the fulfillment system actually send
//! and expect back; do not rename without coordinating both receivers.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

fn default_quantity() -> u32 {
    1
}

/// One invoice line from the CRM
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceLine {
    pub product_id: String,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    /// Overrides the catalog price when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<Decimal>,
    /// Overrides the catalog product name when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Inbound invoice payload (`POST /api/invoice`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoicePayload {
    #[serde(default)]
    pub invoice_id: String,
    #[serde(default)]
    pub member_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub organization_id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    /// Expected order total; diagnostic only, the computed total wins
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Customer number assigned by the fulfillment system, when known
    #[serde(
        default,
        rename = "pogCustomerNumber",
        skip_serializing_if = "Option::is_none"
    )]
    pub customer_number: Option<String>,
    #[serde(default)]
    pub invoice_lines: Vec<InvoiceLine>,
}

/// Response body for `POST /api/invoice`
///
/// Key names are consumed by the CRM's sync dashboard as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestResponse {
    pub success: bool,
    #[serde(rename = "wooOrderId")]
    pub order_id: i64,
    #[serde(rename = "wooOrderNumber")]
    pub order_number: String,
    #[serde(rename = "wooStatus")]
    pub order_status: String,
    #[serde(rename = "digitalInvoiceId")]
    pub invoice_id: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// Inbound field sync from the fulfillment system (`POST /api/sync`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncRequest {
    #[serde(default)]
    pub invoice_id: String,
    #[serde(default, rename = "updatePogCustomerNumber")]
    pub update_customer_number: bool,
    #[serde(
        default,
        rename = "pogCustomerNumber",
        skip_serializing_if = "Option::is_none"
    )]
    pub customer_number: Option<String>,
    #[serde(default)]
    pub update_invoice_status: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_paid: Option<Decimal>,
    #[serde(default, rename = "kid", skip_serializing_if = "Option::is_none")]
    pub kid_number: Option<String>,
    #[serde(
        default,
        rename = "pogInvoiceNumber",
        skip_serializing_if = "Option::is_none"
    )]
    pub invoice_number: Option<String>,
    /// Fulfillment pipeline status, feeds the webhook status vocabulary
    #[serde(default, rename = "pogStatus", skip_serializing_if = "Option::is_none")]
    pub status_field: Option<String>,
}

/// Response body for `POST /api/sync`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncResponse {
    pub success: bool,
    pub order_id: i64,
    /// Which aspects of the order were actually updated
    pub updated: Vec<String>,
}
