//! Order model
//!
//! The storefront order as the sync engine sees it: billing identity,
//! line items, totals, the CRM external identifiers, and the sync fields
//! with their bookkeeping state.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::sync::SyncState;

/// Local order lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrderStatus {
    #[default]
    Pending,
    OnHold,
    Completed,
    Cancelled,
    Refunded,
}

impl OrderStatus {
    /// Wire/display name, matching the serde representation
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::OnHold => "on-hold",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Refunded => "refunded",
        }
    }
}

/// Order line item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    /// Product reference as supplied by the CRM (id or SKU)
    pub product_id: String,
    /// Resolved display name (payload description overrides catalog name)
    pub name: String,
    pub quantity: u32,
    /// Unit price in currency units
    pub unit_price: Decimal,
    /// quantity * unit_price
    pub line_total: Decimal,
    /// Fulfillment-side product reference, propagated per purchased product
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fulfillment_product_id: Option<String>,
}

/// Order entity
///
/// Owned by the order store; the sync engine reads and mutates the named
/// sync fields and the `sync` bookkeeping, nothing else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    /// Human-facing order number
    pub order_number: String,
    pub status: OrderStatus,

    // Billing identity (guest orders; the CRM is the customer system)
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub company: String,
    pub country: String,
    pub currency: String,
    pub payment_method: String,

    pub lines: Vec<OrderLine>,
    /// Computed order total in currency units
    pub total: Decimal,

    // External identity: both non-empty marks this as a CRM-originated order
    #[serde(default)]
    pub invoice_id: String,
    #[serde(default)]
    pub member_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub organization_id: String,

    // Sync fields (empty string = unset)
    #[serde(default)]
    pub customer_number: String,
    #[serde(default)]
    pub invoice_number: String,
    #[serde(default)]
    pub kid_number: String,
    #[serde(default)]
    pub status_field: String,

    // Payment bookkeeping
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_paid: Option<Decimal>,

    #[serde(default)]
    pub sync: SyncState,

    pub created_at: i64,
    pub updated_at: i64,
}

impl Order {
    /// A fresh guest order with defaults for everything the ingest path
    /// fills in afterwards
    pub fn new(id: i64, order_number: impl Into<String>, now: i64) -> Self {
        Self {
            id,
            order_number: order_number.into(),
            status: OrderStatus::Pending,
            email: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            company: String::new(),
            country: "NO".to_string(),
            currency: "NOK".to_string(),
            payment_method: "bank-transfer".to_string(),
            lines: Vec::new(),
            total: Decimal::ZERO,
            invoice_id: String::new(),
            member_id: String::new(),
            organization_id: String::new(),
            customer_number: String::new(),
            invoice_number: String::new(),
            kid_number: String::new(),
            status_field: String::new(),
            paid_at: None,
            amount_paid: None,
            sync: SyncState::default(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_paid(&self) -> bool {
        self.paid_at.is_some()
    }

    /// Recompute `total` from the line items
    pub fn recalculate_total(&mut self) {
        self.total = self.lines.iter().map(|l| l.line_total).sum();
    }
}
