//! Invoice ingest
//!
//! Turns an inbound CRM invoice payload into a storefront order, idempotent
//! by external invoice id. Re-ingesting replaces the line items wholesale;
//! per-line resolution failures are collected as warnings, never fatal.

use std::sync::Arc;

use rust_decimal::Decimal;

use shared::error::{AppError, AppResult};
use shared::models::{InvoicePayload, Order, OrderLine, SyncField};
use shared::status::order_status_from_external;
use shared::util::{now_millis, snowflake_id};

use crate::catalog::ProductCatalog;
use crate::store::OrderStore;

/// Tolerated difference between the CRM's expected total and the computed
/// total, in currency units
const TOTAL_EPSILON: Decimal = Decimal::from_parts(1, 0, 0, false, 2); // 0.01

/// Result of a successful ingest
#[derive(Debug, Clone)]
pub struct IngestOutcome {
    pub order: Order,
    pub created: bool,
    pub warnings: Vec<String>,
}

pub struct IngestService {
    store: Arc<dyn OrderStore>,
    catalog: Arc<dyn ProductCatalog>,
}

impl IngestService {
    pub fn new(store: Arc<dyn OrderStore>, catalog: Arc<dyn ProductCatalog>) -> Self {
        Self { store, catalog }
    }

    /// Create or update an order from an invoice payload.
    ///
    /// Rejects the whole payload when a required field is missing; there is
    /// no partial processing. Marker seeding: values the CRM itself sent
    /// (customer number) are marked synced immediately, the CRM is their
    /// source of truth and needs no echo.
    pub fn ingest(&self, payload: &InvoicePayload) -> AppResult<IngestOutcome> {
        if payload.invoice_id.is_empty() {
            return Err(AppError::required_field("invoiceId"));
        }
        if payload.email.is_empty() {
            return Err(AppError::required_field("email"));
        }
        if payload.invoice_lines.is_empty() {
            return Err(AppError::validation(
                "invoiceLines must be a non-empty array",
            ));
        }

        let existing = self.store.find_by_invoice_id(&payload.invoice_id);
        let mut warnings = Vec::new();

        let (order, created) = match existing {
            Some(found) => {
                tracing::info!(
                    order_id = found.id,
                    invoice_id = %payload.invoice_id,
                    "Order found, updating"
                );
                let updated = self.store.update(found.id, &mut |order| {
                    warnings = self.apply_payload(order, payload);
                })?;
                (updated, false)
            }
            None => {
                let mut order =
                    Order::new(snowflake_id(), self.store.next_order_number(), now_millis());
                warnings = self.apply_payload(&mut order, payload);
                tracing::info!(
                    order_id = order.id,
                    invoice_id = %payload.invoice_id,
                    "Order created"
                );
                self.store.insert(order.clone());
                (order, true)
            }
        };

        Ok(IngestOutcome {
            order,
            created,
            warnings,
        })
    }

    /// Write every payload-derived attribute onto the order.
    ///
    /// Shared by the create and update paths so re-ingest is a pure
    /// overwrite of the same attribute set.
    fn apply_payload(&self, order: &mut Order, payload: &InvoicePayload) -> Vec<String> {
        // Billing identity: organization name wins over member name
        let billing_name = payload
            .organization_name
            .as_deref()
            .filter(|n| !n.is_empty())
            .or(payload.member_name.as_deref())
            .unwrap_or("");
        let (first, last) = split_name(billing_name);
        order.email = payload.email.clone();
        order.first_name = first.to_string();
        order.last_name = last.to_string();
        order.company = payload
            .organization_name
            .clone()
            .unwrap_or_default();
        order.country = payload
            .country_id
            .as_deref()
            .filter(|c| !c.is_empty())
            .map(str::to_uppercase)
            .unwrap_or_else(|| "NO".to_string());
        order.currency = payload
            .currency
            .clone()
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| "NOK".to_string());

        // Replace line items wholesale; never merge with previous lines
        order.lines.clear();
        let warnings = self.add_lines(order, payload);
        order.recalculate_total();

        if let Some(expected) = payload.total {
            if total_mismatch(expected, order.total) {
                tracing::warn!(
                    order_id = order.id,
                    expected = %expected,
                    actual = %order.total,
                    diff = %(expected - order.total),
                    "Total mismatch"
                );
            }
        }

        order.status = order_status_from_external(payload.status.as_deref().unwrap_or(""));

        // External identity and sync-field seeds
        order.invoice_id = payload.invoice_id.clone();
        order.member_id = payload.member_id.clone();
        order.organization_id = payload.organization_id.clone();
        if let Some(customer_number) = payload
            .customer_number
            .as_deref()
            .filter(|n| !n.is_empty())
        {
            order.customer_number = customer_number.to_string();
            // The CRM just sent this value; no outbound confirmation needed
            order.sync.set_marker(SyncField::CustomerNumber, customer_number);
        }

        warnings
    }

    fn add_lines(&self, order: &mut Order, payload: &InvoicePayload) -> Vec<String> {
        let mut warnings = Vec::new();

        for line in &payload.invoice_lines {
            let Some(product) = self.catalog.find(&line.product_id) else {
                let reference = if line.product_id.is_empty() {
                    "N/A"
                } else {
                    &line.product_id
                };
                tracing::warn!(product_id = reference, "Product not found");
                warnings.push(format!("Product not found for productId: {}", reference));
                continue;
            };

            let quantity = line.quantity.max(1);
            let unit_price = line.unit_price.unwrap_or(product.price);
            let name = line
                .description
                .clone()
                .filter(|d| !d.is_empty())
                .unwrap_or_else(|| product.name.clone());

            order.lines.push(OrderLine {
                product_id: product.id.clone(),
                name,
                quantity,
                unit_price,
                line_total: unit_price * Decimal::from(quantity),
                fulfillment_product_id: product.fulfillment_product_id.clone(),
            });
        }

        warnings
    }
}

/// Whether the CRM-supplied total disagrees with the computed total beyond
/// the tolerated rounding epsilon. The computed total stays authoritative
/// either way; a mismatch is diagnostic only.
fn total_mismatch(expected: Decimal, actual: Decimal) -> bool {
    (expected - actual).abs() > TOTAL_EPSILON
}

/// Split a full name into first name and the rest
fn split_name(full_name: &str) -> (&str, &str) {
    match full_name.trim().split_once(' ') {
        Some((first, last)) => (first, last),
        None => (full_name.trim(), ""),
    }
}
