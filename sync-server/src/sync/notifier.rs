//! Outbound CRM notifications
//!
//! Maps changed sync fields to the three CRM webhooks, assembles the
//! payloads, and classifies delivery results. Every network send is
//! bracketed with sync bookkeeping: Pending + attempt stamp before the
//! request, success/failure resolution after. Configuration errors are
//! returned before the bracket and leave the bookkeeping untouched.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use shared::error::{AppError, AppResult};
use shared::models::{Order, OrderStatus};
use shared::status::webhook_status;
use shared::util::now_millis;

use super::state::SyncStateStore;
use super::transport::WebhookTransport;

/// Shared-secret header for the customer and invoice-status endpoints
const API_KEY_HEADER: &str = "X-Api-Key";

/// Injected CRM endpoint configuration, checked at call time.
///
/// The customer endpoint requires both URL and key; the invoice-status
/// endpoint requires the URL only; the payment endpoint is a legacy side
/// channel and entirely optional.
#[derive(Debug, Clone, Default)]
pub struct CrmConfig {
    pub customer_endpoint: Option<String>,
    pub customer_api_key: Option<String>,
    pub invoice_status_endpoint: Option<String>,
    pub invoice_status_api_key: Option<String>,
    pub payment_endpoint: Option<String>,
    pub payment_bearer_token: Option<String>,
}

/// Customer-number webhook body
#[derive(Serialize)]
struct CustomerNumberPayload<'a> {
    #[serde(rename = "invoiceId")]
    invoice_id: &'a str,
    #[serde(rename = "pog_customer_number")]
    customer_number: &'a str,
}

/// Invoice-status webhook body
///
/// `pogInvoiceNumber` is duplicated under the legacy `invoiceNumber` key;
/// older receiver versions only read the alias.
#[derive(Serialize)]
struct InvoiceStatusPayload<'a> {
    #[serde(rename = "invoiceId")]
    invoice_id: &'a str,
    #[serde(rename = "kid", skip_serializing_if = "Option::is_none")]
    kid: Option<&'a str>,
    #[serde(rename = "pogInvoiceNumber", skip_serializing_if = "Option::is_none")]
    invoice_number: Option<&'a str>,
    #[serde(rename = "invoiceNumber", skip_serializing_if = "Option::is_none")]
    invoice_number_alias: Option<&'a str>,
    #[serde(rename = "status", skip_serializing_if = "Option::is_none")]
    status: Option<&'a str>,
}

/// Legacy payment-event webhook body
#[derive(Serialize)]
struct PaymentEventPayload<'a> {
    #[serde(rename = "invoiceId")]
    invoice_id: &'a str,
    #[serde(rename = "memberId")]
    member_id: &'a str,
    status: &'static str,
    #[serde(rename = "amountPaid", with = "rust_decimal::serde::float")]
    amount_paid: rust_decimal::Decimal,
    #[serde(rename = "paidAt", skip_serializing_if = "Option::is_none")]
    paid_at: Option<i64>,
    event: &'static str,
    timestamp: i64,
}

pub struct OutboundNotifier {
    transport: Arc<dyn WebhookTransport>,
    config: CrmConfig,
    sync_state: SyncStateStore,
}

impl OutboundNotifier {
    pub fn new(
        transport: Arc<dyn WebhookTransport>,
        config: CrmConfig,
        sync_state: SyncStateStore,
    ) -> Self {
        Self {
            transport,
            config,
            sync_state,
        }
    }

    /// Send the customer-number webhook.
    ///
    /// Requires both the endpoint URL and the API key; a missing value is
    /// a configuration error surfaced to the caller without touching the
    /// attempt bookkeeping (nothing was attempted, retrying cannot help).
    pub async fn send_customer_number(&self, order: &Order) -> AppResult<()> {
        let url = self
            .config
            .customer_endpoint
            .as_deref()
            .filter(|u| !u.is_empty())
            .ok_or_else(|| {
                tracing::error!(order_id = order.id, "Customer webhook URL not configured");
                AppError::endpoint_not_configured("customer webhook")
            })?;
        let api_key = self
            .config
            .customer_api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                tracing::error!(order_id = order.id, "Customer webhook API key not configured");
                AppError::credential_not_configured("customer webhook")
            })?;

        let payload = serde_json::to_value(CustomerNumberPayload {
            invoice_id: &order.invoice_id,
            customer_number: &order.customer_number,
        })
        .map_err(|e| AppError::internal(format!("Failed to serialize payload: {e}")))?;

        let headers = [(API_KEY_HEADER, api_key.to_string())];
        self.deliver(order, url, &headers, &payload, "customer number")
            .await
    }

    /// Send the invoice-status webhook, batching kid/invoice-number/status.
    ///
    /// Status precedence: a locally completed order is reported as "paid"
    /// no matter what the status field says; completion is the
    /// authoritative payment signal. Unmapped status-field values omit the
    /// status key entirely.
    pub async fn send_invoice_status(&self, order: &Order) -> AppResult<()> {
        let url = self
            .config
            .invoice_status_endpoint
            .as_deref()
            .filter(|u| !u.is_empty())
            .ok_or_else(|| {
                tracing::error!(
                    order_id = order.id,
                    "Invoice status webhook URL not configured"
                );
                AppError::endpoint_not_configured("invoice status webhook")
            })?;

        let status = if order.status == OrderStatus::Completed {
            Some("paid")
        } else if order.status_field.is_empty() {
            None
        } else {
            let mapped = webhook_status(&order.status_field);
            if mapped.is_none() {
                tracing::warn!(
                    order_id = order.id,
                    status_field = %order.status_field,
                    "Unmapped status field value, omitting status from payload"
                );
            }
            mapped
        };

        let kid = Some(order.kid_number.as_str()).filter(|v| !v.is_empty());
        let invoice_number = Some(order.invoice_number.as_str()).filter(|v| !v.is_empty());

        let payload = serde_json::to_value(InvoiceStatusPayload {
            invoice_id: &order.invoice_id,
            kid,
            invoice_number,
            invoice_number_alias: invoice_number,
            status,
        })
        .map_err(|e| AppError::internal(format!("Failed to serialize payload: {e}")))?;

        let mut headers = Vec::new();
        if let Some(key) = self
            .config
            .invoice_status_api_key
            .as_deref()
            .filter(|k| !k.is_empty())
        {
            headers.push((API_KEY_HEADER, key.to_string()));
        }

        self.deliver(order, url, &headers, &payload, "invoice status")
            .await
    }

    /// Send the legacy payment event for a completed order.
    ///
    /// The endpoint is optional; when unconfigured the event is skipped
    /// silently (legacy side channel, not a configuration fault).
    pub async fn send_payment_event(&self, order: &Order) -> AppResult<()> {
        let url = match self
            .config
            .payment_endpoint
            .as_deref()
            .filter(|u| !u.is_empty())
        {
            Some(url) => url,
            None => {
                tracing::debug!(order_id = order.id, "Payment endpoint not configured, skipping");
                return Ok(());
            }
        };

        let payload = serde_json::to_value(PaymentEventPayload {
            invoice_id: &order.invoice_id,
            member_id: &order.member_id,
            status: "paid",
            amount_paid: order.amount_paid.unwrap_or(order.total),
            paid_at: order.paid_at,
            event: "invoice_paid",
            timestamp: now_millis(),
        })
        .map_err(|e| AppError::internal(format!("Failed to serialize payload: {e}")))?;

        let mut headers = Vec::new();
        if let Some(token) = self
            .config
            .payment_bearer_token
            .as_deref()
            .filter(|t| !t.is_empty())
        {
            headers.push(("Authorization", format!("Bearer {token}")));
        }

        self.deliver(order, url, &headers, &payload, "payment event")
            .await
    }

    /// Perform one delivery with full bookkeeping bracketing.
    ///
    /// `event_name` feeds logs and error messages only; routing is fixed
    /// by the caller's endpoint choice.
    async fn deliver(
        &self,
        order: &Order,
        url: &str,
        headers: &[(&'static str, String)],
        payload: &Value,
        event_name: &str,
    ) -> AppResult<()> {
        self.sync_state.begin_attempt(order.id)?;

        match self.transport.post_json(url, headers, payload).await {
            Ok(response) if response.is_success() => {
                self.sync_state.record_success(order.id)?;
                tracing::info!(
                    order_id = order.id,
                    invoice_id = %order.invoice_id,
                    status_code = response.status,
                    "Sent {event_name} webhook"
                );
                Ok(())
            }
            Ok(response) => {
                let err = AppError::webhook_rejected(response.status, response.body);
                self.sync_state.record_failure(order.id, &err.message)?;
                tracing::warn!(
                    order_id = order.id,
                    invoice_id = %order.invoice_id,
                    status_code = response.status,
                    "{event_name} webhook returned non-2xx status"
                );
                Err(err)
            }
            Err(err) => {
                self.sync_state.record_failure(order.id, &err.message)?;
                tracing::error!(
                    order_id = order.id,
                    invoice_id = %order.invoice_id,
                    error = %err.message,
                    "Failed to send {event_name} webhook"
                );
                Err(err)
            }
        }
    }
}
