//! Sync field enumeration and per-order sync state

use serde::{Deserialize, Serialize};

use crate::models::order::Order;

/// The fixed set of order attributes eligible for outbound notification.
///
/// Each field carries one "last synced value" marker on the order and maps
/// to exactly one outbound notification kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncField {
    CustomerNumber,
    InvoiceNumber,
    KidNumber,
    StatusField,
}

impl SyncField {
    /// All sync fields, in marker-storage order
    pub const ALL: [SyncField; 4] = [
        SyncField::CustomerNumber,
        SyncField::InvoiceNumber,
        SyncField::KidNumber,
        SyncField::StatusField,
    ];

    /// The outbound notification kind this field feeds
    pub fn notification_kind(&self) -> NotificationKind {
        match self {
            SyncField::CustomerNumber => NotificationKind::CustomerWebhook,
            SyncField::InvoiceNumber | SyncField::KidNumber | SyncField::StatusField => {
                NotificationKind::InvoiceStatusWebhook
            }
        }
    }

    /// Stable name used in logs and error details
    pub fn name(&self) -> &'static str {
        match self {
            SyncField::CustomerNumber => "customer_number",
            SyncField::InvoiceNumber => "invoice_number",
            SyncField::KidNumber => "kid_number",
            SyncField::StatusField => "status_field",
        }
    }
}

/// Outbound notification kinds.
///
/// The customer webhook carries a single field; the invoice status webhook
/// batches the remaining three into one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    CustomerWebhook,
    InvoiceStatusWebhook,
}

/// Tri-state (plus initial) outcome of the most recent sync attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    /// No attempt has ever been made for this order
    #[default]
    NeverSynced,
    /// An attempt is in flight; must resolve before the next attempt starts
    Pending,
    /// The most recent attempt succeeded
    Success,
    /// The most recent attempt failed
    Failed,
}

/// Per-order sync bookkeeping: field markers plus attempt counters.
///
/// A field's marker equals the field's current value iff that value has
/// been successfully communicated to the CRM at least once since it last
/// changed. Absent markers compare as the empty string.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncState {
    /// Last synced value per field; `None` = never synced
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_number_marker: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoice_number_marker: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kid_number_marker: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_field_marker: Option<String>,

    /// Unix millis of the most recent attempt (success or failure)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_attempt_at: Option<i64>,
    /// Unix millis of the most recent successful attempt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_success_at: Option<i64>,
    /// Message of the most recent failure; cleared on success
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    /// Consecutive failure count; resets to 0 only on success
    #[serde(default)]
    pub error_count: u32,
    /// Overall attempt state
    #[serde(default)]
    pub status: SyncStatus,
}

impl SyncState {
    /// Read a field's marker, coercing absent to the empty string
    pub fn marker(&self, field: SyncField) -> &str {
        let slot = match field {
            SyncField::CustomerNumber => &self.customer_number_marker,
            SyncField::InvoiceNumber => &self.invoice_number_marker,
            SyncField::KidNumber => &self.kid_number_marker,
            SyncField::StatusField => &self.status_field_marker,
        };
        slot.as_deref().unwrap_or("")
    }

    /// Overwrite a field's marker
    pub fn set_marker(&mut self, field: SyncField, value: impl Into<String>) {
        let slot = match field {
            SyncField::CustomerNumber => &mut self.customer_number_marker,
            SyncField::InvoiceNumber => &mut self.invoice_number_marker,
            SyncField::KidNumber => &mut self.kid_number_marker,
            SyncField::StatusField => &mut self.status_field_marker,
        };
        *slot = Some(value.into());
    }
}

impl Order {
    /// Read the current value of a sync field, string-coerced
    pub fn field_value(&self, field: SyncField) -> &str {
        match field {
            SyncField::CustomerNumber => &self.customer_number,
            SyncField::InvoiceNumber => &self.invoice_number,
            SyncField::KidNumber => &self.kid_number,
            SyncField::StatusField => &self.status_field,
        }
    }

    /// Write the current value of a sync field
    pub fn set_field_value(&mut self, field: SyncField, value: impl Into<String>) {
        let slot = match field {
            SyncField::CustomerNumber => &mut self.customer_number,
            SyncField::InvoiceNumber => &mut self.invoice_number,
            SyncField::KidNumber => &mut self.kid_number,
            SyncField::StatusField => &mut self.status_field,
        };
        *slot = value.into();
    }

    /// Whether this order carries the external identifiers required for
    /// outbound sync. Orders without both ids are invisible to the engine.
    pub fn is_syncable(&self) -> bool {
        !self.invoice_id.is_empty() && !self.member_id.is_empty()
    }
}
