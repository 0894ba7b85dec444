//! Reconciliation orchestrator
//!
//! Every trigger shape (direct field update, bulk save sweep, completion
//! transition, operator resync) converges on one internal `reconcile`
//! routine: detect changes, notify, move markers. At most one customer
//! webhook and one status-batch webhook leave per reconcile, whatever
//! subset of fields changed.

use dashmap::DashMap;
use serde::Serialize;
use std::sync::Arc;

use shared::error::{AppError, AppResult};
use shared::models::{NotificationKind, Order, SyncField};

use super::detector;
use super::notifier::OutboundNotifier;
use super::state::SyncStateStore;
use crate::store::OrderStore;

/// Outcome of an operator-initiated forced resync
#[derive(Debug, Clone, Serialize)]
pub struct ResyncReport {
    pub success: bool,
    pub message: String,
}

/// Holds the per-order in-flight slot for the duration of a reconcile
struct InFlightGuard<'a> {
    map: &'a DashMap<i64, ()>,
    order_id: i64,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(map: &'a DashMap<i64, ()>, order_id: i64) -> Option<Self> {
        if map.insert(order_id, ()).is_some() {
            return None;
        }
        Some(Self { map, order_id })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.map.remove(&self.order_id);
    }
}

pub struct ReconciliationOrchestrator {
    store: Arc<dyn OrderStore>,
    notifier: OutboundNotifier,
    sync_state: SyncStateStore,
    /// Orders with a reconcile in flight; overlapping triggers are dropped,
    /// their fields stay unsynced and the next trigger picks them up
    in_flight: DashMap<i64, ()>,
}

impl ReconciliationOrchestrator {
    pub fn new(
        store: Arc<dyn OrderStore>,
        notifier: OutboundNotifier,
        sync_state: SyncStateStore,
    ) -> Self {
        Self {
            store,
            notifier,
            sync_state,
            in_flight: DashMap::new(),
        }
    }

    /// Trigger: a single field was set to a known new value
    pub async fn field_updated(&self, order_id: i64, field: SyncField) -> AppResult<()> {
        self.reconcile(order_id, &[field], false).await
    }

    /// Trigger: the order was persisted, any subset of fields may have changed
    pub async fn order_saved(&self, order_id: i64) -> AppResult<()> {
        self.reconcile(order_id, &SyncField::ALL, false).await
    }

    /// Trigger: the order just transitioned to completed.
    ///
    /// Completion is the authoritative payment signal, so the status batch
    /// fires regardless of field markers, followed by the legacy payment
    /// event. Callers invoke this instead of (never in addition to) the
    /// save sweep for the same logical operation.
    pub async fn status_completed(&self, order_id: i64) -> AppResult<()> {
        self.reconcile(order_id, &SyncField::ALL, true).await
    }

    /// Operator entry point: resend everything, bypassing marker checks.
    ///
    /// Attempts both notification kinds even when the first fails and
    /// reports both outcomes in one joined message.
    pub async fn force_resync(&self, order_id: i64) -> ResyncReport {
        let Some(order) = self.store.get(order_id) else {
            return ResyncReport {
                success: false,
                message: format!("Order {} not found", order_id),
            };
        };
        if !order.is_syncable() {
            return ResyncReport {
                success: false,
                message: format!(
                    "Order {} has no CRM invoice/member identifiers; nothing to sync",
                    order_id
                ),
            };
        }
        let Some(_guard) = InFlightGuard::acquire(&self.in_flight, order_id) else {
            return ResyncReport {
                success: false,
                message: format!("A sync attempt is already in flight for order {}", order_id),
            };
        };

        tracing::info!(order_id, invoice_id = %order.invoice_id, "Forced resync requested");

        let mut success = true;
        let mut parts = Vec::new();

        if order.customer_number.is_empty() {
            parts.push("no customer number to sync".to_string());
        } else {
            match self.notifier.send_customer_number(&order).await {
                Ok(()) => {
                    self.move_marker(order_id, SyncField::CustomerNumber, &order.customer_number);
                    parts.push("customer number sent".to_string());
                }
                Err(err) => {
                    success = false;
                    parts.push(format!("customer number failed: {}", err.message));
                }
            }
        }

        match self.notifier.send_invoice_status(&order).await {
            Ok(()) => {
                self.move_status_batch_markers(&order);
                parts.push("invoice status sent".to_string());
            }
            Err(err) => {
                success = false;
                parts.push(format!("invoice status failed: {}", err.message));
            }
        }

        ResyncReport {
            success,
            message: parts.join("; "),
        }
    }

    /// The shared detect -> notify -> record sequence.
    ///
    /// `completion` forces the status batch regardless of markers and adds
    /// the payment event. Returns the first delivery error after finishing
    /// all due sends; callers decide whether that error reaches their own
    /// caller (HTTP triggers never propagate it as a request failure).
    async fn reconcile(
        &self,
        order_id: i64,
        candidates: &[SyncField],
        completion: bool,
    ) -> AppResult<()> {
        let order = self
            .store
            .get(order_id)
            .ok_or_else(|| AppError::not_found(format!("Order {}", order_id)))?;

        if !order.is_syncable() {
            tracing::debug!(order_id, "Order has no CRM identifiers, skipping sync");
            return Ok(());
        }

        let Some(_guard) = InFlightGuard::acquire(&self.in_flight, order_id) else {
            tracing::debug!(order_id, "Reconcile already in flight, dropping trigger");
            return Ok(());
        };

        let changed = detector::changed_fields(&order, candidates);
        let send_customer = changed.contains(&SyncField::CustomerNumber);
        let send_status = completion
            || changed
                .iter()
                .any(|f| f.notification_kind() == NotificationKind::InvoiceStatusWebhook);

        if !send_customer && !send_status {
            return Ok(());
        }

        tracing::info!(
            order_id,
            invoice_id = %order.invoice_id,
            changed = ?changed,
            completion,
            "Reconciling order with CRM"
        );

        let mut first_err: Option<AppError> = None;

        if send_customer {
            match self.notifier.send_customer_number(&order).await {
                Ok(()) => {
                    self.move_marker(order_id, SyncField::CustomerNumber, &order.customer_number)
                }
                Err(err) => first_err = Some(err),
            }
        }

        if send_status {
            match self.notifier.send_invoice_status(&order).await {
                Ok(()) => self.move_status_batch_markers(&order),
                Err(err) => {
                    first_err.get_or_insert(err);
                }
            }
        }

        if completion {
            if let Err(err) = self.notifier.send_payment_event(&order).await {
                first_err.get_or_insert(err);
            }
        }

        match first_err {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn move_marker(&self, order_id: i64, field: SyncField, value: &str) {
        if let Err(err) = self.sync_state.set_marker(order_id, field, value) {
            tracing::warn!(order_id, field = field.name(), "Failed to move sync marker: {}", err);
        }
    }

    /// After a successful status batch, everything the payload carried is
    /// communicated; move all non-empty status-kind markers in one write
    fn move_status_batch_markers(&self, order: &Order) {
        let markers: Vec<(SyncField, String)> = [
            SyncField::InvoiceNumber,
            SyncField::KidNumber,
            SyncField::StatusField,
        ]
        .into_iter()
        .filter(|field| !order.field_value(*field).is_empty())
        .map(|field| (field, order.field_value(field).to_string()))
        .collect();

        if let Err(err) = self.sync_state.set_markers(order.id, &markers) {
            tracing::warn!(order_id = order.id, "Failed to move sync markers: {}", err);
        }
    }
}
