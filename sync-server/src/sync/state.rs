//! Per-order sync bookkeeping
//!
//! All marker and counter writes go through this component so the
//! invariants hold everywhere: `error_count` resets only on success and
//! increments by exactly one per failure; `Pending` exists only while an
//! attempt is in flight; markers move to a value only once that value has
//! been communicated (or originated) externally.

use std::sync::Arc;

use shared::error::AppResult;
use shared::models::{SyncField, SyncStatus};
use shared::util::now_millis;

use crate::store::OrderStore;

#[derive(Clone)]
pub struct SyncStateStore {
    store: Arc<dyn OrderStore>,
}

impl SyncStateStore {
    pub fn new(store: Arc<dyn OrderStore>) -> Self {
        Self { store }
    }

    /// Stamp the start of a delivery attempt: status Pending + attempt time
    pub fn begin_attempt(&self, order_id: i64) -> AppResult<()> {
        self.store.update(order_id, &mut |order| {
            order.sync.status = SyncStatus::Pending;
            order.sync.last_attempt_at = Some(now_millis());
        })?;
        Ok(())
    }

    /// Resolve the in-flight attempt as successful
    pub fn record_success(&self, order_id: i64) -> AppResult<()> {
        self.store.update(order_id, &mut |order| {
            order.sync.status = SyncStatus::Success;
            order.sync.last_success_at = Some(now_millis());
            order.sync.last_error = None;
            order.sync.error_count = 0;
        })?;
        Ok(())
    }

    /// Resolve the in-flight attempt as failed
    pub fn record_failure(&self, order_id: i64, message: &str) -> AppResult<()> {
        self.store.update(order_id, &mut |order| {
            order.sync.status = SyncStatus::Failed;
            order.sync.last_error = Some(message.to_string());
            order.sync.error_count += 1;
        })?;
        Ok(())
    }

    /// Move one field's marker to a successfully communicated value
    pub fn set_marker(&self, order_id: i64, field: SyncField, value: &str) -> AppResult<()> {
        self.store.update(order_id, &mut |order| {
            order.sync.set_marker(field, value);
        })?;
        Ok(())
    }

    /// Move several markers in one store write
    pub fn set_markers(&self, order_id: i64, markers: &[(SyncField, String)]) -> AppResult<()> {
        if markers.is_empty() {
            return Ok(());
        }
        self.store.update(order_id, &mut |order| {
            for (field, value) in markers {
                order.sync.set_marker(*field, value.clone());
            }
        })?;
        Ok(())
    }
}
