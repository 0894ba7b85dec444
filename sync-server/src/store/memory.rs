//! In-memory order store
//!
//! DashMap-backed implementation with a secondary invoice-id index.
//! Lookups clone the stored order so callers always work on snapshots;
//! the only mutation path is [`OrderStore::update`].

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;

use shared::error::{AppError, AppResult};
use shared::models::Order;
use shared::util::now_millis;

use super::OrderStore;

/// First order number handed out; keeps numbers visually distinct from ids
const ORDER_NUMBER_BASE: u64 = 1000;

#[derive(Debug, Default)]
pub struct MemoryOrderStore {
    orders: DashMap<i64, Order>,
    /// invoice_id -> order id
    invoice_index: DashMap<String, i64>,
    order_counter: AtomicU64,
}

impl MemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}

impl OrderStore for MemoryOrderStore {
    fn get(&self, id: i64) -> Option<Order> {
        self.orders.get(&id).map(|entry| entry.clone())
    }

    fn find_by_invoice_id(&self, invoice_id: &str) -> Option<Order> {
        let id = *self.invoice_index.get(invoice_id)?;
        self.get(id)
    }

    fn insert(&self, order: Order) {
        if !order.invoice_id.is_empty() {
            self.invoice_index.insert(order.invoice_id.clone(), order.id);
        }
        self.orders.insert(order.id, order);
    }

    fn update(&self, id: i64, mutate: &mut dyn FnMut(&mut Order)) -> AppResult<Order> {
        let mut entry = self
            .orders
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Order {}", id)))?;
        mutate(entry.value_mut());
        entry.updated_at = now_millis();
        if !entry.invoice_id.is_empty() {
            self.invoice_index.insert(entry.invoice_id.clone(), id);
        }
        Ok(entry.clone())
    }

    fn next_order_number(&self) -> String {
        let n = self.order_counter.fetch_add(1, Ordering::Relaxed);
        (ORDER_NUMBER_BASE + n).to_string()
    }

    fn all_syncable(&self) -> Vec<Order> {
        self.orders
            .iter()
            .filter(|entry| entry.is_syncable())
            .map(|entry| entry.clone())
            .collect()
    }
}
