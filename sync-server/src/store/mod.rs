//! Order store collaborator
//!
//! The order store is an external system of record; the sync engine only
//! talks to it through the [`OrderStore`] trait. The in-memory
//! implementation backs the server and the test suite.

mod memory;

pub use memory::MemoryOrderStore;

use shared::error::AppResult;
use shared::models::Order;

/// Narrow interface onto the order store.
///
/// All operations address a single order; there is no cross-order
/// atomicity. `update` applies a closure to the stored order and persists
/// the result in one step, returning the updated snapshot.
pub trait OrderStore: Send + Sync {
    /// Load an order by its opaque id
    fn get(&self, id: i64) -> Option<Order>;

    /// Exact-match lookup by external CRM invoice id
    fn find_by_invoice_id(&self, invoice_id: &str) -> Option<Order>;

    /// Store a freshly created order
    fn insert(&self, order: Order);

    /// Mutate an order in place; errors with NotFound for unknown ids
    fn update(&self, id: i64, mutate: &mut dyn FnMut(&mut Order)) -> AppResult<Order>;

    /// Next human-facing order number
    fn next_order_number(&self) -> String;

    /// All orders carrying CRM external identifiers (reporting scans)
    fn all_syncable(&self) -> Vec<Order>;
}
