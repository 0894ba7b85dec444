//! Reconciliation engine
//!
//! Decides, for every observed order change, whether an outbound CRM
//! notification is due, sends it, and records the outcome:
//!
//! - [`detector`]: which sync fields changed since the last successful send
//! - [`notifier`]: payload assembly, endpoint config checks, delivery
//! - [`state`]: per-order marker and attempt bookkeeping
//! - [`orchestrator`]: the entry points every trigger converges on
//! - [`transport`]: the HTTP POST seam

pub mod detector;
pub mod notifier;
pub mod orchestrator;
pub mod state;
pub mod transport;

pub use notifier::{CrmConfig, OutboundNotifier};
pub use orchestrator::{ReconciliationOrchestrator, ResyncReport};
pub use state::SyncStateStore;
pub use transport::{ReqwestTransport, WebhookTransport};
