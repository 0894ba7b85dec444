//! Domain models shared between the sync engine and the HTTP layer

mod invoice;
mod order;
mod sync;

pub use invoice::{IngestResponse, InvoiceLine, InvoicePayload, SyncRequest, SyncResponse};
pub use order::{Order, OrderLine, OrderStatus};
pub use sync::{NotificationKind, SyncField, SyncState, SyncStatus};
