pub mod manager;
pub mod memory;
pub mod models;
pub mod store;

pub use manager::{DatabaseError, DatabaseManager};
pub use memory::MemoryInvoiceStore;
pub use models::invoice::{Invoice, InvoiceChanges, InvoiceStatus, NewInvoice};
pub use store::{InvoiceStore, PgInvoiceStore};
