pub mod audit_logs;
pub mod blockchain_transactions;
pub mod inventory;
pub mod products;
pub mod qr_scan_logs;
pub mod suppliers;
pub mod tracking_events;
pub mod users;

pub use audit_logs::Entity as AuditLogs;
pub use blockchain_transactions::Entity as BlockchainTransactions;
pub use inventory::Entity as Inventory;
pub use products::Entity as Products;
pub use qr_scan_logs::Entity as QrScanLogs;
pub use suppliers::Entity as Suppliers;
pub use tracking_events::Entity as TrackingEvents;
pub use users::Entity as Users;
