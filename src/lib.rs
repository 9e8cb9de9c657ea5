pub mod app;
pub mod domain;
pub mod infra;
pub mod storage;
pub mod transport;

// Convenience re-exports (keeps call-sites clean)
pub use app::change_notifier::{ChangeNotifier, Signal};
pub use app::inventory_service::{InventoryService, ServiceError};
pub use domain::{derive_status, InventoryItem, ItemStatus};
pub use infra::config::AppConfig;
pub use storage::{InMemoryInventoryStore, InventoryStore, PostgresInventoryStore};
