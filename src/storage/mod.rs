pub mod memory;
pub mod postgres;
pub mod store;

pub use memory::InMemoryInventoryStore;
pub use postgres::PostgresInventoryStore;
pub use store::{InventoryStore, StoreError, StoreResult, UpdatePlan};
