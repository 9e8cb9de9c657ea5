pub mod router;
pub mod types;
pub mod handlers {
    pub mod catalog;
    pub mod common;
    pub mod dashboard;
    pub mod db_view;
    pub mod events;
    pub mod frontend;
    pub mod health;
    pub mod inventory;
}

pub use handlers::frontend::with_frontend;
pub use router::{create_router, ApiDoc};
pub use types::AppState;
