pub mod change_notifier;
pub mod inventory_service;
