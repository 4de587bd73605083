//! HTTP handlers

pub mod dashboard;
pub mod health;
pub mod inventory;
pub mod payment;

pub use dashboard::get_metrics;
pub use health::health_check;
pub use inventory::{delete_batch, get_inventory_item, get_timeline, manage_batch};
pub use payment::{create_payment, list_payments};
