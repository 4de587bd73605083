//! Business logic services for the Pharmacy Manager platform

pub mod dashboard;
pub mod inventory;
pub mod payment;

pub use dashboard::DashboardService;
pub use inventory::InventoryService;
pub use payment::PaymentService;
