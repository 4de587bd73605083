//! Domain models for the Pharmacy Manager platform

mod batch;
mod dashboard;
mod inventory;
mod payment;

pub use batch::*;
pub use dashboard::*;
pub use inventory::*;
pub use payment::*;
