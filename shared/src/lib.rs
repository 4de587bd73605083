//! Shared types and calculations for the Pharmacy Manager platform
//!
//! This crate contains the pure calculation layer (quantity and pack math,
//! GST rate reconciliation, amounts in words, date filters) together with the
//! models shared between the backend and the frontend (via WASM).

pub mod date_range;
pub mod error;
pub mod expiry;
pub mod gst;
pub mod models;
pub mod quantity;
pub mod sequence;
pub mod types;
pub mod validation;
pub mod words;

pub use date_range::*;
pub use error::*;
pub use expiry::*;
pub use gst::*;
pub use models::*;
pub use quantity::*;
pub use sequence::*;
pub use types::*;
pub use validation::*;
pub use words::*;
