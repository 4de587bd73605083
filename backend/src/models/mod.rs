//! Models used by the Pharmacy Manager backend
//!
//! Re-exports the shared models together with the calculation helpers the
//! services apply before persisting

pub use shared::gst::round2;
pub use shared::models::*;
pub use shared::types::*;
