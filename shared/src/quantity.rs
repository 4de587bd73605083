//! Pack and loose-unit quantity conversion
//!
//! Stock is stored as a flat count of the smallest unit (tablets, ml, ...).
//! The UI shows it as whole packs plus the loose units left over.

use serde::{Deserialize, Serialize};

use crate::error::InputError;

/// Label used for whole packs when an item has no primary unit
pub const DEFAULT_PRIMARY_UNIT: &str = "packs";

/// Label used for loose units when an item has no secondary unit
pub const DEFAULT_SECONDARY_UNIT: &str = "units";

/// A flat quantity split into whole packs and loose units
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PackSplit {
    pub packs: u64,
    pub loose: u64,
}

impl PackSplit {
    /// Flat quantity this split represents for the given pack size;
    /// `None` when it does not fit in a `u64`
    pub fn total(&self, pack: u32) -> Option<u64> {
        self.packs
            .checked_mul(effective_pack(pack))?
            .checked_add(self.loose)
    }
}

/// Pack size used for arithmetic; an unset (zero) pack counts as one unit
pub fn effective_pack(pack: u32) -> u64 {
    if pack == 0 {
        1
    } else {
        u64::from(pack)
    }
}

/// Split a flat quantity into packs and loose units.
///
/// Returns `None` for a zero quantity, which callers treat as "no stock".
pub fn convert_quantity_value(qty: u64, pack: u32) -> Option<PackSplit> {
    if qty == 0 {
        return None;
    }
    let pack = effective_pack(pack);
    Some(PackSplit {
        packs: qty / pack,
        loose: qty % pack,
    })
}

/// Render a flat quantity as `"<packs> <primary>, <loose> <secondary>"`.
///
/// The loose part is omitted when it is zero and a zero quantity renders as
/// `"-"`.
pub fn convert_quantity(
    qty: u64,
    pack: u32,
    primary_unit: Option<&str>,
    secondary_unit: Option<&str>,
) -> String {
    let Some(split) = convert_quantity_value(qty, pack) else {
        return "-".to_string();
    };

    let primary = primary_unit.unwrap_or(DEFAULT_PRIMARY_UNIT);
    if split.loose > 0 {
        let secondary = secondary_unit.unwrap_or(DEFAULT_SECONDARY_UNIT);
        format!("{} {}, {} {}", split.packs, primary, split.loose, secondary)
    } else {
        format!("{} {}", split.packs, primary)
    }
}

/// Render a flat quantity as a mixed fraction of packs, e.g. `"13 5/10"`
pub fn convert_to_fraction(qty: u64, pack: u32) -> String {
    let Some(split) = convert_quantity_value(qty, pack) else {
        return "0".to_string();
    };
    let pack = effective_pack(pack);

    match (split.packs, split.loose) {
        (packs, 0) => packs.to_string(),
        (0, loose) => format!("{}/{}", loose, pack),
        (packs, loose) => format!("{} {}/{}", packs, loose, pack),
    }
}

/// Flat quantity entered on the batch form as packs plus loose units
pub fn quantity_from_parts(packs: u64, loose: u64, pack: u32) -> Result<u64, InputError> {
    PackSplit { packs, loose }
        .total(pack)
        .ok_or(InputError::OutOfRange { field: "quantity" })
}
