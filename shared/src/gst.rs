//! GST rate reconciliation
//!
//! Purchase rates are stored exclusive of GST and sale rates inclusive of GST,
//! whatever form the user typed them in. Both are rounded to two decimal
//! places before they are persisted.

use std::fmt;
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::InputError;

/// Whether an entered rate already contains GST
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum GstType {
    #[default]
    #[serde(rename = "Excl gst")]
    Exclusive,
    #[serde(rename = "Incl gst")]
    Inclusive,
}

impl GstType {
    pub fn label(&self) -> &'static str {
        match self {
            GstType::Exclusive => "Excl gst",
            GstType::Inclusive => "Incl gst",
        }
    }
}

impl fmt::Display for GstType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for GstType {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "excl gst" => Ok(GstType::Exclusive),
            "incl gst" => Ok(GstType::Inclusive),
            _ => Err(InputError::Invalid {
                field: "gst_type",
                message: "expected \"Excl gst\" or \"Incl gst\"",
            }),
        }
    }
}

/// A validated, non-negative GST percentage
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd)]
pub struct GstRate(Decimal);

impl GstRate {
    pub fn new(percent: Decimal) -> Result<Self, InputError> {
        if percent.is_sign_negative() && !percent.is_zero() {
            return Err(InputError::Negative { field: "gst_per" });
        }
        Ok(Self(percent))
    }

    pub fn percent(&self) -> Decimal {
        self.0
    }

    /// `1 + percent / 100`
    pub fn multiplier(&self) -> Result<Decimal, InputError> {
        (self.0 / Decimal::ONE_HUNDRED)
            .checked_add(Decimal::ONE)
            .ok_or(InputError::OutOfRange { field: "gst_per" })
    }

    /// Strip GST from an inclusive amount (unrounded)
    pub fn to_exclusive(&self, inclusive: Decimal) -> Result<Decimal, InputError> {
        inclusive
            .checked_div(self.multiplier()?)
            .ok_or(InputError::OutOfRange { field: "rate" })
    }

    /// Add GST to an exclusive amount (unrounded)
    pub fn to_inclusive(&self, exclusive: Decimal) -> Result<Decimal, InputError> {
        exclusive
            .checked_mul(self.multiplier()?)
            .ok_or(InputError::OutOfRange { field: "rate" })
    }
}

/// Round a monetary amount to two decimal places, halves away from zero.
/// The result always carries a scale of two, so `100` becomes `100.00`.
pub fn round2(amount: Decimal) -> Decimal {
    let mut rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}

/// Purchase rate in its stored, GST-exclusive form
pub fn canonical_purchase_rate(
    rate: Decimal,
    gst: GstRate,
    entered_as: GstType,
) -> Result<Decimal, InputError> {
    match entered_as {
        GstType::Inclusive => gst.to_exclusive(rate).map(round2),
        GstType::Exclusive => Ok(round2(rate)),
    }
    .map_err(|_| InputError::OutOfRange {
        field: "purchase_rate",
    })
}

/// Sale rate in its stored, GST-inclusive form
pub fn canonical_sale_rate(
    rate: Decimal,
    gst: GstRate,
    entered_as: GstType,
) -> Result<Decimal, InputError> {
    match entered_as {
        GstType::Exclusive => gst.to_inclusive(rate).map(round2),
        GstType::Inclusive => Ok(round2(rate)),
    }
    .map_err(|_| InputError::OutOfRange { field: "sale_rate" })
}

/// Rates as typed on the batch form
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateEntry {
    pub purchase_rate: Decimal,
    pub sale_rate: Decimal,
    pub gst_per: Decimal,
    #[serde(default)]
    pub purchase_gst_type: GstType,
    #[serde(default)]
    pub sale_gst_type: GstType,
}

/// Rates in the form the backend stores them
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalRates {
    /// Exclusive of GST
    pub purchase_rate: Decimal,
    /// Inclusive of GST
    pub sale_rate: Decimal,
}

/// Convert both entered rates to their stored forms
pub fn reconcile_rates(entry: &RateEntry) -> Result<CanonicalRates, InputError> {
    let gst = GstRate::new(entry.gst_per)?;
    if entry.purchase_rate.is_sign_negative() && !entry.purchase_rate.is_zero() {
        return Err(InputError::Negative {
            field: "purchase_rate",
        });
    }
    if entry.sale_rate.is_sign_negative() && !entry.sale_rate.is_zero() {
        return Err(InputError::Negative { field: "sale_rate" });
    }

    Ok(CanonicalRates {
        purchase_rate: canonical_purchase_rate(entry.purchase_rate, gst, entry.purchase_gst_type)?,
        sale_rate: canonical_sale_rate(entry.sale_rate, gst, entry.sale_gst_type)?,
    })
}

/// Tax split of a GST-inclusive amount for an intra-state invoice line
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GstBreakdown {
    pub taxable_amount: Decimal,
    pub cgst: Decimal,
    pub sgst: Decimal,
    pub total_tax: Decimal,
}

impl GstBreakdown {
    /// Work backwards from an inclusive amount; CGST and SGST are equal halves
    pub fn from_inclusive(amount: Decimal, gst: GstRate) -> Result<Self, InputError> {
        let taxable_amount = round2(gst.to_exclusive(amount)?);
        let total_tax = round2(amount) - taxable_amount;
        let cgst = round2(total_tax / Decimal::TWO);
        Ok(Self {
            taxable_amount,
            cgst,
            sgst: total_tax - cgst,
            total_tax,
        })
    }
}
