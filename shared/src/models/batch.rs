//! Inventory batch models and the batch management form

use std::borrow::Cow;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::error::InputError;
use crate::expiry::Expiry;
use crate::gst::{reconcile_rates, round2, GstType, RateEntry};
use crate::quantity::quantity_from_parts;
use crate::validation;

/// A stored batch. Purchase rate excludes GST, sale rate includes it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Batch {
    pub id: Uuid,
    pub inventory_id: Uuid,
    pub batch_number: String,
    /// `MM/YY`
    pub expiry: String,
    pub mrp: Decimal,
    #[serde(rename = "HSN")]
    pub hsn: Option<String>,
    pub gst_per: Decimal,
    pub purchase_rate: Decimal,
    pub sale_rate: Decimal,
    pub pack: u32,
    /// Flat count of loose units
    pub quantity: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Batch {
    /// Parsed expiry; `None` for legacy rows that are not `MM/YY`
    pub fn expiry(&self) -> Option<Expiry> {
        self.expiry.parse().ok()
    }
}

/// Payload of the batch management form (create when `batch_id` is absent)
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ManageBatchInput {
    pub inventory_id: Uuid,
    #[serde(default)]
    pub batch_id: Option<Uuid>,
    #[validate(custom = "batch_number_rule")]
    pub batch_number: String,
    #[validate(custom = "expiry_rule")]
    pub expiry: String,
    #[validate(custom = "amount_rule")]
    pub mrp: Decimal,
    #[serde(default, rename = "HSN")]
    #[validate(custom = "hsn_rule")]
    pub hsn: Option<String>,
    #[validate(custom = "gst_percent_rule")]
    pub gst_per: Decimal,
    #[validate(custom = "amount_rule")]
    pub purchase_rate: Decimal,
    #[validate(custom = "amount_rule")]
    pub sale_rate: Decimal,
    #[serde(default)]
    pub purchase_gst_type: GstType,
    #[serde(default)]
    pub sale_gst_type: GstType,
    #[serde(default)]
    pub pack: u32,
    /// Whole packs entered on the form
    #[serde(default)]
    pub packs: u64,
    /// Loose units entered on the form
    #[serde(default)]
    pub loose: u64,
}

/// A batch ready to be written: canonical rates and a flat quantity
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BatchRecord {
    pub inventory_id: Uuid,
    pub batch_id: Option<Uuid>,
    pub batch_number: String,
    pub expiry: Expiry,
    pub mrp: Decimal,
    #[serde(rename = "HSN")]
    pub hsn: Option<String>,
    pub gst_per: Decimal,
    pub purchase_rate: Decimal,
    pub sale_rate: Decimal,
    pub pack: u32,
    pub quantity: u64,
}

impl ManageBatchInput {
    pub fn rate_entry(&self) -> RateEntry {
        RateEntry {
            purchase_rate: self.purchase_rate,
            sale_rate: self.sale_rate,
            gst_per: self.gst_per,
            purchase_gst_type: self.purchase_gst_type,
            sale_gst_type: self.sale_gst_type,
        }
    }

    /// Convert the form into the record that gets persisted
    pub fn into_record(self) -> Result<BatchRecord, InputError> {
        let rates = reconcile_rates(&self.rate_entry())?;
        let expiry: Expiry = self.expiry.parse()?;
        let pack = self.pack.max(1);

        Ok(BatchRecord {
            inventory_id: self.inventory_id,
            batch_id: self.batch_id,
            batch_number: self.batch_number.trim().to_string(),
            expiry,
            mrp: round2(self.mrp),
            hsn: self
                .hsn
                .map(|h| h.trim().to_string())
                .filter(|h| !h.is_empty()),
            gst_per: self.gst_per,
            purchase_rate: rates.purchase_rate,
            sale_rate: rates.sale_rate,
            pack,
            quantity: quantity_from_parts(self.packs, self.loose, pack)?,
        })
    }
}

fn rule_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

fn batch_number_rule(value: &str) -> Result<(), ValidationError> {
    validation::validate_batch_number(value).map_err(|m| rule_error("batch_number", m))
}

fn expiry_rule(value: &str) -> Result<(), ValidationError> {
    validation::validate_expiry(value).map_err(|m| rule_error("expiry", m))
}

fn hsn_rule(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Ok(());
    }
    validation::validate_hsn(value).map_err(|m| rule_error("hsn", m))
}

fn gst_percent_rule(value: &Decimal) -> Result<(), ValidationError> {
    validation::validate_gst_percent(*value).map_err(|m| rule_error("gst_per", m))
}

fn amount_rule(value: &Decimal) -> Result<(), ValidationError> {
    validation::validate_non_negative_amount(*value).map_err(|m| rule_error("amount", m))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn form() -> ManageBatchInput {
        ManageBatchInput {
            inventory_id: Uuid::nil(),
            batch_id: None,
            batch_number: " B-101 ".to_string(),
            expiry: "08/27".to_string(),
            mrp: dec("150"),
            hsn: Some("3004".to_string()),
            gst_per: dec("12"),
            purchase_rate: dec("112"),
            sale_rate: dec("125"),
            purchase_gst_type: GstType::Inclusive,
            sale_gst_type: GstType::Exclusive,
            pack: 10,
            packs: 13,
            loose: 5,
        }
    }

    #[test]
    fn test_valid_form() {
        assert!(form().validate().is_ok());
    }

    #[test]
    fn test_missing_batch_number() {
        let mut input = form();
        input.batch_number = String::new();
        let errors = input.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("batch_number"));
    }

    #[test]
    fn test_bad_expiry_and_hsn() {
        let mut input = form();
        input.expiry = "2027-08".to_string();
        input.hsn = Some("30A".to_string());
        let errors = input.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("expiry"));
        assert!(fields.contains_key("hsn"));
    }

    #[test]
    fn test_blank_hsn_allowed() {
        let mut input = form();
        input.hsn = Some("  ".to_string());
        assert!(input.validate().is_ok());
        assert_eq!(input.into_record().unwrap().hsn, None);
    }

    #[test]
    fn test_into_record() {
        let record = form().into_record().unwrap();
        assert_eq!(record.batch_number, "B-101");
        assert_eq!(record.purchase_rate, dec("100.00"));
        assert_eq!(record.sale_rate, dec("140.00"));
        assert_eq!(record.quantity, 135);
        assert_eq!(record.expiry.to_string(), "08/27");
    }

    #[test]
    fn test_into_record_unset_pack() {
        let mut input = form();
        input.pack = 0;
        input.packs = 4;
        input.loose = 2;
        let record = input.into_record().unwrap();
        assert_eq!(record.pack, 1);
        assert_eq!(record.quantity, 6);
    }

    #[test]
    fn test_into_record_rejects_quantity_overflow() {
        let mut input = form();
        input.pack = 10;
        input.packs = 1_844_674_407_370_955_162;
        assert!(input.validate().is_ok());
        assert_eq!(
            input.into_record(),
            Err(InputError::OutOfRange { field: "quantity" })
        );
    }

    #[test]
    fn test_into_record_rejects_rate_overflow() {
        let mut input = form();
        input.gst_per = dec("28");
        input.sale_rate = dec("70000000000000000000000000000");
        input.sale_gst_type = GstType::Exclusive;
        assert!(input.validate().is_ok());
        assert_eq!(
            input.into_record(),
            Err(InputError::OutOfRange { field: "sale_rate" })
        );
    }

    #[test]
    fn test_gst_above_one_hundred_percent() {
        let mut input = form();
        input.gst_per = dec("150");
        assert!(input.validate().is_ok());
        let record = input.into_record().unwrap();
        assert_eq!(record.gst_per, dec("150"));
        // 125 excl + 150%
        assert_eq!(record.sale_rate, dec("312.50"));
    }

    #[test]
    fn test_deserialize_from_form_json() {
        let json = r#"{
            "inventoryId": "00000000-0000-0000-0000-000000000000",
            "batchNumber": "B1",
            "expiry": "01/26",
            "mrp": "50",
            "HSN": "3004",
            "gstPer": "5",
            "purchaseRate": "40",
            "saleRate": "45",
            "purchaseGstType": "Excl gst",
            "saleGstType": "Incl gst",
            "pack": 15,
            "packs": 2,
            "loose": 3
        }"#;
        let input: ManageBatchInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.sale_gst_type, GstType::Inclusive);
        let record = input.into_record().unwrap();
        assert_eq!(record.quantity, 33);
        assert_eq!(record.sale_rate, dec("45.00"));
    }
}
