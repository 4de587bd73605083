//! Batch management tests
//!
//! Covers the path from the batch form to the stored record:
//! - Rates are stored exclusive (purchase) and inclusive (sale) of GST
//! - Packs plus loose units collapse to one flat quantity
//! - Item pages render quantities with the item's unit labels

use chrono::{NaiveDate, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::{
    convert_quantity_value, quantity_delta, Batch, BatchView, GstType, InventoryItem,
    InventoryItemDetails, ManageBatchInput,
};
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn form_json() -> serde_json::Value {
    serde_json::json!({
        "inventoryId": "00000000-0000-0000-0000-000000000001",
        "batchNumber": "AMX2409",
        "expiry": "09/26",
        "mrp": "95.5",
        "HSN": "30042019",
        "gstPer": "12",
        "purchaseRate": "56",
        "saleRate": "80",
        "purchaseGstType": "Incl gst",
        "saleGstType": "Excl gst",
        "pack": 10,
        "packs": 4,
        "loose": 3
    })
}

fn item(pack: u32, primary: Option<&str>, secondary: Option<&str>) -> InventoryItem {
    InventoryItem {
        id: Uuid::new_v4(),
        shop_id: Uuid::new_v4(),
        name: "Amoxicillin 500mg".to_string(),
        item_code: Some("AMX500".to_string()),
        manufacturer: None,
        primary_unit: primary.map(str::to_string),
        secondary_unit: secondary.map(str::to_string),
        pack,
        gst_per: dec("12"),
        hsn: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn batch(number: &str, expiry: &str, quantity: u64, pack: u32) -> Batch {
    Batch {
        id: Uuid::new_v4(),
        inventory_id: Uuid::nil(),
        batch_number: number.to_string(),
        expiry: expiry.to_string(),
        mrp: dec("95.50"),
        hsn: None,
        gst_per: dec("12"),
        purchase_rate: dec("50.00"),
        sale_rate: dec("89.60"),
        pack,
        quantity,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// The form as the frontend posts it becomes a canonical record
    #[test]
    fn test_form_to_record() {
        let input: ManageBatchInput = serde_json::from_value(form_json()).unwrap();
        assert!(input.validate().is_ok());

        let record = input.into_record().unwrap();
        assert_eq!(record.purchase_rate, dec("50.00"));
        assert_eq!(record.sale_rate, dec("89.60"));
        assert_eq!(record.mrp, dec("95.50"));
        assert_eq!(record.quantity, 43);
        assert_eq!(record.expiry.to_string(), "09/26");
        assert!(record.batch_id.is_none());
    }

    /// Missing GST types default to exclusive
    #[test]
    fn test_gst_type_defaults() {
        let mut json = form_json();
        let obj = json.as_object_mut().unwrap();
        obj.remove("purchaseGstType");
        obj.remove("saleGstType");

        let input: ManageBatchInput = serde_json::from_value(json).unwrap();
        assert_eq!(input.purchase_gst_type, GstType::Exclusive);
        assert_eq!(input.sale_gst_type, GstType::Exclusive);

        let record = input.into_record().unwrap();
        assert_eq!(record.purchase_rate, dec("56.00"));
        assert_eq!(record.sale_rate, dec("89.60"));
    }

    /// An unset pack size counts as one unit per pack
    #[test]
    fn test_zero_pack_counts_as_one() {
        let mut json = form_json();
        json["pack"] = serde_json::json!(0);

        let input: ManageBatchInput = serde_json::from_value(json).unwrap();
        let record = input.into_record().unwrap();
        assert_eq!(record.pack, 1);
        assert_eq!(record.quantity, 7);
    }

    /// Malformed expiry is rejected before anything is stored
    #[test]
    fn test_bad_expiry_rejected() {
        let mut json = form_json();
        json["expiry"] = serde_json::json!("13/26");

        let input: ManageBatchInput = serde_json::from_value(json).unwrap();
        let errors = input.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("expiry"));
    }

    /// Negative rates are rejected
    #[test]
    fn test_negative_rate_rejected() {
        let mut json = form_json();
        json["saleRate"] = serde_json::json!("-1");

        let input: ManageBatchInput = serde_json::from_value(json).unwrap();
        assert!(input.validate().is_err());
        assert!(input.into_record().is_err());
    }

    /// Batch rows render with the item's units
    #[test]
    fn test_batch_view_display() {
        let item = item(10, Some("strips"), Some("tablets"));
        let today = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();

        let view = BatchView::new(batch("B1", "12/24", 135, 10), &item, today);
        assert_eq!(view.quantity_display, "13 strips, 5 tablets");
        assert!(view.expired);

        let view = BatchView::new(batch("B2", "01/25", 0, 10), &item, today);
        assert_eq!(view.quantity_display, "-");
        assert!(view.pack_split.is_none());
        assert!(!view.expired);
    }

    /// Item totals sum every batch
    #[test]
    fn test_item_details_totals() {
        let item = item(10, None, None);
        let today = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        let details = InventoryItemDetails::new(
            item,
            vec![batch("B1", "06/25", 25, 10), batch("B2", "07/25", 10, 10)],
            today,
        );

        assert_eq!(details.total_quantity, 35);
        assert_eq!(details.total_quantity_display, "3 packs, 5 units");
        assert_eq!(details.batches.len(), 2);
    }

    /// Batch views serialize flat, the way the item page reads them
    #[test]
    fn test_batch_view_json_shape() {
        let item = item(10, None, None);
        let today = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        let view = BatchView::new(batch("B1", "06/25", 25, 10), &item, today);

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["batchNumber"], "B1");
        assert_eq!(json["quantityDisplay"], "2 packs, 5 units");
        assert_eq!(json["packSplit"]["packs"], 2);
        assert_eq!(json["packSplit"]["loose"], 5);
    }

    /// Timeline deltas are signed
    #[test]
    fn test_quantity_delta() {
        assert_eq!(quantity_delta(0, 43), 43);
        assert_eq!(quantity_delta(43, 40), -3);
        assert_eq!(quantity_delta(40, 0), -40);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    /// Strategy for pack sizes seen on pharmacy stock
    fn pack_strategy() -> impl Strategy<Value = u32> {
        prop_oneof![Just(0u32), Just(1u32), 2u32..=100u32]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Property: Packs and loose units entered on the form survive a
        /// round trip through the stored flat quantity
        #[test]
        fn prop_form_quantity_round_trip(
            packs in 0u64..10_000,
            pack in pack_strategy(),
            loose_seed in 0u64..1_000,
        ) {
            let unit = u64::from(pack.max(1));
            let loose = loose_seed % unit;

            let mut json = form_json();
            json["pack"] = serde_json::json!(pack);
            json["packs"] = serde_json::json!(packs);
            json["loose"] = serde_json::json!(loose);

            let input: ManageBatchInput = serde_json::from_value(json).unwrap();
            let record = input.into_record().unwrap();

            match convert_quantity_value(record.quantity, record.pack) {
                None => prop_assert_eq!(packs + loose, 0),
                Some(split) => {
                    prop_assert_eq!(split.packs, packs);
                    prop_assert_eq!(split.loose, loose);
                }
            }
        }

        /// Property: Stored purchase rates never exceed what was typed,
        /// stored sale rates never fall below it
        #[test]
        fn prop_rates_are_canonical(
            purchase_cents in 0i64..1_000_000,
            sale_cents in 0i64..1_000_000,
            idx in 0usize..5,
        ) {
            let gst = [0, 5, 12, 18, 28][idx];
            let mut json = form_json();
            json["gstPer"] = serde_json::json!(gst);
            json["purchaseRate"] = serde_json::json!(Decimal::new(purchase_cents, 2).to_string());
            json["saleRate"] = serde_json::json!(Decimal::new(sale_cents, 2).to_string());

            let input: ManageBatchInput = serde_json::from_value(json).unwrap();
            let typed_purchase = input.purchase_rate;
            let typed_sale = input.sale_rate;
            let record = input.into_record().unwrap();

            prop_assert!(record.purchase_rate <= typed_purchase);
            prop_assert!(record.sale_rate >= typed_sale);
        }
    }
}
