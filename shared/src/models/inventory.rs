//! Inventory item, stock view and timeline models

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Batch;
use crate::quantity::{convert_quantity, convert_quantity_value, PackSplit};

/// An item stocked by the shop
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub id: Uuid,
    pub shop_id: Uuid,
    pub name: String,
    pub item_code: Option<String>,
    pub manufacturer: Option<String>,
    /// Label for whole packs, e.g. "Strip"
    pub primary_unit: Option<String>,
    /// Label for loose units, e.g. "Tablet"
    pub secondary_unit: Option<String>,
    pub pack: u32,
    pub gst_per: Decimal,
    #[serde(rename = "HSN")]
    pub hsn: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InventoryItem {
    /// Render a quantity with this item's unit labels
    pub fn display_quantity(&self, qty: u64, pack: u32) -> String {
        convert_quantity(
            qty,
            pack,
            self.primary_unit.as_deref(),
            self.secondary_unit.as_deref(),
        )
    }
}

/// A batch as shown on the item page
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BatchView {
    #[serde(flatten)]
    pub batch: Batch,
    pub quantity_display: String,
    pub pack_split: Option<PackSplit>,
    pub expired: bool,
}

impl BatchView {
    pub fn new(batch: Batch, item: &InventoryItem, today: NaiveDate) -> Self {
        let quantity_display = item.display_quantity(batch.quantity, batch.pack);
        let pack_split = convert_quantity_value(batch.quantity, batch.pack);
        let expired = batch
            .expiry()
            .map(|e| e.is_expired_on(today))
            .unwrap_or(false);
        Self {
            batch,
            quantity_display,
            pack_split,
            expired,
        }
    }
}

/// Item with all of its batches
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItemDetails {
    #[serde(flatten)]
    pub item: InventoryItem,
    pub batches: Vec<BatchView>,
    pub total_quantity: u64,
    pub total_quantity_display: String,
}

impl InventoryItemDetails {
    pub fn new(item: InventoryItem, batches: Vec<Batch>, today: NaiveDate) -> Self {
        let total_quantity = batches.iter().map(|b| b.quantity).sum();
        let total_quantity_display = item.display_quantity(total_quantity, item.pack);
        let batches = batches
            .into_iter()
            .map(|b| BatchView::new(b, &item, today))
            .collect();
        Self {
            item,
            batches,
            total_quantity,
            total_quantity_display,
        }
    }
}

/// Kinds of stock movement recorded on an item's timeline
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    /// Stock entered when a batch is created
    Opening,
    Purchase,
    Sale,
    PurchaseReturn,
    SaleReturn,
    /// Quantity corrected by editing a batch
    Adjustment,
    BatchDeleted,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Opening => "opening",
            TransactionType::Purchase => "purchase",
            TransactionType::Sale => "sale",
            TransactionType::PurchaseReturn => "purchase_return",
            TransactionType::SaleReturn => "sale_return",
            TransactionType::Adjustment => "adjustment",
            TransactionType::BatchDeleted => "batch_deleted",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "opening" => Some(TransactionType::Opening),
            "purchase" => Some(TransactionType::Purchase),
            "sale" => Some(TransactionType::Sale),
            "purchase_return" => Some(TransactionType::PurchaseReturn),
            "sale_return" => Some(TransactionType::SaleReturn),
            "adjustment" => Some(TransactionType::Adjustment),
            "batch_deleted" => Some(TransactionType::BatchDeleted),
            _ => None,
        }
    }
}

/// One entry of an item's stock timeline
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEntry {
    pub id: Uuid,
    pub inventory_id: Uuid,
    pub batch_id: Option<Uuid>,
    pub batch_number: Option<String>,
    pub transaction_type: TransactionType,
    /// Signed change in loose units
    pub quantity_change: i64,
    pub reference: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Signed stock movement between two flat quantities
pub fn quantity_delta(before: u64, after: u64) -> i64 {
    let before = i64::try_from(before).unwrap_or(i64::MAX);
    let after = i64::try_from(after).unwrap_or(i64::MAX);
    after - before
}
