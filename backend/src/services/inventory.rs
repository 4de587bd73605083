//! Inventory service: batch management and the stock timeline

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::models::{
    quantity_delta, Batch, BatchRecord, BatchView, InventoryItem, InventoryItemDetails,
    ManageBatchInput, PaginatedResponse, Pagination, TimelineEntry, TransactionType,
};

/// Inventory service for managing batches and their stock movements
#[derive(Clone)]
pub struct InventoryService {
    db: PgPool,
}

/// Row for inventory item queries
#[derive(Debug, FromRow)]
struct ItemRow {
    id: Uuid,
    shop_id: Uuid,
    name: String,
    item_code: Option<String>,
    manufacturer: Option<String>,
    primary_unit: Option<String>,
    secondary_unit: Option<String>,
    pack: i32,
    gst_per: Decimal,
    hsn: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ItemRow> for InventoryItem {
    fn from(row: ItemRow) -> Self {
        InventoryItem {
            id: row.id,
            shop_id: row.shop_id,
            name: row.name,
            item_code: row.item_code,
            manufacturer: row.manufacturer,
            primary_unit: row.primary_unit,
            secondary_unit: row.secondary_unit,
            pack: u32::try_from(row.pack).unwrap_or(0),
            gst_per: row.gst_per,
            hsn: row.hsn,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Row for batch queries
#[derive(Debug, FromRow)]
struct BatchRow {
    id: Uuid,
    inventory_id: Uuid,
    batch_number: String,
    expiry: String,
    mrp: Decimal,
    hsn: Option<String>,
    gst_per: Decimal,
    purchase_rate: Decimal,
    sale_rate: Decimal,
    pack: i32,
    quantity: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<BatchRow> for Batch {
    fn from(row: BatchRow) -> Self {
        Batch {
            id: row.id,
            inventory_id: row.inventory_id,
            batch_number: row.batch_number,
            expiry: row.expiry,
            mrp: row.mrp,
            hsn: row.hsn,
            gst_per: row.gst_per,
            purchase_rate: row.purchase_rate,
            sale_rate: row.sale_rate,
            pack: u32::try_from(row.pack).unwrap_or(1),
            quantity: u64::try_from(row.quantity).unwrap_or(0),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Row for timeline queries
#[derive(Debug, FromRow)]
struct TimelineRow {
    id: Uuid,
    inventory_id: Uuid,
    batch_id: Option<Uuid>,
    batch_number: Option<String>,
    transaction_type: String,
    quantity_change: i64,
    reference: Option<String>,
    notes: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<TimelineRow> for TimelineEntry {
    type Error = AppError;

    fn try_from(row: TimelineRow) -> Result<Self, Self::Error> {
        let transaction_type = TransactionType::parse(&row.transaction_type).ok_or_else(|| {
            AppError::Internal(format!("Unknown transaction type: {}", row.transaction_type))
        })?;

        Ok(TimelineEntry {
            id: row.id,
            inventory_id: row.inventory_id,
            batch_id: row.batch_id,
            batch_number: row.batch_number,
            transaction_type,
            quantity_change: row.quantity_change,
            reference: row.reference,
            notes: row.notes,
            created_at: row.created_at,
        })
    }
}

/// A stock movement about to be written to the timeline
struct Movement<'a> {
    shop_id: Uuid,
    user_id: Uuid,
    inventory_id: Uuid,
    batch_id: Uuid,
    batch_number: &'a str,
    transaction_type: TransactionType,
    quantity_change: i64,
}

const BATCH_COLUMNS: &str = "id, inventory_id, batch_number, expiry, mrp, hsn, gst_per, \
     purchase_rate, sale_rate, pack, quantity, created_at, updated_at";

const ITEM_COLUMNS: &str = "id, shop_id, name, item_code, manufacturer, primary_unit, \
     secondary_unit, pack, gst_per, hsn, created_at, updated_at";

fn to_db_quantity(quantity: u64) -> AppResult<i64> {
    i64::try_from(quantity).map_err(|_| AppError::Validation {
        field: "quantity".to_string(),
        message: "quantity is out of range".to_string(),
    })
}

fn to_db_pack(pack: u32) -> AppResult<i32> {
    i32::try_from(pack).map_err(|_| AppError::Validation {
        field: "pack".to_string(),
        message: "pack is out of range".to_string(),
    })
}

impl InventoryService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create or update a batch. Rates are stored in canonical form and any
    /// change in quantity lands on the item's timeline.
    pub async fn manage_batch(
        &self,
        shop_id: Uuid,
        user_id: Uuid,
        input: ManageBatchInput,
    ) -> AppResult<BatchView> {
        input.validate()?;
        let record = input.into_record()?;

        let mut tx = self.db.begin().await?;

        let item = Self::fetch_item(&mut tx, shop_id, record.inventory_id).await?;

        let batch = match record.batch_id {
            Some(batch_id) => {
                let existing = Self::fetch_batch_for_update(&mut tx, &record, batch_id).await?;
                let batch = Self::update_batch(&mut tx, batch_id, &record).await?;
                let change = quantity_delta(existing.quantity, batch.quantity);
                if change != 0 {
                    Self::record_movement(
                        &mut tx,
                        Movement {
                            shop_id,
                            user_id,
                            inventory_id: batch.inventory_id,
                            batch_id: batch.id,
                            batch_number: &batch.batch_number,
                            transaction_type: TransactionType::Adjustment,
                            quantity_change: change,
                        },
                    )
                    .await?;
                }
                batch
            }
            None => {
                let batch = Self::insert_batch(&mut tx, &record).await?;
                Self::record_movement(
                    &mut tx,
                    Movement {
                        shop_id,
                        user_id,
                        inventory_id: batch.inventory_id,
                        batch_id: batch.id,
                        batch_number: &batch.batch_number,
                        transaction_type: TransactionType::Opening,
                        quantity_change: quantity_delta(0, batch.quantity),
                    },
                )
                .await?;
                batch
            }
        };

        tx.commit().await?;

        tracing::info!(
            batch_id = %batch.id,
            inventory_id = %batch.inventory_id,
            quantity = batch.quantity,
            "Batch saved"
        );

        Ok(BatchView::new(batch, &item, Utc::now().date_naive()))
    }

    /// Item with its batches and display quantities
    pub async fn get_item_details(
        &self,
        shop_id: Uuid,
        inventory_id: Uuid,
    ) -> AppResult<InventoryItemDetails> {
        let item: InventoryItem = sqlx::query_as::<_, ItemRow>(&format!(
            "SELECT {} FROM inventory_items WHERE id = $1 AND shop_id = $2",
            ITEM_COLUMNS
        ))
        .bind(inventory_id)
        .bind(shop_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Inventory item".to_string()))?
        .into();

        let batches = sqlx::query_as::<_, BatchRow>(&format!(
            "SELECT {} FROM inventory_batches WHERE inventory_id = $1 ORDER BY batch_number",
            BATCH_COLUMNS
        ))
        .bind(inventory_id)
        .fetch_all(&self.db)
        .await?
        .into_iter()
        .map(Batch::from)
        .collect::<Vec<_>>();

        Ok(InventoryItemDetails::new(
            item,
            sort_by_expiry(batches),
            Utc::now().date_naive(),
        ))
    }

    /// Delete a batch; the removed stock is recorded on the timeline
    pub async fn delete_batch(
        &self,
        shop_id: Uuid,
        user_id: Uuid,
        batch_id: Uuid,
    ) -> AppResult<Uuid> {
        let mut tx = self.db.begin().await?;

        let batch: Batch = sqlx::query_as::<_, BatchRow>(
            r#"
            DELETE FROM inventory_batches b
            USING inventory_items i
            WHERE b.id = $1 AND b.inventory_id = i.id AND i.shop_id = $2
            RETURNING b.id, b.inventory_id, b.batch_number, b.expiry, b.mrp, b.hsn, b.gst_per,
                      b.purchase_rate, b.sale_rate, b.pack, b.quantity, b.created_at, b.updated_at
            "#,
        )
        .bind(batch_id)
        .bind(shop_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Batch".to_string()))?
        .into();

        Self::record_movement(
            &mut tx,
            Movement {
                shop_id,
                user_id,
                inventory_id: batch.inventory_id,
                batch_id: batch.id,
                batch_number: &batch.batch_number,
                transaction_type: TransactionType::BatchDeleted,
                quantity_change: quantity_delta(batch.quantity, 0),
            },
        )
        .await?;

        tx.commit().await?;

        tracing::info!(batch_id = %batch.id, "Batch deleted");

        Ok(batch.id)
    }

    /// Stock timeline of an item, newest first
    pub async fn get_timeline(
        &self,
        shop_id: Uuid,
        inventory_id: Uuid,
        pagination: Pagination,
    ) -> AppResult<PaginatedResponse<TimelineEntry>> {
        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM inventory_transactions WHERE inventory_id = $1 AND shop_id = $2",
        )
        .bind(inventory_id)
        .bind(shop_id)
        .fetch_one(&self.db)
        .await?;

        let rows = sqlx::query_as::<_, TimelineRow>(
            r#"
            SELECT id, inventory_id, batch_id, batch_number, transaction_type, quantity_change,
                   reference, notes, created_at
            FROM inventory_transactions
            WHERE inventory_id = $1 AND shop_id = $2
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(inventory_id)
        .bind(shop_id)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.db)
        .await?;

        let entries = rows
            .into_iter()
            .map(TimelineEntry::try_from)
            .collect::<AppResult<Vec<_>>>()?;

        Ok(PaginatedResponse::new(
            entries,
            pagination,
            u64::try_from(total).unwrap_or(0),
        ))
    }

    /// Every batch the shop holds
    pub async fn list_shop_batches(&self, shop_id: Uuid) -> AppResult<Vec<Batch>> {
        let rows = sqlx::query_as::<_, BatchRow>(
            r#"
            SELECT b.id, b.inventory_id, b.batch_number, b.expiry, b.mrp, b.hsn, b.gst_per,
                   b.purchase_rate, b.sale_rate, b.pack, b.quantity, b.created_at, b.updated_at
            FROM inventory_batches b
            JOIN inventory_items i ON i.id = b.inventory_id
            WHERE i.shop_id = $1
            "#,
        )
        .bind(shop_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Batch::from).collect())
    }

    /// Stock movements recorded in a period
    pub async fn count_movements(
        &self,
        shop_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> AppResult<u64> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM inventory_transactions
            WHERE shop_id = $1 AND created_at BETWEEN $2 AND $3
            "#,
        )
        .bind(shop_id)
        .bind(from)
        .bind(to)
        .fetch_one(&self.db)
        .await?;

        Ok(u64::try_from(count).unwrap_or(0))
    }

    async fn fetch_item(
        tx: &mut Transaction<'_, Postgres>,
        shop_id: Uuid,
        inventory_id: Uuid,
    ) -> AppResult<InventoryItem> {
        sqlx::query_as::<_, ItemRow>(&format!(
            "SELECT {} FROM inventory_items WHERE id = $1 AND shop_id = $2",
            ITEM_COLUMNS
        ))
        .bind(inventory_id)
        .bind(shop_id)
        .fetch_optional(&mut **tx)
        .await?
        .map(InventoryItem::from)
        .ok_or_else(|| AppError::NotFound("Inventory item".to_string()))
    }

    async fn fetch_batch_for_update(
        tx: &mut Transaction<'_, Postgres>,
        record: &BatchRecord,
        batch_id: Uuid,
    ) -> AppResult<Batch> {
        sqlx::query_as::<_, BatchRow>(&format!(
            "SELECT {} FROM inventory_batches WHERE id = $1 AND inventory_id = $2 FOR UPDATE",
            BATCH_COLUMNS
        ))
        .bind(batch_id)
        .bind(record.inventory_id)
        .fetch_optional(&mut **tx)
        .await?
        .map(Batch::from)
        .ok_or_else(|| AppError::NotFound("Batch".to_string()))
    }

    async fn insert_batch(
        tx: &mut Transaction<'_, Postgres>,
        record: &BatchRecord,
    ) -> AppResult<Batch> {
        let row = sqlx::query_as::<_, BatchRow>(&format!(
            r#"
            INSERT INTO inventory_batches (
                inventory_id, batch_number, expiry, mrp, hsn, gst_per,
                purchase_rate, sale_rate, pack, quantity
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {}
            "#,
            BATCH_COLUMNS
        ))
        .bind(record.inventory_id)
        .bind(&record.batch_number)
        .bind(record.expiry.to_string())
        .bind(record.mrp)
        .bind(&record.hsn)
        .bind(record.gst_per)
        .bind(record.purchase_rate)
        .bind(record.sale_rate)
        .bind(to_db_pack(record.pack)?)
        .bind(to_db_quantity(record.quantity)?)
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| AppError::from_unique_violation(e, "batch number"))?;

        Ok(row.into())
    }

    async fn update_batch(
        tx: &mut Transaction<'_, Postgres>,
        batch_id: Uuid,
        record: &BatchRecord,
    ) -> AppResult<Batch> {
        let row = sqlx::query_as::<_, BatchRow>(&format!(
            r#"
            UPDATE inventory_batches
            SET batch_number = $1, expiry = $2, mrp = $3, hsn = $4, gst_per = $5,
                purchase_rate = $6, sale_rate = $7, pack = $8, quantity = $9, updated_at = NOW()
            WHERE id = $10
            RETURNING {}
            "#,
            BATCH_COLUMNS
        ))
        .bind(&record.batch_number)
        .bind(record.expiry.to_string())
        .bind(record.mrp)
        .bind(&record.hsn)
        .bind(record.gst_per)
        .bind(record.purchase_rate)
        .bind(record.sale_rate)
        .bind(to_db_pack(record.pack)?)
        .bind(to_db_quantity(record.quantity)?)
        .bind(batch_id)
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| AppError::from_unique_violation(e, "batch number"))?;

        Ok(row.into())
    }

    async fn record_movement(
        tx: &mut Transaction<'_, Postgres>,
        movement: Movement<'_>,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO inventory_transactions (
                shop_id, inventory_id, batch_id, batch_number, transaction_type,
                quantity_change, created_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(movement.shop_id)
        .bind(movement.inventory_id)
        .bind(movement.batch_id)
        .bind(movement.batch_number)
        .bind(movement.transaction_type.as_str())
        .bind(movement.quantity_change)
        .bind(movement.user_id)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }
}

/// Earliest expiry first; unparseable expiries go last
fn sort_by_expiry(mut batches: Vec<Batch>) -> Vec<Batch> {
    batches.sort_by(|a, b| {
        let expiry = |batch: &Batch| {
            batch
                .expiry()
                .map(|e| e.last_day())
                .unwrap_or(NaiveDate::MAX)
        };
        expiry(a)
            .cmp(&expiry(b))
            .then_with(|| a.batch_number.cmp(&b.batch_number))
    });
    batches
}
