//! Payment service: recording, searching and exporting payments

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::models::{
    format_payment_number, round2, search_pattern, CreatePaymentInput, PaginatedResponse,
    Pagination, Payment, PaymentDirection, PaymentMethod,
};

#[derive(Clone)]
pub struct PaymentService {
    db: PgPool,
}

#[derive(Debug, FromRow)]
struct PaymentRow {
    id: Uuid,
    payment_number: String,
    party_name: String,
    direction: String,
    method: String,
    amount: Decimal,
    remarks: Option<String>,
    payment_date: NaiveDate,
    created_at: DateTime<Utc>,
}

impl TryFrom<PaymentRow> for Payment {
    type Error = AppError;

    fn try_from(row: PaymentRow) -> Result<Self, Self::Error> {
        let direction = PaymentDirection::parse(&row.direction)
            .ok_or_else(|| AppError::Internal(format!("Unknown direction: {}", row.direction)))?;
        let method = PaymentMethod::parse(&row.method)
            .ok_or_else(|| AppError::Internal(format!("Unknown payment method: {}", row.method)))?;

        Ok(Payment {
            id: row.id,
            payment_number: row.payment_number,
            party_name: row.party_name,
            direction,
            method,
            amount: row.amount,
            remarks: row.remarks,
            payment_date: row.payment_date,
            created_at: row.created_at,
        })
    }
}

/// Flat payment row for CSV export
#[derive(Debug, Serialize)]
pub struct PaymentExportRow {
    #[serde(rename = "Payment No")]
    pub payment_number: String,
    #[serde(rename = "Date")]
    pub payment_date: NaiveDate,
    #[serde(rename = "Party")]
    pub party_name: String,
    #[serde(rename = "Type")]
    pub direction: &'static str,
    #[serde(rename = "Method")]
    pub method: &'static str,
    #[serde(rename = "Amount")]
    pub amount: String,
    #[serde(rename = "Remarks")]
    pub remarks: String,
}

impl From<&Payment> for PaymentExportRow {
    fn from(payment: &Payment) -> Self {
        Self {
            payment_number: payment.payment_number.clone(),
            payment_date: payment.payment_date,
            party_name: payment.party_name.clone(),
            direction: payment.direction.as_str(),
            method: payment.method.as_str(),
            amount: round2(payment.amount).to_string(),
            remarks: payment.remarks.clone().unwrap_or_default(),
        }
    }
}

/// Totals of payments in a period
#[derive(Debug, Clone, Copy, Default)]
pub struct PaymentTotals {
    pub payments_in: Decimal,
    pub payments_out: Decimal,
}

const PAYMENT_COLUMNS: &str = "id, payment_number, party_name, direction, method, amount, \
     remarks, payment_date, created_at";

impl PaymentService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Page through payments, optionally filtered by a party name or
    /// payment number search
    pub async fn list_payments(
        &self,
        shop_id: Uuid,
        search: Option<&str>,
        pagination: Pagination,
    ) -> AppResult<PaginatedResponse<Payment>> {
        let pattern = search_pattern(search);

        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM payments
            WHERE shop_id = $1
              AND ($2::TEXT IS NULL OR party_name ILIKE $2 OR payment_number ILIKE $2)
            "#,
        )
        .bind(shop_id)
        .bind(&pattern)
        .fetch_one(&self.db)
        .await?;

        let rows = sqlx::query_as::<_, PaymentRow>(&format!(
            r#"
            SELECT {}
            FROM payments
            WHERE shop_id = $1
              AND ($2::TEXT IS NULL OR party_name ILIKE $2 OR payment_number ILIKE $2)
            ORDER BY payment_date DESC, created_at DESC
            LIMIT $3 OFFSET $4
            "#,
            PAYMENT_COLUMNS
        ))
        .bind(shop_id)
        .bind(&pattern)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.db)
        .await?;

        let payments = rows
            .into_iter()
            .map(Payment::try_from)
            .collect::<AppResult<Vec<_>>>()?;

        Ok(PaginatedResponse::new(
            payments,
            pagination,
            u64::try_from(total).unwrap_or(0),
        ))
    }

    /// Every payment matching the search, for export
    pub async fn search_all(&self, shop_id: Uuid, search: Option<&str>) -> AppResult<Vec<Payment>> {
        let rows = sqlx::query_as::<_, PaymentRow>(&format!(
            r#"
            SELECT {}
            FROM payments
            WHERE shop_id = $1
              AND ($2::TEXT IS NULL OR party_name ILIKE $2 OR payment_number ILIKE $2)
            ORDER BY payment_date DESC, created_at DESC
            "#,
            PAYMENT_COLUMNS
        ))
        .bind(shop_id)
        .bind(search_pattern(search))
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(Payment::try_from).collect()
    }

    /// Record a payment and assign it the next number for its direction
    pub async fn create_payment(
        &self,
        shop_id: Uuid,
        user_id: Uuid,
        input: CreatePaymentInput,
    ) -> AppResult<Payment> {
        input.validate()?;

        let mut tx = self.db.begin().await?;

        // Serialise numbering per shop
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1::TEXT))")
            .bind(shop_id.to_string())
            .execute(&mut *tx)
            .await?;

        let issued = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM payments WHERE shop_id = $1 AND direction = $2",
        )
        .bind(shop_id)
        .bind(input.direction.as_str())
        .fetch_one(&mut *tx)
        .await?;

        let payment_number =
            format_payment_number(input.direction, u64::try_from(issued).unwrap_or(0) + 1);
        let payment_date = input
            .payment_date
            .unwrap_or_else(|| Utc::now().date_naive());

        let row = sqlx::query_as::<_, PaymentRow>(&format!(
            r#"
            INSERT INTO payments (
                shop_id, payment_number, party_name, direction, method, amount,
                remarks, payment_date, created_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {}
            "#,
            PAYMENT_COLUMNS
        ))
        .bind(shop_id)
        .bind(&payment_number)
        .bind(input.party_name.trim())
        .bind(input.direction.as_str())
        .bind(input.method.as_str())
        .bind(round2(input.amount))
        .bind(&input.remarks)
        .bind(payment_date)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::from_unique_violation(e, "payment number"))?;

        tx.commit().await?;

        tracing::info!(payment_number = %payment_number, "Payment recorded");

        row.try_into()
    }

    /// Payments in and out between two dates, inclusive
    pub async fn totals_between(
        &self,
        shop_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> AppResult<PaymentTotals> {
        let (payments_in, payments_out) = sqlx::query_as::<_, (Decimal, Decimal)>(
            r#"
            SELECT
                COALESCE(SUM(amount) FILTER (WHERE direction = 'in'), 0),
                COALESCE(SUM(amount) FILTER (WHERE direction = 'out'), 0)
            FROM payments
            WHERE shop_id = $1 AND payment_date BETWEEN $2 AND $3
            "#,
        )
        .bind(shop_id)
        .bind(from)
        .bind(to)
        .fetch_one(&self.db)
        .await?;

        Ok(PaymentTotals {
            payments_in,
            payments_out,
        })
    }

    /// Export payments as CSV
    pub fn export_to_csv(payments: &[Payment]) -> AppResult<String> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        for payment in payments {
            wtr.serialize(PaymentExportRow::from(payment))
                .map_err(|e| AppError::Internal(format!("CSV serialization error: {}", e)))?;
        }
        let bytes = wtr
            .into_inner()
            .map_err(|e| AppError::Internal(format!("CSV writer error: {}", e)))?;
        String::from_utf8(bytes)
            .map_err(|e| AppError::Internal(format!("UTF-8 conversion error: {}", e)))
    }
}
