//! Dashboard metric models

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Batch;
use crate::date_range::DateFilter;
use crate::error::InputError;
use crate::gst::round2;
use crate::quantity::effective_pack;
use crate::types::DateTimeRange;

/// Thresholds used when classifying stock
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StockThresholds {
    /// A batch holding fewer whole packs than this is low on stock
    pub low_stock_packs: u32,
    /// Batches expiring within this many months are flagged
    pub expiry_warning_months: u32,
}

impl Default for StockThresholds {
    fn default() -> Self {
        Self {
            low_stock_packs: 1,
            expiry_warning_months: 3,
        }
    }
}

/// Stock position across all batches
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StockSummary {
    /// Valued at the GST-exclusive purchase rate per pack
    pub stock_value: Decimal,
    pub batch_count: u64,
    pub low_stock: u64,
    pub expiring_soon: u64,
    pub expired: u64,
}

impl StockSummary {
    /// Fails when the stock value does not fit in a `Decimal`
    pub fn from_batches(
        batches: &[Batch],
        today: NaiveDate,
        thresholds: StockThresholds,
    ) -> Result<Self, InputError> {
        let overflow = InputError::OutOfRange {
            field: "stock_value",
        };
        let mut summary = StockSummary::default();
        for batch in batches {
            let pack = effective_pack(batch.pack);
            summary.batch_count += 1;
            let value = Decimal::from(batch.quantity)
                .checked_mul(batch.purchase_rate)
                .and_then(|v| v.checked_div(Decimal::from(pack)))
                .ok_or_else(|| overflow.clone())?;
            summary.stock_value = summary
                .stock_value
                .checked_add(value)
                .ok_or_else(|| overflow.clone())?;

            if batch.quantity < u64::from(thresholds.low_stock_packs) * pack {
                summary.low_stock += 1;
            }

            if let Some(expiry) = batch.expiry() {
                if expiry.is_expired_on(today) {
                    summary.expired += 1;
                } else if expiry.expires_within(today, thresholds.expiry_warning_months) {
                    summary.expiring_soon += 1;
                }
            }
        }
        summary.stock_value = round2(summary.stock_value);
        Ok(summary)
    }
}

/// Payment totals for a period
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CashFlow {
    pub payments_in: Decimal,
    pub payments_out: Decimal,
    pub net: Decimal,
}

impl CashFlow {
    pub fn new(payments_in: Decimal, payments_out: Decimal) -> Self {
        Self {
            payments_in: round2(payments_in),
            payments_out: round2(payments_out),
            net: round2(payments_in - payments_out),
        }
    }
}

/// Response of the dashboard metrics endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMetrics {
    pub filter: DateFilter,
    pub range: DateTimeRange,
    pub cash_flow: CashFlow,
    pub stock: StockSummary,
    /// Stock movements recorded in the period
    pub transactions: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn batch(expiry: &str, quantity: u64, pack: u32, purchase_rate: &str) -> Batch {
        Batch {
            id: Uuid::new_v4(),
            inventory_id: Uuid::nil(),
            batch_number: "B".to_string(),
            expiry: expiry.to_string(),
            mrp: Decimal::ZERO,
            hsn: None,
            gst_per: Decimal::from(12),
            purchase_rate: purchase_rate.parse().unwrap(),
            sale_rate: Decimal::ZERO,
            pack,
            quantity,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_stock_summary() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let batches = vec![
            batch("05/24", 100, 10, "20"),
            batch("08/24", 5, 10, "20"),
            batch("12/26", 25, 10, "40"),
            batch("bad", 10, 0, "3"),
        ];
        let summary =
            StockSummary::from_batches(&batches, today, StockThresholds::default()).unwrap();

        assert_eq!(summary.batch_count, 4);
        assert_eq!(summary.expired, 1);
        assert_eq!(summary.expiring_soon, 1);
        assert_eq!(summary.low_stock, 1);
        // 200 + 10 + 100 + 30
        assert_eq!(summary.stock_value, Decimal::from(340));
    }

    #[test]
    fn test_empty_summary() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let summary = StockSummary::from_batches(&[], today, StockThresholds::default()).unwrap();
        assert_eq!(summary, StockSummary::default());
    }

    #[test]
    fn test_stock_value_overflow() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let batches = vec![batch("12/26", u64::MAX, 1, "70000000000000000000000000000")];
        assert_eq!(
            StockSummary::from_batches(&batches, today, StockThresholds::default()),
            Err(InputError::OutOfRange {
                field: "stock_value"
            })
        );

        // Each batch fits but the running total does not
        let big = batch("12/26", 1, 1, "70000000000000000000000000000");
        let batches = vec![big.clone(), big];
        assert!(StockSummary::from_batches(&batches, today, StockThresholds::default()).is_err());
    }

    #[test]
    fn test_cash_flow() {
        let flow = CashFlow::new(Decimal::from(1000), "250.255".parse().unwrap());
        assert_eq!(flow.payments_out, "250.26".parse::<Decimal>().unwrap());
        assert_eq!(flow.net, "749.75".parse::<Decimal>().unwrap());
    }
}
