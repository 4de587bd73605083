//! Dashboard service aggregating cash flow and stock position for a period

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{CashFlow, DashboardMetrics, StockSummary, StockThresholds};
use crate::services::{InventoryService, PaymentService};
use shared::DateFilter;

#[derive(Clone)]
pub struct DashboardService {
    inventory: InventoryService,
    payments: PaymentService,
    thresholds: StockThresholds,
}

/// Interpret a wall-clock time in the server's zone
fn local_to_utc(naive: NaiveDateTime) -> DateTime<Utc> {
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| naive.and_utc())
}

impl DashboardService {
    pub fn new(db: PgPool, thresholds: StockThresholds) -> Self {
        Self {
            inventory: InventoryService::new(db.clone()),
            payments: PaymentService::new(db),
            thresholds,
        }
    }

    /// Metrics for the named filter, resolved against the current local time
    pub async fn get_metrics(
        &self,
        shop_id: Uuid,
        filter: DateFilter,
    ) -> AppResult<DashboardMetrics> {
        let now = Local::now().naive_local();
        let range = filter.resolve(now);

        let totals = self
            .payments
            .totals_between(shop_id, range.from.date(), range.to.date())
            .await?;

        let batches = self.inventory.list_shop_batches(shop_id).await?;
        let stock = StockSummary::from_batches(&batches, now.date(), self.thresholds)?;

        let transactions = self
            .inventory
            .count_movements(shop_id, local_to_utc(range.from), local_to_utc(range.to))
            .await?;

        tracing::debug!(
            filter = %filter,
            batches = stock.batch_count,
            "Dashboard metrics computed"
        );

        Ok(DashboardMetrics {
            filter,
            range,
            cash_flow: CashFlow::new(totals.payments_in, totals.payments_out),
            stock,
            transactions,
        })
    }
}
