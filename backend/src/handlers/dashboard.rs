//! Dashboard handlers

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::models::DashboardMetrics;
use crate::services::DashboardService;
use crate::AppState;
use shared::DateFilter;

#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    /// UI label such as "This Week"; anything else means the last 30 days
    pub filter: Option<String>,
}

/// Get dashboard metrics for a date filter
pub async fn get_metrics(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<DashboardQuery>,
) -> AppResult<Json<DashboardMetrics>> {
    let filter = query
        .filter
        .as_deref()
        .map(DateFilter::from_label)
        .unwrap_or_default();
    let service = DashboardService::new(state.db, state.config.inventory.thresholds());
    let metrics = service.get_metrics(current_user.0.shop_id, filter).await?;
    Ok(Json(metrics))
}
