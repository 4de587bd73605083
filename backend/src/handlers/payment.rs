//! HTTP handlers for payment endpoints

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::models::{CreatePaymentInput, Pagination, Payment};
use crate::services::PaymentService;
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentQuery {
    pub search: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub format: Option<String>, // "json" or "csv"
}

/// List payments, or export them when `format=csv`
pub async fn list_payments(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<PaymentQuery>,
) -> AppResult<Response> {
    let service = PaymentService::new(state.db);
    let shop_id = current_user.0.shop_id;

    if query.format.as_deref() == Some("csv") {
        let payments = service.search_all(shop_id, query.search.as_deref()).await?;
        let csv = PaymentService::export_to_csv(&payments)?;
        return Ok((
            [
                (header::CONTENT_TYPE, "text/csv"),
                (header::CONTENT_DISPOSITION, "attachment; filename=\"payments.csv\""),
            ],
            csv,
        )
            .into_response());
    }

    let page = service
        .list_payments(
            shop_id,
            query.search.as_deref(),
            Pagination::from_query(query.page, query.per_page),
        )
        .await?;
    Ok(Json(page).into_response())
}

/// Record a payment
pub async fn create_payment(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreatePaymentInput>,
) -> AppResult<(StatusCode, Json<Payment>)> {
    let service = PaymentService::new(state.db);
    let payment = service
        .create_payment(current_user.0.shop_id, current_user.0.user_id, input)
        .await?;
    Ok((StatusCode::CREATED, Json(payment)))
}
