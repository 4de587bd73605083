//! HTTP handlers for inventory endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::models::{
    BatchView, InventoryItemDetails, ManageBatchInput, PaginatedResponse, Pagination,
    TimelineEntry,
};
use crate::services::InventoryService;
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct DeletedBatch {
    pub id: Uuid,
}

/// Create a batch, or update it when `batchId` is present
pub async fn manage_batch(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<ManageBatchInput>,
) -> AppResult<(StatusCode, Json<BatchView>)> {
    let status = if input.batch_id.is_some() {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    let service = InventoryService::new(state.db);
    let batch = service
        .manage_batch(current_user.0.shop_id, current_user.0.user_id, input)
        .await?;
    Ok((status, Json(batch)))
}

/// Get an inventory item with its batches
pub async fn get_inventory_item(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(inventory_id): Path<Uuid>,
) -> AppResult<Json<InventoryItemDetails>> {
    let service = InventoryService::new(state.db);
    let details = service
        .get_item_details(current_user.0.shop_id, inventory_id)
        .await?;
    Ok(Json(details))
}

/// Delete a batch
pub async fn delete_batch(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(batch_id): Path<Uuid>,
) -> AppResult<Json<DeletedBatch>> {
    let service = InventoryService::new(state.db);
    let id = service
        .delete_batch(current_user.0.shop_id, current_user.0.user_id, batch_id)
        .await?;
    Ok(Json(DeletedBatch { id }))
}

/// Stock timeline of an item
pub async fn get_timeline(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(inventory_id): Path<Uuid>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<PaginatedResponse<TimelineEntry>>> {
    let service = InventoryService::new(state.db);
    let timeline = service
        .get_timeline(
            current_user.0.shop_id,
            inventory_id,
            Pagination::from_query(query.page, query.per_page),
        )
        .await?;
    Ok(Json(timeline))
}
