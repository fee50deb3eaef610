//! HTTP handlers for stock transfer endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::handlers::ViewQuery;
use crate::middleware::CurrentUser;
use crate::services::TransferService;
use crate::AppState;
use shared::models::{StockTransfer, StockTransferInput};

/// List transfers, filtered by the `?view=` parameter
pub async fn list_transfers(
    State(state): State<AppState>,
    Query(query): Query<ViewQuery>,
) -> AppResult<Json<Vec<StockTransfer>>> {
    let service = TransferService::new(state.db);
    Ok(Json(service.list(query.filter()).await?))
}

/// Get a transfer by id
pub async fn get_transfer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<StockTransfer>> {
    let service = TransferService::new(state.db);
    Ok(Json(service.get(id).await?))
}

/// Create a transfer
pub async fn create_transfer(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<StockTransferInput>,
) -> AppResult<Json<StockTransfer>> {
    let service = TransferService::new(state.db);
    Ok(Json(service.create(current_user.0.user_id, input).await?))
}

/// Update a transfer
pub async fn update_transfer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<StockTransferInput>,
) -> AppResult<Json<StockTransfer>> {
    let service = TransferService::new(state.db);
    Ok(Json(service.update(id, input).await?))
}

/// Soft-delete a transfer
pub async fn delete_transfer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<()>> {
    let service = TransferService::new(state.db);
    service.soft_delete(id).await?;
    Ok(Json(()))
}

/// Restore a soft-deleted transfer
pub async fn restore_transfer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<StockTransfer>> {
    let service = TransferService::new(state.db);
    Ok(Json(service.restore(id).await?))
}
