//! HTTP handlers for SPG (goods receipt) endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::handlers::ViewQuery;
use crate::middleware::CurrentUser;
use crate::services::SpgService;
use crate::AppState;
use shared::models::{Spg, SpgInput};

/// List goods receipts, filtered by the `?view=` parameter
pub async fn list_spg(
    State(state): State<AppState>,
    Query(query): Query<ViewQuery>,
) -> AppResult<Json<Vec<Spg>>> {
    let service = SpgService::new(state.db);
    Ok(Json(service.list(query.filter()).await?))
}

/// Get a goods receipt by id
pub async fn get_spg(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Spg>> {
    let service = SpgService::new(state.db);
    Ok(Json(service.get(id).await?))
}

/// Create a goods receipt
pub async fn create_spg(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<SpgInput>,
) -> AppResult<Json<Spg>> {
    let service = SpgService::new(state.db);
    Ok(Json(service.create(current_user.0.user_id, input).await?))
}

/// Update a goods receipt
pub async fn update_spg(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<SpgInput>,
) -> AppResult<Json<Spg>> {
    let service = SpgService::new(state.db);
    Ok(Json(service.update(id, input).await?))
}

/// Soft-delete a goods receipt
pub async fn delete_spg(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<()>> {
    let service = SpgService::new(state.db);
    service.soft_delete(id).await?;
    Ok(Json(()))
}

/// Restore a soft-deleted goods receipt
pub async fn restore_spg(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Spg>> {
    let service = SpgService::new(state.db);
    Ok(Json(service.restore(id).await?))
}
