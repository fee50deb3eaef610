//! HTTP handlers for SPK (work order) endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::handlers::ViewQuery;
use crate::middleware::CurrentUser;
use crate::services::SpkService;
use crate::AppState;
use shared::models::{Spk, SpkInput};

/// List work orders, filtered by the `?view=` parameter
pub async fn list_spk(
    State(state): State<AppState>,
    Query(query): Query<ViewQuery>,
) -> AppResult<Json<Vec<Spk>>> {
    let service = SpkService::new(state.db);
    Ok(Json(service.list(query.filter()).await?))
}

/// Get a work order by id
pub async fn get_spk(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Spk>> {
    let service = SpkService::new(state.db);
    Ok(Json(service.get(id).await?))
}

/// Create a work order
pub async fn create_spk(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<SpkInput>,
) -> AppResult<Json<Spk>> {
    let service = SpkService::new(state.db);
    Ok(Json(service.create(current_user.0.user_id, input).await?))
}

/// Update a work order
pub async fn update_spk(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<SpkInput>,
) -> AppResult<Json<Spk>> {
    let service = SpkService::new(state.db);
    Ok(Json(service.update(id, input).await?))
}

/// Soft-delete a work order
pub async fn delete_spk(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<()>> {
    let service = SpkService::new(state.db);
    service.soft_delete(id).await?;
    Ok(Json(()))
}

/// Restore a soft-deleted work order
pub async fn restore_spk(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Spk>> {
    let service = SpkService::new(state.db);
    Ok(Json(service.restore(id).await?))
}
