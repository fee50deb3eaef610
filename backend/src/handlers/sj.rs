//! HTTP handlers for SJ (delivery note) endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::handlers::ViewQuery;
use crate::middleware::CurrentUser;
use crate::services::SjService;
use crate::AppState;
use shared::models::{Sj, SjInput};

/// List delivery notes, filtered by the `?view=` parameter
pub async fn list_sj(
    State(state): State<AppState>,
    Query(query): Query<ViewQuery>,
) -> AppResult<Json<Vec<Sj>>> {
    let service = SjService::new(state.db);
    Ok(Json(service.list(query.filter()).await?))
}

/// Get a delivery note by id
pub async fn get_sj(State(state): State<AppState>, Path(id): Path<Uuid>) -> AppResult<Json<Sj>> {
    let service = SjService::new(state.db);
    Ok(Json(service.get(id).await?))
}

/// Create a delivery note
pub async fn create_sj(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<SjInput>,
) -> AppResult<Json<Sj>> {
    let service = SjService::new(state.db);
    Ok(Json(service.create(current_user.0.user_id, input).await?))
}

/// Update a delivery note
pub async fn update_sj(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<SjInput>,
) -> AppResult<Json<Sj>> {
    let service = SjService::new(state.db);
    Ok(Json(service.update(id, input).await?))
}

/// Soft-delete a delivery note
pub async fn delete_sj(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<()>> {
    let service = SjService::new(state.db);
    service.soft_delete(id).await?;
    Ok(Json(()))
}

/// Restore a soft-deleted delivery note
pub async fn restore_sj(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Sj>> {
    let service = SjService::new(state.db);
    Ok(Json(service.restore(id).await?))
}
