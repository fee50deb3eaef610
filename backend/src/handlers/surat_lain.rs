//! HTTP handlers for SuratLain (miscellaneous movement) endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::handlers::ViewQuery;
use crate::middleware::CurrentUser;
use crate::services::SuratLainService;
use crate::AppState;
use shared::models::{SuratLain, SuratLainInput};

/// List documents, filtered by the `?view=` parameter
pub async fn list_surat_lain(
    State(state): State<AppState>,
    Query(query): Query<ViewQuery>,
) -> AppResult<Json<Vec<SuratLain>>> {
    let service = SuratLainService::new(state.db);
    Ok(Json(service.list(query.filter()).await?))
}

/// Get a document by id
pub async fn get_surat_lain(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<SuratLain>> {
    let service = SuratLainService::new(state.db);
    Ok(Json(service.get(id).await?))
}

/// Create a document
pub async fn create_surat_lain(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<SuratLainInput>,
) -> AppResult<Json<SuratLain>> {
    let service = SuratLainService::new(state.db);
    Ok(Json(service.create(current_user.0.user_id, input).await?))
}

/// Update a document
pub async fn update_surat_lain(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<SuratLainInput>,
) -> AppResult<Json<SuratLain>> {
    let service = SuratLainService::new(state.db);
    Ok(Json(service.update(id, input).await?))
}

/// Soft-delete a document
pub async fn delete_surat_lain(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<()>> {
    let service = SuratLainService::new(state.db);
    service.soft_delete(id).await?;
    Ok(Json(()))
}

/// Restore a soft-deleted document
pub async fn restore_surat_lain(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<SuratLain>> {
    let service = SuratLainService::new(state.db);
    Ok(Json(service.restore(id).await?))
}
