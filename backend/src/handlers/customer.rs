//! HTTP handlers for customer endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::handlers::ViewQuery;
use crate::services::customer::{CustomerInput, CustomerService};
use crate::AppState;
use shared::models::Customer;

/// List customers, filtered by the `?view=` parameter
pub async fn list_customers(
    State(state): State<AppState>,
    Query(query): Query<ViewQuery>,
) -> AppResult<Json<Vec<Customer>>> {
    let service = CustomerService::new(state.db);
    Ok(Json(service.list(query.filter()).await?))
}

/// Get a customer by id
pub async fn get_customer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Customer>> {
    let service = CustomerService::new(state.db);
    Ok(Json(service.get(id).await?))
}

/// Create a customer
pub async fn create_customer(
    State(state): State<AppState>,
    Json(input): Json<CustomerInput>,
) -> AppResult<Json<Customer>> {
    let service = CustomerService::new(state.db);
    Ok(Json(service.create(input).await?))
}

/// Update a customer
pub async fn update_customer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<CustomerInput>,
) -> AppResult<Json<Customer>> {
    let service = CustomerService::new(state.db);
    Ok(Json(service.update(id, input).await?))
}

/// Soft-delete a customer
pub async fn delete_customer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<()>> {
    let service = CustomerService::new(state.db);
    service.soft_delete(id).await?;
    Ok(Json(()))
}

/// Restore a soft-deleted customer
pub async fn restore_customer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Customer>> {
    let service = CustomerService::new(state.db);
    Ok(Json(service.restore(id).await?))
}
