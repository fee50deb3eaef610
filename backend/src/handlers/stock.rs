//! HTTP handlers for stock endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::stock::{AdjustStockInput, StockService};
use crate::AppState;
use shared::models::Stock;

/// List stock balances for active products
pub async fn list_stocks(State(state): State<AppState>) -> AppResult<Json<Vec<Stock>>> {
    let service = StockService::new(state.db);
    Ok(Json(service.list().await?))
}

/// Get a stock row by id
pub async fn get_stock(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Stock>> {
    let service = StockService::new(state.db);
    Ok(Json(service.get(id).await?))
}

/// List stock balances at one warehouse
pub async fn list_stocks_by_warehouse(
    State(state): State<AppState>,
    Path(warehouse_id): Path<Uuid>,
) -> AppResult<Json<Vec<Stock>>> {
    let service = StockService::new(state.db);
    Ok(Json(service.by_warehouse(warehouse_id).await?))
}

/// List stock balances of one product across warehouses
pub async fn list_stocks_by_product(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<Vec<Stock>>> {
    let service = StockService::new(state.db);
    Ok(Json(service.by_product(product_id).await?))
}

/// Set absolute quantities on a stock row
pub async fn adjust_stock(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<AdjustStockInput>,
) -> AppResult<Json<Stock>> {
    let service = StockService::new(state.db);
    Ok(Json(service.adjust(id, input).await?))
}
