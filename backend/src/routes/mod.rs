//! Route definitions for the Warehouse Management Platform

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Master data
        .nest("/categories", category_routes())
        .nest("/suppliers", supplier_routes())
        .nest("/customers", customer_routes())
        .nest("/products", product_routes())
        .nest("/warehouses", warehouse_routes())
        .nest("/stocks", stock_routes())
        // Documents
        .nest("/spg", spg_routes())
        .nest("/spk", spk_routes())
        .nest("/sj", sj_routes())
        .nest("/transfers", transfer_routes())
        .nest("/surat-lain", surat_lain_routes())
}

/// Category management routes (protected)
fn category_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_categories).post(handlers::create_category),
        )
        .route(
            "/:id",
            get(handlers::get_category)
                .put(handlers::update_category)
                .delete(handlers::delete_category),
        )
        .route("/:id/products", get(handlers::list_products_by_category))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Supplier management routes (protected)
fn supplier_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_suppliers).post(handlers::create_supplier),
        )
        .route(
            "/:id",
            get(handlers::get_supplier)
                .put(handlers::update_supplier)
                .delete(handlers::delete_supplier),
        )
        .route("/:id/restore", post(handlers::restore_supplier))
        .route("/:id/products", get(handlers::list_products_by_supplier))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Customer management routes (protected)
fn customer_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_customers).post(handlers::create_customer),
        )
        .route(
            "/:id",
            get(handlers::get_customer)
                .put(handlers::update_customer)
                .delete(handlers::delete_customer),
        )
        .route("/:id/restore", post(handlers::restore_customer))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Product management routes (protected)
fn product_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_products).post(handlers::create_product),
        )
        .route(
            "/:id",
            get(handlers::get_product)
                .put(handlers::update_product)
                .delete(handlers::delete_product),
        )
        .route("/:id/restore", post(handlers::restore_product))
        .route("/:id/stocks", get(handlers::list_stocks_by_product))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Warehouse management routes (protected)
fn warehouse_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_warehouses).post(handlers::create_warehouse),
        )
        .route(
            "/:id",
            get(handlers::get_warehouse)
                .put(handlers::update_warehouse)
                .delete(handlers::delete_warehouse),
        )
        .route("/:id/stocks", get(handlers::list_stocks_by_warehouse))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Stock routes (protected)
fn stock_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_stocks))
        .route("/:id", get(handlers::get_stock))
        .route("/:id/adjust", put(handlers::adjust_stock))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Goods receipt routes (protected)
fn spg_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_spg).post(handlers::create_spg))
        .route(
            "/:id",
            get(handlers::get_spg)
                .put(handlers::update_spg)
                .delete(handlers::delete_spg),
        )
        .route("/:id/restore", post(handlers::restore_spg))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Work order routes (protected)
fn spk_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_spk).post(handlers::create_spk))
        .route(
            "/:id",
            get(handlers::get_spk)
                .put(handlers::update_spk)
                .delete(handlers::delete_spk),
        )
        .route("/:id/restore", post(handlers::restore_spk))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Delivery note routes (protected)
fn sj_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_sj).post(handlers::create_sj))
        .route(
            "/:id",
            get(handlers::get_sj)
                .put(handlers::update_sj)
                .delete(handlers::delete_sj),
        )
        .route("/:id/restore", post(handlers::restore_sj))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Stock transfer routes (protected)
fn transfer_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_transfers).post(handlers::create_transfer),
        )
        .route(
            "/:id",
            get(handlers::get_transfer)
                .put(handlers::update_transfer)
                .delete(handlers::delete_transfer),
        )
        .route("/:id/restore", post(handlers::restore_transfer))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Miscellaneous movement routes (protected)
fn surat_lain_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_surat_lain).post(handlers::create_surat_lain),
        )
        .route(
            "/:id",
            get(handlers::get_surat_lain)
                .put(handlers::update_surat_lain)
                .delete(handlers::delete_surat_lain),
        )
        .route("/:id/restore", post(handlers::restore_surat_lain))
        .route_layer(middleware::from_fn(auth_middleware))
}
