//! Product catalog models

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A product category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A catalog product
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    /// Unique product code
    pub code: String,
    pub name: String,
    pub category_id: Uuid,
    pub category_name: String,
    pub supplier_id: Uuid,
    pub supplier_name: String,
    pub supplier_price: Decimal,
    /// Packing description (e.g., "24 x 200g")
    pub packing: String,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Product with its stock balances per warehouse
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    /// Warehouse name -> quantities; empty for deleted products
    pub stocks: BTreeMap<String, WarehouseQuantities>,
}

/// Quantities held at one warehouse
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct WarehouseQuantities {
    pub carton: i32,
    pub pack: i32,
}
