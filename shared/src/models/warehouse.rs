//! Warehouse and stock ledger models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A physical warehouse (e.g., G1, G2, GLB)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Warehouse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The stock ledger entry for one (product, warehouse) pair
///
/// Exactly one row exists per pair that has ever coexisted; the two
/// counters are independent and carry no fixed conversion ratio.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stock {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub product_code: String,
    pub warehouse_id: Uuid,
    pub warehouse_name: String,
    pub carton_quantity: i32,
    pub pack_quantity: i32,
    pub is_product_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
