//! SPG (goods receipt) models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::SpgType;

/// A goods-receipt document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Spg {
    pub id: Uuid,
    pub document_number: String,
    pub document_type: SpgType,
    pub warehouse_id: Uuid,
    pub warehouse_name: String,
    pub container_number: Option<String>,
    pub vehicle_number: Option<String>,
    /// Supplier's delivery-note reference
    pub sj_number: Option<String>,
    pub start_unload: Option<String>,
    pub finish_load: Option<String>,
    pub user_id: Uuid,
    pub transaction_date: DateTime<Utc>,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub items: Vec<SpgItem>,
}

/// A goods-receipt line item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpgItem {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub product_code: String,
    pub carton_quantity: i32,
    pub pack_quantity: i32,
    pub packaging_size: Option<String>,
    pub inn: Option<String>,
    pub out: Option<String>,
    pub pjg: Option<String>,
    pub warehouse_size: Option<String>,
    pub packaging_weight: Option<String>,
    pub warehouse_weight: Option<String>,
    pub production_code: Option<String>,
}

/// Caller input for creating or updating an SPG
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpgInput {
    pub document_type: SpgType,
    pub warehouse_id: Uuid,
    #[serde(default)]
    pub container_number: Option<String>,
    #[serde(default)]
    pub vehicle_number: Option<String>,
    #[serde(default)]
    pub sj_number: Option<String>,
    #[serde(default)]
    pub start_unload: Option<String>,
    #[serde(default)]
    pub finish_load: Option<String>,
    /// Defaults to now; immutable after creation
    #[serde(default)]
    pub transaction_date: Option<DateTime<Utc>>,
    pub items: Vec<SpgItemInput>,
}

/// Caller input for an SPG line item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpgItemInput {
    pub product_id: Uuid,
    pub carton_quantity: i32,
    pub pack_quantity: i32,
    #[serde(default)]
    pub packaging_size: Option<String>,
    #[serde(default)]
    pub inn: Option<String>,
    #[serde(default)]
    pub out: Option<String>,
    #[serde(default)]
    pub pjg: Option<String>,
    #[serde(default)]
    pub warehouse_size: Option<String>,
    #[serde(default)]
    pub packaging_weight: Option<String>,
    #[serde(default)]
    pub warehouse_weight: Option<String>,
    #[serde(default)]
    pub production_code: Option<String>,
}
