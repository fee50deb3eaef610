//! SJ (delivery note) models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{DocumentItem, DocumentItemInput};

/// A delivery-note document (stock out)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sj {
    pub id: Uuid,
    pub document_number: String,
    pub spk_id: Uuid,
    pub spk_number: String,
    pub warehouse_id: Uuid,
    pub warehouse_name: String,
    pub is_customer: bool,
    pub customer_id: Option<Uuid>,
    pub customer_name: Option<String>,
    /// Free-text recipient when no registered customer is involved
    pub non_customer_name: Option<String>,
    pub vehicle_number: Option<String>,
    pub user_id: Uuid,
    pub transaction_date: DateTime<Utc>,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub items: Vec<DocumentItem>,
}

/// Caller input for creating or updating an SJ
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SjInput {
    pub spk_id: Uuid,
    pub warehouse_id: Uuid,
    pub is_customer: bool,
    #[serde(default)]
    pub customer_id: Option<Uuid>,
    #[serde(default)]
    pub non_customer_name: Option<String>,
    #[serde(default)]
    pub vehicle_number: Option<String>,
    /// Defaults to now; immutable after creation
    #[serde(default)]
    pub transaction_date: Option<DateTime<Utc>>,
    pub items: Vec<DocumentItemInput>,
}
