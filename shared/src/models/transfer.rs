//! Inter-warehouse stock transfer models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{DocumentItem, DocumentItemInput};

/// An inter-warehouse transfer document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockTransfer {
    pub id: Uuid,
    pub document_number: String,
    pub source_warehouse_id: Uuid,
    pub source_warehouse_name: String,
    pub destination_warehouse_id: Uuid,
    pub destination_warehouse_name: String,
    pub user_id: Uuid,
    pub transaction_date: DateTime<Utc>,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub items: Vec<DocumentItem>,
}

/// Caller input for creating or updating a transfer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockTransferInput {
    pub source_warehouse_id: Uuid,
    pub destination_warehouse_id: Uuid,
    /// Defaults to now; immutable after creation
    #[serde(default)]
    pub transaction_date: Option<DateTime<Utc>>,
    pub items: Vec<DocumentItemInput>,
}
