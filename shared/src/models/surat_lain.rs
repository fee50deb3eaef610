//! SuratLain (miscellaneous movement) models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{DocumentItem, DocumentItemInput, SuratLainType};

/// A miscellaneous movement document (STB, SPB, purchase/sales returns)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuratLain {
    pub id: Uuid,
    pub document_number: String,
    pub document_type: SuratLainType,
    pub warehouse_id: Uuid,
    pub warehouse_name: String,
    pub user_id: Uuid,
    pub transaction_date: DateTime<Utc>,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub items: Vec<DocumentItem>,
}

/// Caller input for creating or updating a SuratLain
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuratLainInput {
    pub document_type: SuratLainType,
    pub warehouse_id: Uuid,
    /// Defaults to now; immutable after creation
    #[serde(default)]
    pub transaction_date: Option<DateTime<Utc>>,
    pub items: Vec<DocumentItemInput>,
}
