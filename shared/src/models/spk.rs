//! SPK (work order) models
//!
//! An SPK precedes a delivery and has no stock effect of its own; SJ
//! documents reference it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{DocumentItem, DocumentItemInput};

/// A work-order document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Spk {
    pub id: Uuid,
    pub document_number: String,
    pub notes: Option<String>,
    pub user_id: Uuid,
    pub transaction_date: DateTime<Utc>,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub items: Vec<DocumentItem>,
}

/// Caller input for creating or updating an SPK
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpkInput {
    #[serde(default)]
    pub notes: Option<String>,
    /// Defaults to now; immutable after creation
    #[serde(default)]
    pub transaction_date: Option<DateTime<Utc>>,
    pub items: Vec<DocumentItemInput>,
}
