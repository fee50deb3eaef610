//! SPK (work order) service
//!
//! Work orders plan quantities but never move stock. Delivery notes
//! reference them, so a work order cannot be soft-deleted while an
//! active delivery note points at it.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::document_number;
use crate::services::lifecycle::{self, ensure_products, fetch_document_items, ItemTable};
use shared::models::{DocumentItem, Spk, SpkInput};
use shared::types::ViewFilter;
use shared::validation::validate_document_items;

#[derive(Debug, FromRow)]
struct SpkRow {
    id: Uuid,
    document_number: String,
    notes: Option<String>,
    user_id: Uuid,
    transaction_date: DateTime<Utc>,
    is_deleted: bool,
    deleted_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl SpkRow {
    fn into_spk(self, items: Vec<DocumentItem>) -> Spk {
        Spk {
            id: self.id,
            document_number: self.document_number,
            notes: self.notes,
            user_id: self.user_id,
            transaction_date: self.transaction_date,
            is_deleted: self.is_deleted,
            deleted_at: self.deleted_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
            items,
        }
    }
}

/// Service for work-order documents
#[derive(Clone)]
pub struct SpkService {
    db: PgPool,
}

impl SpkService {
    /// Create a new SpkService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List work orders filtered by deletion state
    pub async fn list(&self, view: ViewFilter) -> AppResult<Vec<Spk>> {
        let rows = sqlx::query_as::<_, SpkRow>(&format!(
            r#"
            SELECT id, document_number, notes, user_id, transaction_date,
                   is_deleted, deleted_at, created_at, updated_at
            FROM spk
            WHERE {}
            ORDER BY transaction_date DESC, document_number DESC
            "#,
            view.predicate()
        ))
        .fetch_all(&self.db)
        .await?;

        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let mut items = fetch_document_items(&self.db, ItemTable::Spk, &ids).await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let doc_items = items.remove(&row.id).unwrap_or_default();
                row.into_spk(doc_items)
            })
            .collect())
    }

    /// Get a single work order with its items
    pub async fn get(&self, id: Uuid) -> AppResult<Spk> {
        let row = sqlx::query_as::<_, SpkRow>(
            r#"
            SELECT id, document_number, notes, user_id, transaction_date,
                   is_deleted, deleted_at, created_at, updated_at
            FROM spk
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("SPK".to_string()))?;

        let mut items = fetch_document_items(&self.db, ItemTable::Spk, &[id]).await?;
        Ok(row.into_spk(items.remove(&id).unwrap_or_default()))
    }

    /// Create a work order and assign its monthly number
    pub async fn create(&self, user_id: Uuid, input: SpkInput) -> AppResult<Spk> {
        if let Err(field) = validate_document_items(&input.items) {
            return Err(AppError::required_field(field));
        }

        let mut tx = self.db.begin().await?;
        ensure_products(&mut tx, input.items.iter().map(|i| i.product_id)).await?;

        let transaction_date = input.transaction_date.unwrap_or_else(Utc::now);
        let number = document_number::next_spk_number(&mut tx, transaction_date).await?;

        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO spk (document_number, notes, user_id, transaction_date)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(&number)
        .bind(&input.notes)
        .bind(user_id)
        .bind(transaction_date)
        .fetch_one(&mut *tx)
        .await?;

        lifecycle::insert_plain_items(&mut tx, ItemTable::Spk, id, &input.items).await?;

        tx.commit().await?;
        self.get(id).await
    }

    /// Replace a work order's notes and items. No stock is involved.
    pub async fn update(&self, id: Uuid, input: SpkInput) -> AppResult<Spk> {
        if let Err(field) = validate_document_items(&input.items) {
            return Err(AppError::required_field(field));
        }

        let mut tx = self.db.begin().await?;

        let is_deleted = lock_state(&mut tx, id).await?;
        if is_deleted {
            return Err(AppError::InvalidStateTransition(
                "Cannot update a deleted SPK".to_string(),
            ));
        }
        ensure_products(&mut tx, input.items.iter().map(|i| i.product_id)).await?;

        sqlx::query("UPDATE spk SET notes = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(&input.notes)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM spk_items WHERE spk_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        lifecycle::insert_plain_items(&mut tx, ItemTable::Spk, id, &input.items).await?;

        tx.commit().await?;
        self.get(id).await
    }

    /// Soft-delete a work order. Refused while an active delivery note
    /// references it.
    pub async fn soft_delete(&self, id: Uuid) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        let is_deleted = lock_state(&mut tx, id).await?;
        if is_deleted {
            return Err(AppError::InvalidStateTransition(
                "SPK is already deleted".to_string(),
            ));
        }

        let referenced = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM sj WHERE spk_id = $1 AND is_deleted = FALSE)",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;
        if referenced {
            return Err(AppError::validation(
                "spk",
                "SPK is referenced by an active delivery note",
                "SPK masih digunakan oleh surat jalan aktif",
            ));
        }

        sqlx::query(
            "UPDATE spk SET is_deleted = TRUE, deleted_at = NOW(), updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Restore a soft-deleted work order
    pub async fn restore(&self, id: Uuid) -> AppResult<Spk> {
        let mut tx = self.db.begin().await?;

        let is_deleted = lock_state(&mut tx, id).await?;
        if !is_deleted {
            return Err(AppError::InvalidStateTransition(
                "SPK is not deleted".to_string(),
            ));
        }

        sqlx::query(
            "UPDATE spk SET is_deleted = FALSE, deleted_at = NULL, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        self.get(id).await
    }
}

async fn lock_state(tx: &mut Transaction<'_, Postgres>, id: Uuid) -> AppResult<bool> {
    sqlx::query_scalar::<_, bool>("SELECT is_deleted FROM spk WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| AppError::NotFound("SPK".to_string()))
}
