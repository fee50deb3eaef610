//! SuratLain (miscellaneous movement) service
//!
//! STB and sales returns bring stock in; SPB and purchase returns take
//! it out. The document type fixes the direction, so outgoing types get
//! the same sufficiency treatment as delivery notes while incoming
//! types apply unconditionally.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::document_number;
use crate::services::lifecycle::{
    self, ensure_products, ensure_warehouse, fetch_document_items, ItemTable,
};
use crate::services::stock;
use shared::models::{
    DocumentDirection, DocumentItem, SuratLain, SuratLainInput, SuratLainType,
};
use shared::types::ViewFilter;
use shared::validation::validate_document_items;

#[derive(Debug, FromRow)]
struct SuratLainRow {
    id: Uuid,
    document_number: String,
    document_type: String,
    warehouse_id: Uuid,
    warehouse_name: String,
    user_id: Uuid,
    transaction_date: DateTime<Utc>,
    is_deleted: bool,
    deleted_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl SuratLainRow {
    fn into_surat_lain(self, items: Vec<DocumentItem>) -> AppResult<SuratLain> {
        let document_type = SuratLainType::from_str(&self.document_type).ok_or_else(|| {
            AppError::Integrity(format!("Unknown SuratLain type '{}'", self.document_type))
        })?;
        Ok(SuratLain {
            id: self.id,
            document_number: self.document_number,
            document_type,
            warehouse_id: self.warehouse_id,
            warehouse_name: self.warehouse_name,
            user_id: self.user_id,
            transaction_date: self.transaction_date,
            is_deleted: self.is_deleted,
            deleted_at: self.deleted_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
            items,
        })
    }
}

const SURAT_LAIN_SELECT: &str = r#"
    SELECT l.id, l.document_number, l.document_type,
           l.warehouse_id, w.name AS warehouse_name,
           l.user_id, l.transaction_date,
           l.is_deleted, l.deleted_at, l.created_at, l.updated_at
    FROM surat_lain l
    JOIN warehouses w ON w.id = l.warehouse_id
"#;

/// Service for miscellaneous movement documents
#[derive(Clone)]
pub struct SuratLainService {
    db: PgPool,
}

impl SuratLainService {
    /// Create a new SuratLainService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List documents filtered by deletion state
    pub async fn list(&self, view: ViewFilter) -> AppResult<Vec<SuratLain>> {
        let rows = sqlx::query_as::<_, SuratLainRow>(&format!(
            "{} WHERE l.{} ORDER BY l.transaction_date DESC, l.document_number DESC",
            SURAT_LAIN_SELECT,
            view.predicate()
        ))
        .fetch_all(&self.db)
        .await?;

        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let mut items = fetch_document_items(&self.db, ItemTable::SuratLain, &ids).await?;

        rows.into_iter()
            .map(|row| {
                let doc_items = items.remove(&row.id).unwrap_or_default();
                row.into_surat_lain(doc_items)
            })
            .collect()
    }

    /// Get a single document with its items
    pub async fn get(&self, id: Uuid) -> AppResult<SuratLain> {
        let row =
            sqlx::query_as::<_, SuratLainRow>(&format!("{} WHERE l.id = $1", SURAT_LAIN_SELECT))
                .bind(id)
                .fetch_optional(&self.db)
                .await?
                .ok_or_else(|| AppError::NotFound("SuratLain".to_string()))?;

        let mut items = fetch_document_items(&self.db, ItemTable::SuratLain, &[id]).await?;
        row.into_surat_lain(items.remove(&id).unwrap_or_default())
    }

    /// Create a document and apply its typed movement
    pub async fn create(&self, user_id: Uuid, input: SuratLainInput) -> AppResult<SuratLain> {
        if let Err(field) = validate_document_items(&input.items) {
            return Err(AppError::required_field(field));
        }

        let mut tx = self.db.begin().await?;
        ensure_warehouse(&mut tx, input.warehouse_id).await?;
        ensure_products(&mut tx, input.items.iter().map(|i| i.product_id)).await?;

        if input.document_type.direction() == DocumentDirection::Outgoing {
            let requests = lifecycle::outgoing_requests(input.warehouse_id, &input.items);
            stock::check_sufficiency(&mut tx, &requests, &[]).await?;
        }

        let transaction_date = input.transaction_date.unwrap_or_else(Utc::now);
        let number = document_number::next_surat_lain_number(
            &mut tx,
            input.document_type,
            transaction_date,
        )
        .await?;

        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO surat_lain (document_number, document_type, warehouse_id,
                                    user_id, transaction_date)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(&number)
        .bind(input.document_type.as_str())
        .bind(input.warehouse_id)
        .bind(user_id)
        .bind(transaction_date)
        .fetch_one(&mut *tx)
        .await?;

        lifecycle::insert_plain_items(&mut tx, ItemTable::SuratLain, id, &input.items).await?;

        let deltas =
            lifecycle::surat_lain_deltas(input.document_type, input.warehouse_id, &input.items);
        lifecycle::apply(&mut tx, &deltas).await?;

        tx.commit().await?;
        self.get(id).await
    }

    /// Replace a document's warehouse and items. The type, and with it
    /// the direction and number prefix, stays as issued.
    pub async fn update(&self, id: Uuid, input: SuratLainInput) -> AppResult<SuratLain> {
        if let Err(field) = validate_document_items(&input.items) {
            return Err(AppError::required_field(field));
        }

        let mut tx = self.db.begin().await?;

        let existing = lock_header(&mut tx, id).await?;
        if existing.is_deleted {
            return Err(AppError::InvalidStateTransition(
                "Cannot update a deleted SuratLain".to_string(),
            ));
        }
        let existing_type = SuratLainType::from_str(&existing.document_type).ok_or_else(|| {
            AppError::Integrity(format!("Unknown SuratLain type '{}'", existing.document_type))
        })?;
        if input.document_type != existing_type {
            return Err(AppError::validation(
                "document_type",
                "Document type cannot be changed after creation",
                "Jenis dokumen tidak dapat diubah setelah dibuat",
            ));
        }
        ensure_warehouse(&mut tx, input.warehouse_id).await?;
        ensure_products(&mut tx, input.items.iter().map(|i| i.product_id)).await?;

        let old_items = lifecycle::item_quantities(&mut tx, ItemTable::SuratLain, id).await?;

        if input.document_type.direction() == DocumentDirection::Outgoing {
            let requests = lifecycle::outgoing_requests(input.warehouse_id, &input.items);
            let prior = lifecycle::outgoing_requests(existing.warehouse_id, &old_items);
            stock::check_sufficiency(&mut tx, &requests, &prior).await?;
        }

        let reversal = lifecycle::invert(&lifecycle::surat_lain_deltas(
            existing_type,
            existing.warehouse_id,
            &old_items,
        ));
        lifecycle::apply(&mut tx, &reversal).await?;

        sqlx::query(
            "UPDATE surat_lain SET warehouse_id = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(input.warehouse_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM surat_lain_items WHERE surat_lain_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        lifecycle::insert_plain_items(&mut tx, ItemTable::SuratLain, id, &input.items).await?;

        let deltas =
            lifecycle::surat_lain_deltas(input.document_type, input.warehouse_id, &input.items);
        lifecycle::apply(&mut tx, &deltas).await?;

        tx.commit().await?;
        self.get(id).await
    }

    /// Soft-delete a document, reversing its movement
    pub async fn soft_delete(&self, id: Uuid) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        let existing = lock_header(&mut tx, id).await?;
        if existing.is_deleted {
            return Err(AppError::InvalidStateTransition(
                "SuratLain is already deleted".to_string(),
            ));
        }
        let existing_type = SuratLainType::from_str(&existing.document_type).ok_or_else(|| {
            AppError::Integrity(format!("Unknown SuratLain type '{}'", existing.document_type))
        })?;

        let items = lifecycle::item_quantities(&mut tx, ItemTable::SuratLain, id).await?;
        let reversal = lifecycle::invert(&lifecycle::surat_lain_deltas(
            existing_type,
            existing.warehouse_id,
            &items,
        ));
        lifecycle::apply(&mut tx, &reversal).await?;

        sqlx::query(
            r#"
            UPDATE surat_lain
            SET is_deleted = TRUE, deleted_at = NOW(), updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Restore a soft-deleted document, re-applying its movement. An
    /// outgoing type must still find its quantities available.
    pub async fn restore(&self, id: Uuid) -> AppResult<SuratLain> {
        let mut tx = self.db.begin().await?;

        let existing = lock_header(&mut tx, id).await?;
        if !existing.is_deleted {
            return Err(AppError::InvalidStateTransition(
                "SuratLain is not deleted".to_string(),
            ));
        }
        let existing_type = SuratLainType::from_str(&existing.document_type).ok_or_else(|| {
            AppError::Integrity(format!("Unknown SuratLain type '{}'", existing.document_type))
        })?;

        let items = lifecycle::item_quantities(&mut tx, ItemTable::SuratLain, id).await?;

        if existing_type.direction() == DocumentDirection::Outgoing {
            let requests = lifecycle::outgoing_requests(existing.warehouse_id, &items);
            stock::check_sufficiency(&mut tx, &requests, &[]).await?;
        }

        let deltas =
            lifecycle::surat_lain_deltas(existing_type, existing.warehouse_id, &items);
        lifecycle::apply(&mut tx, &deltas).await?;

        sqlx::query(
            r#"
            UPDATE surat_lain
            SET is_deleted = FALSE, deleted_at = NULL, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        self.get(id).await
    }
}

#[derive(Debug, FromRow)]
struct SuratLainHeader {
    warehouse_id: Uuid,
    document_type: String,
    is_deleted: bool,
}

async fn lock_header(tx: &mut Transaction<'_, Postgres>, id: Uuid) -> AppResult<SuratLainHeader> {
    sqlx::query_as::<_, SuratLainHeader>(
        "SELECT warehouse_id, document_type, is_deleted FROM surat_lain WHERE id = $1 FOR UPDATE",
    )
    .bind(id)
    .fetch_optional(&mut **tx)
    .await?
    .ok_or_else(|| AppError::NotFound("SuratLain".to_string()))
}
