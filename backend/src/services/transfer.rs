//! Inter-warehouse stock transfer service
//!
//! A transfer subtracts each line at the source warehouse and adds it
//! at the destination, atomically. Sufficiency is checked at the source
//! only; an update reverses the old movement before judging the new
//! quantities, so the check never sees the document's own additions.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::document_number;
use crate::services::lifecycle::{
    self, ensure_products, ensure_warehouse, fetch_document_items, ItemTable,
};
use crate::services::stock;
use shared::models::{DocumentItem, StockTransfer, StockTransferInput};
use shared::types::ViewFilter;
use shared::validation::{validate_document_items, validate_transfer_warehouses};

#[derive(Debug, FromRow)]
struct TransferRow {
    id: Uuid,
    document_number: String,
    source_warehouse_id: Uuid,
    source_warehouse_name: String,
    destination_warehouse_id: Uuid,
    destination_warehouse_name: String,
    user_id: Uuid,
    transaction_date: DateTime<Utc>,
    is_deleted: bool,
    deleted_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TransferRow {
    fn into_transfer(self, items: Vec<DocumentItem>) -> StockTransfer {
        StockTransfer {
            id: self.id,
            document_number: self.document_number,
            source_warehouse_id: self.source_warehouse_id,
            source_warehouse_name: self.source_warehouse_name,
            destination_warehouse_id: self.destination_warehouse_id,
            destination_warehouse_name: self.destination_warehouse_name,
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

const TRANSFER_SELECT: &str = r#"
    SELECT t.id, t.document_number,
           t.source_warehouse_id, src.name AS source_warehouse_name,
           t.destination_warehouse_id, dst.name AS destination_warehouse_name,
           t.user_id, t.transaction_date,
           t.is_deleted, t.deleted_at, t.created_at, t.updated_at
    FROM surat_transfer_stok t
    JOIN warehouses src ON src.id = t.source_warehouse_id
    JOIN warehouses dst ON dst.id = t.destination_warehouse_id
"#;

/// Service for inter-warehouse transfer documents
#[derive(Clone)]
pub struct TransferService {
    db: PgPool,
}

impl TransferService {
    /// Create a new TransferService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List transfers filtered by deletion state
    pub async fn list(&self, view: ViewFilter) -> AppResult<Vec<StockTransfer>> {
        let rows = sqlx::query_as::<_, TransferRow>(&format!(
            "{} WHERE t.{} ORDER BY t.transaction_date DESC, t.document_number DESC",
            TRANSFER_SELECT,
            view.predicate()
        ))
        .fetch_all(&self.db)
        .await?;

        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let mut items = fetch_document_items(&self.db, ItemTable::Transfer, &ids).await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let doc_items = items.remove(&row.id).unwrap_or_default();
                row.into_transfer(doc_items)
            })
            .collect())
    }

    /// Get a single transfer with its items
    pub async fn get(&self, id: Uuid) -> AppResult<StockTransfer> {
        let row = sqlx::query_as::<_, TransferRow>(&format!("{} WHERE t.id = $1", TRANSFER_SELECT))
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Stock transfer".to_string()))?;

        let mut items = fetch_document_items(&self.db, ItemTable::Transfer, &[id]).await?;
        Ok(row.into_transfer(items.remove(&id).unwrap_or_default()))
    }

    /// Create a transfer and move the quantities between warehouses
    pub async fn create(&self, user_id: Uuid, input: StockTransferInput) -> AppResult<StockTransfer> {
        validate_transfer(&input)?;

        let mut tx = self.db.begin().await?;
        ensure_warehouse(&mut tx, input.source_warehouse_id).await?;
        ensure_warehouse(&mut tx, input.destination_warehouse_id).await?;
        ensure_products(&mut tx, input.items.iter().map(|i| i.product_id)).await?;

        let requests = lifecycle::outgoing_requests(input.source_warehouse_id, &input.items);
        stock::check_sufficiency(&mut tx, &requests, &[]).await?;

        let transaction_date = input.transaction_date.unwrap_or_else(Utc::now);
        let number = document_number::next_transfer_number(&mut tx, transaction_date).await?;

        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO surat_transfer_stok (document_number, source_warehouse_id,
                                             destination_warehouse_id, user_id, transaction_date)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(&number)
        .bind(input.source_warehouse_id)
        .bind(input.destination_warehouse_id)
        .bind(user_id)
        .bind(transaction_date)
        .fetch_one(&mut *tx)
        .await?;

        lifecycle::insert_plain_items(&mut tx, ItemTable::Transfer, id, &input.items).await?;

        let deltas = lifecycle::transfer_deltas(
            input.source_warehouse_id,
            input.destination_warehouse_id,
            &input.items,
        );
        lifecycle::apply(&mut tx, &deltas).await?;

        tx.commit().await?;
        self.get(id).await
    }

    /// Replace a transfer's endpoints and items. The old movement is
    /// reversed first, so the new source balance is judged without the
    /// old transfer's additions or subtractions in it; a transfer that
    /// redirects stock it had itself moved cannot pass on phantom
    /// quantities. A failed check rolls the reversal back.
    pub async fn update(&self, id: Uuid, input: StockTransferInput) -> AppResult<StockTransfer> {
        validate_transfer(&input)?;

        let mut tx = self.db.begin().await?;

        let existing = lock_header(&mut tx, id).await?;
        if existing.is_deleted {
            return Err(AppError::InvalidStateTransition(
                "Cannot update a deleted stock transfer".to_string(),
            ));
        }
        ensure_warehouse(&mut tx, input.source_warehouse_id).await?;
        ensure_warehouse(&mut tx, input.destination_warehouse_id).await?;
        ensure_products(&mut tx, input.items.iter().map(|i| i.product_id)).await?;

        let old_items = lifecycle::item_quantities(&mut tx, ItemTable::Transfer, id).await?;
        let reversal = lifecycle::invert(&lifecycle::transfer_deltas(
            existing.source_warehouse_id,
            existing.destination_warehouse_id,
            &old_items,
        ));
        lifecycle::apply(&mut tx, &reversal).await?;

        let requests = lifecycle::outgoing_requests(input.source_warehouse_id, &input.items);
        stock::check_sufficiency(&mut tx, &requests, &[]).await?;

        sqlx::query(
            r#"
            UPDATE surat_transfer_stok
            SET source_warehouse_id = $2, destination_warehouse_id = $3, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(input.source_warehouse_id)
        .bind(input.destination_warehouse_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM surat_transfer_stok_items WHERE surat_transfer_stok_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        lifecycle::insert_plain_items(&mut tx, ItemTable::Transfer, id, &input.items).await?;

        let deltas = lifecycle::transfer_deltas(
            input.source_warehouse_id,
            input.destination_warehouse_id,
            &input.items,
        );
        lifecycle::apply(&mut tx, &deltas).await?;

        tx.commit().await?;
        self.get(id).await
    }

    /// Soft-delete a transfer, moving the quantities back to the source
    pub async fn soft_delete(&self, id: Uuid) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        let existing = lock_header(&mut tx, id).await?;
        if existing.is_deleted {
            return Err(AppError::InvalidStateTransition(
                "Stock transfer is already deleted".to_string(),
            ));
        }

        let items = lifecycle::item_quantities(&mut tx, ItemTable::Transfer, id).await?;
        let reversal = lifecycle::invert(&lifecycle::transfer_deltas(
            existing.source_warehouse_id,
            existing.destination_warehouse_id,
            &items,
        ));
        lifecycle::apply(&mut tx, &reversal).await?;

        sqlx::query(
            r#"
            UPDATE surat_transfer_stok
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

    /// Restore a soft-deleted transfer. The source must again hold the
    /// moved quantities.
    pub async fn restore(&self, id: Uuid) -> AppResult<StockTransfer> {
        let mut tx = self.db.begin().await?;

        let existing = lock_header(&mut tx, id).await?;
        if !existing.is_deleted {
            return Err(AppError::InvalidStateTransition(
                "Stock transfer is not deleted".to_string(),
            ));
        }

        let items = lifecycle::item_quantities(&mut tx, ItemTable::Transfer, id).await?;
        let requests = lifecycle::outgoing_requests(existing.source_warehouse_id, &items);
        stock::check_sufficiency(&mut tx, &requests, &[]).await?;

        let deltas = lifecycle::transfer_deltas(
            existing.source_warehouse_id,
            existing.destination_warehouse_id,
            &items,
        );
        lifecycle::apply(&mut tx, &deltas).await?;

        sqlx::query(
            r#"
            UPDATE surat_transfer_stok
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
struct TransferHeader {
    source_warehouse_id: Uuid,
    destination_warehouse_id: Uuid,
    is_deleted: bool,
}

async fn lock_header(tx: &mut Transaction<'_, Postgres>, id: Uuid) -> AppResult<TransferHeader> {
    sqlx::query_as::<_, TransferHeader>(
        r#"
        SELECT source_warehouse_id, destination_warehouse_id, is_deleted
        FROM surat_transfer_stok
        WHERE id = $1
        FOR UPDATE
        "#,
    )
    .bind(id)
    .fetch_optional(&mut **tx)
    .await?
    .ok_or_else(|| AppError::NotFound("Stock transfer".to_string()))
}

fn validate_transfer(input: &StockTransferInput) -> AppResult<()> {
    if let Err(field) = validate_document_items(&input.items) {
        return Err(AppError::required_field(field));
    }
    if let Err(field) =
        validate_transfer_warehouses(input.source_warehouse_id, input.destination_warehouse_id)
    {
        return Err(AppError::validation(
            field,
            "Source and destination warehouses must differ",
            "Gudang asal dan tujuan harus berbeda",
        ));
    }
    Ok(())
}
