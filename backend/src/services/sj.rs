//! SJ (delivery note) service
//!
//! Delivery notes are outgoing documents, so every path that puts stock
//! on the road checks sufficiency first and only mutates once every
//! line has passed. An update credits the document's own prior
//! reservation at the matching (product, warehouse) pairs before
//! judging the new quantities, then reverses the old deltas and applies
//! the new set in one transaction.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::document_number;
use crate::services::lifecycle::{
    self, ensure_products, ensure_warehouse, fetch_document_items, ItemTable,
};
use crate::services::stock;
use shared::models::{DocumentItem, Sj, SjInput};
use shared::types::ViewFilter;
use shared::validation::{validate_document_items, validate_sj_recipient};

#[derive(Debug, FromRow)]
struct SjRow {
    id: Uuid,
    document_number: String,
    spk_id: Uuid,
    spk_number: String,
    warehouse_id: Uuid,
    warehouse_name: String,
    is_customer: bool,
    customer_id: Option<Uuid>,
    customer_name: Option<String>,
    non_customer_name: Option<String>,
    vehicle_number: Option<String>,
    user_id: Uuid,
    transaction_date: DateTime<Utc>,
    is_deleted: bool,
    deleted_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl SjRow {
    fn into_sj(self, items: Vec<DocumentItem>) -> Sj {
        Sj {
            id: self.id,
            document_number: self.document_number,
            spk_id: self.spk_id,
            spk_number: self.spk_number,
            warehouse_id: self.warehouse_id,
            warehouse_name: self.warehouse_name,
            is_customer: self.is_customer,
            customer_id: self.customer_id,
            customer_name: self.customer_name,
            non_customer_name: self.non_customer_name,
            vehicle_number: self.vehicle_number,
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

const SJ_SELECT: &str = r#"
    SELECT j.id, j.document_number,
           j.spk_id, k.document_number AS spk_number,
           j.warehouse_id, w.name AS warehouse_name,
           j.is_customer, j.customer_id, c.name AS customer_name,
           j.non_customer_name, j.vehicle_number,
           j.user_id, j.transaction_date,
           j.is_deleted, j.deleted_at, j.created_at, j.updated_at
    FROM sj j
    JOIN spk k ON k.id = j.spk_id
    JOIN warehouses w ON w.id = j.warehouse_id
    LEFT JOIN customers c ON c.id = j.customer_id
"#;

/// Service for delivery-note documents
#[derive(Clone)]
pub struct SjService {
    db: PgPool,
}

impl SjService {
    /// Create a new SjService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List delivery notes filtered by deletion state
    pub async fn list(&self, view: ViewFilter) -> AppResult<Vec<Sj>> {
        let rows = sqlx::query_as::<_, SjRow>(&format!(
            "{} WHERE j.{} ORDER BY j.transaction_date DESC, j.document_number DESC",
            SJ_SELECT,
            view.predicate()
        ))
        .fetch_all(&self.db)
        .await?;

        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let mut items = fetch_document_items(&self.db, ItemTable::Sj, &ids).await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let doc_items = items.remove(&row.id).unwrap_or_default();
                row.into_sj(doc_items)
            })
            .collect())
    }

    /// Get a single delivery note with its items
    pub async fn get(&self, id: Uuid) -> AppResult<Sj> {
        let row = sqlx::query_as::<_, SjRow>(&format!("{} WHERE j.id = $1", SJ_SELECT))
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("SJ".to_string()))?;

        let mut items = fetch_document_items(&self.db, ItemTable::Sj, &[id]).await?;
        Ok(row.into_sj(items.remove(&id).unwrap_or_default()))
    }

    /// Create a delivery note and subtract the shipped quantities. The
    /// warehouse name at creation time decides the R/S/O code baked
    /// into the number.
    pub async fn create(&self, user_id: Uuid, input: SjInput) -> AppResult<Sj> {
        validate_sj(&input)?;

        let mut tx = self.db.begin().await?;
        let warehouse_name = warehouse_name_for(&mut tx, input.warehouse_id).await?;
        ensure_products(&mut tx, input.items.iter().map(|i| i.product_id)).await?;
        ensure_spk(&mut tx, input.spk_id).await?;
        if let Some(customer_id) = input.customer_id {
            ensure_customer(&mut tx, customer_id).await?;
        }

        let requests = lifecycle::outgoing_requests(input.warehouse_id, &input.items);
        stock::check_sufficiency(&mut tx, &requests, &[]).await?;

        let transaction_date = input.transaction_date.unwrap_or_else(Utc::now);
        let number = document_number::next_sj_number(
            &mut tx,
            &warehouse_name,
            input.is_customer,
            transaction_date,
        )
        .await?;

        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO sj (document_number, spk_id, warehouse_id, is_customer,
                            customer_id, non_customer_name, vehicle_number,
                            user_id, transaction_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id
            "#,
        )
        .bind(&number)
        .bind(input.spk_id)
        .bind(input.warehouse_id)
        .bind(input.is_customer)
        .bind(input.customer_id)
        .bind(&input.non_customer_name)
        .bind(&input.vehicle_number)
        .bind(user_id)
        .bind(transaction_date)
        .fetch_one(&mut *tx)
        .await?;

        lifecycle::insert_plain_items(&mut tx, ItemTable::Sj, id, &input.items).await?;

        let deltas = lifecycle::outgoing_deltas(input.warehouse_id, &input.items);
        lifecycle::apply(&mut tx, &deltas).await?;

        tx.commit().await?;
        self.get(id).await
    }

    /// Replace a delivery note's details and items. Sufficiency is
    /// judged against the balance plus this document's own prior
    /// reservation before anything is mutated.
    pub async fn update(&self, id: Uuid, input: SjInput) -> AppResult<Sj> {
        validate_sj(&input)?;

        let mut tx = self.db.begin().await?;

        let existing = lock_header(&mut tx, id).await?;
        if existing.is_deleted {
            return Err(AppError::InvalidStateTransition(
                "Cannot update a deleted SJ".to_string(),
            ));
        }
        ensure_warehouse(&mut tx, input.warehouse_id).await?;
        ensure_products(&mut tx, input.items.iter().map(|i| i.product_id)).await?;
        ensure_spk(&mut tx, input.spk_id).await?;
        if let Some(customer_id) = input.customer_id {
            ensure_customer(&mut tx, customer_id).await?;
        }

        let old_items = lifecycle::item_quantities(&mut tx, ItemTable::Sj, id).await?;
        let requests = lifecycle::outgoing_requests(input.warehouse_id, &input.items);
        let prior = lifecycle::outgoing_requests(existing.warehouse_id, &old_items);
        stock::check_sufficiency(&mut tx, &requests, &prior).await?;

        let reversal =
            lifecycle::invert(&lifecycle::outgoing_deltas(existing.warehouse_id, &old_items));
        lifecycle::apply(&mut tx, &reversal).await?;

        sqlx::query(
            r#"
            UPDATE sj
            SET spk_id = $2, warehouse_id = $3, is_customer = $4, customer_id = $5,
                non_customer_name = $6, vehicle_number = $7, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(input.spk_id)
        .bind(input.warehouse_id)
        .bind(input.is_customer)
        .bind(input.customer_id)
        .bind(&input.non_customer_name)
        .bind(&input.vehicle_number)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM sj_items WHERE sj_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        lifecycle::insert_plain_items(&mut tx, ItemTable::Sj, id, &input.items).await?;

        let deltas = lifecycle::outgoing_deltas(input.warehouse_id, &input.items);
        lifecycle::apply(&mut tx, &deltas).await?;

        tx.commit().await?;
        self.get(id).await
    }

    /// Soft-delete a delivery note, returning the shipped quantities
    pub async fn soft_delete(&self, id: Uuid) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        let existing = lock_header(&mut tx, id).await?;
        if existing.is_deleted {
            return Err(AppError::InvalidStateTransition(
                "SJ is already deleted".to_string(),
            ));
        }

        let items = lifecycle::item_quantities(&mut tx, ItemTable::Sj, id).await?;
        let reversal = lifecycle::invert(&lifecycle::outgoing_deltas(existing.warehouse_id, &items));
        lifecycle::apply(&mut tx, &reversal).await?;

        sqlx::query(
            "UPDATE sj SET is_deleted = TRUE, deleted_at = NOW(), updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Restore a soft-deleted delivery note. The outgoing quantities
    /// must still be available.
    pub async fn restore(&self, id: Uuid) -> AppResult<Sj> {
        let mut tx = self.db.begin().await?;

        let existing = lock_header(&mut tx, id).await?;
        if !existing.is_deleted {
            return Err(AppError::InvalidStateTransition(
                "SJ is not deleted".to_string(),
            ));
        }

        let items = lifecycle::item_quantities(&mut tx, ItemTable::Sj, id).await?;
        let requests = lifecycle::outgoing_requests(existing.warehouse_id, &items);
        stock::check_sufficiency(&mut tx, &requests, &[]).await?;

        let deltas = lifecycle::outgoing_deltas(existing.warehouse_id, &items);
        lifecycle::apply(&mut tx, &deltas).await?;

        sqlx::query(
            "UPDATE sj SET is_deleted = FALSE, deleted_at = NULL, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        self.get(id).await
    }
}

#[derive(Debug, FromRow)]
struct SjHeader {
    warehouse_id: Uuid,
    is_deleted: bool,
}

async fn lock_header(tx: &mut Transaction<'_, Postgres>, id: Uuid) -> AppResult<SjHeader> {
    sqlx::query_as::<_, SjHeader>(
        "SELECT warehouse_id, is_deleted FROM sj WHERE id = $1 FOR UPDATE",
    )
    .bind(id)
    .fetch_optional(&mut **tx)
    .await?
    .ok_or_else(|| AppError::NotFound("SJ".to_string()))
}

async fn warehouse_name_for(
    tx: &mut Transaction<'_, Postgres>,
    warehouse_id: Uuid,
) -> AppResult<String> {
    sqlx::query_scalar::<_, String>("SELECT name FROM warehouses WHERE id = $1")
        .bind(warehouse_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Warehouse".to_string()))
}

async fn ensure_spk(tx: &mut Transaction<'_, Postgres>, spk_id: Uuid) -> AppResult<()> {
    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM spk WHERE id = $1 AND is_deleted = FALSE)",
    )
    .bind(spk_id)
    .fetch_one(&mut **tx)
    .await?;
    if !exists {
        return Err(AppError::NotFound("SPK".to_string()));
    }
    Ok(())
}

async fn ensure_customer(tx: &mut Transaction<'_, Postgres>, customer_id: Uuid) -> AppResult<()> {
    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM customers WHERE id = $1 AND is_deleted = FALSE)",
    )
    .bind(customer_id)
    .fetch_one(&mut **tx)
    .await?;
    if !exists {
        return Err(AppError::NotFound("Customer".to_string()));
    }
    Ok(())
}

fn validate_sj(input: &SjInput) -> AppResult<()> {
    if let Err(field) = validate_document_items(&input.items) {
        return Err(AppError::required_field(field));
    }
    if let Err(field) = validate_sj_recipient(
        input.is_customer,
        input.customer_id,
        input.non_customer_name.as_deref(),
    ) {
        return Err(AppError::validation(
            field,
            "Recipient details do not match the delivery type",
            "Data penerima tidak sesuai dengan jenis pengiriman",
        ));
    }
    Ok(())
}
