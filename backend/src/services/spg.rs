//! SPG (goods receipt) service
//!
//! All SPG types are incoming documents. IMPORT receipts additionally
//! carry container and measurement fields, required on every line.
//! Create applies the item quantities to the receiving warehouse;
//! update reverses the old quantities and applies the new ones; delete
//! and restore mirror each other exactly. Document number and
//! transaction date are fixed at creation.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::lifecycle::{self, ensure_products, ensure_warehouse};
use crate::services::document_number;
use shared::models::{DocumentItemInput, Spg, SpgInput, SpgItem, SpgType};
use shared::types::ViewFilter;
use shared::validation::{missing_import_header_fields, missing_import_item_fields};

#[derive(Debug, FromRow)]
struct SpgRow {
    id: Uuid,
    document_number: String,
    document_type: String,
    warehouse_id: Uuid,
    warehouse_name: String,
    container_number: Option<String>,
    vehicle_number: Option<String>,
    sj_number: Option<String>,
    start_unload: Option<String>,
    finish_load: Option<String>,
    user_id: Uuid,
    transaction_date: DateTime<Utc>,
    is_deleted: bool,
    deleted_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct SpgItemRow {
    id: Uuid,
    spg_id: Uuid,
    product_id: Uuid,
    product_name: String,
    product_code: String,
    carton_quantity: i32,
    pack_quantity: i32,
    packaging_size: Option<String>,
    inn: Option<String>,
    out: Option<String>,
    pjg: Option<String>,
    warehouse_size: Option<String>,
    packaging_weight: Option<String>,
    warehouse_weight: Option<String>,
    production_code: Option<String>,
}

impl SpgItemRow {
    fn into_item(self) -> SpgItem {
        SpgItem {
            id: self.id,
            product_id: self.product_id,
            product_name: self.product_name,
            product_code: self.product_code,
            carton_quantity: self.carton_quantity,
            pack_quantity: self.pack_quantity,
            packaging_size: self.packaging_size,
            inn: self.inn,
            out: self.out,
            pjg: self.pjg,
            warehouse_size: self.warehouse_size,
            packaging_weight: self.packaging_weight,
            warehouse_weight: self.warehouse_weight,
            production_code: self.production_code,
        }
    }
}

impl SpgRow {
    fn into_spg(self, items: Vec<SpgItem>) -> AppResult<Spg> {
        let document_type = SpgType::from_str(&self.document_type).ok_or_else(|| {
            AppError::Integrity(format!("Unknown SPG type '{}'", self.document_type))
        })?;
        Ok(Spg {
            id: self.id,
            document_number: self.document_number,
            document_type,
            warehouse_id: self.warehouse_id,
            warehouse_name: self.warehouse_name,
            container_number: self.container_number,
            vehicle_number: self.vehicle_number,
            sj_number: self.sj_number,
            start_unload: self.start_unload,
            finish_load: self.finish_load,
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

const SPG_SELECT: &str = r#"
    SELECT g.id, g.document_number, g.document_type,
           g.warehouse_id, w.name AS warehouse_name,
           g.container_number, g.vehicle_number, g.sj_number,
           g.start_unload, g.finish_load,
           g.user_id, g.transaction_date,
           g.is_deleted, g.deleted_at, g.created_at, g.updated_at
    FROM spg g
    JOIN warehouses w ON w.id = g.warehouse_id
"#;

const SPG_ITEM_SELECT: &str = r#"
    SELECT i.id, i.spg_id, i.product_id, p.name AS product_name, p.code AS product_code,
           i.carton_quantity, i.pack_quantity,
           i.packaging_size, i.inn, i."out", i.pjg,
           i.warehouse_size, i.packaging_weight, i.warehouse_weight, i.production_code
    FROM spg_items i
    JOIN products p ON p.id = i.product_id
"#;

/// Service for goods-receipt documents
#[derive(Clone)]
pub struct SpgService {
    db: PgPool,
}

impl SpgService {
    /// Create a new SpgService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List SPG documents filtered by deletion state
    pub async fn list(&self, view: ViewFilter) -> AppResult<Vec<Spg>> {
        let rows = sqlx::query_as::<_, SpgRow>(&format!(
            "{} WHERE g.{} ORDER BY g.transaction_date DESC, g.document_number DESC",
            SPG_SELECT,
            view.predicate()
        ))
        .fetch_all(&self.db)
        .await?;

        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let mut items = self.items_for(&ids).await?;

        rows.into_iter()
            .map(|row| {
                let doc_items = items.remove(&row.id).unwrap_or_default();
                row.into_spg(doc_items)
            })
            .collect()
    }

    /// Get a single SPG with its items
    pub async fn get(&self, id: Uuid) -> AppResult<Spg> {
        let row = sqlx::query_as::<_, SpgRow>(&format!("{} WHERE g.id = $1", SPG_SELECT))
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("SPG".to_string()))?;

        let mut items = self.items_for(&[id]).await?;
        row.into_spg(items.remove(&id).unwrap_or_default())
    }

    /// Create an SPG, assign its number, and add the received
    /// quantities to the warehouse.
    pub async fn create(&self, user_id: Uuid, input: SpgInput) -> AppResult<Spg> {
        validate_spg(&input)?;

        let mut tx = self.db.begin().await?;
        ensure_warehouse(&mut tx, input.warehouse_id).await?;
        ensure_products(&mut tx, input.items.iter().map(|i| i.product_id)).await?;

        let transaction_date = input.transaction_date.unwrap_or_else(Utc::now);
        let number =
            document_number::next_spg_number(&mut tx, input.document_type, transaction_date)
                .await?;

        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO spg (document_number, document_type, warehouse_id,
                             container_number, vehicle_number, sj_number,
                             start_unload, finish_load, user_id, transaction_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id
            "#,
        )
        .bind(&number)
        .bind(input.document_type.as_str())
        .bind(input.warehouse_id)
        .bind(&input.container_number)
        .bind(&input.vehicle_number)
        .bind(&input.sj_number)
        .bind(&input.start_unload)
        .bind(&input.finish_load)
        .bind(user_id)
        .bind(transaction_date)
        .fetch_one(&mut *tx)
        .await?;

        insert_items(&mut tx, id, &input.items).await?;

        let deltas = lifecycle::incoming_deltas(input.warehouse_id, &quantities(&input.items));
        lifecycle::apply(&mut tx, &deltas).await?;

        tx.commit().await?;
        self.get(id).await
    }

    /// Replace an SPG's header details and items. The old quantities
    /// are reversed before the new ones are applied; document number,
    /// type, and transaction date stay as issued.
    pub async fn update(&self, id: Uuid, input: SpgInput) -> AppResult<Spg> {
        validate_spg(&input)?;

        let mut tx = self.db.begin().await?;

        let existing = lock_header(&mut tx, id).await?;
        if existing.is_deleted {
            return Err(AppError::InvalidStateTransition(
                "Cannot update a deleted SPG".to_string(),
            ));
        }
        if input.document_type.as_str() != existing.document_type {
            return Err(AppError::validation(
                "document_type",
                "Document type cannot be changed after creation",
                "Jenis dokumen tidak dapat diubah setelah dibuat",
            ));
        }
        ensure_warehouse(&mut tx, input.warehouse_id).await?;
        ensure_products(&mut tx, input.items.iter().map(|i| i.product_id)).await?;

        let old_items = item_quantities(&mut tx, id).await?;
        let reversal =
            lifecycle::invert(&lifecycle::incoming_deltas(existing.warehouse_id, &old_items));
        lifecycle::apply(&mut tx, &reversal).await?;

        sqlx::query(
            r#"
            UPDATE spg
            SET warehouse_id = $2, container_number = $3, vehicle_number = $4,
                sj_number = $5, start_unload = $6, finish_load = $7, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(input.warehouse_id)
        .bind(&input.container_number)
        .bind(&input.vehicle_number)
        .bind(&input.sj_number)
        .bind(&input.start_unload)
        .bind(&input.finish_load)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM spg_items WHERE spg_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        insert_items(&mut tx, id, &input.items).await?;

        let deltas = lifecycle::incoming_deltas(input.warehouse_id, &quantities(&input.items));
        lifecycle::apply(&mut tx, &deltas).await?;

        tx.commit().await?;
        self.get(id).await
    }

    /// Soft-delete an SPG, withdrawing the received quantities
    pub async fn soft_delete(&self, id: Uuid) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        let existing = lock_header(&mut tx, id).await?;
        if existing.is_deleted {
            return Err(AppError::InvalidStateTransition(
                "SPG is already deleted".to_string(),
            ));
        }

        let items = item_quantities(&mut tx, id).await?;
        let reversal = lifecycle::invert(&lifecycle::incoming_deltas(existing.warehouse_id, &items));
        lifecycle::apply(&mut tx, &reversal).await?;

        sqlx::query(
            "UPDATE spg SET is_deleted = TRUE, deleted_at = NOW(), updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Restore a soft-deleted SPG, re-applying its quantities
    pub async fn restore(&self, id: Uuid) -> AppResult<Spg> {
        let mut tx = self.db.begin().await?;

        let existing = lock_header(&mut tx, id).await?;
        if !existing.is_deleted {
            return Err(AppError::InvalidStateTransition(
                "SPG is not deleted".to_string(),
            ));
        }

        let items = item_quantities(&mut tx, id).await?;
        let deltas = lifecycle::incoming_deltas(existing.warehouse_id, &items);
        lifecycle::apply(&mut tx, &deltas).await?;

        sqlx::query(
            "UPDATE spg SET is_deleted = FALSE, deleted_at = NULL, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        self.get(id).await
    }

    async fn items_for(&self, ids: &[Uuid]) -> AppResult<HashMap<Uuid, Vec<SpgItem>>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows = sqlx::query_as::<_, SpgItemRow>(&format!(
            "{} WHERE i.spg_id = ANY($1) ORDER BY i.created_at",
            SPG_ITEM_SELECT
        ))
        .bind(ids)
        .fetch_all(&self.db)
        .await?;

        let mut grouped: HashMap<Uuid, Vec<SpgItem>> = HashMap::new();
        for row in rows {
            grouped.entry(row.spg_id).or_default().push(row.into_item());
        }
        Ok(grouped)
    }
}

#[derive(Debug, FromRow)]
struct SpgHeader {
    warehouse_id: Uuid,
    document_type: String,
    is_deleted: bool,
}

async fn lock_header(tx: &mut Transaction<'_, Postgres>, id: Uuid) -> AppResult<SpgHeader> {
    sqlx::query_as::<_, SpgHeader>(
        "SELECT warehouse_id, document_type, is_deleted FROM spg WHERE id = $1 FOR UPDATE",
    )
    .bind(id)
    .fetch_optional(&mut **tx)
    .await?
    .ok_or_else(|| AppError::NotFound("SPG".to_string()))
}

async fn insert_items(
    tx: &mut Transaction<'_, Postgres>,
    spg_id: Uuid,
    items: &[shared::models::SpgItemInput],
) -> AppResult<()> {
    for item in items {
        sqlx::query(
            r#"
            INSERT INTO spg_items (spg_id, product_id, carton_quantity, pack_quantity,
                                   packaging_size, inn, "out", pjg, warehouse_size,
                                   packaging_weight, warehouse_weight, production_code)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(spg_id)
        .bind(item.product_id)
        .bind(item.carton_quantity)
        .bind(item.pack_quantity)
        .bind(&item.packaging_size)
        .bind(&item.inn)
        .bind(&item.out)
        .bind(&item.pjg)
        .bind(&item.warehouse_size)
        .bind(&item.packaging_weight)
        .bind(&item.warehouse_weight)
        .bind(&item.production_code)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

async fn item_quantities(
    tx: &mut Transaction<'_, Postgres>,
    spg_id: Uuid,
) -> AppResult<Vec<DocumentItemInput>> {
    lifecycle::item_quantities(tx, lifecycle::ItemTable::Spg, spg_id).await
}

fn quantities(items: &[shared::models::SpgItemInput]) -> Vec<DocumentItemInput> {
    items
        .iter()
        .map(|item| DocumentItemInput {
            product_id: item.product_id,
            carton_quantity: item.carton_quantity,
            pack_quantity: item.pack_quantity,
        })
        .collect()
}

fn validate_spg(input: &SpgInput) -> AppResult<()> {
    if input.items.is_empty() {
        return Err(AppError::required_field("items"));
    }
    for item in &input.items {
        if item.carton_quantity < 0 || item.pack_quantity < 0 {
            return Err(AppError::validation(
                "items",
                "Quantities must not be negative",
                "Jumlah tidak boleh negatif",
            ));
        }
    }

    if input.document_type.requires_import_fields() {
        if let Some(field) = missing_import_header_fields(input).first() {
            return Err(AppError::required_field(field));
        }
        for item in &input.items {
            if let Some(field) = missing_import_item_fields(item).first() {
                return Err(AppError::required_field(field));
            }
        }
    }
    Ok(())
}

