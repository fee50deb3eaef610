//! Shared document lifecycle arithmetic
//!
//! Every document family drives stock through the same three moves:
//! apply its deltas on create or restore, invert them on soft delete,
//! and on update invert the old before applying the new. The delta
//! builders here turn document items into signed per-row moves; the
//! inversion is a pure sign flip, which is what makes delete and
//! restore exact mirrors.

use std::collections::HashMap;

use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::stock::{self, QuantityRequest};
use shared::models::{DocumentItem, DocumentItemInput, SuratLainType};

/// One signed stock movement against a (product, warehouse) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockDelta {
    pub product_id: Uuid,
    pub warehouse_id: Uuid,
    pub carton_delta: i32,
    pub pack_delta: i32,
}

impl StockDelta {
    /// The exact opposite movement
    pub fn inverted(self) -> Self {
        Self {
            carton_delta: -self.carton_delta,
            pack_delta: -self.pack_delta,
            ..self
        }
    }
}

/// Flip the sign of every delta
pub fn invert(deltas: &[StockDelta]) -> Vec<StockDelta> {
    deltas.iter().map(|d| d.inverted()).collect()
}

/// Apply a batch of deltas inside the caller's transaction
pub async fn apply(
    tx: &mut Transaction<'_, Postgres>,
    deltas: &[StockDelta],
) -> AppResult<()> {
    for delta in deltas {
        stock::apply_delta(
            tx,
            delta.product_id,
            delta.warehouse_id,
            delta.carton_delta,
            delta.pack_delta,
        )
        .await?;
    }
    Ok(())
}

/// Deltas for an incoming document: every item adds to one warehouse
pub fn incoming_deltas(warehouse_id: Uuid, items: &[DocumentItemInput]) -> Vec<StockDelta> {
    items
        .iter()
        .map(|item| StockDelta {
            product_id: item.product_id,
            warehouse_id,
            carton_delta: item.carton_quantity,
            pack_delta: item.pack_quantity,
        })
        .collect()
}

/// Deltas for an outgoing document: every item subtracts from one warehouse
pub fn outgoing_deltas(warehouse_id: Uuid, items: &[DocumentItemInput]) -> Vec<StockDelta> {
    items
        .iter()
        .map(|item| StockDelta {
            product_id: item.product_id,
            warehouse_id,
            carton_delta: -item.carton_quantity,
            pack_delta: -item.pack_quantity,
        })
        .collect()
}

/// Deltas for a transfer: each item subtracts at the source and adds
/// the same quantities at the destination.
pub fn transfer_deltas(
    source_warehouse_id: Uuid,
    destination_warehouse_id: Uuid,
    items: &[DocumentItemInput],
) -> Vec<StockDelta> {
    let mut deltas = Vec::with_capacity(items.len() * 2);
    for item in items {
        deltas.push(StockDelta {
            product_id: item.product_id,
            warehouse_id: source_warehouse_id,
            carton_delta: -item.carton_quantity,
            pack_delta: -item.pack_quantity,
        });
        deltas.push(StockDelta {
            product_id: item.product_id,
            warehouse_id: destination_warehouse_id,
            carton_delta: item.carton_quantity,
            pack_delta: item.pack_quantity,
        });
    }
    deltas
}

/// Deltas for a surat lain, signed per its document type
pub fn surat_lain_deltas(
    document_type: SuratLainType,
    warehouse_id: Uuid,
    items: &[DocumentItemInput],
) -> Vec<StockDelta> {
    match document_type {
        SuratLainType::Stb | SuratLainType::ReturPenjualan => incoming_deltas(warehouse_id, items),
        SuratLainType::Spb | SuratLainType::ReturPembelian => outgoing_deltas(warehouse_id, items),
    }
}

/// Sufficiency requests for an outgoing movement
pub fn outgoing_requests(warehouse_id: Uuid, items: &[DocumentItemInput]) -> Vec<QuantityRequest> {
    items
        .iter()
        .map(|item| QuantityRequest {
            product_id: item.product_id,
            warehouse_id,
            carton_quantity: item.carton_quantity,
            pack_quantity: item.pack_quantity,
        })
        .collect()
}

/// Documents may only reference existing warehouses.
pub async fn ensure_warehouse(
    tx: &mut Transaction<'_, Postgres>,
    warehouse_id: Uuid,
) -> AppResult<()> {
    let exists =
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM warehouses WHERE id = $1)")
            .bind(warehouse_id)
            .fetch_one(&mut **tx)
            .await?;
    if !exists {
        return Err(crate::error::AppError::NotFound("Warehouse".to_string()));
    }
    Ok(())
}

/// Every referenced product must exist and be active.
pub async fn ensure_products(
    tx: &mut Transaction<'_, Postgres>,
    product_ids: impl Iterator<Item = Uuid>,
) -> AppResult<()> {
    let ids: Vec<Uuid> = product_ids.collect();
    let active = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(DISTINCT id) FROM products WHERE id = ANY($1) AND is_deleted = FALSE",
    )
    .bind(&ids)
    .fetch_one(&mut **tx)
    .await?;

    let distinct: std::collections::HashSet<Uuid> = ids.iter().copied().collect();
    if active as usize != distinct.len() {
        return Err(crate::error::AppError::NotFound("Product".to_string()));
    }
    Ok(())
}

/// Fetch a document's items as bare quantities, for delta building.
pub async fn item_quantities(
    tx: &mut Transaction<'_, Postgres>,
    table: ItemTable,
    parent_id: Uuid,
) -> AppResult<Vec<DocumentItemInput>> {
    let rows = sqlx::query_as::<_, (Uuid, i32, i32)>(&format!(
        "SELECT product_id, carton_quantity, pack_quantity FROM {} WHERE {} = $1",
        table.table(),
        table.parent_column()
    ))
    .bind(parent_id)
    .fetch_all(&mut **tx)
    .await?;
    Ok(rows
        .into_iter()
        .map(|(product_id, carton_quantity, pack_quantity)| DocumentItemInput {
            product_id,
            carton_quantity,
            pack_quantity,
        })
        .collect())
}

/// The item tables that share the plain (product, carton, pack) shape
#[derive(Debug, Clone, Copy)]
pub enum ItemTable {
    Spg,
    Spk,
    Sj,
    Transfer,
    SuratLain,
}

impl ItemTable {
    fn table(self) -> &'static str {
        match self {
            ItemTable::Spg => "spg_items",
            ItemTable::Spk => "spk_items",
            ItemTable::Sj => "sj_items",
            ItemTable::Transfer => "surat_transfer_stok_items",
            ItemTable::SuratLain => "surat_lain_items",
        }
    }

    fn parent_column(self) -> &'static str {
        match self {
            ItemTable::Spg => "spg_id",
            ItemTable::Spk => "spk_id",
            ItemTable::Sj => "sj_id",
            ItemTable::Transfer => "surat_transfer_stok_id",
            ItemTable::SuratLain => "surat_lain_id",
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct JoinedItemRow {
    id: Uuid,
    parent_id: Uuid,
    product_id: Uuid,
    product_name: String,
    product_code: String,
    carton_quantity: i32,
    pack_quantity: i32,
}

/// Fetch the items of many documents at once, joined with product
/// details and grouped by parent document id.
pub async fn fetch_document_items(
    db: &PgPool,
    table: ItemTable,
    parent_ids: &[Uuid],
) -> AppResult<HashMap<Uuid, Vec<DocumentItem>>> {
    if parent_ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows = sqlx::query_as::<_, JoinedItemRow>(&format!(
        r#"
        SELECT i.id, i.{parent} AS parent_id, i.product_id,
               p.name AS product_name, p.code AS product_code,
               i.carton_quantity, i.pack_quantity
        FROM {table} i
        JOIN products p ON p.id = i.product_id
        WHERE i.{parent} = ANY($1)
        ORDER BY i.created_at
        "#,
        table = table.table(),
        parent = table.parent_column()
    ))
    .bind(parent_ids)
    .fetch_all(db)
    .await?;

    let mut grouped: HashMap<Uuid, Vec<DocumentItem>> = HashMap::new();
    for row in rows {
        grouped
            .entry(row.parent_id)
            .or_default()
            .push(DocumentItem {
                id: row.id,
                product_id: row.product_id,
                product_name: row.product_name,
                product_code: row.product_code,
                carton_quantity: row.carton_quantity,
                pack_quantity: row.pack_quantity,
            });
    }
    Ok(grouped)
}

/// Insert plain (product, carton, pack) items for a document.
pub async fn insert_plain_items(
    tx: &mut Transaction<'_, Postgres>,
    table: ItemTable,
    parent_id: Uuid,
    items: &[DocumentItemInput],
) -> AppResult<()> {
    let sql = format!(
        "INSERT INTO {} ({}, product_id, carton_quantity, pack_quantity) VALUES ($1, $2, $3, $4)",
        table.table(),
        table.parent_column()
    );
    for item in items {
        sqlx::query(&sql)
            .bind(parent_id)
            .bind(item.product_id)
            .bind(item.carton_quantity)
            .bind(item.pack_quantity)
            .execute(&mut **tx)
            .await?;
    }
    Ok(())
}
