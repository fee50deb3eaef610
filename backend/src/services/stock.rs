//! Stock ledger service
//!
//! Owns the per-(product, warehouse) balance. Balances are mutated only
//! through `apply_delta`, a single in-place increment evaluated by the
//! database so that concurrent document operations on the same row
//! serialize instead of losing updates. `check_sufficiency` locks the
//! affected rows for the rest of the transaction so the validated
//! balance cannot be invalidated before the deltas land.

use std::collections::HashMap;

use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::models::Stock;

/// A requested outgoing quantity for one (product, warehouse) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuantityRequest {
    pub product_id: Uuid,
    pub warehouse_id: Uuid,
    pub carton_quantity: i32,
    pub pack_quantity: i32,
}

/// Atomically add the given (possibly negative) deltas to a stock row.
///
/// The increment happens inside the UPDATE statement; the balance is
/// never read into application memory. A missing row is a provisioning
/// failure, not a user error.
pub async fn apply_delta(
    tx: &mut Transaction<'_, Postgres>,
    product_id: Uuid,
    warehouse_id: Uuid,
    carton_delta: i32,
    pack_delta: i32,
) -> AppResult<()> {
    let result = sqlx::query(
        r#"
        UPDATE stocks
        SET carton_quantity = carton_quantity + $3,
            pack_quantity = pack_quantity + $4,
            updated_at = NOW()
        WHERE product_id = $1 AND warehouse_id = $2
        "#,
    )
    .bind(product_id)
    .bind(warehouse_id)
    .bind(carton_delta)
    .bind(pack_delta)
    .execute(&mut **tx)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::Integrity(format!(
            "No stock row for product {} at warehouse {}",
            product_id, warehouse_id
        )));
    }

    Ok(())
}

/// Verify that the requested outgoing quantities do not exceed the
/// available balance, locking each affected stock row `FOR UPDATE`.
///
/// `prior` carries the quantities an existing document already reserved
/// for the same (product, warehouse) pairs, so an in-place update can
/// reuse its own reservation instead of double-counting it. Requests
/// for the same pair are aggregated before checking.
pub async fn check_sufficiency(
    tx: &mut Transaction<'_, Postgres>,
    requests: &[QuantityRequest],
    prior: &[QuantityRequest],
) -> AppResult<()> {
    let requested = aggregate(requests);
    let reserved = aggregate(prior);

    for ((product_id, warehouse_id), (carton, pack)) in requested {
        let row = sqlx::query_as::<_, (i32, i32)>(
            r#"
            SELECT carton_quantity, pack_quantity
            FROM stocks
            WHERE product_id = $1 AND warehouse_id = $2
            FOR UPDATE
            "#,
        )
        .bind(product_id)
        .bind(warehouse_id)
        .fetch_optional(&mut **tx)
        .await?;

        let (balance_carton, balance_pack) = row.ok_or_else(|| {
            AppError::NotFound(format!(
                "Stock for product {} at warehouse {}",
                product_id, warehouse_id
            ))
        })?;

        let (prior_carton, prior_pack) = reserved
            .get(&(product_id, warehouse_id))
            .copied()
            .unwrap_or((0, 0));

        if balance_carton + prior_carton < carton || balance_pack + prior_pack < pack {
            let (product, warehouse) = describe_pair(tx, product_id, warehouse_id).await?;
            return Err(AppError::InsufficientStock { product, warehouse });
        }
    }

    Ok(())
}

/// Create zero-balance stock rows for a new product at every warehouse.
/// Runs inside the product-creation transaction.
pub async fn provision_for_product(
    tx: &mut Transaction<'_, Postgres>,
    product_id: Uuid,
) -> AppResult<()> {
    sqlx::query(
        r#"
        INSERT INTO stocks (product_id, warehouse_id)
        SELECT $1, id FROM warehouses
        "#,
    )
    .bind(product_id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// Create zero-balance stock rows for a new warehouse across every
/// product, deleted products included, so the one-row-per-pair
/// invariant holds even for products that are later restored.
pub async fn provision_for_warehouse(
    tx: &mut Transaction<'_, Postgres>,
    warehouse_id: Uuid,
) -> AppResult<()> {
    sqlx::query(
        r#"
        INSERT INTO stocks (product_id, warehouse_id)
        SELECT id, $1 FROM products
        "#,
    )
    .bind(warehouse_id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

fn aggregate(requests: &[QuantityRequest]) -> HashMap<(Uuid, Uuid), (i32, i32)> {
    let mut totals: HashMap<(Uuid, Uuid), (i32, i32)> = HashMap::new();
    for request in requests {
        let entry = totals
            .entry((request.product_id, request.warehouse_id))
            .or_default();
        entry.0 += request.carton_quantity;
        entry.1 += request.pack_quantity;
    }
    totals
}

async fn describe_pair(
    tx: &mut Transaction<'_, Postgres>,
    product_id: Uuid,
    warehouse_id: Uuid,
) -> AppResult<(String, String)> {
    let product = sqlx::query_scalar::<_, String>("SELECT name FROM products WHERE id = $1")
        .bind(product_id)
        .fetch_optional(&mut **tx)
        .await?
        .unwrap_or_else(|| product_id.to_string());
    let warehouse = sqlx::query_scalar::<_, String>("SELECT name FROM warehouses WHERE id = $1")
        .bind(warehouse_id)
        .fetch_optional(&mut **tx)
        .await?
        .unwrap_or_else(|| warehouse_id.to_string());
    Ok((product, warehouse))
}

/// Row shape for stock listings
#[derive(Debug, sqlx::FromRow)]
struct StockRow {
    id: Uuid,
    product_id: Uuid,
    product_name: String,
    product_code: String,
    warehouse_id: Uuid,
    warehouse_name: String,
    carton_quantity: i32,
    pack_quantity: i32,
    is_product_deleted: bool,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<StockRow> for Stock {
    fn from(row: StockRow) -> Self {
        Stock {
            id: row.id,
            product_id: row.product_id,
            product_name: row.product_name,
            product_code: row.product_code,
            warehouse_id: row.warehouse_id,
            warehouse_name: row.warehouse_name,
            carton_quantity: row.carton_quantity,
            pack_quantity: row.pack_quantity,
            is_product_deleted: row.is_product_deleted,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const STOCK_SELECT: &str = r#"
    SELECT s.id, s.product_id, p.name AS product_name, p.code AS product_code,
           s.warehouse_id, w.name AS warehouse_name,
           s.carton_quantity, s.pack_quantity,
           p.is_deleted AS is_product_deleted,
           s.created_at, s.updated_at
    FROM stocks s
    JOIN products p ON p.id = s.product_id
    JOIN warehouses w ON w.id = s.warehouse_id
"#;

/// Input for an absolute stock adjustment
#[derive(Debug, serde::Deserialize)]
pub struct AdjustStockInput {
    pub carton_quantity: i32,
    pub pack_quantity: i32,
}

/// Service for reading and adjusting stock balances
#[derive(Clone)]
pub struct StockService {
    db: PgPool,
}

impl StockService {
    /// Create a new StockService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List stock rows for non-deleted products
    pub async fn list(&self) -> AppResult<Vec<Stock>> {
        let rows = sqlx::query_as::<_, StockRow>(&format!(
            "{} WHERE p.is_deleted = FALSE ORDER BY p.name, w.name",
            STOCK_SELECT
        ))
        .fetch_all(&self.db)
        .await?;
        Ok(rows.into_iter().map(Stock::from).collect())
    }

    /// Stock rows for one warehouse (non-deleted products)
    pub async fn by_warehouse(&self, warehouse_id: Uuid) -> AppResult<Vec<Stock>> {
        let rows = sqlx::query_as::<_, StockRow>(&format!(
            "{} WHERE p.is_deleted = FALSE AND s.warehouse_id = $1 ORDER BY p.name",
            STOCK_SELECT
        ))
        .bind(warehouse_id)
        .fetch_all(&self.db)
        .await?;
        Ok(rows.into_iter().map(Stock::from).collect())
    }

    /// Stock rows for one product across warehouses
    pub async fn by_product(&self, product_id: Uuid) -> AppResult<Vec<Stock>> {
        let rows = sqlx::query_as::<_, StockRow>(&format!(
            "{} WHERE p.is_deleted = FALSE AND s.product_id = $1 ORDER BY w.name",
            STOCK_SELECT
        ))
        .bind(product_id)
        .fetch_all(&self.db)
        .await?;
        Ok(rows.into_iter().map(Stock::from).collect())
    }

    /// Get a single stock row by id
    pub async fn get(&self, stock_id: Uuid) -> AppResult<Stock> {
        let row = sqlx::query_as::<_, StockRow>(&format!("{} WHERE s.id = $1", STOCK_SELECT))
            .bind(stock_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Stock".to_string()))?;
        Ok(row.into())
    }

    /// Set absolute quantities on a stock row (manual correction outside
    /// the document flow). Stock of a deleted product may be viewed but
    /// never mutated.
    pub async fn adjust(&self, stock_id: Uuid, input: AdjustStockInput) -> AppResult<Stock> {
        let deleted = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT p.is_deleted
            FROM stocks s
            JOIN products p ON p.id = s.product_id
            WHERE s.id = $1
            "#,
        )
        .bind(stock_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Stock".to_string()))?;

        if deleted {
            return Err(AppError::validation(
                "product",
                "Cannot perform operations on stock of deleted product",
                "Tidak dapat mengubah stok produk yang sudah dihapus",
            ));
        }

        sqlx::query(
            r#"
            UPDATE stocks
            SET carton_quantity = $2, pack_quantity = $3, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(stock_id)
        .bind(input.carton_quantity)
        .bind(input.pack_quantity)
        .execute(&self.db)
        .await?;

        self.get(stock_id).await
    }
}
