//! Warehouse management service
//!
//! Creating a warehouse provisions a zero-balance stock row for every
//! product, in the same transaction, so the stock matrix stays complete.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::stock;
use shared::models::Warehouse;

/// Input for creating or updating a warehouse
#[derive(Debug, Deserialize)]
pub struct WarehouseInput {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, FromRow)]
struct WarehouseRow {
    id: Uuid,
    name: String,
    description: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<WarehouseRow> for Warehouse {
    fn from(row: WarehouseRow) -> Self {
        Warehouse {
            id: row.id,
            name: row.name,
            description: row.description,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Service for managing warehouses
#[derive(Clone)]
pub struct WarehouseService {
    db: PgPool,
}

impl WarehouseService {
    /// Create a new WarehouseService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List all warehouses
    pub async fn list(&self) -> AppResult<Vec<Warehouse>> {
        let rows = sqlx::query_as::<_, WarehouseRow>(
            "SELECT id, name, description, created_at, updated_at FROM warehouses ORDER BY name",
        )
        .fetch_all(&self.db)
        .await?;
        Ok(rows.into_iter().map(Warehouse::from).collect())
    }

    /// Get a single warehouse by id
    pub async fn get(&self, id: Uuid) -> AppResult<Warehouse> {
        let row = sqlx::query_as::<_, WarehouseRow>(
            "SELECT id, name, description, created_at, updated_at FROM warehouses WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Warehouse".to_string()))?;
        Ok(row.into())
    }

    /// Create a warehouse and provision stock rows for every product
    pub async fn create(&self, input: WarehouseInput) -> AppResult<Warehouse> {
        if input.name.trim().is_empty() {
            return Err(AppError::required_field("name"));
        }

        let mut tx = self.db.begin().await?;

        let row = sqlx::query_as::<_, WarehouseRow>(
            r#"
            INSERT INTO warehouses (name, description)
            VALUES ($1, $2)
            RETURNING id, name, description, created_at, updated_at
            "#,
        )
        .bind(input.name.trim())
        .bind(&input.description)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::from_unique_violation(e, "name"))?;

        stock::provision_for_warehouse(&mut tx, row.id).await?;

        tx.commit().await?;
        Ok(row.into())
    }

    /// Update warehouse details.
    ///
    /// Renaming changes the R/S/O code used by future delivery note
    /// numbers; numbers already issued keep the code they were born with.
    pub async fn update(&self, id: Uuid, input: WarehouseInput) -> AppResult<Warehouse> {
        if input.name.trim().is_empty() {
            return Err(AppError::required_field("name"));
        }

        let row = sqlx::query_as::<_, WarehouseRow>(
            r#"
            UPDATE warehouses
            SET name = $2, description = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, description, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(input.name.trim())
        .bind(&input.description)
        .fetch_optional(&self.db)
        .await
        .map_err(|e| AppError::from_unique_violation(e, "name"))?
        .ok_or_else(|| AppError::NotFound("Warehouse".to_string()))?;
        Ok(row.into())
    }

    /// Delete a warehouse. Refused while any of its stock rows hold a
    /// non-zero balance or any document references it.
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let has_stock = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM stocks
                WHERE warehouse_id = $1 AND (carton_quantity <> 0 OR pack_quantity <> 0)
            )
            "#,
        )
        .bind(id)
        .fetch_one(&self.db)
        .await?;

        if has_stock {
            return Err(AppError::validation(
                "warehouse",
                "Warehouse still holds stock",
                "Gudang masih menyimpan stok",
            ));
        }

        let referenced = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(SELECT 1 FROM spg WHERE warehouse_id = $1)
                OR EXISTS(SELECT 1 FROM sj WHERE warehouse_id = $1)
                OR EXISTS(SELECT 1 FROM surat_lain WHERE warehouse_id = $1)
                OR EXISTS(
                    SELECT 1 FROM surat_transfer_stok
                    WHERE source_warehouse_id = $1 OR destination_warehouse_id = $1
                )
            "#,
        )
        .bind(id)
        .fetch_one(&self.db)
        .await?;

        if referenced {
            return Err(AppError::validation(
                "warehouse",
                "Warehouse is referenced by documents",
                "Gudang masih digunakan oleh dokumen",
            ));
        }

        let result = sqlx::query("DELETE FROM warehouses WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Warehouse".to_string()));
        }
        Ok(())
    }
}
