//! Supplier management service

use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::models::Supplier;
use shared::types::ViewFilter;

/// Input for creating or updating a supplier
#[derive(Debug, Deserialize)]
pub struct SupplierInput {
    pub name: String,
    pub email: String,
    pub address: String,
    pub pic_name: String,
    pub pic_contact: String,
}

#[derive(Debug, FromRow)]
struct SupplierRow {
    id: Uuid,
    name: String,
    email: String,
    address: String,
    pic_name: String,
    pic_contact: String,
    is_deleted: bool,
    deleted_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<SupplierRow> for Supplier {
    fn from(row: SupplierRow) -> Self {
        Supplier {
            id: row.id,
            name: row.name,
            email: row.email,
            address: row.address,
            pic_name: row.pic_name,
            pic_contact: row.pic_contact,
            is_deleted: row.is_deleted,
            deleted_at: row.deleted_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const SUPPLIER_COLUMNS: &str = "id, name, email, address, pic_name, pic_contact, \
     is_deleted, deleted_at, created_at, updated_at";

/// Service for managing suppliers
#[derive(Clone)]
pub struct SupplierService {
    db: PgPool,
}

impl SupplierService {
    /// Create a new SupplierService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List suppliers filtered by deletion state
    pub async fn list(&self, view: ViewFilter) -> AppResult<Vec<Supplier>> {
        let rows = sqlx::query_as::<_, SupplierRow>(&format!(
            "SELECT {} FROM suppliers WHERE {} ORDER BY name",
            SUPPLIER_COLUMNS,
            view.predicate()
        ))
        .fetch_all(&self.db)
        .await?;
        Ok(rows.into_iter().map(Supplier::from).collect())
    }

    /// Get a single supplier by id
    pub async fn get(&self, id: Uuid) -> AppResult<Supplier> {
        let row = sqlx::query_as::<_, SupplierRow>(&format!(
            "SELECT {} FROM suppliers WHERE id = $1",
            SUPPLIER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Supplier".to_string()))?;
        Ok(row.into())
    }

    /// Create a new supplier
    pub async fn create(&self, input: SupplierInput) -> AppResult<Supplier> {
        validate_supplier(&input)?;

        let row = sqlx::query_as::<_, SupplierRow>(&format!(
            r#"
            INSERT INTO suppliers (name, email, address, pic_name, pic_contact)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            SUPPLIER_COLUMNS
        ))
        .bind(input.name.trim())
        .bind(input.email.trim())
        .bind(&input.address)
        .bind(&input.pic_name)
        .bind(&input.pic_contact)
        .fetch_one(&self.db)
        .await?;
        Ok(row.into())
    }

    /// Update supplier details. Deleted suppliers must be restored first.
    pub async fn update(&self, id: Uuid, input: SupplierInput) -> AppResult<Supplier> {
        validate_supplier(&input)?;
        self.ensure_active(id).await?;

        let row = sqlx::query_as::<_, SupplierRow>(&format!(
            r#"
            UPDATE suppliers
            SET name = $2, email = $3, address = $4, pic_name = $5, pic_contact = $6,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            SUPPLIER_COLUMNS
        ))
        .bind(id)
        .bind(input.name.trim())
        .bind(input.email.trim())
        .bind(&input.address)
        .bind(&input.pic_name)
        .bind(&input.pic_contact)
        .fetch_one(&self.db)
        .await?;
        Ok(row.into())
    }

    /// Soft-delete a supplier
    pub async fn soft_delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE suppliers
            SET is_deleted = TRUE, deleted_at = NOW(), updated_at = NOW()
            WHERE id = $1 AND is_deleted = FALSE
            "#,
        )
        .bind(id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(self.missing_or_transition(id, true).await?);
        }
        Ok(())
    }

    /// Restore a soft-deleted supplier
    pub async fn restore(&self, id: Uuid) -> AppResult<Supplier> {
        let result = sqlx::query(
            r#"
            UPDATE suppliers
            SET is_deleted = FALSE, deleted_at = NULL, updated_at = NOW()
            WHERE id = $1 AND is_deleted = TRUE
            "#,
        )
        .bind(id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(self.missing_or_transition(id, false).await?);
        }
        self.get(id).await
    }

    async fn ensure_active(&self, id: Uuid) -> AppResult<()> {
        let deleted =
            sqlx::query_scalar::<_, bool>("SELECT is_deleted FROM suppliers WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.db)
                .await?
                .ok_or_else(|| AppError::NotFound("Supplier".to_string()))?;
        if deleted {
            return Err(AppError::InvalidStateTransition(
                "Supplier is deleted".to_string(),
            ));
        }
        Ok(())
    }

    /// Distinguish a missing row from a bad state after a guarded UPDATE
    /// matched nothing.
    async fn missing_or_transition(&self, id: Uuid, deleting: bool) -> AppResult<AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM suppliers WHERE id = $1)",
        )
        .bind(id)
        .fetch_one(&self.db)
        .await?;

        Ok(if !exists {
            AppError::NotFound("Supplier".to_string())
        } else if deleting {
            AppError::InvalidStateTransition("Supplier is already deleted".to_string())
        } else {
            AppError::InvalidStateTransition("Supplier is not deleted".to_string())
        })
    }
}

fn validate_supplier(input: &SupplierInput) -> AppResult<()> {
    if input.name.trim().is_empty() {
        return Err(AppError::required_field("name"));
    }
    if input.email.trim().is_empty() {
        return Err(AppError::required_field("email"));
    }
    Ok(())
}
