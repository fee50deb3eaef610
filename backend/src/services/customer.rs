//! Customer management service

use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::models::Customer;
use shared::types::ViewFilter;

/// Input for creating or updating a customer
#[derive(Debug, Deserialize)]
pub struct CustomerInput {
    pub name: String,
    pub address: String,
    pub contact_number: String,
}

#[derive(Debug, FromRow)]
struct CustomerRow {
    id: Uuid,
    name: String,
    address: String,
    contact_number: String,
    is_deleted: bool,
    deleted_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CustomerRow> for Customer {
    fn from(row: CustomerRow) -> Self {
        Customer {
            id: row.id,
            name: row.name,
            address: row.address,
            contact_number: row.contact_number,
            is_deleted: row.is_deleted,
            deleted_at: row.deleted_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const CUSTOMER_COLUMNS: &str =
    "id, name, address, contact_number, is_deleted, deleted_at, created_at, updated_at";

/// Service for managing delivery customers
#[derive(Clone)]
pub struct CustomerService {
    db: PgPool,
}

impl CustomerService {
    /// Create a new CustomerService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List customers filtered by deletion state
    pub async fn list(&self, view: ViewFilter) -> AppResult<Vec<Customer>> {
        let rows = sqlx::query_as::<_, CustomerRow>(&format!(
            "SELECT {} FROM customers WHERE {} ORDER BY name",
            CUSTOMER_COLUMNS,
            view.predicate()
        ))
        .fetch_all(&self.db)
        .await?;
        Ok(rows.into_iter().map(Customer::from).collect())
    }

    /// Get a single customer by id
    pub async fn get(&self, id: Uuid) -> AppResult<Customer> {
        let row = sqlx::query_as::<_, CustomerRow>(&format!(
            "SELECT {} FROM customers WHERE id = $1",
            CUSTOMER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Customer".to_string()))?;
        Ok(row.into())
    }

    /// Create a new customer
    pub async fn create(&self, input: CustomerInput) -> AppResult<Customer> {
        if input.name.trim().is_empty() {
            return Err(AppError::required_field("name"));
        }

        let row = sqlx::query_as::<_, CustomerRow>(&format!(
            r#"
            INSERT INTO customers (name, address, contact_number)
            VALUES ($1, $2, $3)
            RETURNING {}
            "#,
            CUSTOMER_COLUMNS
        ))
        .bind(input.name.trim())
        .bind(&input.address)
        .bind(&input.contact_number)
        .fetch_one(&self.db)
        .await?;
        Ok(row.into())
    }

    /// Update customer details. Deleted customers must be restored first.
    pub async fn update(&self, id: Uuid, input: CustomerInput) -> AppResult<Customer> {
        if input.name.trim().is_empty() {
            return Err(AppError::required_field("name"));
        }

        let deleted =
            sqlx::query_scalar::<_, bool>("SELECT is_deleted FROM customers WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.db)
                .await?
                .ok_or_else(|| AppError::NotFound("Customer".to_string()))?;
        if deleted {
            return Err(AppError::InvalidStateTransition(
                "Customer is deleted".to_string(),
            ));
        }

        let row = sqlx::query_as::<_, CustomerRow>(&format!(
            r#"
            UPDATE customers
            SET name = $2, address = $3, contact_number = $4, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            CUSTOMER_COLUMNS
        ))
        .bind(id)
        .bind(input.name.trim())
        .bind(&input.address)
        .bind(&input.contact_number)
        .fetch_one(&self.db)
        .await?;
        Ok(row.into())
    }

    /// Soft-delete a customer
    pub async fn soft_delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE customers
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

    /// Restore a soft-deleted customer
    pub async fn restore(&self, id: Uuid) -> AppResult<Customer> {
        let result = sqlx::query(
            r#"
            UPDATE customers
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

    async fn missing_or_transition(&self, id: Uuid, deleting: bool) -> AppResult<AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM customers WHERE id = $1)",
        )
        .bind(id)
        .fetch_one(&self.db)
        .await?;

        Ok(if !exists {
            AppError::NotFound("Customer".to_string())
        } else if deleting {
            AppError::InvalidStateTransition("Customer is already deleted".to_string())
        } else {
            AppError::InvalidStateTransition("Customer is not deleted".to_string())
        })
    }
}
