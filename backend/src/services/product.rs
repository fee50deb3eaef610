//! Product catalog service
//!
//! Creating a product provisions a zero-balance stock row at every
//! warehouse inside the creation transaction. Soft delete hides the
//! product and its balances from active views without touching them;
//! restore brings both back exactly as they were.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::stock;
use shared::models::{Product, ProductDetail, WarehouseQuantities};
use shared::types::ViewFilter;

/// Input for creating or updating a product
#[derive(Debug, Deserialize)]
pub struct ProductInput {
    pub code: String,
    pub name: String,
    pub category_id: Uuid,
    pub supplier_id: Uuid,
    pub supplier_price: Decimal,
    pub packing: String,
}

#[derive(Debug, FromRow)]
struct ProductRow {
    id: Uuid,
    code: String,
    name: String,
    category_id: Uuid,
    category_name: String,
    supplier_id: Uuid,
    supplier_name: String,
    supplier_price: Decimal,
    packing: String,
    is_deleted: bool,
    deleted_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            code: row.code,
            name: row.name,
            category_id: row.category_id,
            category_name: row.category_name,
            supplier_id: row.supplier_id,
            supplier_name: row.supplier_name,
            supplier_price: row.supplier_price,
            packing: row.packing,
            is_deleted: row.is_deleted,
            deleted_at: row.deleted_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const PRODUCT_SELECT: &str = r#"
    SELECT p.id, p.code, p.name,
           p.category_id, c.name AS category_name,
           p.supplier_id, sup.name AS supplier_name,
           p.supplier_price, p.packing,
           p.is_deleted, p.deleted_at, p.created_at, p.updated_at
    FROM products p
    JOIN categories c ON c.id = p.category_id
    JOIN suppliers sup ON sup.id = p.supplier_id
"#;

/// Service for managing the product catalog
#[derive(Clone)]
pub struct ProductService {
    db: PgPool,
}

impl ProductService {
    /// Create a new ProductService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List products filtered by deletion state
    pub async fn list(&self, view: ViewFilter) -> AppResult<Vec<Product>> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "{} WHERE p.{} ORDER BY p.name",
            PRODUCT_SELECT,
            view.predicate()
        ))
        .fetch_all(&self.db)
        .await?;
        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Active products in one category
    pub async fn by_category(&self, category_id: Uuid) -> AppResult<Vec<Product>> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "{} WHERE p.is_deleted = FALSE AND p.category_id = $1 ORDER BY p.name",
            PRODUCT_SELECT
        ))
        .bind(category_id)
        .fetch_all(&self.db)
        .await?;
        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Active products from one supplier
    pub async fn by_supplier(&self, supplier_id: Uuid) -> AppResult<Vec<Product>> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "{} WHERE p.is_deleted = FALSE AND p.supplier_id = $1 ORDER BY p.name",
            PRODUCT_SELECT
        ))
        .bind(supplier_id)
        .fetch_all(&self.db)
        .await?;
        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Get a product with its per-warehouse balances. Deleted products
    /// are returned without balances.
    pub async fn get_detail(&self, id: Uuid) -> AppResult<ProductDetail> {
        let product = self.get(id).await?;

        let stocks = if product.is_deleted {
            BTreeMap::new()
        } else {
            let rows = sqlx::query_as::<_, (String, i32, i32)>(
                r#"
                SELECT w.name, s.carton_quantity, s.pack_quantity
                FROM stocks s
                JOIN warehouses w ON w.id = s.warehouse_id
                WHERE s.product_id = $1
                "#,
            )
            .bind(id)
            .fetch_all(&self.db)
            .await?;

            rows.into_iter()
                .map(|(name, carton, pack)| (name, WarehouseQuantities { carton, pack }))
                .collect()
        };

        Ok(ProductDetail { product, stocks })
    }

    /// Get a single product by id
    pub async fn get(&self, id: Uuid) -> AppResult<Product> {
        let row =
            sqlx::query_as::<_, ProductRow>(&format!("{} WHERE p.id = $1", PRODUCT_SELECT))
                .bind(id)
                .fetch_optional(&self.db)
                .await?
                .ok_or_else(|| AppError::NotFound("Product".to_string()))?;
        Ok(row.into())
    }

    /// Create a product and provision stock rows at every warehouse
    pub async fn create(&self, input: ProductInput) -> AppResult<Product> {
        validate_product(&input)?;
        self.check_references(&input).await?;

        let mut tx = self.db.begin().await?;

        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO products (code, name, category_id, supplier_id, supplier_price, packing)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(input.code.trim())
        .bind(input.name.trim())
        .bind(input.category_id)
        .bind(input.supplier_id)
        .bind(input.supplier_price)
        .bind(&input.packing)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::from_unique_violation(e, "code"))?;

        stock::provision_for_product(&mut tx, id).await?;

        tx.commit().await?;
        self.get(id).await
    }

    /// Update product details. Deleted products must be restored first.
    pub async fn update(&self, id: Uuid, input: ProductInput) -> AppResult<Product> {
        validate_product(&input)?;
        self.check_references(&input).await?;

        let deleted =
            sqlx::query_scalar::<_, bool>("SELECT is_deleted FROM products WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.db)
                .await?
                .ok_or_else(|| AppError::NotFound("Product".to_string()))?;
        if deleted {
            return Err(AppError::InvalidStateTransition(
                "Product is deleted".to_string(),
            ));
        }

        let result = sqlx::query(
            r#"
            UPDATE products
            SET code = $2, name = $3, category_id = $4, supplier_id = $5,
                supplier_price = $6, packing = $7, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(input.code.trim())
        .bind(input.name.trim())
        .bind(input.category_id)
        .bind(input.supplier_id)
        .bind(input.supplier_price)
        .bind(&input.packing)
        .execute(&self.db)
        .await
        .map_err(|e| AppError::from_unique_violation(e, "code"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Product".to_string()));
        }
        self.get(id).await
    }

    /// Soft-delete a product. Its stock rows keep their balances and
    /// reappear untouched on restore.
    pub async fn soft_delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE products
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

    /// Restore a soft-deleted product
    pub async fn restore(&self, id: Uuid) -> AppResult<Product> {
        let result = sqlx::query(
            r#"
            UPDATE products
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

    async fn check_references(&self, input: &ProductInput) -> AppResult<()> {
        let category_exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM categories WHERE id = $1)",
        )
        .bind(input.category_id)
        .fetch_one(&self.db)
        .await?;
        if !category_exists {
            return Err(AppError::NotFound("Category".to_string()));
        }

        let supplier_exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM suppliers WHERE id = $1 AND is_deleted = FALSE)",
        )
        .bind(input.supplier_id)
        .fetch_one(&self.db)
        .await?;
        if !supplier_exists {
            return Err(AppError::NotFound("Supplier".to_string()));
        }
        Ok(())
    }

    async fn missing_or_transition(&self, id: Uuid, deleting: bool) -> AppResult<AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM products WHERE id = $1)",
        )
        .bind(id)
        .fetch_one(&self.db)
        .await?;

        Ok(if !exists {
            AppError::NotFound("Product".to_string())
        } else if deleting {
            AppError::InvalidStateTransition("Product is already deleted".to_string())
        } else {
            AppError::InvalidStateTransition("Product is not deleted".to_string())
        })
    }
}

fn validate_product(input: &ProductInput) -> AppResult<()> {
    if input.code.trim().is_empty() {
        return Err(AppError::required_field("code"));
    }
    if input.name.trim().is_empty() {
        return Err(AppError::required_field("name"));
    }
    if input.supplier_price < Decimal::ZERO {
        return Err(AppError::validation(
            "supplier_price",
            "Supplier price must not be negative",
            "Harga supplier tidak boleh negatif",
        ));
    }
    Ok(())
}
