//! # Product Repository
//!
//! Catalog reads and writes.
//!
//! ## Stock Updates
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                    Stock Update Strategy                         │
//! │                                                                  │
//! │  ❌ WRONG: absolute update (lost-update race)                    │
//! │     UPDATE products SET stock = 7 WHERE id = ?                   │
//! │                                                                  │
//! │  ✅ CORRECT: relative delta                                      │
//! │     UPDATE products SET stock = stock - 3 WHERE id = ?           │
//! │                                                                  │
//! │  Two concurrent checkouts each apply their own delta; neither    │
//! │  overwrites the other's decrement.                               │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `adjust_stock` is deliberately unconditional: backorder products are
//! allowed to go negative (units owed to customers). The "can this sell?"
//! check belongs to the checkout service, which runs it inside the same
//! transaction as the decrement.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use caja_core::types::{Category, Product};
use caja_core::validation::{validate_product_name, validate_sale_price};
use caja_core::Money;

use crate::error::{StoreError, StoreResult};
use crate::repository::new_id;

const PRODUCT_COLUMNS: &str = "id, name, barcode, category, cost_price, market_price, \
     sale_price, wholesale_price, stock, min_stock, backorder, created_at, updated_at";

/// Fields required to create a catalog entry.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub barcode: Option<String>,
    pub category: Category,
    pub cost_price: Money,
    pub market_price: Money,
    pub sale_price: Money,
    pub wholesale_price: Money,
    pub stock: i64,
    pub min_stock: Option<i64>,
    pub backorder: bool,
}

/// Repository for product catalog operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Creates a new product.
    ///
    /// ## Errors
    /// - [`StoreError::Domain`] - empty name or non-positive sale price
    /// - [`StoreError::UniqueViolation`] - duplicate barcode
    pub async fn create(&self, new: NewProduct) -> StoreResult<Product> {
        validate_product_name(&new.name).map_err(caja_core::CoreError::from)?;
        validate_sale_price(new.sale_price.cents()).map_err(caja_core::CoreError::from)?;

        let now = Utc::now();
        let product = Product {
            id: new_id(),
            name: new.name.trim().to_string(),
            barcode: new.barcode,
            category: new.category,
            cost_price: new.cost_price,
            market_price: new.market_price,
            sale_price: new.sale_price,
            wholesale_price: new.wholesale_price,
            stock: new.stock,
            min_stock: new.min_stock,
            backorder: new.backorder,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %product.id, name = %product.name, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, name, barcode, category,
                cost_price, market_price, sale_price, wholesale_price,
                stock, min_stock, backorder,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.barcode)
        .bind(product.category)
        .bind(product.cost_price)
        .bind(product.market_price)
        .bind(product.sale_price)
        .bind(product.wholesale_price)
        .bind(product.stock)
        .bind(product.min_stock)
        .bind(product.backorder)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(product)
    }

    /// Updates an existing product's catalog fields.
    ///
    /// Stock is NOT written here; use [`ProductRepository::adjust_stock`]
    /// so concurrent sales can't overwrite each other's decrements.
    pub async fn update(&self, product: &Product) -> StoreResult<()> {
        validate_product_name(&product.name).map_err(caja_core::CoreError::from)?;
        validate_sale_price(product.sale_price.cents()).map_err(caja_core::CoreError::from)?;

        debug!(id = %product.id, "Updating product");

        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = ?2,
                barcode = ?3,
                category = ?4,
                cost_price = ?5,
                market_price = ?6,
                sale_price = ?7,
                wholesale_price = ?8,
                min_stock = ?9,
                backorder = ?10,
                updated_at = ?11
            WHERE id = ?1
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.barcode)
        .bind(product.category)
        .bind(product.cost_price)
        .bind(product.market_price)
        .bind(product.sale_price)
        .bind(product.wholesale_price)
        .bind(product.min_stock)
        .bind(product.backorder)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("Product", &product.id));
        }

        Ok(())
    }

    /// Applies a relative stock change (negative for sales, positive for
    /// restocking). Unconditional - see the module docs.
    pub async fn adjust_stock(&self, id: &str, delta: i64) -> StoreResult<()> {
        debug!(id = %id, delta = %delta, "Adjusting stock");

        let result = sqlx::query(
            r#"
            UPDATE products
            SET stock = stock + ?2, updated_at = ?3
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(delta)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("Product", id));
        }

        Ok(())
    }

    /// Gets a product by id.
    pub async fn get_by_id(&self, id: &str) -> StoreResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Gets a product by barcode (for the scanner path at the register).
    pub async fn get_by_barcode(&self, barcode: &str) -> StoreResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE barcode = ?1"
        ))
        .bind(barcode)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Searches the catalog by name or barcode substring.
    ///
    /// Empty query returns the catalog sorted by name.
    pub async fn search(&self, query: &str, limit: u32) -> StoreResult<Vec<Product>> {
        let query = query.trim();

        debug!(query = %query, limit = %limit, "Searching products");

        if query.is_empty() {
            return self.list(limit).await;
        }

        let pattern = format!("%{}%", query);
        let products = sqlx::query_as::<_, Product>(&format!(
            r#"
            SELECT {PRODUCT_COLUMNS} FROM products
            WHERE name LIKE ?1 OR barcode LIKE ?1
            ORDER BY name
            LIMIT ?2
            "#
        ))
        .bind(pattern)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        debug!(count = products.len(), "Search returned products");
        Ok(products)
    }

    /// Lists the catalog sorted by name.
    pub async fn list(&self, limit: u32) -> StoreResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY name LIMIT ?1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Products at or below their restock threshold.
    pub async fn low_stock(&self) -> StoreResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            r#"
            SELECT {PRODUCT_COLUMNS} FROM products
            WHERE min_stock IS NOT NULL AND stock <= min_stock
            ORDER BY stock ASC
            "#
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Deletes a product from the catalog.
    ///
    /// Historical sale lines keep their frozen snapshot; only the catalog
    /// row disappears.
    pub async fn delete(&self, id: &str) -> StoreResult<()> {
        debug!(id = %id, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("Product", id));
        }

        Ok(())
    }

    /// Counts catalog entries (for diagnostics).
    pub async fn count(&self) -> StoreResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
