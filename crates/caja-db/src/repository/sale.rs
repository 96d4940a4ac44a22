//! # Sale Repository
//!
//! Reads over the immutable sale history, plus the insert helpers the
//! transactional services use. Sales are never updated or deleted: a
//! mistaken sale is corrected by the humans at the counter, not by
//! rewriting the ledger.

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use caja_core::types::{Sale, SaleItem};
use caja_core::Money;

use crate::error::StoreResult;

const SALE_COLUMNS: &str = "id, method, total, customer_name, seller, received, change, \
     installment_count, installment_amount, debt_previous, debt_remaining, \
     business_date, created_at";

/// Per-day settlement totals, bucketed by how the money arrived.
///
/// Cash = methods {cash, credit_payment_cash}; card = {card,
/// credit_payment_card}. Credit originations move merchandise but no
/// money, so they land in neither bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DaySales {
    pub cash: Money,
    pub card: Money,
}

/// Repository for sale history reads.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Gets a sale by id.
    pub async fn get_by_id(&self, id: &str) -> StoreResult<Option<Sale>> {
        let sale = sqlx::query_as::<_, Sale>(&format!(
            r#"SELECT {SALE_COLUMNS} FROM sales WHERE id = ?1"#
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sale)
    }

    /// Line items of a sale, in insertion order.
    pub async fn items(&self, sale_id: &str) -> StoreResult<Vec<SaleItem>> {
        let items = sqlx::query_as::<_, SaleItem>(
            r#"
            SELECT id, sale_id, product_id, name, quantity, unit_price, unit_cost
            FROM sale_items
            WHERE sale_id = ?1
            ORDER BY rowid
            "#,
        )
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// All sales of one business day, newest first.
    pub async fn list_by_business_date(&self, business_date: &str) -> StoreResult<Vec<Sale>> {
        let sales = sqlx::query_as::<_, Sale>(&format!(
            r#"
            SELECT {SALE_COLUMNS} FROM sales
            WHERE business_date = ?1
            ORDER BY created_at DESC
            "#
        ))
        .bind(business_date)
        .fetch_all(&self.pool)
        .await?;

        Ok(sales)
    }

    /// Most recent sales across all days.
    pub async fn list_recent(&self, limit: u32) -> StoreResult<Vec<Sale>> {
        let sales = sqlx::query_as::<_, Sale>(&format!(
            r#"SELECT {SALE_COLUMNS} FROM sales ORDER BY created_at DESC LIMIT ?1"#
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(sales)
    }

    /// Cash and card settlement totals for one business day.
    pub async fn day_totals(&self, business_date: &str) -> StoreResult<DaySales> {
        let mut conn = self.pool.acquire().await?;
        Self::day_totals_on(&mut conn, business_date).await
    }

    /// Connection-scoped variant of [`SaleRepository::day_totals`], so the
    /// cash cut service reads the totals inside its own transaction.
    pub(crate) async fn day_totals_on(
        conn: &mut SqliteConnection,
        business_date: &str,
    ) -> StoreResult<DaySales> {
        let (cash, card): (i64, i64) = sqlx::query_as(
            r#"
            SELECT
                COALESCE(SUM(CASE WHEN method IN ('cash', 'credit_payment_cash')
                                  THEN total ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN method IN ('card', 'credit_payment_card')
                                  THEN total ELSE 0 END), 0)
            FROM sales
            WHERE business_date = ?1
            "#,
        )
        .bind(business_date)
        .fetch_one(&mut *conn)
        .await?;

        Ok(DaySales {
            cash: Money::from_cents(cash),
            card: Money::from_cents(card),
        })
    }

    /// Inserts a sale row. Transaction-scoped: only the services call this.
    pub(crate) async fn insert_on(conn: &mut SqliteConnection, sale: &Sale) -> StoreResult<()> {
        debug!(id = %sale.id, method = ?sale.method, total = %sale.total, "Inserting sale");

        sqlx::query(
            r#"
            INSERT INTO sales (
                id, method, total, customer_name, seller,
                received, change,
                installment_count, installment_amount,
                debt_previous, debt_remaining,
                business_date, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            "#,
        )
        .bind(&sale.id)
        .bind(sale.method)
        .bind(sale.total)
        .bind(&sale.customer_name)
        .bind(&sale.seller)
        .bind(sale.received)
        .bind(sale.change)
        .bind(sale.installment_count)
        .bind(sale.installment_amount)
        .bind(sale.debt_previous)
        .bind(sale.debt_remaining)
        .bind(&sale.business_date)
        .bind(sale.created_at)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// Inserts one sale line item. Transaction-scoped.
    pub(crate) async fn insert_item_on(
        conn: &mut SqliteConnection,
        item: &SaleItem,
    ) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO sale_items (id, sale_id, product_id, name, quantity, unit_price, unit_cost)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&item.id)
        .bind(&item.sale_id)
        .bind(&item.product_id)
        .bind(&item.name)
        .bind(item.quantity)
        .bind(item.unit_price)
        .bind(item.unit_cost)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Store, StoreConfig};
    use crate::repository::new_id;
    use caja_core::types::PaymentKind;
    use chrono::Utc;

    fn sale(method: PaymentKind, total: i64, date: &str) -> Sale {
        Sale {
            id: new_id(),
            method,
            total: Money::from_cents(total),
            customer_name: None,
            seller: "Ana".to_string(),
            received: None,
            change: None,
            installment_count: None,
            installment_amount: None,
            debt_previous: None,
            debt_remaining: None,
            business_date: date.to_string(),
            created_at: Utc::now(),
        }
    }

    async fn insert(store: &Store, s: &Sale) {
        let mut conn = store.pool().acquire().await.unwrap();
        SaleRepository::insert_on(&mut conn, s).await.unwrap();
    }

    #[tokio::test]
    async fn test_day_totals_buckets() {
        let store = Store::open(StoreConfig::in_memory()).await.unwrap();

        insert(&store, &sale(PaymentKind::Cash, 10000, "2026-08-28")).await;
        insert(&store, &sale(PaymentKind::Card, 5000, "2026-08-28")).await;
        insert(&store, &sale(PaymentKind::CreditPaymentCash, 2000, "2026-08-28")).await;
        insert(&store, &sale(PaymentKind::CreditPaymentCard, 1500, "2026-08-28")).await;
        // Origination: merchandise on credit, no money in either bucket.
        insert(&store, &sale(PaymentKind::Credit, 30000, "2026-08-28")).await;
        // Another day, excluded entirely.
        insert(&store, &sale(PaymentKind::Cash, 77700, "2026-08-29")).await;

        let totals = store.sales().day_totals("2026-08-28").await.unwrap();
        assert_eq!(totals.cash.cents(), 12000);
        assert_eq!(totals.card.cents(), 6500);
    }

    #[tokio::test]
    async fn test_day_totals_empty_day() {
        let store = Store::open(StoreConfig::in_memory()).await.unwrap();
        let totals = store.sales().day_totals("2026-01-01").await.unwrap();
        assert_eq!(totals, DaySales::default());
    }

    #[tokio::test]
    async fn test_list_by_business_date() {
        let store = Store::open(StoreConfig::in_memory()).await.unwrap();
        insert(&store, &sale(PaymentKind::Cash, 100, "2026-08-28")).await;
        insert(&store, &sale(PaymentKind::Cash, 200, "2026-08-29")).await;

        let day = store.sales().list_by_business_date("2026-08-28").await.unwrap();
        assert_eq!(day.len(), 1);
        assert_eq!(day[0].total.cents(), 100);
    }

    #[tokio::test]
    async fn test_items_roundtrip() {
        let store = Store::open(StoreConfig::in_memory()).await.unwrap();
        let s = sale(PaymentKind::Cash, 1998, "2026-08-28");
        insert(&store, &s).await;

        let item = SaleItem {
            id: new_id(),
            sale_id: s.id.clone(),
            product_id: Some("p1".to_string()),
            name: "Nails 1kg".to_string(),
            quantity: 2,
            unit_price: Money::from_cents(999),
            unit_cost: Money::from_cents(500),
        };
        let mut conn = store.pool().acquire().await.unwrap();
        SaleRepository::insert_item_on(&mut conn, &item).await.unwrap();
        drop(conn);

        let items = store.sales().items(&s.id).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].line_total().cents(), 1998);
    }
}
