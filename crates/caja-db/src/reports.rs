//! # Reports
//!
//! Monthly aggregates for the back office: how much was sold, by whom, and
//! which products moved.
//!
//! ## Double-Count Rule
//! Companion sales (methods `credit_payment_*`) are money movements against
//! existing ledgers, not merchandise. Counting them alongside the credit
//! origination would count the same goods twice, so every merchandise
//! report here filters them out. Drawer-side reports (the daily cut) do the
//! opposite and bucket them as cash/card - the two views answer different
//! questions.
//!
//! Months are addressed as `YYYY-MM`; rows match on
//! `substr(business_date, 1, 7)`.

use serde::Serialize;
use sqlx::SqlitePool;

use caja_core::Money;

use crate::error::StoreResult;

/// Methods excluded from merchandise reports.
const COMPANION_METHODS: &str = "('credit_payment_cash', 'credit_payment_card')";

/// One month of trading, summarized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthSummary {
    /// `YYYY-MM`.
    pub month: String,
    /// Merchandise sales count (companion sales excluded).
    pub sale_count: i64,
    /// Merchandise revenue (cash + card + credit originations).
    pub revenue: Money,
    /// Frozen cost of the goods sold, from the item snapshots.
    pub cost_of_goods: Money,
    /// revenue - cost_of_goods.
    pub profit: Money,
    /// Expenses logged in the month.
    pub expenses: Money,
}

/// One seller's row in the monthly leaderboard.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct SellerStat {
    pub seller: String,
    pub sale_count: i64,
    pub revenue: Money,
}

/// One product's row in the monthly top list.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ProductStat {
    pub name: String,
    pub units: i64,
    pub revenue: Money,
}

/// Read-only reporting queries.
#[derive(Debug, Clone)]
pub struct Reports {
    pool: SqlitePool,
}

impl Reports {
    pub fn new(pool: SqlitePool) -> Self {
        Reports { pool }
    }

    /// Summarizes a month (`YYYY-MM`) of trading.
    pub async fn month_summary(&self, month: &str) -> StoreResult<MonthSummary> {
        let (sale_count, revenue): (i64, i64) = sqlx::query_as(&format!(
            r#"
            SELECT COUNT(*), COALESCE(SUM(total), 0)
            FROM sales
            WHERE substr(business_date, 1, 7) = ?1
              AND method NOT IN {COMPANION_METHODS}
            "#
        ))
        .bind(month)
        .fetch_one(&self.pool)
        .await?;

        let cost_of_goods: i64 = sqlx::query_scalar(&format!(
            r#"
            SELECT COALESCE(SUM(i.unit_cost * i.quantity), 0)
            FROM sale_items i
            JOIN sales s ON s.id = i.sale_id
            WHERE substr(s.business_date, 1, 7) = ?1
              AND s.method NOT IN {COMPANION_METHODS}
            "#
        ))
        .bind(month)
        .fetch_one(&self.pool)
        .await?;

        let expenses: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(amount), 0) FROM expenses WHERE substr(business_date, 1, 7) = ?1",
        )
        .bind(month)
        .fetch_one(&self.pool)
        .await?;

        Ok(MonthSummary {
            month: month.to_string(),
            sale_count,
            revenue: Money::from_cents(revenue),
            cost_of_goods: Money::from_cents(cost_of_goods),
            profit: Money::from_cents(revenue - cost_of_goods),
            expenses: Money::from_cents(expenses),
        })
    }

    /// Sellers ranked by merchandise revenue for a month.
    pub async fn seller_leaderboard(&self, month: &str) -> StoreResult<Vec<SellerStat>> {
        let rows = sqlx::query_as::<_, SellerStat>(&format!(
            r#"
            SELECT seller,
                   COUNT(*) AS sale_count,
                   COALESCE(SUM(total), 0) AS revenue
            FROM sales
            WHERE substr(business_date, 1, 7) = ?1
              AND method NOT IN {COMPANION_METHODS}
            GROUP BY seller
            ORDER BY revenue DESC
            "#
        ))
        .bind(month)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// The month's best-selling products by units moved.
    ///
    /// Grouped by the frozen line-item name, so renamed or deleted catalog
    /// entries still report under the name they sold as.
    pub async fn top_products(&self, month: &str, limit: u32) -> StoreResult<Vec<ProductStat>> {
        let rows = sqlx::query_as::<_, ProductStat>(&format!(
            r#"
            SELECT i.name,
                   COALESCE(SUM(i.quantity), 0) AS units,
                   COALESCE(SUM(i.unit_price * i.quantity), 0) AS revenue
            FROM sale_items i
            JOIN sales s ON s.id = i.sale_id
            WHERE substr(s.business_date, 1, 7) = ?1
              AND s.method NOT IN {COMPANION_METHODS}
            GROUP BY i.name
            ORDER BY units DESC, revenue DESC
            LIMIT ?2
            "#
        ))
        .bind(month)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Store, StoreConfig};
    use crate::repository::customer::ContactDetails;
    use crate::repository::product::NewProduct;
    use crate::service::checkout::{CreditSaleRequest, SaleRequest};
    use caja_core::cart::CartLine;
    use caja_core::types::{Category, Product, TenderKind};

    const DAY: &str = "2026-08-28";
    const MONTH: &str = "2026-08";

    async fn store() -> Store {
        Store::open(StoreConfig::in_memory()).await.unwrap()
    }

    async fn seed_product(store: &Store, name: &str, price: i64, cost: i64) -> Product {
        store
            .products()
            .create(NewProduct {
                name: name.to_string(),
                barcode: None,
                category: Category::General,
                cost_price: Money::from_cents(cost),
                market_price: Money::from_cents(price),
                sale_price: Money::from_cents(price),
                wholesale_price: Money::from_cents(price),
                stock: 100,
                min_stock: None,
                backorder: false,
            })
            .await
            .unwrap()
    }

    async fn cash_sale(store: &Store, product: &Product, qty: i64, seller: &str, date: &str) {
        let total = product.sale_price.multiply_quantity(qty);
        store
            .checkout()
            .settle(SaleRequest {
                lines: vec![CartLine::from_product(product, qty)],
                tender: TenderKind::Cash,
                received: Some(total),
                seller: seller.to_string(),
                business_date: date.to_string(),
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_month_summary_and_profit() {
        let store = store().await;
        let p = seed_product(&store, "Paint 1L", 10000, 6000).await;
        cash_sale(&store, &p, 2, "Ana", DAY).await;
        cash_sale(&store, &p, 1, "Luis", "2026-08-15").await;
        // Out of the month, excluded.
        cash_sale(&store, &p, 5, "Ana", "2026-07-01").await;

        store
            .expenses()
            .record("Bags", Money::from_cents(2000), "Ana", DAY)
            .await
            .unwrap();

        let summary = store.reports().month_summary(MONTH).await.unwrap();
        assert_eq!(summary.sale_count, 2);
        assert_eq!(summary.revenue.cents(), 30000);
        assert_eq!(summary.cost_of_goods.cents(), 18000);
        assert_eq!(summary.profit.cents(), 12000);
        assert_eq!(summary.expenses.cents(), 2000);
    }

    #[tokio::test]
    async fn test_companion_sales_not_double_counted() {
        let store = store().await;
        let p = seed_product(&store, "Drill", 30000, 15000).await;

        let receipt = store
            .checkout()
            .settle_on_credit(CreditSaleRequest {
                lines: vec![CartLine::from_product(&p, 1)],
                customer: ContactDetails {
                    name: "Maria Lopez".to_string(),
                    phone: "555-0101".to_string(),
                    address: String::new(),
                    notes: None,
                },
                installments: 3,
                seller: "Ana".to_string(),
                business_date: DAY.to_string(),
            })
            .await
            .unwrap();

        // A payment lands the same month. Revenue must stay at the
        // origination's 300.00, not 400.00.
        store
            .credit_service()
            .record_payment(
                &receipt.credit.id,
                Money::from_cents(10000),
                TenderKind::Cash,
                "Ana",
                DAY,
            )
            .await
            .unwrap();

        let summary = store.reports().month_summary(MONTH).await.unwrap();
        assert_eq!(summary.sale_count, 1);
        assert_eq!(summary.revenue.cents(), 30000);

        let top = store.reports().top_products(MONTH, 5).await.unwrap();
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].name, "Drill");
    }

    #[tokio::test]
    async fn test_seller_leaderboard_order() {
        let store = store().await;
        let p = seed_product(&store, "Paint 1L", 10000, 6000).await;
        cash_sale(&store, &p, 1, "Ana", DAY).await;
        cash_sale(&store, &p, 3, "Luis", DAY).await;
        cash_sale(&store, &p, 1, "Ana", DAY).await;

        let board = store.reports().seller_leaderboard(MONTH).await.unwrap();
        assert_eq!(board.len(), 2);
        assert_eq!(board[0].seller, "Luis");
        assert_eq!(board[0].revenue.cents(), 30000);
        assert_eq!(board[1].seller, "Ana");
        assert_eq!(board[1].sale_count, 2);
    }

    #[tokio::test]
    async fn test_top_products_limit_and_order() {
        let store = store().await;
        let a = seed_product(&store, "Nails 1kg", 1000, 500).await;
        let b = seed_product(&store, "Screws 1kg", 1200, 600).await;
        let c = seed_product(&store, "Tape", 800, 300).await;
        cash_sale(&store, &a, 10, "Ana", DAY).await;
        cash_sale(&store, &b, 7, "Ana", DAY).await;
        cash_sale(&store, &c, 2, "Ana", DAY).await;

        let top = store.reports().top_products(MONTH, 2).await.unwrap();
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].name, "Nails 1kg");
        assert_eq!(top[0].units, 10);
        assert_eq!(top[1].name, "Screws 1kg");
    }

    #[tokio::test]
    async fn test_empty_month() {
        let store = store().await;
        let summary = store.reports().month_summary("2025-01").await.unwrap();
        assert_eq!(summary.sale_count, 0);
        assert!(summary.revenue.is_zero());
        assert!(store.reports().seller_leaderboard("2025-01").await.unwrap().is_empty());
    }
}
