//! # Checkout Service
//!
//! Turns a cart into a persisted sale, atomically.
//!
//! ## Flow
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │  BEGIN TRANSACTION                                               │
//! │       │                                                          │
//! │       ├── for each cart line with a product id:                  │
//! │       │       re-read product, check stock rule, decrement       │
//! │       │                                                          │
//! │       ├── cash tender: received ≥ total, compute change          │
//! │       │                                                          │
//! │       ├── INSERT sale + sale_items (frozen snapshots)            │
//! │       │                                                          │
//! │       ├── credit only: upsert customer by phone,                 │
//! │       │               INSERT credit + credit_items               │
//! │       │                                                          │
//! │  COMMIT (any failure rolls the whole sale back)                  │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The stock rule runs on the row as read *inside* the transaction, not on
//! whatever the register displayed. Non-backorder products can therefore
//! never be driven below zero, even by concurrent checkouts.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use caja_core::cart::CartLine;
use caja_core::ledger::installment_amount;
use caja_core::types::{
    Credit, CreditItem, CreditStatus, PaymentKind, Product, Sale, SaleItem, TenderKind,
};
use caja_core::{CoreError, Money};

use crate::error::{StoreError, StoreResult};
use crate::repository::customer::{ContactDetails, CustomerRepository};
use crate::repository::new_id;
use crate::repository::sale::SaleRepository;

// =============================================================================
// Requests
// =============================================================================

/// A cash or card sale, ready to settle.
#[derive(Debug, Clone)]
pub struct SaleRequest {
    pub lines: Vec<CartLine>,
    pub tender: TenderKind,
    /// Cash only: amount the customer handed over.
    pub received: Option<Money>,
    /// Display name of the cashier ringing this up.
    pub seller: String,
    /// Local day the sale belongs to, ISO `YYYY-MM-DD`.
    pub business_date: String,
}

/// A sale on installment credit, ready to originate.
#[derive(Debug, Clone)]
pub struct CreditSaleRequest {
    pub lines: Vec<CartLine>,
    pub customer: ContactDetails,
    /// Agreed number of installments (2 or 3).
    pub installments: u32,
    pub seller: String,
    pub business_date: String,
}

/// What a completed cash/card checkout hands back for the receipt.
#[derive(Debug, Clone)]
pub struct SaleReceipt {
    pub sale: Sale,
    pub items: Vec<SaleItem>,
}

/// What a completed credit origination hands back.
#[derive(Debug, Clone)]
pub struct CreditReceipt {
    pub sale: Sale,
    pub credit: Credit,
}

// =============================================================================
// Service
// =============================================================================

/// Atomic checkout flows.
#[derive(Debug, Clone)]
pub struct CheckoutService {
    pool: SqlitePool,
}

impl CheckoutService {
    pub fn new(pool: SqlitePool) -> Self {
        CheckoutService { pool }
    }

    /// Settles a cash or card sale.
    ///
    /// ## Errors
    /// - [`CoreError::InsufficientStock`] - a non-backorder line exceeds stock
    /// - [`CoreError::InsufficientPayment`] - cash tendered below the total
    /// - [`StoreError::NotFound`] - a cart line references a deleted product
    pub async fn settle(&self, request: SaleRequest) -> StoreResult<SaleReceipt> {
        let total = cart_total(&request.lines)?;

        // Cash needs tender arithmetic up front; card settles exactly.
        let (received, change) = match request.tender {
            TenderKind::Cash => {
                let received = request.received.unwrap_or(Money::zero());
                if received < total {
                    return Err(CoreError::InsufficientPayment {
                        total_cents: total.cents(),
                        tendered_cents: received.cents(),
                    }
                    .into());
                }
                (Some(received), Some(received - total))
            }
            TenderKind::Card => (None, None),
        };

        let method = match request.tender {
            TenderKind::Cash => PaymentKind::Cash,
            TenderKind::Card => PaymentKind::Card,
        };

        let mut tx = self.pool.begin().await?;

        for line in &request.lines {
            take_stock(&mut tx, line).await?;
        }

        let sale = Sale {
            id: new_id(),
            method,
            total,
            customer_name: None,
            seller: request.seller.clone(),
            received,
            change,
            installment_count: None,
            installment_amount: None,
            debt_previous: None,
            debt_remaining: None,
            business_date: request.business_date.clone(),
            created_at: Utc::now(),
        };
        SaleRepository::insert_on(&mut tx, &sale).await?;

        let items = insert_items(&mut tx, &sale.id, &request.lines).await?;

        tx.commit().await?;

        info!(
            sale_id = %sale.id,
            total = %sale.total,
            method = ?sale.method,
            seller = %sale.seller,
            "Sale settled"
        );

        Ok(SaleReceipt { sale, items })
    }

    /// Originates a sale on installment credit.
    ///
    /// Gets or creates the customer by phone (refreshing contact details),
    /// then writes the sale, the credit ledger, and its merchandise lines
    /// in the same transaction as the stock decrements.
    pub async fn settle_on_credit(&self, request: CreditSaleRequest) -> StoreResult<CreditReceipt> {
        let total = cart_total(&request.lines)?;
        let per_installment = installment_amount(total, request.installments)?;

        let mut tx = self.pool.begin().await?;

        for line in &request.lines {
            take_stock(&mut tx, line).await?;
        }

        let customer = CustomerRepository::upsert_by_phone(&mut tx, &request.customer).await?;

        let now = Utc::now();
        let sale = Sale {
            id: new_id(),
            method: PaymentKind::Credit,
            total,
            customer_name: Some(customer.name.clone()),
            seller: request.seller.clone(),
            received: None,
            change: None,
            installment_count: Some(request.installments as i64),
            installment_amount: Some(per_installment),
            debt_previous: None,
            debt_remaining: None,
            business_date: request.business_date.clone(),
            created_at: now,
        };
        SaleRepository::insert_on(&mut tx, &sale).await?;
        insert_items(&mut tx, &sale.id, &request.lines).await?;

        let credit = Credit {
            id: new_id(),
            customer_id: customer.id.clone(),
            customer_name: customer.name.clone(),
            customer_phone: customer.phone.clone(),
            customer_address: customer.address.clone(),
            customer_notes: customer.notes.clone(),
            total_debt: total,
            remaining_debt: total,
            installment_count: request.installments as i64,
            status: CreditStatus::Active,
            created_at: now,
        };
        let credit_items: Vec<CreditItem> = request
            .lines
            .iter()
            .map(|line| CreditItem {
                id: new_id(),
                credit_id: credit.id.clone(),
                name: line.name.clone(),
                quantity: line.quantity,
                unit_price: line.unit_price,
                unit_cost: line.unit_cost,
            })
            .collect();
        crate::repository::credit::CreditRepository::insert_on(&mut tx, &credit, &credit_items)
            .await?;

        tx.commit().await?;

        info!(
            sale_id = %sale.id,
            credit_id = %credit.id,
            total = %credit.total_debt,
            installments = request.installments,
            customer = %credit.customer_name,
            "Credit originated"
        );

        Ok(CreditReceipt { sale, credit })
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn cart_total(lines: &[CartLine]) -> StoreResult<Money> {
    if lines.is_empty() {
        return Err(CoreError::Validation(caja_core::error::ValidationError::Required {
            field: "cart".to_string(),
        })
        .into());
    }
    Ok(lines.iter().map(CartLine::line_total).sum())
}

/// Re-reads a product inside the transaction, enforces the stock rule, and
/// applies the decrement. Ad-hoc lines (no product id) skip stock entirely.
async fn take_stock(conn: &mut SqliteConnection, line: &CartLine) -> StoreResult<()> {
    let Some(product_id) = line.product_id.as_deref() else {
        return Ok(());
    };

    let product = sqlx::query_as::<_, Product>(
        r#"
        SELECT id, name, barcode, category, cost_price, market_price,
               sale_price, wholesale_price, stock, min_stock, backorder,
               created_at, updated_at
        FROM products WHERE id = ?1
        "#,
    )
    .bind(product_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| StoreError::not_found("Product", product_id))?;

    if !product.can_sell(line.quantity) {
        return Err(CoreError::InsufficientStock {
            name: product.name,
            available: product.stock,
            requested: line.quantity,
        }
        .into());
    }

    debug!(product_id = %product_id, quantity = line.quantity, "Decrementing stock");

    sqlx::query("UPDATE products SET stock = stock - ?2, updated_at = ?3 WHERE id = ?1")
        .bind(product_id)
        .bind(line.quantity)
        .bind(Utc::now())
        .execute(&mut *conn)
        .await?;

    Ok(())
}

async fn insert_items(
    conn: &mut SqliteConnection,
    sale_id: &str,
    lines: &[CartLine],
) -> StoreResult<Vec<SaleItem>> {
    let mut items = Vec::with_capacity(lines.len());
    for line in lines {
        let item = SaleItem {
            id: new_id(),
            sale_id: sale_id.to_string(),
            product_id: line.product_id.clone(),
            name: line.name.clone(),
            quantity: line.quantity,
            unit_price: line.unit_price,
            unit_cost: line.unit_cost,
        };
        SaleRepository::insert_item_on(conn, &item).await?;
        items.push(item);
    }
    Ok(items)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Store, StoreConfig};
    use crate::repository::product::NewProduct;
    use caja_core::types::Category;

    const DAY: &str = "2026-08-28";

    async fn store() -> Store {
        Store::open(StoreConfig::in_memory()).await.unwrap()
    }

    async fn seed_product(store: &Store, name: &str, price: i64, stock: i64, backorder: bool) -> Product {
        store
            .products()
            .create(NewProduct {
                name: name.to_string(),
                barcode: None,
                category: Category::General,
                cost_price: Money::from_cents(price / 2),
                market_price: Money::from_cents(price),
                sale_price: Money::from_cents(price),
                wholesale_price: Money::from_cents(price),
                stock,
                min_stock: None,
                backorder,
            })
            .await
            .unwrap()
    }

    fn line(product: &Product, quantity: i64) -> CartLine {
        CartLine::from_product(product, quantity)
    }

    fn maria() -> ContactDetails {
        ContactDetails {
            name: "Maria Lopez".to_string(),
            phone: "555-0101".to_string(),
            address: "12 Market St".to_string(),
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_cash_sale_with_change() {
        // Two items at 120.00 and 1x 80.00 = 320.00; customer hands 400.00.
        let store = store().await;
        let a = seed_product(&store, "Paint 1L", 12000, 5, false).await;
        let b = seed_product(&store, "Brush", 8000, 5, false).await;

        let receipt = store
            .checkout()
            .settle(SaleRequest {
                lines: vec![line(&a, 2), line(&b, 1)],
                tender: TenderKind::Cash,
                received: Some(Money::from_cents(40000)),
                seller: "Ana".to_string(),
                business_date: DAY.to_string(),
            })
            .await
            .unwrap();

        assert_eq!(receipt.sale.total.cents(), 32000);
        assert_eq!(receipt.sale.change.unwrap().cents(), 8000);
        assert_eq!(receipt.items.len(), 2);

        let a = store.products().get_by_id(&a.id).await.unwrap().unwrap();
        let b = store.products().get_by_id(&b.id).await.unwrap().unwrap();
        assert_eq!(a.stock, 3);
        assert_eq!(b.stock, 4);
    }

    #[tokio::test]
    async fn test_cash_below_total_rejected() {
        let store = store().await;
        let p = seed_product(&store, "Paint 1L", 12000, 5, false).await;

        let err = store
            .checkout()
            .settle(SaleRequest {
                lines: vec![line(&p, 1)],
                tender: TenderKind::Cash,
                received: Some(Money::from_cents(10000)),
                seller: "Ana".to_string(),
                business_date: DAY.to_string(),
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            StoreError::Domain(CoreError::InsufficientPayment { .. })
        ));
    }

    #[tokio::test]
    async fn test_card_sale_has_no_tender_fields() {
        let store = store().await;
        let p = seed_product(&store, "Paint 1L", 12000, 5, false).await;

        let receipt = store
            .checkout()
            .settle(SaleRequest {
                lines: vec![line(&p, 1)],
                tender: TenderKind::Card,
                received: None,
                seller: "Ana".to_string(),
                business_date: DAY.to_string(),
            })
            .await
            .unwrap();

        assert_eq!(receipt.sale.method, PaymentKind::Card);
        assert!(receipt.sale.received.is_none());
        assert!(receipt.sale.change.is_none());
    }

    #[tokio::test]
    async fn test_insufficient_stock_rolls_back_everything() {
        let store = store().await;
        let ok = seed_product(&store, "Brush", 8000, 5, false).await;
        let scarce = seed_product(&store, "Paint 1L", 12000, 1, false).await;

        let err = store
            .checkout()
            .settle(SaleRequest {
                lines: vec![line(&ok, 2), line(&scarce, 3)],
                tender: TenderKind::Cash,
                received: Some(Money::from_cents(100000)),
                seller: "Ana".to_string(),
                business_date: DAY.to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::Domain(CoreError::InsufficientStock { .. })
        ));

        // The first line's decrement must not survive the rollback.
        let ok = store.products().get_by_id(&ok.id).await.unwrap().unwrap();
        assert_eq!(ok.stock, 5);
        assert!(store.sales().list_recent(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_backorder_sells_past_zero() {
        let store = store().await;
        let made_to_order = seed_product(&store, "Custom frame", 50000, 0, true).await;

        store
            .checkout()
            .settle(SaleRequest {
                lines: vec![line(&made_to_order, 2)],
                tender: TenderKind::Card,
                received: None,
                seller: "Ana".to_string(),
                business_date: DAY.to_string(),
            })
            .await
            .unwrap();

        let p = store
            .products()
            .get_by_id(&made_to_order.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(p.stock, -2); // two units owed
    }

    #[tokio::test]
    async fn test_empty_cart_rejected() {
        let store = store().await;
        let err = store
            .checkout()
            .settle(SaleRequest {
                lines: vec![],
                tender: TenderKind::Card,
                received: None,
                seller: "Ana".to_string(),
                business_date: DAY.to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Domain(_)));
    }

    #[tokio::test]
    async fn test_price_snapshot_frozen_in_sale() {
        let store = store().await;
        let p = seed_product(&store, "Paint 1L", 12000, 5, false).await;
        let lines = vec![line(&p, 1)];

        // Catalog price changes between carting and settling.
        let mut edited = p.clone();
        edited.sale_price = Money::from_cents(99999);
        store.products().update(&edited).await.unwrap();

        let receipt = store
            .checkout()
            .settle(SaleRequest {
                lines,
                tender: TenderKind::Card,
                received: None,
                seller: "Ana".to_string(),
                business_date: DAY.to_string(),
            })
            .await
            .unwrap();

        assert_eq!(receipt.sale.total.cents(), 12000);
        assert_eq!(receipt.items[0].unit_price.cents(), 12000);
    }

    #[tokio::test]
    async fn test_credit_origination_scenario() {
        // 300.00 of merchandise over 3 installments of 100.00.
        let store = store().await;
        let p = seed_product(&store, "Drill", 30000, 2, false).await;

        let receipt = store
            .checkout()
            .settle_on_credit(CreditSaleRequest {
                lines: vec![line(&p, 1)],
                customer: maria(),
                installments: 3,
                seller: "Ana".to_string(),
                business_date: DAY.to_string(),
            })
            .await
            .unwrap();

        assert_eq!(receipt.sale.method, PaymentKind::Credit);
        assert_eq!(receipt.sale.installment_amount.unwrap().cents(), 10000);
        assert_eq!(receipt.credit.total_debt.cents(), 30000);
        assert_eq!(receipt.credit.remaining_debt.cents(), 30000);
        assert_eq!(receipt.credit.status, CreditStatus::Active);

        // Stock moved at origination, customer exists, items snapshotted.
        let p = store.products().get_by_id(&p.id).await.unwrap().unwrap();
        assert_eq!(p.stock, 1);
        assert!(store
            .customers()
            .get_by_phone("555-0101")
            .await
            .unwrap()
            .is_some());
        assert_eq!(store.credits().items(&receipt.credit.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_credit_reuses_customer_by_phone() {
        let store = store().await;
        let p = seed_product(&store, "Drill", 30000, 5, false).await;

        let first = store
            .checkout()
            .settle_on_credit(CreditSaleRequest {
                lines: vec![line(&p, 1)],
                customer: maria(),
                installments: 2,
                seller: "Ana".to_string(),
                business_date: DAY.to_string(),
            })
            .await
            .unwrap();

        let mut moved = maria();
        moved.address = "99 Harbor Rd".to_string();
        let second = store
            .checkout()
            .settle_on_credit(CreditSaleRequest {
                lines: vec![line(&p, 1)],
                customer: moved,
                installments: 2,
                seller: "Ana".to_string(),
                business_date: DAY.to_string(),
            })
            .await
            .unwrap();

        assert_eq!(first.credit.customer_id, second.credit.customer_id);
        assert_eq!(store.customers().list().await.unwrap().len(), 1);
        assert_eq!(second.credit.customer_address, "99 Harbor Rd");
    }

    #[tokio::test]
    async fn test_credit_rejects_bad_installment_count() {
        let store = store().await;
        let p = seed_product(&store, "Drill", 30000, 5, false).await;

        let err = store
            .checkout()
            .settle_on_credit(CreditSaleRequest {
                lines: vec![line(&p, 1)],
                customer: maria(),
                installments: 4,
                seller: "Ana".to_string(),
                business_date: DAY.to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Domain(_)));

        // Nothing persisted.
        let p = store.products().get_by_id(&p.id).await.unwrap().unwrap();
        assert_eq!(p.stock, 5);
        assert!(store.credits().list().await.unwrap().is_empty());
    }
}
