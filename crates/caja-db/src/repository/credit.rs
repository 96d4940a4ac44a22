//! # Credit Repository
//!
//! Reads over credit ledgers plus the transaction-scoped write helpers.
//!
//! A credit row is written exactly twice per event: once at origination
//! (by the checkout service) and once per payment (balance + status, by the
//! credit service). Both writers run inside a transaction and go through
//! the `_on` helpers here.

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use caja_core::types::{Credit, CreditItem, CreditStatus, PaymentLog};
use caja_core::Money;

use crate::error::StoreResult;

const CREDIT_COLUMNS: &str = "id, customer_id, customer_name, customer_phone, customer_address, \
     customer_notes, total_debt, remaining_debt, installment_count, status, created_at";

/// Repository for credit ledger reads.
#[derive(Debug, Clone)]
pub struct CreditRepository {
    pool: SqlitePool,
}

impl CreditRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CreditRepository { pool }
    }

    /// Gets a credit by id.
    pub async fn get_by_id(&self, id: &str) -> StoreResult<Option<Credit>> {
        let credit = sqlx::query_as::<_, Credit>(&format!(
            "SELECT {CREDIT_COLUMNS} FROM credits WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(credit)
    }

    /// Lists credits, open accounts first, newest first within each group.
    pub async fn list(&self) -> StoreResult<Vec<Credit>> {
        let credits = sqlx::query_as::<_, Credit>(&format!(
            r#"
            SELECT {CREDIT_COLUMNS} FROM credits
            ORDER BY CASE status WHEN 'active' THEN 0 ELSE 1 END, created_at DESC
            "#
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(credits)
    }

    /// Open credits only.
    pub async fn list_active(&self) -> StoreResult<Vec<Credit>> {
        let credits = sqlx::query_as::<_, Credit>(&format!(
            r#"
            SELECT {CREDIT_COLUMNS} FROM credits
            WHERE status = 'active'
            ORDER BY created_at DESC
            "#
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(credits)
    }

    /// Settled credits only.
    pub async fn list_paid(&self) -> StoreResult<Vec<Credit>> {
        let credits = sqlx::query_as::<_, Credit>(&format!(
            r#"
            SELECT {CREDIT_COLUMNS} FROM credits
            WHERE status = 'paid'
            ORDER BY created_at DESC
            "#
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(credits)
    }

    /// Credits of one customer (by phone), for the counter lookup.
    pub async fn list_by_phone(&self, phone: &str) -> StoreResult<Vec<Credit>> {
        let credits = sqlx::query_as::<_, Credit>(&format!(
            r#"
            SELECT {CREDIT_COLUMNS} FROM credits
            WHERE customer_phone = ?1
            ORDER BY created_at DESC
            "#
        ))
        .bind(phone)
        .fetch_all(&self.pool)
        .await?;

        Ok(credits)
    }

    /// Merchandise lines of a credit, in insertion order.
    pub async fn items(&self, credit_id: &str) -> StoreResult<Vec<CreditItem>> {
        let items = sqlx::query_as::<_, CreditItem>(
            r#"
            SELECT id, credit_id, name, quantity, unit_price, unit_cost
            FROM credit_items
            WHERE credit_id = ?1
            ORDER BY rowid
            "#,
        )
        .bind(credit_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Payment log of a credit, oldest first.
    pub async fn payments(&self, credit_id: &str) -> StoreResult<Vec<PaymentLog>> {
        let payments = sqlx::query_as::<_, PaymentLog>(
            r#"
            SELECT id, credit_id, amount, method, created_at
            FROM credit_payments
            WHERE credit_id = ?1
            ORDER BY created_at ASC
            "#,
        )
        .bind(credit_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(payments)
    }

    /// Sum of outstanding debt across open credits.
    pub async fn total_outstanding(&self) -> StoreResult<Money> {
        let cents: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(remaining_debt), 0) FROM credits WHERE status = 'active'",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(Money::from_cents(cents))
    }

    /// Hard-deletes a credit ledger with its items and payment log (FK
    /// cascade). Companion sales already recorded for its payments are
    /// audit history and stay untouched.
    pub async fn delete(&self, id: &str) -> StoreResult<()> {
        debug!(id = %id, "Deleting credit");

        let result = sqlx::query("DELETE FROM credits WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(crate::error::StoreError::not_found("Credit", id));
        }

        Ok(())
    }

    // -- transaction-scoped helpers -------------------------------------------

    /// Re-reads a credit inside a transaction. The payment flow bases its
    /// arithmetic on this row, not on whatever the caller last displayed,
    /// so two clerks taking payments at once can't double-apply.
    pub(crate) async fn get_by_id_on(
        conn: &mut SqliteConnection,
        id: &str,
    ) -> StoreResult<Option<Credit>> {
        let credit = sqlx::query_as::<_, Credit>(&format!(
            "SELECT {CREDIT_COLUMNS} FROM credits WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(credit)
    }

    /// Inserts a credit ledger with its merchandise lines.
    pub(crate) async fn insert_on(
        conn: &mut SqliteConnection,
        credit: &Credit,
        items: &[CreditItem],
    ) -> StoreResult<()> {
        debug!(id = %credit.id, total = %credit.total_debt, "Inserting credit");

        sqlx::query(
            r#"
            INSERT INTO credits (
                id, customer_id, customer_name, customer_phone, customer_address,
                customer_notes, total_debt, remaining_debt, installment_count,
                status, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&credit.id)
        .bind(&credit.customer_id)
        .bind(&credit.customer_name)
        .bind(&credit.customer_phone)
        .bind(&credit.customer_address)
        .bind(&credit.customer_notes)
        .bind(credit.total_debt)
        .bind(credit.remaining_debt)
        .bind(credit.installment_count)
        .bind(credit.status)
        .bind(credit.created_at)
        .execute(&mut *conn)
        .await?;

        for item in items {
            sqlx::query(
                r#"
                INSERT INTO credit_items (id, credit_id, name, quantity, unit_price, unit_cost)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
            )
            .bind(&item.id)
            .bind(&item.credit_id)
            .bind(&item.name)
            .bind(item.quantity)
            .bind(item.unit_price)
            .bind(item.unit_cost)
            .execute(&mut *conn)
            .await?;
        }

        Ok(())
    }

    /// Writes the post-payment balance and status.
    pub(crate) async fn update_balance_on(
        conn: &mut SqliteConnection,
        id: &str,
        remaining: Money,
        status: CreditStatus,
    ) -> StoreResult<()> {
        sqlx::query("UPDATE credits SET remaining_debt = ?2, status = ?3 WHERE id = ?1")
            .bind(id)
            .bind(remaining)
            .bind(status)
            .execute(&mut *conn)
            .await?;

        Ok(())
    }

    /// Appends an entry to a credit's payment log.
    pub(crate) async fn insert_payment_on(
        conn: &mut SqliteConnection,
        payment: &PaymentLog,
    ) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO credit_payments (id, credit_id, amount, method, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&payment.id)
        .bind(&payment.credit_id)
        .bind(payment.amount)
        .bind(payment.method)
        .bind(payment.created_at)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
