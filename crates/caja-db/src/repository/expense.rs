//! # Expense Repository
//!
//! Cash-outflow log. Expenses are append-only; the daily cash cut reads
//! the same-day sum as its withdrawals figure.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use caja_core::types::Expense;
use caja_core::validation::{validate_amount, validate_description};
use caja_core::Money;

use crate::error::StoreResult;
use crate::repository::new_id;

const EXPENSE_COLUMNS: &str = "id, description, amount, spent_by, business_date, created_at";

/// Repository for the expense log.
#[derive(Debug, Clone)]
pub struct ExpenseRepository {
    pool: SqlitePool,
}

impl ExpenseRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ExpenseRepository { pool }
    }

    /// Records a cash outflow.
    ///
    /// ## Arguments
    /// * `description` - what the money was spent on
    /// * `amount` - strictly positive
    /// * `spent_by` - display name of whoever took the cash
    /// * `business_date` - the local day this belongs to, ISO `YYYY-MM-DD`
    pub async fn record(
        &self,
        description: &str,
        amount: Money,
        spent_by: &str,
        business_date: &str,
    ) -> StoreResult<Expense> {
        validate_description(description).map_err(caja_core::CoreError::from)?;
        validate_amount(amount.cents()).map_err(caja_core::CoreError::from)?;

        let expense = Expense {
            id: new_id(),
            description: description.trim().to_string(),
            amount,
            spent_by: spent_by.to_string(),
            business_date: business_date.to_string(),
            created_at: Utc::now(),
        };

        debug!(id = %expense.id, amount = %expense.amount, "Recording expense");

        sqlx::query(
            r#"
            INSERT INTO expenses (id, description, amount, spent_by, business_date, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&expense.id)
        .bind(&expense.description)
        .bind(expense.amount)
        .bind(&expense.spent_by)
        .bind(&expense.business_date)
        .bind(expense.created_at)
        .execute(&self.pool)
        .await?;

        Ok(expense)
    }

    /// Expenses of one business day, newest first.
    pub async fn list_by_business_date(&self, business_date: &str) -> StoreResult<Vec<Expense>> {
        let expenses = sqlx::query_as::<_, Expense>(&format!(
            r#"
            SELECT {EXPENSE_COLUMNS} FROM expenses
            WHERE business_date = ?1
            ORDER BY created_at DESC
            "#
        ))
        .bind(business_date)
        .fetch_all(&self.pool)
        .await?;

        Ok(expenses)
    }

    /// Expenses of one month (`YYYY-MM`), newest first.
    pub async fn list_by_month(&self, month: &str) -> StoreResult<Vec<Expense>> {
        let expenses = sqlx::query_as::<_, Expense>(&format!(
            r#"
            SELECT {EXPENSE_COLUMNS} FROM expenses
            WHERE substr(business_date, 1, 7) = ?1
            ORDER BY created_at DESC
            "#
        ))
        .bind(month)
        .fetch_all(&self.pool)
        .await?;

        Ok(expenses)
    }

    /// Same-day expense sum, for the cash cut.
    pub async fn day_total(&self, business_date: &str) -> StoreResult<Money> {
        let mut conn = self.pool.acquire().await?;
        Self::day_total_on(&mut conn, business_date).await
    }

    /// Connection-scoped variant of [`ExpenseRepository::day_total`].
    pub(crate) async fn day_total_on(
        conn: &mut SqliteConnection,
        business_date: &str,
    ) -> StoreResult<Money> {
        let cents: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(amount), 0) FROM expenses WHERE business_date = ?1",
        )
        .bind(business_date)
        .fetch_one(&mut *conn)
        .await?;

        Ok(Money::from_cents(cents))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::pool::{Store, StoreConfig};

    #[tokio::test]
    async fn test_record_and_day_total() {
        let repo = Store::open(StoreConfig::in_memory()).await.unwrap().expenses();

        repo.record("Ice delivery", Money::from_cents(5000), "Ana", "2026-08-28")
            .await
            .unwrap();
        repo.record("Bags", Money::from_cents(3000), "Ana", "2026-08-28")
            .await
            .unwrap();
        repo.record("Other day", Money::from_cents(999), "Ana", "2026-08-29")
            .await
            .unwrap();

        assert_eq!(repo.day_total("2026-08-28").await.unwrap().cents(), 8000);
        assert_eq!(
            repo.list_by_business_date("2026-08-28").await.unwrap().len(),
            2
        );
    }

    #[tokio::test]
    async fn test_day_total_empty() {
        let repo = Store::open(StoreConfig::in_memory()).await.unwrap().expenses();
        assert!(repo.day_total("2026-01-01").await.unwrap().is_zero());
    }

    #[tokio::test]
    async fn test_rejects_bad_input() {
        let repo = Store::open(StoreConfig::in_memory()).await.unwrap().expenses();

        let err = repo
            .record("", Money::from_cents(100), "Ana", "2026-08-28")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Domain(_)));

        let err = repo
            .record("Bags", Money::zero(), "Ana", "2026-08-28")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Domain(_)));
    }

    #[tokio::test]
    async fn test_list_by_month() {
        let repo = Store::open(StoreConfig::in_memory()).await.unwrap().expenses();
        repo.record("Ice", Money::from_cents(100), "Ana", "2026-08-01")
            .await
            .unwrap();
        repo.record("Bags", Money::from_cents(100), "Ana", "2026-08-28")
            .await
            .unwrap();
        repo.record("July thing", Money::from_cents(100), "Ana", "2026-07-31")
            .await
            .unwrap();

        assert_eq!(repo.list_by_month("2026-08").await.unwrap().len(), 2);
    }
}
