//! # Cash Cut Repository
//!
//! Reads over the frozen daily reconciliation records. Cuts are inserted
//! only by [`crate::service::cash_cut::CashCutService`], inside its
//! transaction; once written they are never touched again.

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use caja_core::types::CashCut;

use crate::error::StoreResult;

const CUT_COLUMNS: &str = "id, business_date, opening, cash_sales, card_sales, withdrawals, \
     expected, declared, difference, notes, closed_by, created_at";

/// Repository for cash cut reads.
#[derive(Debug, Clone)]
pub struct CashCutRepository {
    pool: SqlitePool,
}

impl CashCutRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CashCutRepository { pool }
    }

    /// The cut for one business day, if the day was closed.
    pub async fn get_by_date(&self, business_date: &str) -> StoreResult<Option<CashCut>> {
        let cut = sqlx::query_as::<_, CashCut>(&format!(
            "SELECT {CUT_COLUMNS} FROM cash_cuts WHERE business_date = ?1"
        ))
        .bind(business_date)
        .fetch_optional(&self.pool)
        .await?;

        Ok(cut)
    }

    /// Recent cuts, newest day first.
    pub async fn list_recent(&self, limit: u32) -> StoreResult<Vec<CashCut>> {
        let cuts = sqlx::query_as::<_, CashCut>(&format!(
            "SELECT {CUT_COLUMNS} FROM cash_cuts ORDER BY business_date DESC LIMIT ?1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(cuts)
    }

    /// Cuts of one month (`YYYY-MM`), newest first.
    pub async fn list_by_month(&self, month: &str) -> StoreResult<Vec<CashCut>> {
        let cuts = sqlx::query_as::<_, CashCut>(&format!(
            r#"
            SELECT {CUT_COLUMNS} FROM cash_cuts
            WHERE substr(business_date, 1, 7) = ?1
            ORDER BY business_date DESC
            "#
        ))
        .bind(month)
        .fetch_all(&self.pool)
        .await?;

        Ok(cuts)
    }

    /// Inserts a cut. The UNIQUE index on `business_date` is the one-cut-
    /// per-day invariant; a second insert for the same day fails here.
    pub(crate) async fn insert_on(conn: &mut SqliteConnection, cut: &CashCut) -> StoreResult<()> {
        debug!(date = %cut.business_date, difference = %cut.difference, "Inserting cash cut");

        sqlx::query(
            r#"
            INSERT INTO cash_cuts (
                id, business_date, opening, cash_sales, card_sales, withdrawals,
                expected, declared, difference, notes, closed_by, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
        )
        .bind(&cut.id)
        .bind(&cut.business_date)
        .bind(cut.opening)
        .bind(cut.cash_sales)
        .bind(cut.card_sales)
        .bind(cut.withdrawals)
        .bind(cut.expected)
        .bind(cut.declared)
        .bind(cut.difference)
        .bind(&cut.notes)
        .bind(&cut.closed_by)
        .bind(cut.created_at)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }
}
