//! # Cash Cut Service
//!
//! Closes the drawer for a business day: reads the day's totals, runs the
//! reconciliation arithmetic, and freezes the result as a cut.
//!
//! ## Flow
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │  BEGIN TRANSACTION                                               │
//! │       │                                                          │
//! │       ├── sum the day's sales into cash/card buckets             │
//! │       ├── sum the day's expenses                                 │
//! │       ├── expected   = opening + cash sales - expenses           │
//! │       ├── difference = declared - expected                       │
//! │       ├── INSERT cash_cuts (UNIQUE business_date)                │
//! │  COMMIT                                                          │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Reading the totals inside the same transaction as the insert means the
//! frozen figures describe exactly the sales that existed at close. Two
//! concurrent close attempts race on the UNIQUE index; the loser gets
//! [`StoreError::AlreadyClosed`], never a second cut.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::info;

use caja_core::session::{reconcile, DrawerTotals};
use caja_core::types::CashCut;
use caja_core::Money;

use crate::error::{StoreError, StoreResult};
use crate::repository::cash_cut::CashCutRepository;
use crate::repository::expense::ExpenseRepository;
use crate::repository::new_id;
use crate::repository::sale::SaleRepository;

/// Inputs counted by the human closing the drawer.
#[derive(Debug, Clone)]
pub struct CloseDrawerRequest {
    /// Local day being closed, ISO `YYYY-MM-DD`.
    pub business_date: String,
    /// Float the drawer opened with.
    pub opening: Money,
    /// Physically counted cash.
    pub declared: Money,
    pub notes: String,
    /// Display name of whoever is closing.
    pub closed_by: String,
}

/// Where a business day stands when the reconciliation view opens.
#[derive(Debug, Clone)]
pub enum DrawerStatus {
    /// The day was already closed; the frozen cut renders read-only.
    Closed(CashCut),
    /// Still open: a live preview of the day's aggregates, nothing
    /// persisted.
    Open(DrawerDraft),
}

/// Draft aggregates for a day that has no cut yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DrawerDraft {
    pub cash_sales: Money,
    pub card_sales: Money,
    pub expenses: Money,
}

/// Atomic daily reconciliation.
#[derive(Debug, Clone)]
pub struct CashCutService {
    pool: SqlitePool,
}

impl CashCutService {
    pub fn new(pool: SqlitePool) -> Self {
        CashCutService { pool }
    }

    /// The frozen cut for a day, or a non-persisted preview of its
    /// aggregates if the day is still open.
    pub async fn day_status(&self, business_date: &str) -> StoreResult<DrawerStatus> {
        if let Some(cut) = CashCutRepository::new(self.pool.clone())
            .get_by_date(business_date)
            .await?
        {
            return Ok(DrawerStatus::Closed(cut));
        }

        let mut conn = self.pool.acquire().await?;
        let sales = SaleRepository::day_totals_on(&mut conn, business_date).await?;
        let expenses = ExpenseRepository::day_total_on(&mut conn, business_date).await?;

        Ok(DrawerStatus::Open(DrawerDraft {
            cash_sales: sales.cash,
            card_sales: sales.card,
            expenses,
        }))
    }

    /// Closes the drawer for a business day.
    ///
    /// ## Errors
    /// [`StoreError::AlreadyClosed`] if the day already has a cut.
    pub async fn close_day(&self, request: CloseDrawerRequest) -> StoreResult<CashCut> {
        let mut tx = self.pool.begin().await?;

        let sales = SaleRepository::day_totals_on(&mut tx, &request.business_date).await?;
        let expenses = ExpenseRepository::day_total_on(&mut tx, &request.business_date).await?;

        let totals = DrawerTotals {
            cash_sales: sales.cash,
            card_sales: sales.card,
            expenses,
        };
        let reconciliation = reconcile(request.opening, &totals, request.declared);

        let cut = CashCut {
            id: new_id(),
            business_date: request.business_date.clone(),
            opening: request.opening,
            cash_sales: sales.cash,
            card_sales: sales.card,
            withdrawals: expenses,
            expected: reconciliation.expected,
            declared: request.declared,
            difference: reconciliation.difference,
            notes: request.notes.clone(),
            closed_by: request.closed_by.clone(),
            created_at: Utc::now(),
        };

        CashCutRepository::insert_on(&mut tx, &cut)
            .await
            .map_err(|err| match err {
                StoreError::UniqueViolation { .. } => StoreError::AlreadyClosed {
                    date: request.business_date.clone(),
                },
                other => other,
            })?;

        tx.commit().await?;

        info!(
            date = %cut.business_date,
            expected = %cut.expected,
            declared = %cut.declared,
            difference = %cut.difference,
            closed_by = %cut.closed_by,
            "Drawer closed"
        );

        Ok(cut)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
