//! # Credit Payment Service
//!
//! Applies a payment to a credit ledger, atomically.
//!
//! ## Flow
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │  BEGIN TRANSACTION                                               │
//! │       │                                                          │
//! │       ├── re-read credit row (NOT the caller's stale copy)       │
//! │       ├── apply_payment: validate, new balance, status           │
//! │       ├── UPDATE credits (remaining_debt, status)                │
//! │       ├── INSERT credit_payments (append-only log)               │
//! │       ├── INSERT companion sale + synthetic line item            │
//! │  COMMIT                                                          │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The transactional re-read is what makes two clerks taking payments on
//! the same account simultaneously safe: each payment is applied to the
//! balance as it stands inside the transaction, so the second one either
//! sees the reduced balance or fails the overpayment check.
//!
//! The companion sale is an audit entry with method `credit_payment_cash`
//! or `credit_payment_card`. It carries the money into the correct drawer
//! bucket for that day's cut, and its `debt_previous`/`debt_remaining`
//! fields feed the receipt. It moves no merchandise.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::info;

use caja_core::ledger::apply_payment;
use caja_core::types::{Credit, PaymentLog, Sale, SaleItem, TenderKind, ACCOUNT_PAYMENT_LABEL};
use caja_core::Money;

use crate::error::{StoreError, StoreResult};
use crate::repository::credit::CreditRepository;
use crate::repository::new_id;
use crate::repository::sale::SaleRepository;

/// What a recorded payment hands back for the receipt.
#[derive(Debug, Clone)]
pub struct PaymentReceipt {
    /// The ledger after the payment.
    pub credit: Credit,
    /// The appended log entry.
    pub payment: PaymentLog,
    /// The companion audit sale.
    pub sale: Sale,
}

/// Atomic credit-ledger payments.
#[derive(Debug, Clone)]
pub struct CreditService {
    pool: SqlitePool,
}

impl CreditService {
    pub fn new(pool: SqlitePool) -> Self {
        CreditService { pool }
    }

    /// Records a payment against a credit ledger.
    ///
    /// ## Arguments
    /// * `credit_id` - the ledger being paid down
    /// * `amount` - strictly positive, at most the remaining debt
    /// * `tender` - cash or card
    /// * `seller` - display name of the clerk taking the payment
    /// * `business_date` - local day, ISO `YYYY-MM-DD`
    ///
    /// ## Errors
    /// - [`StoreError::NotFound`] - no such credit
    /// - [`StoreError::Domain`] - non-positive amount or overpayment
    ///   (a settled ledger rejects any further payment this way)
    pub async fn record_payment(
        &self,
        credit_id: &str,
        amount: Money,
        tender: TenderKind,
        seller: &str,
        business_date: &str,
    ) -> StoreResult<PaymentReceipt> {
        let mut tx = self.pool.begin().await?;

        let mut credit = CreditRepository::get_by_id_on(&mut tx, credit_id)
            .await?
            .ok_or_else(|| StoreError::not_found("Credit", credit_id))?;

        let outcome = apply_payment(credit.remaining_debt, amount)?;

        CreditRepository::update_balance_on(&mut tx, credit_id, outcome.remaining, outcome.status)
            .await?;

        let now = Utc::now();
        let payment = PaymentLog {
            id: new_id(),
            credit_id: credit_id.to_string(),
            amount,
            method: tender,
            created_at: now,
        };
        CreditRepository::insert_payment_on(&mut tx, &payment).await?;

        let sale = Sale {
            id: new_id(),
            method: tender.companion_sale_kind(),
            total: amount,
            customer_name: Some(credit.customer_name.clone()),
            seller: seller.to_string(),
            received: None,
            change: None,
            installment_count: None,
            installment_amount: None,
            debt_previous: Some(outcome.previous),
            debt_remaining: Some(outcome.remaining),
            business_date: business_date.to_string(),
            created_at: now,
        };
        SaleRepository::insert_on(&mut tx, &sale).await?;
        SaleRepository::insert_item_on(
            &mut tx,
            &SaleItem {
                id: new_id(),
                sale_id: sale.id.clone(),
                product_id: None,
                name: ACCOUNT_PAYMENT_LABEL.to_string(),
                quantity: 1,
                unit_price: amount,
                unit_cost: Money::zero(),
            },
        )
        .await?;

        tx.commit().await?;

        info!(
            credit_id = %credit_id,
            amount = %amount,
            remaining = %outcome.remaining,
            status = ?outcome.status,
            "Payment recorded"
        );

        credit.remaining_debt = outcome.remaining;
        credit.status = outcome.status;

        Ok(PaymentReceipt {
            credit,
            payment,
            sale,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
