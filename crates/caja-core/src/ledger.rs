//! # Credit Ledger Arithmetic
//!
//! The pure heart of the installment-credit feature: how a payment changes
//! a ledger's remaining debt and status.
//!
//! ## Payment Flow
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │  recordPayment(amount)                                           │
//! │       │                                                          │
//! │       ▼                                                          │
//! │  apply_payment(remaining, amount)  ← THIS MODULE                 │
//! │       │                                                          │
//! │       ├── amount ≤ 0?          → ValidationError                 │
//! │       ├── amount > remaining?  → Overpayment                     │
//! │       │                                                          │
//! │       ▼                                                          │
//! │  new_remaining = remaining - amount                              │
//! │  status = new_remaining ≤ 50¢ ? Paid : Active                    │
//! │       │                                                          │
//! │       ▼                                                          │
//! │  PaymentOutcome { previous, remaining, status }                  │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Status is one-way: once a ledger is `Paid` its remaining debt is within
//! the epsilon of zero, so any further positive payment fails the
//! overpayment check. No separate status guard is needed.

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::CreditStatus;
use crate::ALLOWED_INSTALLMENTS;

/// Remaining debt at or below this settles the ledger.
///
/// 50 cents of slack absorbs the truncation drift of installment division
/// (a 2- or 3-way split can leave the final payment a cent or two off).
pub const SETTLE_EPSILON: Money = Money::from_cents(50);

/// The result of applying one payment to a ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentOutcome {
    /// Debt before the payment (for the receipt).
    pub previous: Money,
    /// Debt after the payment.
    pub remaining: Money,
    /// Status after the payment.
    pub status: CreditStatus,
}

/// Applies a payment to a ledger's remaining debt.
///
/// ## Errors
/// - [`ValidationError::MustBePositive`] if `amount ≤ 0`
/// - [`CoreError::Overpayment`] if `amount > remaining`
///
/// ## Example
/// ```rust
/// use caja_core::ledger::apply_payment;
/// use caja_core::money::Money;
/// use caja_core::types::CreditStatus;
///
/// let outcome = apply_payment(Money::from_cents(30000), Money::from_cents(10000)).unwrap();
/// assert_eq!(outcome.remaining.cents(), 20000);
/// assert_eq!(outcome.status, CreditStatus::Active);
/// ```
pub fn apply_payment(remaining: Money, amount: Money) -> CoreResult<PaymentOutcome> {
    if !amount.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "payment amount".to_string(),
        }
        .into());
    }

    if amount > remaining {
        return Err(CoreError::Overpayment {
            remaining_cents: remaining.cents(),
            attempted_cents: amount.cents(),
        });
    }

    let new_remaining = remaining - amount;
    let status = if new_remaining <= SETTLE_EPSILON {
        CreditStatus::Paid
    } else {
        CreditStatus::Active
    };

    Ok(PaymentOutcome {
        previous: remaining,
        remaining: new_remaining,
        status,
    })
}

/// Computes the per-installment amount for a credit plan.
///
/// Integer division: the residual cents are not redistributed. The ledger
/// tracks the full debt, so the drift only shows on the quoted installment,
/// never on the balance.
///
/// ## Errors
/// [`ValidationError::NotAllowed`] unless `count` is 2 or 3.
pub fn installment_amount(total: Money, count: u32) -> CoreResult<Money> {
    if !ALLOWED_INSTALLMENTS.contains(&count) {
        return Err(ValidationError::NotAllowed {
            field: "installment count".to_string(),
            allowed: ALLOWED_INSTALLMENTS.iter().map(|n| *n as i64).collect(),
        }
        .into());
    }

    Ok(total.split(count as i64))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_payment_stays_active() {
        // Scenario B: 300.00 debt, first installment of 100.00 cash
        let outcome = apply_payment(Money::from_cents(30000), Money::from_cents(10000)).unwrap();
        assert_eq!(outcome.previous.cents(), 30000);
        assert_eq!(outcome.remaining.cents(), 20000);
        assert_eq!(outcome.status, CreditStatus::Active);
    }

    #[test]
    fn test_full_payment_settles() {
        // Scenario C: paying the full remaining 200.00 settles the ledger
        let outcome = apply_payment(Money::from_cents(20000), Money::from_cents(20000)).unwrap();
        assert_eq!(outcome.remaining.cents(), 0);
        assert_eq!(outcome.status, CreditStatus::Paid);
    }

    #[test]
    fn test_epsilon_settles() {
        // Leaving 50 cents or less counts as settled
        let outcome = apply_payment(Money::from_cents(10050), Money::from_cents(10000)).unwrap();
        assert_eq!(outcome.remaining.cents(), 50);
        assert_eq!(outcome.status, CreditStatus::Paid);

        // 51 cents left stays active
        let outcome = apply_payment(Money::from_cents(10051), Money::from_cents(10000)).unwrap();
        assert_eq!(outcome.status, CreditStatus::Active);
    }

    #[test]
    fn test_zero_and_negative_amounts_rejected() {
        let remaining = Money::from_cents(1000);
        assert!(matches!(
            apply_payment(remaining, Money::zero()),
            Err(CoreError::Validation(_))
        ));
        assert!(matches!(
            apply_payment(remaining, Money::from_cents(-100)),
            Err(CoreError::Validation(_))
        ));
    }

    #[test]
    fn test_overpayment_rejected() {
        let err = apply_payment(Money::from_cents(1000), Money::from_cents(1001)).unwrap_err();
        assert!(matches!(err, CoreError::Overpayment { .. }));
    }

    #[test]
    fn test_paid_is_terminal() {
        // A settled ledger has ~0 remaining; any positive payment is an
        // overpayment, so status can never leave Paid.
        let settled = apply_payment(Money::from_cents(500), Money::from_cents(500)).unwrap();
        assert_eq!(settled.status, CreditStatus::Paid);

        let err = apply_payment(settled.remaining, Money::from_cents(1)).unwrap_err();
        assert!(matches!(err, CoreError::Overpayment { .. }));
    }

    #[test]
    fn test_remaining_monotonic_and_log_sum() {
        // remaining never increases; total - remaining = Σ payments
        let total = Money::from_cents(30000);
        let payments = [10000, 5000, 15000];

        let mut remaining = total;
        let mut paid = Money::zero();
        for cents in payments {
            let amount = Money::from_cents(cents);
            let outcome = apply_payment(remaining, amount).unwrap();
            assert!(outcome.remaining <= remaining);
            remaining = outcome.remaining;
            paid += amount;
        }

        assert_eq!(total - remaining, paid);
        assert_eq!(remaining, Money::zero());
    }

    #[test]
    fn test_installment_amount() {
        // Scenario B: 300.00 over 3 installments = 100.00
        assert_eq!(
            installment_amount(Money::from_cents(30000), 3)
                .unwrap()
                .cents(),
            10000
        );
        assert_eq!(
            installment_amount(Money::from_cents(30000), 2)
                .unwrap()
                .cents(),
            15000
        );
    }

    #[test]
    fn test_installment_count_restricted() {
        assert!(installment_amount(Money::from_cents(1000), 1).is_err());
        assert!(installment_amount(Money::from_cents(1000), 4).is_err());
    }

    #[test]
    fn test_installment_truncation() {
        // 100.00 over 3 quotes 33.33; the missing cent stays on the ledger.
        assert_eq!(
            installment_amount(Money::from_cents(10000), 3)
                .unwrap()
                .cents(),
            3333
        );
    }
}
