//! # Cash-Drawer Reconciliation Arithmetic
//!
//! Pure math for the daily cash cut: what the drawer *should* hold versus
//! what was counted.
//!
//! ```text
//! expected   = opening float + cash sales - expenses
//! difference = declared (counted) - expected
//! ```
//!
//! Card sales never touch the drawer; they are carried on the cut for the
//! day's total but excluded from the expected-cash formula. The storage
//! layer supplies the day's totals ([`DrawerTotals`]); this module never
//! reads anything.

use crate::money::Money;

/// The day's aggregates, computed by the read side from sales and expenses.
///
/// Cash = sales with method in {cash, credit_payment_cash}; card = {card,
/// credit_payment_card}; credit originations appear in neither bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DrawerTotals {
    pub cash_sales: Money,
    pub card_sales: Money,
    pub expenses: Money,
}

impl DrawerTotals {
    /// Total sold today across both settlement buckets.
    #[inline]
    pub fn total_sales(&self) -> Money {
        self.cash_sales + self.card_sales
    }
}

/// The outcome of reconciling a counted drawer against the day's totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reconciliation {
    /// opening + cash sales - expenses.
    pub expected: Money,
    /// declared - expected. Negative: drawer is short. Positive: over.
    pub difference: Money,
}

/// Reconciles a counted drawer balance against the day's totals.
///
/// ## Example
/// ```rust
/// use caja_core::money::Money;
/// use caja_core::session::{reconcile, DrawerTotals};
///
/// let totals = DrawerTotals {
///     cash_sales: Money::from_cents(43000),
///     card_sales: Money::from_cents(12000),
///     expenses: Money::from_cents(8000),
/// };
/// let r = reconcile(Money::from_cents(5000), &totals, Money::from_cents(40000));
/// assert_eq!(r.expected.cents(), 40000);
/// assert!(r.difference.is_zero());
/// ```
pub fn reconcile(opening: Money, totals: &DrawerTotals, declared: Money) -> Reconciliation {
    let expected = opening + totals.cash_sales - totals.expenses;
    Reconciliation {
        expected,
        difference: declared - expected,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn totals(cash: i64, card: i64, expenses: i64) -> DrawerTotals {
        DrawerTotals {
            cash_sales: Money::from_cents(cash),
            card_sales: Money::from_cents(card),
            expenses: Money::from_cents(expenses),
        }
    }

    #[test]
    fn test_scenario_d() {
        // opening 50.00, cash sales 430.00, expenses 80.00, declared 400.00
        let r = reconcile(
            Money::from_cents(5000),
            &totals(43000, 0, 8000),
            Money::from_cents(40000),
        );
        assert_eq!(r.expected.cents(), 40000);
        assert_eq!(r.difference.cents(), 0);
    }

    #[test]
    fn test_card_sales_do_not_affect_expected() {
        let without_card = reconcile(
            Money::from_cents(5000),
            &totals(43000, 0, 8000),
            Money::from_cents(40000),
        );
        let with_card = reconcile(
            Money::from_cents(5000),
            &totals(43000, 99000, 8000),
            Money::from_cents(40000),
        );
        assert_eq!(without_card.expected, with_card.expected);
    }

    #[test]
    fn test_shortfall_is_negative() {
        let r = reconcile(
            Money::from_cents(5000),
            &totals(43000, 0, 8000),
            Money::from_cents(39000),
        );
        assert_eq!(r.difference.cents(), -1000);
        assert!(r.difference.is_negative());
    }

    #[test]
    fn test_overage_is_positive() {
        let r = reconcile(
            Money::zero(),
            &totals(10000, 0, 0),
            Money::from_cents(10500),
        );
        assert_eq!(r.difference.cents(), 500);
    }

    #[test]
    fn test_total_sales() {
        assert_eq!(totals(43000, 12000, 0).total_sales().cents(), 55000);
    }
}
