//! # Domain Types
//!
//! Core domain types used throughout Caja POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                        Domain Types                              │
//! │                                                                  │
//! │  ┌──────────────┐   ┌──────────────┐   ┌──────────────┐          │
//! │  │   Product    │   │     Sale     │   │    Credit    │          │
//! │  │ ──────────── │   │ ──────────── │   │ ──────────── │          │
//! │  │ id (UUID)    │   │ id (UUID)    │   │ id (UUID)    │          │
//! │  │ price tiers  │   │ method       │   │ total_debt   │          │
//! │  │ stock        │   │ total        │   │ remaining    │          │
//! │  │ backorder    │   │ seller       │   │ status       │          │
//! │  └──────────────┘   └──────┬───────┘   └──────┬───────┘          │
//! │                           │                  │                   │
//! │                     ┌─────┴─────┐      ┌─────┴──────┐            │
//! │                     │ SaleItem  │      │ PaymentLog │            │
//! │                     │ snapshot  │      │ append-only│            │
//! │                     └───────────┘      └────────────┘            │
//! │                                                                  │
//! │  Customer (dedup by phone)   Expense   CashCut (one per day)     │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! Sales and credits never reference live product rows: each line freezes
//! the name, sale price, and cost price at the moment of sale, so later
//! catalog edits (or deletes) cannot rewrite history or profit figures.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Category
// =============================================================================

/// Product category used for catalog grouping.
///
/// Legacy records may lack a category; readers default them to `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum Category {
    General,
    Snacks,
    Beauty,
    Tools,
    #[default]
    Other,
}

// =============================================================================
// Payment Kind
// =============================================================================

/// How a sale was settled.
///
/// Merchandise sales use `Cash`, `Card`, or `Credit` (installment
/// origination). `CreditPaymentCash`/`CreditPaymentCard` mark the companion
/// sales synthesized when a debtor pays down an account - they are audit
/// entries, not merchandise movements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum PaymentKind {
    /// Physical cash payment.
    Cash,
    /// Card payment on an external terminal.
    Card,
    /// Installment-credit origination (no immediate cash impact).
    Credit,
    /// Cash payment against an existing credit ledger.
    CreditPaymentCash,
    /// Card payment against an existing credit ledger.
    CreditPaymentCard,
}

impl PaymentKind {
    /// True for sales that put cash in the drawer.
    #[inline]
    pub const fn counts_as_cash(&self) -> bool {
        matches!(self, PaymentKind::Cash | PaymentKind::CreditPaymentCash)
    }

    /// True for sales settled on the card terminal.
    #[inline]
    pub const fn counts_as_card(&self) -> bool {
        matches!(self, PaymentKind::Card | PaymentKind::CreditPaymentCard)
    }

    /// True for companion sales recorded against a credit ledger.
    ///
    /// Reporting excludes these to avoid counting the same merchandise
    /// twice (once at origination, once per payment).
    #[inline]
    pub const fn is_credit_payment(&self) -> bool {
        matches!(
            self,
            PaymentKind::CreditPaymentCash | PaymentKind::CreditPaymentCard
        )
    }
}

// =============================================================================
// Tender Kind
// =============================================================================

/// The physical tender of a single credit-ledger payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum TenderKind {
    Cash,
    Card,
}

impl TenderKind {
    /// The sale method a payment of this tender is audited under.
    #[inline]
    pub const fn companion_sale_kind(&self) -> PaymentKind {
        match self {
            TenderKind::Cash => PaymentKind::CreditPaymentCash,
            TenderKind::Card => PaymentKind::CreditPaymentCard,
        }
    }
}

// =============================================================================
// Credit Status
// =============================================================================

/// Lifecycle of a credit ledger.
///
/// `Active --[remaining ≤ SETTLE_EPSILON]--> Paid` - exactly once, never
/// reversed. See [`crate::ledger::apply_payment`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum CreditStatus {
    #[default]
    Active,
    Paid,
}

// =============================================================================
// Product
// =============================================================================

/// A catalog entry with four price tiers and a stock counter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name shown to cashier and on receipt.
    pub name: String,

    /// Barcode (EAN-13, UPC-A, etc.).
    pub barcode: Option<String>,

    /// Catalog category.
    pub category: Category,

    /// What the shop paid per unit.
    pub cost_price: Money,

    /// Going market price, kept for comparison.
    pub market_price: Money,

    /// What the customer pays per unit.
    pub sale_price: Money,

    /// Bulk price tier.
    pub wholesale_price: Money,

    /// Current stock level. Signed: backorder products may go negative,
    /// representing units owed to customers.
    pub stock: i64,

    /// Stock level at or below which the product is flagged for restock.
    pub min_stock: Option<i64>,

    /// Whether the product may be sold past zero stock (made to order).
    pub backorder: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Checks whether `quantity` units can be sold right now.
    ///
    /// Backorder products always sell; everything else needs the stock.
    pub fn can_sell(&self, quantity: i64) -> bool {
        self.backorder || self.stock >= quantity
    }

    /// True when stock has fallen to or below the restock threshold.
    pub fn is_low_stock(&self) -> bool {
        match self.min_stock {
            Some(min) => self.stock <= min,
            None => false,
        }
    }
}

// =============================================================================
// Sale
// =============================================================================

/// An immutable sale record: created once, never updated or deleted.
///
/// Merchandise sales satisfy `total = Σ(item.unit_price × item.quantity)`;
/// for credit-payment sales `total` is the payment amount and the items list
/// holds one synthetic "payment to account" line.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Sale {
    pub id: String,
    pub method: PaymentKind,
    pub total: Money,

    /// Walk-in sales carry no customer; credit flows name the debtor.
    pub customer_name: Option<String>,

    /// Display name of the cashier, passed in explicitly by the caller.
    pub seller: String,

    /// Cash sales only: amount the customer handed over.
    pub received: Option<Money>,

    /// Cash sales only: change returned (received - total).
    pub change: Option<Money>,

    /// Credit originations only: number of agreed installments.
    pub installment_count: Option<i64>,

    /// Credit originations only: per-installment amount (total / count).
    pub installment_amount: Option<Money>,

    /// Credit payments only: debt before this payment (for the receipt).
    pub debt_previous: Option<Money>,

    /// Credit payments only: debt left after this payment.
    pub debt_remaining: Option<Money>,

    /// Local calendar day the sale belongs to, ISO `YYYY-MM-DD`.
    /// Drives the daily cash cut and monthly reports.
    pub business_date: String,

    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Sale Item
// =============================================================================

/// A line item in a sale, frozen at time of sale.
///
/// `unit_cost` is captured so later cost edits never retroactively change
/// historical profit calculations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SaleItem {
    pub id: String,
    pub sale_id: String,
    /// Absent for the synthetic line of a credit-payment sale.
    pub product_id: Option<String>,
    /// Product name at time of sale (frozen).
    pub name: String,
    pub quantity: i64,
    /// Unit sale price at time of sale (frozen).
    pub unit_price: Money,
    /// Unit cost at time of sale (frozen).
    pub unit_cost: Money,
}

impl SaleItem {
    /// Line total (unit price × quantity).
    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }
}

/// Label for the synthetic line item of a credit-payment sale.
pub const ACCOUNT_PAYMENT_LABEL: &str = "Payment to account";

// =============================================================================
// Customer
// =============================================================================

/// A deduplicated contact. Phone is the natural key: a second credit
/// origination with the same phone refreshes this record instead of
/// creating a duplicate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub address: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Credit Ledger
// =============================================================================

/// A customer's running installment-debt account, originated from a sale on
/// credit.
///
/// ## Invariants
/// - `remaining_debt` starts equal to `total_debt` and only ever decreases
/// - `total_debt - remaining_debt` equals the sum of the payment log
/// - `status` flips to `Paid` exactly once, when remaining falls within
///   [`crate::ledger::SETTLE_EPSILON`] of zero
///
/// Customer contact fields are denormalized here so the credits list renders
/// without a join; the linked [`Customer`] row remains the dedup anchor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Credit {
    pub id: String,
    pub customer_id: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_address: String,
    pub customer_notes: Option<String>,
    /// Fixed at origination.
    pub total_debt: Money,
    /// Monotonically non-increasing.
    pub remaining_debt: Money,
    pub installment_count: i64,
    pub status: CreditStatus,
    pub created_at: DateTime<Utc>,
}

/// A merchandise line snapshotted into a credit at origination.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CreditItem {
    pub id: String,
    pub credit_id: String,
    pub name: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub unit_cost: Money,
}

/// One entry in a credit's append-only payment log.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct PaymentLog {
    pub id: String,
    pub credit_id: String,
    pub amount: Money,
    pub method: TenderKind,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Expense
// =============================================================================

/// A cash outflow logged during the day. Immutable once created; consumed
/// only as a read-side input to the daily reconciliation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Expense {
    pub id: String,
    pub description: String,
    pub amount: Money,
    /// Who logged the expense.
    pub spent_by: String,
    /// Local calendar day, ISO `YYYY-MM-DD`.
    pub business_date: String,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Cash Cut
// =============================================================================

/// The frozen daily reconciliation record ("cash cut"): one per calendar
/// day, enforced by a unique constraint on `business_date`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CashCut {
    pub id: String,
    /// Local calendar day, ISO `YYYY-MM-DD`. Unique.
    pub business_date: String,
    /// Float the drawer opened with.
    pub opening: Money,
    pub cash_sales: Money,
    pub card_sales: Money,
    /// Same-day expense sum.
    pub withdrawals: Money,
    /// opening + cash_sales - withdrawals.
    pub expected: Money,
    /// Physically counted cash.
    pub declared: Money,
    /// declared - expected. Negative means the drawer is short.
    pub difference: Money,
    pub notes: String,
    /// Who closed the drawer.
    pub closed_by: String,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn product(stock: i64, backorder: bool) -> Product {
        Product {
            id: "p1".to_string(),
            name: "Test".to_string(),
            barcode: None,
            category: Category::default(),
            cost_price: Money::from_cents(600),
            market_price: Money::from_cents(1200),
            sale_price: Money::from_cents(1000),
            wholesale_price: Money::from_cents(900),
            stock,
            min_stock: Some(2),
            backorder,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_category_default() {
        assert_eq!(Category::default(), Category::Other);
    }

    #[test]
    fn test_can_sell_respects_stock() {
        let p = product(3, false);
        assert!(p.can_sell(3));
        assert!(!p.can_sell(4));
    }

    #[test]
    fn test_backorder_always_sells() {
        let p = product(0, true);
        assert!(p.can_sell(10));
    }

    #[test]
    fn test_low_stock_flag() {
        assert!(product(2, false).is_low_stock());
        assert!(!product(5, false).is_low_stock());
    }

    #[test]
    fn test_payment_kind_buckets() {
        assert!(PaymentKind::Cash.counts_as_cash());
        assert!(PaymentKind::CreditPaymentCash.counts_as_cash());
        assert!(!PaymentKind::Card.counts_as_cash());

        assert!(PaymentKind::Card.counts_as_card());
        assert!(PaymentKind::CreditPaymentCard.counts_as_card());

        // Credit originations hit neither drawer bucket.
        assert!(!PaymentKind::Credit.counts_as_cash());
        assert!(!PaymentKind::Credit.counts_as_card());
    }

    #[test]
    fn test_tender_companion_kind() {
        assert_eq!(
            TenderKind::Cash.companion_sale_kind(),
            PaymentKind::CreditPaymentCash
        );
        assert_eq!(
            TenderKind::Card.companion_sale_kind(),
            PaymentKind::CreditPaymentCard
        );
    }
}
