//! # Transactional Domain Services
//!
//! Every multi-record flow runs here, inside one SQLite transaction:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │  checkout   sale + items + stock decrements (+ customer, credit) │
//! │  credit     balance + payment log + companion sale               │
//! │  cash_cut   day totals read + frozen cut insert                  │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! If any step fails, the whole flow rolls back; the database never holds
//! a sale whose stock was not decremented, or a payment whose companion
//! sale is missing.
//!
//! All services take the acting clerk's display name as an explicit
//! argument. There is no ambient "current user" in this layer.

pub mod cash_cut;
pub mod checkout;
pub mod credit;

/// The local calendar day, ISO `YYYY-MM-DD`.
///
/// Sales, expenses, and cuts group by this value; a sale rung up at 23:59
/// belongs to that day's cut even if the row is written after midnight UTC.
pub fn local_business_date() -> String {
    chrono::Local::now().format("%Y-%m-%d").to_string()
}
