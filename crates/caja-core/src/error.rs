//! # Error Types
//!
//! Domain-specific error types for caja-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                        Error Types                               │
//! │                                                                  │
//! │  caja-core errors (this file)                                    │
//! │  ├── CoreError        - Business-rule violations                 │
//! │  └── ValidationError  - Input validation failures                │
//! │                                                                  │
//! │  caja-db errors (separate crate)                                 │
//! │  └── StoreError       - Database operation failures              │
//! │                                                                  │
//! │  Flow: ValidationError → CoreError → StoreError → caller         │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (amounts, names)
//! 3. Errors are enum variants, never String
//! 4. Each variant maps to a user-facing message; nothing is retried

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These represent business-rule violations. They are raised before any
/// persistence happens (or, inside a transaction, roll the whole flow back)
/// and should be translated to inline user-facing messages.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Cash tendered is below the sale total.
    #[error("Insufficient payment: total {total_cents} cents, tendered {tendered_cents} cents")]
    InsufficientPayment {
        total_cents: i64,
        tendered_cents: i64,
    },

    /// A credit payment would exceed the remaining debt.
    ///
    /// Also the guard that makes `paid` terminal: a settled ledger has
    /// remaining debt ~0, so any positive amount is an overpayment.
    #[error("Overpayment: remaining debt {remaining_cents} cents, attempted {attempted_cents} cents")]
    Overpayment {
        remaining_cents: i64,
        attempted_cents: i64,
    },

    /// Selling would drive a non-backorder product below zero stock.
    #[error("Insufficient stock for {name}: available {available}, requested {requested}")]
    InsufficientStock {
        name: String,
        available: i64,
        requested: i64,
    },

    /// Cart has exceeded maximum allowed lines.
    #[error("Cart cannot have more than {max} lines")]
    CartTooLarge { max: usize },

    /// Line quantity exceeds maximum allowed.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when user input doesn't meet requirements and are rejected
/// before any business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be strictly positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value is not in the allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<i64> },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
