//! # caja-core: Pure Business Logic for Caja POS
//!
//! This crate is the **heart** of Caja POS. It contains the domain model and
//! all business rules as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                     Caja POS Architecture                        │
//! │                                                                  │
//! │  ┌────────────────────────────────────────────────────────────┐  │
//! │  │              ★ caja-core (THIS CRATE) ★                    │  │
//! │  │                                                            │  │
//! │  │  ┌─────────┐ ┌───────┐ ┌────────┐ ┌─────────┐ ┌─────────┐ │  │
//! │  │  │  types  │ │ money │ │  cart  │ │ ledger  │ │ session │ │  │
//! │  │  │ Product │ │ Money │ │  Cart  │ │ credit  │ │ drawer  │ │  │
//! │  │  │  Sale   │ │ cents │ │ lines  │ │ payment │ │ math    │ │  │
//! │  │  └─────────┘ └───────┘ └────────┘ └─────────┘ └─────────┘ │  │
//! │  │                                                            │  │
//! │  │  NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS        │  │
//! │  └────────────────────────────────────────────────────────────┘  │
//! │                              │                                   │
//! │  ┌───────────────────────────▼────────────────────────────────┐  │
//! │  │                caja-db (Storage Layer)                     │  │
//! │  │     SQLite repositories, migrations, transactional ops     │  │
//! │  └────────────────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Sale, Credit, Customer, CashCut, …)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`cart`] - Shopping cart with price/cost snapshots
//! - [`ledger`] - Credit-ledger payment arithmetic and status transition
//! - [`session`] - Cash-drawer reconciliation arithmetic
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in cents (i64) to avoid float errors
//! 4. **Explicit Errors**: All errors are typed, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod ledger;
pub mod money;
pub mod session;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartLine};
pub use error::{CoreError, ValidationError};
pub use ledger::{apply_payment, installment_amount, PaymentOutcome, SETTLE_EPSILON};
pub use money::Money;
pub use session::{reconcile, DrawerTotals, Reconciliation};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum lines allowed in a single cart
///
/// ## Business Reason
/// Prevents runaway carts and ensures reasonable transaction sizes.
pub const MAX_CART_LINES: usize = 100;

/// Maximum quantity of a single line in the cart
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10).
pub const MAX_LINE_QUANTITY: i64 = 999;

/// Allowed installment counts for credit sales.
///
/// The shop only offers two- or three-payment plans.
pub const ALLOWED_INSTALLMENTS: [u32; 2] = [2, 3];
