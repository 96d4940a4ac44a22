//! # caja-db: Storage Layer for Caja POS
//!
//! SQLite persistence for the register. This crate owns every query and
//! every multi-record flow; [`caja_core`] supplies the types and the
//! arithmetic, nothing here re-implements business math.
//!
//! ## Architecture Position
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                      Caja POS Data Flow                          │
//! │                                                                  │
//! │  Caller (register UI, admin tool, seed binary)                   │
//! │       │                                                          │
//! │       ▼                                                          │
//! │  ┌────────────────────────────────────────────────────────────┐  │
//! │  │                   caja-db (THIS CRATE)                     │  │
//! │  │                                                            │  │
//! │  │  ┌──────────┐  ┌──────────────┐  ┌─────────────────────┐   │  │
//! │  │  │  Store   │  │ Repositories │  │ Services (atomic)   │   │  │
//! │  │  │ (pool.rs)│  │ product sale │  │ checkout            │   │  │
//! │  │  │          │◄─│ credit  ...  │  │ credit payment      │   │  │
//! │  │  │SqlitePool│  │              │  │ cash cut            │   │  │
//! │  │  └──────────┘  └──────────────┘  └─────────────────────┘   │  │
//! │  │         plus migrations (embedded) and reports             │  │
//! │  └────────────────────────────────────────────────────────────┘  │
//! │       │                                                          │
//! │       ▼                                                          │
//! │  SQLite database (WAL mode, foreign keys on)                     │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use caja_db::{Store, StoreConfig};
//!
//! let store = Store::open(StoreConfig::new("caja.db")).await?;
//!
//! let hits = store.products().search("hammer", 20).await?;
//! let receipt = store.checkout().settle(request).await?;
//! let cut = store.cash_cut_service().close_day(close).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod reports;
pub mod repository;
pub mod service;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{StoreError, StoreResult};
pub use pool::{Store, StoreConfig};

pub use repository::cash_cut::CashCutRepository;
pub use repository::credit::CreditRepository;
pub use repository::customer::{ContactDetails, CustomerRepository};
pub use repository::expense::ExpenseRepository;
pub use repository::product::{NewProduct, ProductRepository};
pub use repository::sale::{DaySales, SaleRepository};

pub use reports::Reports;
pub use service::cash_cut::{CashCutService, CloseDrawerRequest, DrawerDraft, DrawerStatus};
pub use service::checkout::{
    CheckoutService, CreditReceipt, CreditSaleRequest, SaleReceipt, SaleRequest,
};
pub use service::credit::{CreditService, PaymentReceipt};
pub use service::local_business_date;
