//! # Repository Implementations
//!
//! One repository per table family. Repositories own single-record reads
//! and writes; anything that must touch several tables atomically lives in
//! [`crate::service`] instead.
//!
//! ## Pattern
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │  Repository Pattern                                              │
//! │                                                                  │
//! │  Caller ──► ProductRepository ──► SQL ──► SQLite                 │
//! │                                                                  │
//! │  Benefits:                                                       │
//! │  • SQL isolated in one place per entity                          │
//! │  • Domain types in, domain types out (caja-core structs)         │
//! │  • Input validation before anything is persisted                 │
//! └──────────────────────────────────────────────────────────────────┘
//! ```

pub mod cash_cut;
pub mod credit;
pub mod customer;
pub mod expense;
pub mod product;
pub mod sale;

use uuid::Uuid;

/// Generates a fresh UUID v4 primary key.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}
