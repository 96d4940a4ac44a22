//! # Validation Module
//!
//! Input validation rules, applied before anything is persisted.
//!
//! ## Validation Strategy
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                     Validation Layers                            │
//! │                                                                  │
//! │  Layer 1: THIS MODULE - business-rule validation                 │
//! │  Layer 2: Database - NOT NULL / UNIQUE / FK constraints          │
//! │                                                                  │
//! │  Defense in depth: the two layers catch different errors         │
//! └──────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a product name.
///
/// ## Rules
/// - Must not be empty (after trimming)
/// - Must be at most 200 characters
///
/// ## Example
/// ```rust
/// use caja_core::validation::validate_product_name;
///
/// assert!(validate_product_name("Claw hammer 16oz").is_ok());
/// assert!(validate_product_name("   ").is_err());
/// ```
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates the customer details required for a credit sale.
///
/// Name and phone are mandatory (phone is the dedup key); address and notes
/// are free-form.
pub fn validate_credit_customer(name: &str, phone: &str) -> ValidationResult<()> {
    if name.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "customer name".to_string(),
        });
    }
    if phone.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "customer phone".to_string(),
        });
    }
    Ok(())
}

/// Validates a free-form description (expense reason, note).
pub fn validate_description(text: &str) -> ValidationResult<()> {
    let text = text.trim();

    if text.is_empty() {
        return Err(ValidationError::Required {
            field: "description".to_string(),
        });
    }

    if text.len() > 500 {
        return Err(ValidationError::TooLong {
            field: "description".to_string(),
            max: 500,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a sale price in cents.
///
/// Prices must be strictly positive; a free item is a data-entry mistake at
/// this counter.
pub fn validate_sale_price(cents: i64) -> ValidationResult<()> {
    if cents <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "sale price".to_string(),
        });
    }
    Ok(())
}

/// Validates a payment or expense amount in cents.
pub fn validate_amount(cents: i64) -> ValidationResult<()> {
    if cents <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "amount".to_string(),
        });
    }
    Ok(())
}

/// Validates a line quantity.
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
