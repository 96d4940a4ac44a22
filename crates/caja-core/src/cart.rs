//! # Cart
//!
//! The in-memory shopping cart built up during checkout.
//!
//! ## Snapshot Pattern
//! Each line freezes the product's name, sale price, and cost price at the
//! moment it enters the cart. If the catalog changes while the cashier is
//! still ringing up, the cart (and the eventual sale) keeps the prices the
//! customer saw.
//!
//! ## Invariants
//! - Lines are unique by `product_id` (adding the same product again
//!   increases quantity)
//! - Quantity is always > 0 (updating to 0 removes the line)
//! - Maximum lines / per-line quantity come from crate-level constants

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::Product;
use crate::{MAX_CART_LINES, MAX_LINE_QUANTITY};

/// One line of the cart: a product snapshot plus a quantity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLine {
    /// Catalog id the line came from. `None` for ad-hoc lines that have no
    /// stock to decrement.
    pub product_id: Option<String>,

    /// Product name at time of adding (frozen).
    pub name: String,

    /// Sale price at time of adding (frozen).
    pub unit_price: Money,

    /// Cost price at time of adding (frozen), for later profit reports.
    pub unit_cost: Money,

    pub quantity: i64,
}

impl CartLine {
    /// Builds a line from a catalog product, freezing its prices.
    pub fn from_product(product: &Product, quantity: i64) -> Self {
        CartLine {
            product_id: Some(product.id.clone()),
            name: product.name.clone(),
            unit_price: product.sale_price,
            unit_cost: product.cost_price,
            quantity,
        }
    }

    /// Line total (unit price × quantity).
    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }
}

/// The shopping cart.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Cart {
    pub lines: Vec<CartLine>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart { lines: Vec::new() }
    }

    /// Adds a product to the cart or increases quantity if already present.
    pub fn add_product(&mut self, product: &Product, quantity: i64) -> CoreResult<()> {
        if let Some(line) = self
            .lines
            .iter_mut()
            .find(|l| l.product_id.as_deref() == Some(product.id.as_str()))
        {
            let new_qty = line.quantity + quantity;
            if new_qty > MAX_LINE_QUANTITY {
                return Err(CoreError::QuantityTooLarge {
                    requested: new_qty,
                    max: MAX_LINE_QUANTITY,
                });
            }
            line.quantity = new_qty;
            return Ok(());
        }

        if self.lines.len() >= MAX_CART_LINES {
            return Err(CoreError::CartTooLarge {
                max: MAX_CART_LINES,
            });
        }
        if quantity > MAX_LINE_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested: quantity,
                max: MAX_LINE_QUANTITY,
            });
        }

        self.lines.push(CartLine::from_product(product, quantity));
        Ok(())
    }

    /// Sets the quantity of a line; 0 removes it.
    pub fn update_quantity(&mut self, product_id: &str, quantity: i64) -> CoreResult<()> {
        if quantity == 0 {
            self.remove(product_id);
            return Ok(());
        }
        if quantity > MAX_LINE_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested: quantity,
                max: MAX_LINE_QUANTITY,
            });
        }
        if let Some(line) = self
            .lines
            .iter_mut()
            .find(|l| l.product_id.as_deref() == Some(product_id))
        {
            line.quantity = quantity;
        }
        Ok(())
    }

    /// Removes a line by product id. Removing a line that isn't there is
    /// a no-op.
    pub fn remove(&mut self, product_id: &str) {
        self.lines
            .retain(|l| l.product_id.as_deref() != Some(product_id));
    }

    /// Clears all lines (after a completed sale).
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Cart total: Σ(unit price × quantity).
    pub fn total(&self) -> Money {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Total units across all lines.
    pub fn total_quantity(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Category;
    use chrono::Utc;

    fn test_product(id: &str, sale_cents: i64) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Product {}", id),
            barcode: None,
            category: Category::Other,
            cost_price: Money::from_cents(sale_cents / 2),
            market_price: Money::from_cents(sale_cents),
            sale_price: Money::from_cents(sale_cents),
            wholesale_price: Money::from_cents(sale_cents),
            stock: 10,
            min_stock: None,
            backorder: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_add_and_total() {
        let mut cart = Cart::new();
        cart.add_product(&test_product("1", 999), 2).unwrap();

        assert_eq!(cart.lines.len(), 1);
        assert_eq!(cart.total_quantity(), 2);
        assert_eq!(cart.total().cents(), 1998);
    }

    #[test]
    fn test_add_same_product_merges() {
        let mut cart = Cart::new();
        let p = test_product("1", 999);
        cart.add_product(&p, 2).unwrap();
        cart.add_product(&p, 3).unwrap();

        assert_eq!(cart.lines.len(), 1);
        assert_eq!(cart.total_quantity(), 5);
    }

    #[test]
    fn test_update_quantity_zero_removes() {
        let mut cart = Cart::new();
        cart.add_product(&test_product("1", 999), 2).unwrap();
        cart.update_quantity("1", 0).unwrap();
        assert!(cart.is_empty());
    }

    #[test]
    fn test_price_snapshot_survives_catalog_edit() {
        let mut cart = Cart::new();
        let mut p = test_product("1", 1000);
        cart.add_product(&p, 1).unwrap();

        // Catalog price change after the fact does not touch the cart.
        p.sale_price = Money::from_cents(9999);
        assert_eq!(cart.total().cents(), 1000);
    }

    #[test]
    fn test_quantity_cap() {
        let mut cart = Cart::new();
        let err = cart.add_product(&test_product("1", 100), 1000).unwrap_err();
        assert!(matches!(err, CoreError::QuantityTooLarge { .. }));
    }

    #[test]
    fn test_clear() {
        let mut cart = Cart::new();
        cart.add_product(&test_product("1", 999), 2).unwrap();
        cart.clear();
        assert!(cart.is_empty());
    }
}
