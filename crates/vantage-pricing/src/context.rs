//! # Discount Context
//!
//! The engine's input: the cart lines plus optional customer data.
//!
//! A context is built fresh for every calculation and never mutated by
//! rules. Line order is preserved (it decides which target lines a
//! buy-X-get-Y reward lands on) but carries no other meaning.

use serde::{Deserialize, Serialize};
use vantage_core::{CustomDiscount, Money, SaleItem};

/// One cart row: one stock batch at one quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub line_id: String,
    pub product_id: String,
    pub batch_id: String,
    pub unit_price: Money,
    pub quantity: i64,
    #[serde(default)]
    pub custom_discount: Option<CustomDiscount>,
}

impl LineItem {
    pub fn new(
        line_id: impl Into<String>,
        product_id: impl Into<String>,
        batch_id: impl Into<String>,
        unit_price: Money,
        quantity: i64,
    ) -> Self {
        LineItem {
            line_id: line_id.into(),
            product_id: product_id.into(),
            batch_id: batch_id.into(),
            unit_price,
            quantity,
            custom_discount: None,
        }
    }

    /// Attaches a cashier-entered discount.
    pub fn with_custom_discount(mut self, custom: CustomDiscount) -> Self {
        self.custom_discount = Some(custom);
        self
    }

    /// Pre-discount value of the line.
    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }
}

impl From<&SaleItem> for LineItem {
    fn from(item: &SaleItem) -> Self {
        LineItem {
            line_id: item.id.clone(),
            product_id: item.product_id.clone(),
            batch_id: item.batch_id.clone(),
            unit_price: item.unit_price(),
            quantity: item.quantity,
            custom_discount: item.custom_discount,
        }
    }
}

/// Customer data carried alongside the cart.
///
/// No current rule reads it; it is part of the input contract so
/// customer-targeted rules can be added without changing callers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerInfo {
    pub customer_id: Option<String>,
    pub loyalty_tier: Option<String>,
}

/// Full input to one engine run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiscountContext {
    pub line_items: Vec<LineItem>,
    #[serde(default)]
    pub customer: Option<CustomerInfo>,
}

impl DiscountContext {
    pub fn new(line_items: Vec<LineItem>) -> Self {
        DiscountContext {
            line_items,
            customer: None,
        }
    }

    /// Builds a context from sale lines, preserving their order.
    pub fn from_sale_items(items: &[SaleItem]) -> Self {
        DiscountContext::new(items.iter().map(LineItem::from).collect())
    }

    pub fn with_customer(mut self, customer: CustomerInfo) -> Self {
        self.customer = Some(customer);
        self
    }

    /// Sum of all line quantities.
    pub fn total_quantity(&self) -> i64 {
        self.line_items.iter().map(|l| l.quantity).sum()
    }

    /// Quantity of a product across all of its batches.
    pub fn quantity_of_product(&self, product_id: &str) -> i64 {
        self.line_items
            .iter()
            .filter(|l| l.product_id == product_id)
            .map(|l| l.quantity)
            .sum()
    }

    /// Sum of pre-discount line totals.
    pub fn original_subtotal(&self) -> Money {
        self.line_items.iter().map(LineItem::line_total).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.line_items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cart() -> DiscountContext {
        DiscountContext::new(vec![
            LineItem::new("l1", "cola", "cola-b1", Money::from_cents(250), 2),
            LineItem::new("l2", "cola", "cola-b2", Money::from_cents(240), 1),
            LineItem::new("l3", "chips", "chips-b1", Money::from_cents(199), 3),
        ])
    }

    #[test]
    fn test_totals() {
        let ctx = cart();
        assert_eq!(ctx.total_quantity(), 6);
        assert_eq!(ctx.original_subtotal().cents(), 500 + 240 + 597);
    }

    #[test]
    fn test_quantity_of_product_spans_batches() {
        let ctx = cart();
        assert_eq!(ctx.quantity_of_product("cola"), 3);
        assert_eq!(ctx.quantity_of_product("chips"), 3);
        assert_eq!(ctx.quantity_of_product("bread"), 0);
    }

    #[test]
    fn test_from_sale_items_keeps_order_and_custom_discount() {
        let items = vec![SaleItem {
            id: "l1".to_string(),
            product_id: "cola".to_string(),
            batch_id: "cola-b1".to_string(),
            name_snapshot: "Cola".to_string(),
            unit_price_cents: 250,
            quantity: 2,
            discount_cents: 0,
            custom_discount: Some(CustomDiscount::fixed_once(Money::from_cents(50))),
        }];
        let ctx = DiscountContext::from_sale_items(&items);
        assert_eq!(ctx.line_items.len(), 1);
        assert_eq!(ctx.line_items[0].line_total().cents(), 500);
        assert!(ctx.line_items[0].custom_discount.is_some());
    }
}
