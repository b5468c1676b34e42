//! # Discount Result
//!
//! The single mutable accumulator of one engine run. Rules never compute
//! totals themselves; they hand a [`DiscountApplication`] to the result,
//! which clamps it and does the bookkeeping.
//!
//! ## Clamping
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Line: 1 × $1.00                                                        │
//! │                                                                         │
//! │  rule A offers $0.80 ──► headroom $1.00 ──► applied $0.80               │
//! │  rule B offers $0.80 ──► headroom $0.20 ──► applied $0.20               │
//! │  rule C offers $0.80 ──► headroom $0.00 ──► nothing recorded            │
//! │                                                                         │
//! │  total_discount = $1.00, net_price = $0.00                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Invariants held by every mutation:
//! - per line: `0 ≤ total_discount ≤ unit_price × quantity`
//! - per cart: `0 ≤ total_cart_discount ≤ subtotal after item discounts`
//! - a one-time rule id is recorded at most once per line (and once at
//!   cart scope)

use std::collections::HashSet;

use serde::Serialize;
use vantage_core::{DiscountType, Money};

use crate::context::{DiscountContext, LineItem};

// =============================================================================
// Applications
// =============================================================================

/// Which rule family produced a discount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleSource {
    Custom,
    Batch,
    Product,
    BuyXGetY,
    CampaignDefault,
    CartTotal,
}

impl RuleSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleSource::Custom => "custom",
            RuleSource::Batch => "batch",
            RuleSource::Product => "product",
            RuleSource::BuyXGetY => "buy_x_get_y",
            RuleSource::CampaignDefault => "campaign_default",
            RuleSource::CartTotal => "cart_total",
        }
    }
}

/// Descriptive metadata about the rule behind an application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppliedRuleInfo {
    pub source: RuleSource,
    pub rule_name: String,
    pub discount_type: DiscountType,
    /// Configured value: cents for fixed, basis points for percentage.
    pub discount_value: i64,
}

/// One rule firing against one line (or the cart).
///
/// Rules build it with the amount they computed. Once recorded on a
/// result, `amount` is the amount actually applied after clamping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscountApplication {
    pub rule_id: String,
    pub amount: Money,
    pub description: String,
    pub info: AppliedRuleInfo,
    pub is_one_time: bool,
}

impl DiscountApplication {
    fn with_amount(mut self, amount: Money) -> Self {
        self.amount = amount;
        self
    }
}

// =============================================================================
// Line Item Result
// =============================================================================

/// Discount state of one cart line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineItemResult {
    line_id: String,
    product_id: String,
    batch_id: String,
    unit_price: Money,
    quantity: i64,
    total_discount: Money,
    applied_rules: Vec<DiscountApplication>,
    #[serde(skip)]
    consumed_one_time: HashSet<String>,
    locked: bool,
}

impl LineItemResult {
    pub fn new(line: &LineItem) -> Self {
        LineItemResult {
            line_id: line.line_id.clone(),
            product_id: line.product_id.clone(),
            batch_id: line.batch_id.clone(),
            unit_price: line.unit_price,
            quantity: line.quantity,
            total_discount: Money::zero(),
            applied_rules: Vec::new(),
            consumed_one_time: HashSet::new(),
            locked: false,
        }
    }

    pub fn line_id(&self) -> &str {
        &self.line_id
    }

    pub fn product_id(&self) -> &str {
        &self.product_id
    }

    pub fn batch_id(&self) -> &str {
        &self.batch_id
    }

    pub fn unit_price(&self) -> Money {
        self.unit_price
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    pub fn total_discount(&self) -> Money {
        self.total_discount
    }

    /// Pre-discount value of the line.
    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }

    /// What the customer pays for this line.
    #[inline]
    pub fn net_price(&self) -> Money {
        self.line_total() - self.total_discount
    }

    /// Headroom left for further discounts.
    #[inline]
    pub fn remaining_value(&self) -> Money {
        self.net_price().max(Money::zero())
    }

    pub fn has_discount(&self) -> bool {
        self.total_discount.is_positive()
    }

    /// True once a cashier override has been applied.
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn applied_rules(&self) -> &[DiscountApplication] {
        &self.applied_rules
    }

    /// True if the one-time rule `rule_id` already fired on this line.
    pub fn has_consumed(&self, rule_id: &str) -> bool {
        self.consumed_one_time.contains(rule_id)
    }

    /// Adds a discount, clamped to the line's remaining value.
    ///
    /// Returns the amount actually applied. Nothing is recorded when the
    /// line is locked, the one-time rule already fired, or the clamped
    /// amount is zero.
    ///
    /// ## Example
    /// ```rust
    /// use vantage_core::{DiscountType, Money};
    /// use vantage_pricing::context::LineItem;
    /// use vantage_pricing::result::{
    ///     AppliedRuleInfo, DiscountApplication, LineItemResult, RuleSource,
    /// };
    ///
    /// let line = LineItem::new("l1", "cola", "cola-b1", Money::from_cents(100), 1);
    /// let mut result = LineItemResult::new(&line);
    /// let offer = DiscountApplication {
    ///     rule_id: "default-summer-line_value".to_string(),
    ///     amount: Money::from_cents(80),
    ///     description: "80c off".to_string(),
    ///     info: AppliedRuleInfo {
    ///         source: RuleSource::CampaignDefault,
    ///         rule_name: "80c off".to_string(),
    ///         discount_type: DiscountType::Fixed,
    ///         discount_value: 80,
    ///     },
    ///     is_one_time: false,
    /// };
    ///
    /// assert_eq!(result.add_discount(offer.clone()).cents(), 80);
    /// assert_eq!(result.add_discount(offer).cents(), 20);
    /// assert_eq!(result.net_price().cents(), 0);
    /// ```
    pub fn add_discount(&mut self, application: DiscountApplication) -> Money {
        if self.locked {
            return Money::zero();
        }
        if application.is_one_time && self.consumed_one_time.contains(&application.rule_id) {
            return Money::zero();
        }

        let applicable = application.amount.clamp_to(self.remaining_value());
        if !applicable.is_positive() {
            return Money::zero();
        }

        self.total_discount += applicable;
        if application.is_one_time {
            self.consumed_one_time.insert(application.rule_id.clone());
        }
        self.applied_rules.push(application.with_amount(applicable));
        applicable
    }

    /// Blocks every further discount on this line.
    pub(crate) fn lock(&mut self) {
        self.locked = true;
    }
}

// =============================================================================
// Discount Result
// =============================================================================

/// The outcome of one engine run over a cart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiscountResult {
    lines: Vec<LineItemResult>,
    total_cart_discount: Money,
    applied_cart_rules: Vec<DiscountApplication>,
    #[serde(skip)]
    consumed_cart_rules: HashSet<String>,
    total_item_discount: Money,
    finalized: bool,
}

impl DiscountResult {
    /// One line result per context line, same order.
    pub fn new(context: &DiscountContext) -> Self {
        DiscountResult {
            lines: context.line_items.iter().map(LineItemResult::new).collect(),
            total_cart_discount: Money::zero(),
            applied_cart_rules: Vec::new(),
            consumed_cart_rules: HashSet::new(),
            total_item_discount: Money::zero(),
            finalized: false,
        }
    }

    pub fn line_items(&self) -> &[LineItemResult] {
        &self.lines
    }

    pub fn line_items_mut(&mut self) -> &mut [LineItemResult] {
        &mut self.lines
    }

    pub fn line(&self, line_id: &str) -> Option<&LineItemResult> {
        self.lines.iter().find(|l| l.line_id == line_id)
    }

    pub fn applied_cart_rules(&self) -> &[DiscountApplication] {
        &self.applied_cart_rules
    }

    pub fn total_cart_discount(&self) -> Money {
        self.total_cart_discount
    }

    /// Adds a cart-level discount, clamped to what is left of the subtotal
    /// after item discounts and earlier cart discounts.
    pub fn add_cart_discount(&mut self, application: DiscountApplication) -> Money {
        if application.is_one_time && self.consumed_cart_rules.contains(&application.rule_id) {
            return Money::zero();
        }

        let headroom = self.subtotal_after_item_discounts() - self.total_cart_discount;
        let applicable = application.amount.clamp_to(headroom);
        if !applicable.is_positive() {
            return Money::zero();
        }

        self.total_cart_discount += applicable;
        if application.is_one_time {
            self.consumed_cart_rules.insert(application.rule_id.clone());
        }
        self.applied_cart_rules.push(application.with_amount(applicable));
        applicable
    }

    /// Sum of pre-discount line totals.
    pub fn original_subtotal(&self) -> Money {
        self.lines.iter().map(LineItemResult::line_total).sum()
    }

    /// Subtotal once item-level discounts are taken off.
    pub fn subtotal_after_item_discounts(&self) -> Money {
        self.lines.iter().map(LineItemResult::net_price).sum()
    }

    /// Sum of line discounts. Frozen by [`finalize`](Self::finalize).
    pub fn total_item_discount(&self) -> Money {
        if self.finalized {
            self.total_item_discount
        } else {
            self.lines.iter().map(LineItemResult::total_discount).sum()
        }
    }

    /// Item plus cart discount.
    pub fn total_discount(&self) -> Money {
        self.total_item_discount() + self.total_cart_discount
    }

    pub fn final_total(&self) -> Money {
        self.original_subtotal() - self.total_discount()
    }

    pub fn has_discount(&self) -> bool {
        self.total_discount().is_positive()
    }

    /// Freezes derived totals. Calling it again changes nothing.
    pub fn finalize(&mut self) {
        if self.finalized {
            return;
        }
        self.total_item_discount = self.lines.iter().map(LineItemResult::total_discount).sum();
        self.finalized = true;
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn application(rule_id: &str, cents: i64, one_time: bool) -> DiscountApplication {
        DiscountApplication {
            rule_id: rule_id.to_string(),
            amount: Money::from_cents(cents),
            description: rule_id.to_string(),
            info: AppliedRuleInfo {
                source: RuleSource::CampaignDefault,
                rule_name: rule_id.to_string(),
                discount_type: DiscountType::Fixed,
                discount_value: cents,
            },
            is_one_time: one_time,
        }
    }

    fn context() -> DiscountContext {
        DiscountContext::new(vec![
            LineItem::new("l1", "cola", "cola-b1", Money::from_cents(100), 1),
            LineItem::new("l2", "chips", "chips-b1", Money::from_cents(200), 2),
        ])
    }

    #[test]
    fn test_line_discount_is_clamped_and_records_applied_amount() {
        let mut result = DiscountResult::new(&context());
        let line = &mut result.line_items_mut()[0];

        assert_eq!(line.add_discount(application("a", 80, false)).cents(), 80);
        assert_eq!(line.add_discount(application("b", 80, false)).cents(), 20);
        assert_eq!(line.add_discount(application("c", 80, false)).cents(), 0);

        assert_eq!(line.total_discount().cents(), 100);
        assert_eq!(line.applied_rules().len(), 2);
        assert_eq!(line.applied_rules()[1].amount.cents(), 20);
    }

    #[test]
    fn test_negative_amount_is_ignored() {
        let mut result = DiscountResult::new(&context());
        let line = &mut result.line_items_mut()[0];
        assert!(line.add_discount(application("neg", -50, false)).is_zero());
        assert!(line.applied_rules().is_empty());
    }

    #[test]
    fn test_one_time_rule_applies_once_per_line() {
        let mut result = DiscountResult::new(&context());
        let line = &mut result.line_items_mut()[1];

        assert_eq!(line.add_discount(application("once", 50, true)).cents(), 50);
        assert_eq!(line.add_discount(application("once", 50, true)).cents(), 0);
        assert!(line.has_consumed("once"));
        assert_eq!(line.total_discount().cents(), 50);

        // A repeatable rule with the same id is not blocked
        assert_eq!(line.add_discount(application("once", 50, false)).cents(), 50);
    }

    #[test]
    fn test_locked_line_rejects_discounts() {
        let mut result = DiscountResult::new(&context());
        let line = &mut result.line_items_mut()[1];
        line.lock();
        assert!(line.add_discount(application("a", 50, false)).is_zero());
        assert!(!line.has_discount());
    }

    #[test]
    fn test_cart_discount_clamped_to_remaining_subtotal() {
        let mut result = DiscountResult::new(&context());
        result.line_items_mut()[1].add_discount(application("item", 100, false));
        assert_eq!(result.subtotal_after_item_discounts().cents(), 400);

        assert_eq!(result.add_cart_discount(application("cart", 300, false)).cents(), 300);
        assert_eq!(result.add_cart_discount(application("cart2", 300, false)).cents(), 100);
        assert_eq!(result.total_cart_discount().cents(), 400);
        assert_eq!(result.final_total().cents(), 0);
    }

    #[test]
    fn test_cart_one_time_rule() {
        let mut result = DiscountResult::new(&context());
        assert_eq!(result.add_cart_discount(application("cart", 50, true)).cents(), 50);
        assert_eq!(result.add_cart_discount(application("cart", 50, true)).cents(), 0);
        assert_eq!(result.applied_cart_rules().len(), 1);
    }

    #[test]
    fn test_totals_and_finalize_idempotent() {
        let mut result = DiscountResult::new(&context());
        result.line_items_mut()[0].add_discount(application("a", 30, false));
        result.add_cart_discount(application("cart", 70, false));

        result.finalize();
        result.finalize();

        assert!(result.is_finalized());
        assert_eq!(result.original_subtotal().cents(), 500);
        assert_eq!(result.total_item_discount().cents(), 30);
        assert_eq!(result.total_discount().cents(), 100);
        assert_eq!(result.final_total().cents(), 400);
    }
}
