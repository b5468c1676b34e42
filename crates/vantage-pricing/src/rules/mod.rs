//! # Discount Rules
//!
//! Every rule family the engine knows, behind one closed enum.
//!
//! ## Precedence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. Custom          cashier override, then the line is LOCKED           │
//! │  2. Batch           one per batch rule set                              │
//! │  3. Product         one per product rule set, priority ascending        │
//! │  4. Buy X Get Y     one per enabled, valid config                       │
//! │  5. Campaign default  lines without a batch or product discount         │
//! │  6. Cart total      once, on the subtotal left after 1-5                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Order is fixed by how the engine builds the list. Adding a rule family
//! means adding a variant here, and the compiler points at every match
//! that has to learn about it.

mod batch;
mod buy_x_get_y;
mod campaign_default;
mod cart_total;
mod custom;
mod product;

pub use batch::BatchRule;
pub use buy_x_get_y::{validate_buy_x_get_y, BuyXGetYRule};
pub use campaign_default::CampaignDefaultRule;
pub use cart_total::CartTotalRule;
pub use custom::CustomRule;
pub use product::ProductRule;

use vantage_core::Money;

use crate::campaign::{RuleConfig, RuleKind, RuleSlot};
use crate::context::{DiscountContext, LineItem};
use crate::evaluate::{describe, evaluate_rule, EvaluationInput};
use crate::result::{AppliedRuleInfo, DiscountApplication, DiscountResult, RuleSource};

// =============================================================================
// Strategy Trait
// =============================================================================

/// Behaviour shared by every rule family.
pub trait RuleStrategy {
    /// Offers this rule's discounts to `result`.
    ///
    /// Reads `context` only; all bookkeeping goes through the result's
    /// `add_discount` / `add_cart_discount`.
    fn apply(&self, context: &DiscountContext, result: &mut DiscountResult);

    /// Whether the rule may fire more than once per transaction.
    ///
    /// Non-repeatable rules have their applications marked one-time.
    fn is_potentially_repeatable(&self) -> bool;

    /// Identifier of this rule instance, scoped to `line` for rules whose
    /// identity depends on it.
    fn rule_id(&self, line: Option<&LineItem>) -> String;

    fn source(&self) -> RuleSource;
}

// =============================================================================
// Closed Rule Set
// =============================================================================

/// One compiled rule, ready to run.
#[derive(Debug, Clone)]
pub enum DiscountRule {
    Custom(CustomRule),
    Batch(BatchRule),
    Product(ProductRule),
    BuyXGetY(BuyXGetYRule),
    CampaignDefault(CampaignDefaultRule),
    CartTotal(CartTotalRule),
}

impl RuleStrategy for DiscountRule {
    fn apply(&self, context: &DiscountContext, result: &mut DiscountResult) {
        match self {
            DiscountRule::Custom(rule) => rule.apply(context, result),
            DiscountRule::Batch(rule) => rule.apply(context, result),
            DiscountRule::Product(rule) => rule.apply(context, result),
            DiscountRule::BuyXGetY(rule) => rule.apply(context, result),
            DiscountRule::CampaignDefault(rule) => rule.apply(context, result),
            DiscountRule::CartTotal(rule) => rule.apply(context, result),
        }
    }

    fn is_potentially_repeatable(&self) -> bool {
        match self {
            DiscountRule::Custom(rule) => rule.is_potentially_repeatable(),
            DiscountRule::Batch(rule) => rule.is_potentially_repeatable(),
            DiscountRule::Product(rule) => rule.is_potentially_repeatable(),
            DiscountRule::BuyXGetY(rule) => rule.is_potentially_repeatable(),
            DiscountRule::CampaignDefault(rule) => rule.is_potentially_repeatable(),
            DiscountRule::CartTotal(rule) => rule.is_potentially_repeatable(),
        }
    }

    fn rule_id(&self, line: Option<&LineItem>) -> String {
        match self {
            DiscountRule::Custom(rule) => rule.rule_id(line),
            DiscountRule::Batch(rule) => rule.rule_id(line),
            DiscountRule::Product(rule) => rule.rule_id(line),
            DiscountRule::BuyXGetY(rule) => rule.rule_id(line),
            DiscountRule::CampaignDefault(rule) => rule.rule_id(line),
            DiscountRule::CartTotal(rule) => rule.rule_id(line),
        }
    }

    fn source(&self) -> RuleSource {
        match self {
            DiscountRule::Custom(_) => RuleSource::Custom,
            DiscountRule::Batch(_) => RuleSource::Batch,
            DiscountRule::Product(_) => RuleSource::Product,
            DiscountRule::BuyXGetY(_) => RuleSource::BuyXGetY,
            DiscountRule::CampaignDefault(_) => RuleSource::CampaignDefault,
            DiscountRule::CartTotal(_) => RuleSource::CartTotal,
        }
    }
}

// =============================================================================
// Shared Helpers
// =============================================================================

/// Evaluates slots in order and returns the first one offering a positive
/// amount.
pub(crate) fn first_positive<'c>(
    candidates: impl IntoIterator<Item = (RuleKind, Option<&'c RuleConfig>, EvaluationInput)>,
) -> Option<(RuleKind, &'c RuleConfig, Money)> {
    candidates.into_iter().find_map(|(kind, config, input)| {
        let amount = evaluate_rule(RuleSlot::of(config), &input);
        match config {
            Some(config) if amount.is_positive() => Some((kind, config, amount)),
            _ => None,
        }
    })
}

/// Wraps an evaluated amount into an application record.
pub(crate) fn application(
    rule_id: String,
    config: &RuleConfig,
    amount: Money,
    source: RuleSource,
    is_one_time: bool,
) -> DiscountApplication {
    DiscountApplication {
        rule_id,
        amount,
        description: describe(config),
        info: AppliedRuleInfo {
            source,
            rule_name: config.name.clone(),
            discount_type: config.discount_type,
            discount_value: config.discount_value,
        },
        is_one_time,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vantage_core::Rate;

    #[test]
    fn test_first_positive_skips_zero_offers() {
        let value = RuleConfig::percentage("big spend", Rate::from_percent(10)).with_min(10_000);
        let quantity = RuleConfig::fixed("3+", Money::from_cents(50)).with_min(3);
        let line = EvaluationInput::for_line(Money::from_cents(200), 4);

        let hit = first_positive([
            (RuleKind::LineValue, Some(&value), line),
            (RuleKind::LineQuantity, Some(&quantity), line.gated_by_quantity()),
        ]);

        let (kind, config, amount) = hit.unwrap();
        assert_eq!(kind, RuleKind::LineQuantity);
        assert_eq!(config.name, "3+");
        assert_eq!(amount.cents(), 200);
    }

    #[test]
    fn test_first_positive_none_when_nothing_matches() {
        let line = EvaluationInput::for_line(Money::from_cents(200), 1);
        assert!(first_positive([(RuleKind::LineValue, None, line)]).is_none());
    }
}
