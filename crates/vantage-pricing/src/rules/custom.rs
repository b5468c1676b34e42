//! Cashier overrides.
//!
//! Runs first. A line that receives a positive override is locked, so no
//! campaign rule stacks on top of what the cashier entered.

use tracing::{trace, warn};
use vantage_core::{CustomDiscount, DiscountType, Money, Rate};

use super::RuleStrategy;
use crate::campaign::RuleKind;
use crate::context::{DiscountContext, LineItem};
use crate::evaluate::{rate_of, rule_id};
use crate::result::{AppliedRuleInfo, DiscountApplication, DiscountResult, RuleSource};

const PREFIX: &str = "custom";

/// Applies each line's `custom_discount`, if any.
#[derive(Debug, Clone, Default)]
pub struct CustomRule;

impl CustomRule {
    pub fn new() -> Self {
        CustomRule
    }

    fn amount(custom: &CustomDiscount, line: &LineItem) -> Money {
        match custom.discount_type {
            DiscountType::Fixed if custom.apply_once => Money::from_cents(custom.value),
            DiscountType::Fixed => Money::from_cents(custom.value.saturating_mul(line.quantity)),
            DiscountType::Percentage => line.line_total().percentage(rate_of(custom.value)),
        }
    }

    fn is_valid(custom: &CustomDiscount) -> bool {
        match custom.discount_type {
            DiscountType::Fixed => custom.value > 0,
            DiscountType::Percentage => {
                custom.value > 0 && custom.value <= i64::from(Rate::FULL_BPS)
            }
        }
    }

    fn describe(custom: &CustomDiscount) -> String {
        match custom.discount_type {
            DiscountType::Fixed if custom.apply_once => {
                format!("Manual discount ({} off)", Money::from_cents(custom.value))
            }
            DiscountType::Fixed => {
                format!("Manual discount ({} off each)", Money::from_cents(custom.value))
            }
            DiscountType::Percentage => {
                format!("Manual discount ({} off)", rate_of(custom.value))
            }
        }
    }
}

impl RuleStrategy for CustomRule {
    fn apply(&self, context: &DiscountContext, result: &mut DiscountResult) {
        for (line, line_result) in context.line_items.iter().zip(result.line_items_mut()) {
            let Some(custom) = line.custom_discount.as_ref() else {
                continue;
            };

            if !Self::is_valid(custom) {
                if custom.value != 0 {
                    warn!(
                        line_id = %line.line_id,
                        value = custom.value,
                        discount_type = %custom.discount_type,
                        "Ignoring invalid manual discount"
                    );
                }
                continue;
            }

            let application = DiscountApplication {
                rule_id: self.rule_id(Some(line)),
                amount: Self::amount(custom, line),
                description: Self::describe(custom),
                info: AppliedRuleInfo {
                    source: RuleSource::Custom,
                    rule_name: "Manual discount".to_string(),
                    discount_type: custom.discount_type,
                    discount_value: custom.value,
                },
                is_one_time: false,
            };

            let applied = line_result.add_discount(application);
            if applied.is_positive() {
                line_result.lock();
                trace!(line_id = %line.line_id, applied = %applied, "Manual discount applied, line locked");
            }
        }
    }

    fn is_potentially_repeatable(&self) -> bool {
        true
    }

    fn rule_id(&self, line: Option<&LineItem>) -> String {
        match line {
            Some(line) => rule_id(PREFIX, &line.line_id, RuleKind::Custom, None, None),
            None => PREFIX.to_string(),
        }
    }

    fn source(&self) -> RuleSource {
        RuleSource::Custom
    }
}
