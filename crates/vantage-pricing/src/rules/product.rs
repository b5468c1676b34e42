//! Product-level rules.
//!
//! One instance per product rule set. Matching is by `product_id`, so a
//! product's rules reach every batch of it. Slots are tried in order:
//!
//! ```text
//! line_value → line_quantity → specific_quantity → specific_unit_price
//! ```
//!
//! The first positive offer applies; lines already discounted by a
//! higher-precedence rule are skipped.

use tracing::{trace, warn};

use super::{application, first_positive, RuleStrategy};
use crate::campaign::{ProductRuleSet, RuleKind};
use crate::context::{DiscountContext, LineItem};
use crate::error::RuleConfigError;
use crate::evaluate::{resolve_one_time, rule_id, EvaluationInput};
use crate::result::{DiscountResult, RuleSource};

const PREFIX: &str = "product";

#[derive(Debug, Clone)]
pub struct ProductRule {
    rules: ProductRuleSet,
    campaign_one_time: bool,
}

impl ProductRule {
    /// Drops a specific-quantity slot whose unit cap is not positive.
    pub fn new(mut rules: ProductRuleSet, campaign_one_time: bool) -> Self {
        if let Some(specific) = &rules.specific_quantity {
            if specific.units <= 0 {
                let err = RuleConfigError::InvalidQuantity {
                    name: specific.rule.name.clone(),
                    field: "units",
                };
                warn!(product_id = %rules.product_id, error = %err, "Skipping specific quantity rule");
                rules.specific_quantity = None;
            }
        }
        ProductRule {
            rules,
            campaign_one_time,
        }
    }

    pub fn product_id(&self) -> &str {
        &self.rules.product_id
    }

    pub fn priority(&self) -> i32 {
        self.rules.priority
    }
}

impl RuleStrategy for ProductRule {
    fn apply(&self, context: &DiscountContext, result: &mut DiscountResult) {
        let rules = &self.rules;

        for (line, line_result) in context.line_items.iter().zip(result.line_items_mut()) {
            if line.product_id != rules.product_id
                || line_result.is_locked()
                || line_result.has_discount()
            {
                continue;
            }

            let whole_line = EvaluationInput::for_line(line.unit_price, line.quantity);

            // Only the first `units` units are discounted; the window still
            // tests the full line quantity.
            let specific_quantity = rules.specific_quantity.as_ref().map(|s| {
                let units = s.units.min(line.quantity);
                (
                    &s.rule,
                    EvaluationInput::for_line(line.unit_price, units).with_condition(line.quantity),
                )
            });

            let special_price = rules
                .specific_unit_price
                .as_ref()
                .map(|s| s.as_rule_config(line.unit_price));

            let hit = first_positive([
                (RuleKind::LineValue, rules.line_value.as_ref(), whole_line),
                (
                    RuleKind::LineQuantity,
                    rules.line_quantity.as_ref(),
                    whole_line.gated_by_quantity(),
                ),
                (
                    RuleKind::SpecificQuantity,
                    specific_quantity.map(|(rule, _)| rule),
                    specific_quantity.map_or(whole_line, |(_, input)| input),
                ),
                (
                    RuleKind::SpecificUnitPrice,
                    special_price.as_ref(),
                    whole_line.gated_by_quantity(),
                ),
            ]);

            if let Some((kind, config, amount)) = hit {
                let id = rule_id(PREFIX, &rules.config_id, kind, Some(&rules.product_id), None);
                let one_time = resolve_one_time(config.one_time, self.campaign_one_time)
                    || !self.is_potentially_repeatable();
                let applied = line_result.add_discount(application(
                    id,
                    config,
                    amount,
                    RuleSource::Product,
                    one_time,
                ));
                trace!(line_id = %line.line_id, product_id = %rules.product_id, rule = %kind, applied = %applied, "Product rule applied");
            }
        }
    }

    fn is_potentially_repeatable(&self) -> bool {
        true
    }

    fn rule_id(&self, _line: Option<&LineItem>) -> String {
        format!("{}-{}-{}", PREFIX, self.rules.config_id, self.rules.product_id)
    }

    fn source(&self) -> RuleSource {
        RuleSource::Product
    }
}
