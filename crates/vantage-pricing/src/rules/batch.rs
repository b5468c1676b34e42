//! Batch-specific rules: discounts pinned to one received stock lot.

use tracing::trace;

use super::{application, first_positive, RuleStrategy};
use crate::campaign::{BatchRuleSet, RuleKind};
use crate::context::{DiscountContext, LineItem};
use crate::evaluate::{resolve_one_time, rule_id, EvaluationInput};
use crate::result::{DiscountResult, RuleSource};

const PREFIX: &str = "batch";

/// Applies one batch rule set to lines sold from that batch.
///
/// Lines already carrying a discount are left alone. Line value is tried
/// before line quantity, and only the first positive offer applies.
#[derive(Debug, Clone)]
pub struct BatchRule {
    rules: BatchRuleSet,
    campaign_one_time: bool,
}

impl BatchRule {
    pub fn new(rules: BatchRuleSet, campaign_one_time: bool) -> Self {
        BatchRule {
            rules,
            campaign_one_time,
        }
    }

    pub fn batch_id(&self) -> &str {
        &self.rules.batch_id
    }
}

impl RuleStrategy for BatchRule {
    fn apply(&self, context: &DiscountContext, result: &mut DiscountResult) {
        for (line, line_result) in context.line_items.iter().zip(result.line_items_mut()) {
            if line.batch_id != self.rules.batch_id
                || line_result.is_locked()
                || line_result.has_discount()
            {
                continue;
            }

            let input = EvaluationInput::for_line(line.unit_price, line.quantity);
            let hit = first_positive([
                (RuleKind::LineValue, self.rules.line_value.as_ref(), input),
                (
                    RuleKind::LineQuantity,
                    self.rules.line_quantity.as_ref(),
                    input.gated_by_quantity(),
                ),
            ]);

            if let Some((kind, config, amount)) = hit {
                let id = rule_id(
                    PREFIX,
                    &self.rules.config_id,
                    kind,
                    None,
                    Some(&self.rules.batch_id),
                );
                let one_time = resolve_one_time(config.one_time, self.campaign_one_time)
                    || !self.is_potentially_repeatable();
                let applied = line_result.add_discount(application(
                    id,
                    config,
                    amount,
                    RuleSource::Batch,
                    one_time,
                ));
                trace!(line_id = %line.line_id, batch_id = %self.rules.batch_id, rule = %kind, applied = %applied, "Batch rule applied");
            }
        }
    }

    fn is_potentially_repeatable(&self) -> bool {
        false
    }

    fn rule_id(&self, _line: Option<&LineItem>) -> String {
        format!("{}-{}-{}", PREFIX, self.rules.config_id, self.rules.batch_id)
    }

    fn source(&self) -> RuleSource {
        RuleSource::Batch
    }
}
