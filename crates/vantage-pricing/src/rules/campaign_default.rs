//! Campaign-wide default item rules.

use tracing::trace;

use super::{application, first_positive, RuleStrategy};
use crate::campaign::{DefaultRules, RuleKind};
use crate::context::{DiscountContext, LineItem};
use crate::evaluate::{resolve_one_time, rule_id, EvaluationInput};
use crate::result::{DiscountResult, LineItemResult, RuleSource};

const PREFIX: &str = "default";

/// Offers the campaign's default line-value and line-quantity rules to
/// every unlocked line without a batch or product discount.
///
/// A buy-X-get-Y reward does not exclude a line; the default stacks on
/// top of it, clamped to what is left of the line.
#[derive(Debug, Clone)]
pub struct CampaignDefaultRule {
    campaign_id: String,
    rules: DefaultRules,
    campaign_one_time: bool,
}

impl CampaignDefaultRule {
    pub fn new(campaign_id: impl Into<String>, rules: DefaultRules, campaign_one_time: bool) -> Self {
        CampaignDefaultRule {
            campaign_id: campaign_id.into(),
            rules,
            campaign_one_time,
        }
    }
}

fn has_item_specific_discount(line: &LineItemResult) -> bool {
    line.applied_rules()
        .iter()
        .any(|a| matches!(a.info.source, RuleSource::Batch | RuleSource::Product))
}

impl RuleStrategy for CampaignDefaultRule {
    fn apply(&self, context: &DiscountContext, result: &mut DiscountResult) {
        for (line, line_result) in context.line_items.iter().zip(result.line_items_mut()) {
            if line_result.is_locked() || has_item_specific_discount(line_result) {
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
                let id = rule_id(PREFIX, &self.campaign_id, kind, None, None);
                let one_time = resolve_one_time(config.one_time, self.campaign_one_time)
                    || !self.is_potentially_repeatable();
                let applied = line_result.add_discount(application(
                    id,
                    config,
                    amount,
                    RuleSource::CampaignDefault,
                    one_time,
                ));
                trace!(line_id = %line.line_id, rule = %kind, applied = %applied, "Default rule applied");
            }
        }
    }

    fn is_potentially_repeatable(&self) -> bool {
        true
    }

    fn rule_id(&self, _line: Option<&LineItem>) -> String {
        format!("{}-{}", PREFIX, self.campaign_id)
    }

    fn source(&self) -> RuleSource {
        RuleSource::CampaignDefault
    }
}
