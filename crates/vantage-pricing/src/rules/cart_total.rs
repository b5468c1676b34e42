//! Cart-level rules. Always the last rule in the list.

use tracing::trace;

use super::{application, first_positive, RuleStrategy};
use crate::campaign::{CartRules, RuleKind};
use crate::context::{DiscountContext, LineItem};
use crate::evaluate::{resolve_one_time, rule_id, EvaluationInput};
use crate::result::{DiscountResult, RuleSource};

const PREFIX: &str = "cart";

/// Evaluates the cart price rule against the subtotal left after item
/// discounts, then the cart quantity rule against the total unit count.
/// The first positive offer becomes the cart discount.
#[derive(Debug, Clone)]
pub struct CartTotalRule {
    campaign_id: String,
    rules: CartRules,
    campaign_one_time: bool,
}

impl CartTotalRule {
    pub fn new(campaign_id: impl Into<String>, rules: CartRules, campaign_one_time: bool) -> Self {
        CartTotalRule {
            campaign_id: campaign_id.into(),
            rules,
            campaign_one_time,
        }
    }
}

impl RuleStrategy for CartTotalRule {
    fn apply(&self, context: &DiscountContext, result: &mut DiscountResult) {
        if context.is_empty() {
            return;
        }

        let input = EvaluationInput::for_cart(
            result.subtotal_after_item_discounts(),
            context.total_quantity(),
        );
        let hit = first_positive([
            (RuleKind::CartPrice, self.rules.cart_price.as_ref(), input),
            (
                RuleKind::CartQuantity,
                self.rules.cart_quantity.as_ref(),
                input.gated_by_quantity(),
            ),
        ]);

        if let Some((kind, config, amount)) = hit {
            let id = rule_id(PREFIX, &self.campaign_id, kind, None, None);
            let one_time = resolve_one_time(config.one_time, self.campaign_one_time)
                || !self.is_potentially_repeatable();
            let applied = result.add_cart_discount(application(
                id,
                config,
                amount,
                RuleSource::CartTotal,
                one_time,
            ));
            trace!(rule = %kind, applied = %applied, "Cart rule applied");
        }
    }

    fn is_potentially_repeatable(&self) -> bool {
        false
    }

    fn rule_id(&self, _line: Option<&LineItem>) -> String {
        format!("{}-{}", PREFIX, self.campaign_id)
    }

    fn source(&self) -> RuleSource {
        RuleSource::CartTotal
    }
}
