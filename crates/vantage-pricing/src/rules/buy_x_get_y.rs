//! Buy X, get Y.
//!
//! ## Reward Distribution
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Buy 2 Cola → get 1 Chips free (repeatable)                             │
//! │                                                                         │
//! │  trigger qty (all Cola lines) = 5      groups = 5 / 2 = 2               │
//! │  reward units = groups × get = 2                                        │
//! │                                                                         │
//! │  Chips lines in cart order:                                             │
//! │    l3: 1 × Chips (locked) ──► skipped                                   │
//! │    l4: 1 × Chips          ──► 1 unit free   (1 left)                    │
//! │    l5: 3 × Chips          ──► 1 unit free   (0 left)                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! When trigger and target are the same product a group consumes
//! `buy + get` units, so "buy 2 get 1" over 7 units rewards 2.

use tracing::trace;
use vantage_core::{DiscountType, Money, Rate};

use super::RuleStrategy;
use crate::campaign::{BuyXGetYConfig, BuyXGetYReward, RuleKind};
use crate::context::{DiscountContext, LineItem};
use crate::error::RuleConfigError;
use crate::evaluate::rule_id;
use crate::result::{AppliedRuleInfo, DiscountApplication, DiscountResult, RuleSource};

const PREFIX: &str = "bxgy";

/// Rejects configs that cannot be evaluated safely.
pub fn validate_buy_x_get_y(config: &BuyXGetYConfig) -> Result<(), RuleConfigError> {
    if config.name.trim().is_empty() {
        return Err(RuleConfigError::MissingName);
    }
    if config.buy_quantity <= 0 {
        return Err(RuleConfigError::InvalidQuantity {
            name: config.name.clone(),
            field: "buy_quantity",
        });
    }
    if config.get_quantity <= 0 {
        return Err(RuleConfigError::InvalidQuantity {
            name: config.name.clone(),
            field: "get_quantity",
        });
    }
    match config.reward {
        BuyXGetYReward::Free => Ok(()),
        BuyXGetYReward::Percentage { rate } if rate.exceeds_full() => {
            Err(RuleConfigError::PercentageTooLarge {
                name: config.name.clone(),
                bps: i64::from(rate.bps()),
            })
        }
        BuyXGetYReward::Percentage { .. } => Ok(()),
        BuyXGetYReward::FixedAmount { amount } if amount.is_negative() => {
            Err(RuleConfigError::NegativeValue {
                name: config.name.clone(),
                value: amount.cents(),
            })
        }
        BuyXGetYReward::FixedAmount { .. } => Ok(()),
    }
}

/// One buy-X-get-Y offer. Built only from enabled, validated configs.
#[derive(Debug, Clone)]
pub struct BuyXGetYRule {
    config: BuyXGetYConfig,
    campaign_one_time: bool,
}

impl BuyXGetYRule {
    pub fn new(config: BuyXGetYConfig, campaign_one_time: bool) -> Self {
        BuyXGetYRule {
            config,
            campaign_one_time,
        }
    }

    /// Number of times the offer is earned by `trigger_quantity` units.
    pub fn groups(&self, trigger_quantity: i64) -> i64 {
        let per_group = if self.config.is_same_product() {
            self.config.buy_quantity + self.config.get_quantity
        } else {
            self.config.buy_quantity
        };
        if per_group <= 0 {
            return 0;
        }

        let groups = trigger_quantity.max(0) / per_group;
        if self.config.repeatable {
            groups
        } else {
            groups.min(1)
        }
    }

    fn reward_for(&self, unit_price: Money, units: i64) -> Money {
        let value = unit_price.multiply_quantity(units);
        match self.config.reward {
            BuyXGetYReward::Free => value,
            BuyXGetYReward::Percentage { rate } => value.percentage(rate),
            BuyXGetYReward::FixedAmount { amount } => amount.multiply_quantity(units).min(value),
        }
    }

    fn info(&self) -> AppliedRuleInfo {
        let (discount_type, discount_value) = match self.config.reward {
            BuyXGetYReward::Free => (DiscountType::Percentage, i64::from(Rate::FULL_BPS)),
            BuyXGetYReward::Percentage { rate } => (DiscountType::Percentage, i64::from(rate.bps())),
            BuyXGetYReward::FixedAmount { amount } => (DiscountType::Fixed, amount.cents()),
        };
        AppliedRuleInfo {
            source: RuleSource::BuyXGetY,
            rule_name: self.config.name.clone(),
            discount_type,
            discount_value,
        }
    }

    fn describe(&self, units: i64) -> String {
        match self.config.reward {
            BuyXGetYReward::Free => format!("{} ({} free)", self.config.name, units),
            BuyXGetYReward::Percentage { rate } => {
                format!("{} ({} off {} units)", self.config.name, rate, units)
            }
            BuyXGetYReward::FixedAmount { amount } => {
                format!("{} ({} off {} units)", self.config.name, amount, units)
            }
        }
    }
}

impl RuleStrategy for BuyXGetYRule {
    fn apply(&self, context: &DiscountContext, result: &mut DiscountResult) {
        let trigger_quantity = context.quantity_of_product(&self.config.trigger_product_id);
        let groups = self.groups(trigger_quantity);
        let mut remaining = groups * self.config.get_quantity;
        if remaining <= 0 {
            return;
        }

        let id = self.rule_id(None);
        let one_time = self.campaign_one_time || !self.is_potentially_repeatable();

        for (line, line_result) in context.line_items.iter().zip(result.line_items_mut()) {
            if remaining == 0 {
                break;
            }
            if line.product_id != self.config.target_product_id || line_result.is_locked() {
                continue;
            }

            let units = remaining.min(line.quantity);
            let applied = line_result.add_discount(DiscountApplication {
                rule_id: id.clone(),
                amount: self.reward_for(line.unit_price, units),
                description: self.describe(units),
                info: self.info(),
                is_one_time: one_time,
            });
            if applied.is_positive() {
                remaining -= units;
                trace!(line_id = %line.line_id, units, applied = %applied, "Buy-X-get-Y reward applied");
            }
        }
    }

    fn is_potentially_repeatable(&self) -> bool {
        self.config.repeatable
    }

    fn rule_id(&self, _line: Option<&LineItem>) -> String {
        rule_id(
            PREFIX,
            &self.config.config_id,
            RuleKind::BuyXGetY,
            Some(&self.config.target_product_id),
            None,
        )
    }

    fn source(&self) -> RuleSource {
        RuleSource::BuyXGetY
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vantage_core::CustomDiscount;

    fn offer(trigger: &str, target: &str, reward: BuyXGetYReward, repeatable: bool) -> BuyXGetYConfig {
        BuyXGetYConfig {
            config_id: "b2g1".to_string(),
            enabled: true,
            name: "Buy 2 get 1".to_string(),
            trigger_product_id: trigger.to_string(),
            buy_quantity: 2,
            target_product_id: target.to_string(),
            get_quantity: 1,
            reward,
            repeatable,
        }
    }

    fn run(config: BuyXGetYConfig, lines: Vec<LineItem>) -> DiscountResult {
        let ctx = DiscountContext::new(lines);
        let mut result = DiscountResult::new(&ctx);
        BuyXGetYRule::new(config, false).apply(&ctx, &mut result);
        result
    }

    #[test]
    fn test_groups() {
        let cross = BuyXGetYRule::new(offer("cola", "chips", BuyXGetYReward::Free, true), false);
        assert_eq!(cross.groups(5), 2);
        assert_eq!(cross.groups(1), 0);

        let same = BuyXGetYRule::new(offer("cola", "cola", BuyXGetYReward::Free, true), false);
        assert_eq!(same.groups(7), 2);

        let once = BuyXGetYRule::new(offer("cola", "chips", BuyXGetYReward::Free, false), false);
        assert_eq!(once.groups(9), 1);
    }

    #[test]
    fn test_free_reward_distributed_in_cart_order() {
        let result = run(
            offer("cola", "chips", BuyXGetYReward::Free, true),
            vec![
                LineItem::new("l1", "cola", "cola-b1", Money::from_cents(250), 3),
                LineItem::new("l2", "cola", "cola-b2", Money::from_cents(250), 2),
                LineItem::new("l3", "chips", "chips-b1", Money::from_cents(199), 1),
                LineItem::new("l4", "chips", "chips-b1", Money::from_cents(199), 1),
                LineItem::new("l5", "chips", "chips-b2", Money::from_cents(199), 3),
            ],
        );

        let lines = result.line_items();
        assert_eq!(lines[2].total_discount().cents(), 199);
        assert_eq!(lines[3].total_discount().cents(), 199);
        assert!(!lines[4].has_discount());
    }

    #[test]
    fn test_locked_lines_are_skipped() {
        let ctx = DiscountContext::new(vec![
            LineItem::new("l1", "cola", "cola-b1", Money::from_cents(250), 2),
            LineItem::new("l2", "chips", "chips-b1", Money::from_cents(199), 1)
                .with_custom_discount(CustomDiscount::fixed_once(Money::from_cents(10))),
            LineItem::new("l3", "chips", "chips-b1", Money::from_cents(199), 1),
        ]);
        let mut result = DiscountResult::new(&ctx);
        crate::rules::CustomRule::new().apply(&ctx, &mut result);
        BuyXGetYRule::new(offer("cola", "chips", BuyXGetYReward::Free, false), false)
            .apply(&ctx, &mut result);

        assert_eq!(result.line_items()[1].total_discount().cents(), 10);
        assert_eq!(result.line_items()[2].total_discount().cents(), 199);
        assert!(result.line_items()[2].applied_rules()[0].is_one_time);
    }

    #[test]
    fn test_percentage_and_fixed_rewards() {
        let half = BuyXGetYReward::Percentage {
            rate: Rate::from_percent(50),
        };
        let result = run(
            offer("cola", "cola", half, true),
            vec![LineItem::new("l1", "cola", "b1", Money::from_cents(300), 6)],
        );
        // 6 / 3 = 2 groups → 2 units at 50%
        assert_eq!(result.line_items()[0].total_discount().cents(), 300);

        let fixed = BuyXGetYReward::FixedAmount {
            amount: Money::from_cents(500),
        };
        let result = run(
            offer("cola", "chips", fixed, true),
            vec![
                LineItem::new("l1", "cola", "b1", Money::from_cents(300), 2),
                LineItem::new("l2", "chips", "b2", Money::from_cents(199), 1),
            ],
        );
        // Fixed reward never exceeds the unit price
        assert_eq!(result.line_items()[1].total_discount().cents(), 199);
    }

    #[test]
    fn test_validate() {
        let mut config = offer("cola", "chips", BuyXGetYReward::Free, true);
        assert!(validate_buy_x_get_y(&config).is_ok());

        config.buy_quantity = 0;
        assert!(matches!(
            validate_buy_x_get_y(&config),
            Err(RuleConfigError::InvalidQuantity { field: "buy_quantity", .. })
        ));

        config.buy_quantity = 2;
        config.reward = BuyXGetYReward::Percentage {
            rate: Rate::from_bps(10_500),
        };
        assert!(matches!(
            validate_buy_x_get_y(&config),
            Err(RuleConfigError::PercentageTooLarge { bps: 10_500, .. })
        ));
    }
}
