//! # Discount Engine
//!
//! Orchestrates one pricing run: fetch (or build) the campaign's rule
//! list, run every rule in order against a fresh result, finalize.
//!
//! ## Processing Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  process(campaign, context)                                             │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  RuleCache.get_or_build(campaign.id) ◄── build_rules(campaign)          │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  result = DiscountResult::new(context)                                  │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  for rule in [custom, batch…, product…, bxgy…, default, cart]           │
//! │      rule.apply(context, &mut result)                                   │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  result.finalize() ──► DiscountResult                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `process` is a pure function of (campaign, context): the refund flow
//! relies on re-running it over kept items and getting the same answer
//! the sale would have produced for them.

use std::sync::Arc;

use tracing::{debug, trace, warn};

use crate::cache::RuleCache;
use crate::campaign::Campaign;
use crate::context::DiscountContext;
use crate::result::DiscountResult;
use crate::rules::{
    validate_buy_x_get_y, BatchRule, BuyXGetYRule, CampaignDefaultRule, CartTotalRule, CustomRule,
    DiscountRule, ProductRule, RuleStrategy,
};
use crate::settings::EngineSettings;

/// The discount rule engine. Cheap to share behind an `Arc`.
#[derive(Debug, Default)]
pub struct DiscountEngine {
    cache: RuleCache,
}

impl DiscountEngine {
    pub fn new(settings: &EngineSettings) -> Self {
        DiscountEngine {
            cache: RuleCache::from_settings(settings),
        }
    }

    /// Uses an explicitly constructed cache.
    pub fn with_cache(cache: RuleCache) -> Self {
        DiscountEngine { cache }
    }

    pub fn cache(&self) -> &RuleCache {
        &self.cache
    }

    /// Compiles a campaign into its ordered rule list.
    ///
    /// Invalid buy-X-get-Y configs are logged and left out. Product rule
    /// sets run in ascending `priority`; ties keep configuration order.
    pub fn build_rules(campaign: &Campaign) -> Vec<DiscountRule> {
        let one_time = campaign.one_time_per_transaction;
        let mut rules = vec![DiscountRule::Custom(CustomRule::new())];

        rules.extend(
            campaign
                .batch_rules
                .iter()
                .cloned()
                .map(|set| DiscountRule::Batch(BatchRule::new(set, one_time))),
        );

        let mut products: Vec<_> = campaign.product_rules.iter().collect();
        products.sort_by_key(|set| set.priority);
        rules.extend(
            products
                .into_iter()
                .map(|set| DiscountRule::Product(ProductRule::new(set.clone(), one_time))),
        );

        for config in &campaign.buy_x_get_y {
            if !config.enabled {
                continue;
            }
            if let Err(err) = validate_buy_x_get_y(config) {
                warn!(
                    campaign_id = %campaign.id,
                    config_id = %config.config_id,
                    error = %err,
                    "Skipping invalid buy-x-get-y rule"
                );
                continue;
            }
            rules.push(DiscountRule::BuyXGetY(BuyXGetYRule::new(
                config.clone(),
                one_time,
            )));
        }

        rules.push(DiscountRule::CampaignDefault(CampaignDefaultRule::new(
            campaign.id.clone(),
            campaign.default_rules.clone(),
            one_time,
        )));
        rules.push(DiscountRule::CartTotal(CartTotalRule::new(
            campaign.id.clone(),
            campaign.cart_rules.clone(),
            one_time,
        )));

        rules
    }

    /// Cached rule list for `campaign`.
    pub fn rules_for(&self, campaign: &Campaign) -> Arc<[DiscountRule]> {
        self.cache
            .get_or_build(&campaign.id, || Self::build_rules(campaign))
    }

    /// Runs `rules` in order over `context`.
    pub fn run(rules: &[DiscountRule], context: &DiscountContext) -> DiscountResult {
        let mut result = DiscountResult::new(context);
        for rule in rules {
            rule.apply(context, &mut result);
            trace!(
                rule = %rule.rule_id(None),
                source = rule.source().as_str(),
                running_discount = %result.total_discount(),
                "Rule evaluated"
            );
        }
        result.finalize();
        result
    }

    /// Prices `context` under `campaign`.
    ///
    /// ## Example
    /// ```rust
    /// use vantage_core::{Money, Rate};
    /// use vantage_pricing::campaign::{Campaign, RuleConfig};
    /// use vantage_pricing::context::{DiscountContext, LineItem};
    /// use vantage_pricing::engine::DiscountEngine;
    ///
    /// let mut campaign = Campaign::new("summer", "Summer Sale");
    /// campaign.default_rules.line_value =
    ///     Some(RuleConfig::percentage("15% over $30", Rate::from_percent(15)).with_min(3000));
    ///
    /// let context = DiscountContext::new(vec![
    ///     LineItem::new("l1", "jacket", "jacket-b1", Money::from_cents(5000), 1),
    /// ]);
    ///
    /// let result = DiscountEngine::default().process(&campaign, &context);
    /// assert_eq!(result.total_discount().cents(), 750);
    /// assert_eq!(result.final_total().cents(), 4250);
    /// ```
    pub fn process(&self, campaign: &Campaign, context: &DiscountContext) -> DiscountResult {
        let rules = self.rules_for(campaign);
        let result = Self::run(&rules, context);

        debug!(
            campaign_id = %campaign.id,
            lines = context.line_items.len(),
            rules = rules.len(),
            subtotal = %result.original_subtotal(),
            item_discount = %result.total_item_discount(),
            cart_discount = %result.total_cart_discount(),
            final_total = %result.final_total(),
            "Discounts calculated"
        );

        result
    }

    /// Drops every cached rule list.
    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }
}
