//! End-to-end pricing through `DiscountEngine::process`.

use vantage_core::{CustomDiscount, Money, Rate};
use vantage_pricing::campaign::{
    BatchRuleSet, BuyXGetYConfig, BuyXGetYReward, Campaign, ProductRuleSet, RuleConfig,
};
use vantage_pricing::context::{DiscountContext, LineItem};
use vantage_pricing::engine::DiscountEngine;
use vantage_pricing::result::{DiscountResult, RuleSource};

fn line(id: &str, product: &str, batch: &str, price: i64, qty: i64) -> LineItem {
    LineItem::new(id, product, batch, Money::from_cents(price), qty)
}

fn price(campaign: &Campaign, lines: Vec<LineItem>) -> DiscountResult {
    DiscountEngine::default().process(campaign, &DiscountContext::new(lines))
}

fn assert_invariants(result: &DiscountResult) {
    for line in result.line_items() {
        assert!(!line.total_discount().is_negative());
        assert!(line.total_discount() <= line.line_total());
    }
    assert!(!result.total_cart_discount().is_negative());
    assert!(result.total_cart_discount() <= result.subtotal_after_item_discounts());
    assert_eq!(
        result.final_total(),
        result.original_subtotal() - (result.total_item_discount() + result.total_cart_discount())
    );
}

// =============================================================================
// Worked scenarios
// =============================================================================

#[test]
fn test_scenario_fixed_per_unit_quantity_gated() {
    let mut campaign = Campaign::new("a", "A");
    campaign.default_rules.line_quantity =
        Some(RuleConfig::fixed("2+ units", Money::from_cents(100)).with_min(2));

    let result = price(&campaign, vec![line("l1", "shirt", "shirt-b1", 1000, 3)]);
    assert_eq!(result.line_items()[0].total_discount().cents(), 300);
    assert_eq!(result.final_total().cents(), 2700);
}

#[test]
fn test_scenario_fixed_applied_once() {
    let mut campaign = Campaign::new("b", "B");
    campaign.default_rules.line_quantity = Some(
        RuleConfig::fixed("2+ units", Money::from_cents(100))
            .with_min(2)
            .applied_once(),
    );

    let result = price(&campaign, vec![line("l1", "shirt", "shirt-b1", 1000, 3)]);
    assert_eq!(result.line_items()[0].total_discount().cents(), 100);
}

#[test]
fn test_scenario_percentage_value_gated() {
    let mut campaign = Campaign::new("c", "C");
    campaign.default_rules.line_value =
        Some(RuleConfig::percentage("15% over $30", Rate::from_percent(15)).with_min(3000));

    let result = price(
        &campaign,
        vec![
            line("l1", "jacket", "jacket-b1", 5000, 1),
            line("l2", "scarf", "scarf-b1", 2000, 1),
        ],
    );
    assert_eq!(result.line_items()[0].total_discount().cents(), 750);
    assert_eq!(result.line_items()[1].total_discount().cents(), 0);
}

#[test]
fn test_scenario_discount_clamped_to_line_value() {
    let mut campaign = Campaign::new("d", "D");
    campaign.default_rules.line_value = Some(RuleConfig::fixed("$5 off", Money::from_cents(500)));

    let result = price(&campaign, vec![line("l1", "gum", "gum-b1", 100, 1)]);
    assert_eq!(result.line_items()[0].total_discount().cents(), 100);
    assert_eq!(result.final_total().cents(), 0);
}

#[test]
fn test_scenario_stacked_rules_clamp_second() {
    let mut campaign = Campaign::new("e", "E");

    let mut gum = ProductRuleSet::new("gum-deal", "gum");
    gum.line_value = Some(RuleConfig::fixed("80c off gum", Money::from_cents(80)).applied_once());
    campaign.product_rules = vec![gum];
    campaign.buy_x_get_y = vec![BuyXGetYConfig {
        config_id: "cola-gum".to_string(),
        enabled: true,
        name: "Buy a cola, 80c off gum".to_string(),
        trigger_product_id: "cola".to_string(),
        buy_quantity: 1,
        target_product_id: "gum".to_string(),
        get_quantity: 1,
        reward: BuyXGetYReward::FixedAmount {
            amount: Money::from_cents(80),
        },
        repeatable: false,
    }];

    let result = price(
        &campaign,
        vec![line("l1", "cola", "cola-b1", 250, 1), line("l2", "gum", "gum-b1", 100, 1)],
    );

    let gum = &result.line_items()[1];
    let applied: Vec<_> = gum.applied_rules().iter().map(|a| a.amount.cents()).collect();
    assert_eq!(applied, vec![80, 20]);
    assert_eq!(gum.total_discount().cents(), 100);
    assert_invariants(&result);
}

// =============================================================================
// Precedence
// =============================================================================

fn layered_campaign() -> Campaign {
    let mut campaign = Campaign::new("layered", "Layered");

    let mut batch = BatchRuleSet::new("old-stock", "cola-b1");
    batch.line_value = Some(RuleConfig::fixed("Old cola", Money::from_cents(30)));
    campaign.batch_rules = vec![batch];

    let mut product = ProductRuleSet::new("cola-deal", "cola");
    product.line_value = Some(RuleConfig::fixed("Cola deal", Money::from_cents(20)));
    campaign.product_rules = vec![product];

    campaign.default_rules.line_value = Some(RuleConfig::fixed("Everything", Money::from_cents(10)));
    campaign
}

#[test]
fn test_precedence_custom_batch_product_default() {
    let result = price(
        &layered_campaign(),
        vec![
            line("l1", "cola", "cola-b1", 250, 1)
                .with_custom_discount(CustomDiscount::fixed_once(Money::from_cents(5))),
            line("l2", "cola", "cola-b1", 250, 1),
            line("l3", "cola", "cola-b2", 250, 1),
            line("l4", "chips", "chips-b1", 250, 1),
        ],
    );

    let sources: Vec<_> = result
        .line_items()
        .iter()
        .map(|l| {
            assert_eq!(l.applied_rules().len(), 1);
            (l.applied_rules()[0].info.source, l.total_discount().cents())
        })
        .collect();

    assert_eq!(
        sources,
        vec![
            (RuleSource::Custom, 5),
            (RuleSource::Batch, 30),
            (RuleSource::Product, 20),
            (RuleSource::CampaignDefault, 10),
        ]
    );
    assert!(result.line_items()[0].is_locked());
}

#[test]
fn test_locked_line_excluded_from_buy_x_get_y() {
    let mut campaign = Campaign::new("bxgy", "BXGY");
    campaign.buy_x_get_y = vec![BuyXGetYConfig {
        config_id: "b1g1".to_string(),
        enabled: true,
        name: "Buy 1 get 1".to_string(),
        trigger_product_id: "cola".to_string(),
        buy_quantity: 1,
        target_product_id: "chips".to_string(),
        get_quantity: 1,
        reward: BuyXGetYReward::Free,
        repeatable: true,
    }];

    let result = price(
        &campaign,
        vec![
            line("l1", "cola", "cola-b1", 250, 2),
            line("l2", "chips", "chips-b1", 199, 1)
                .with_custom_discount(CustomDiscount::percentage(Rate::from_percent(10))),
            line("l3", "chips", "chips-b1", 199, 3),
        ],
    );

    assert_eq!(result.line_items()[1].total_discount().cents(), 20);
    assert_eq!(result.line_items()[2].total_discount().cents(), 398);
}

#[test]
fn test_default_rule_stacks_on_buy_x_get_y_but_not_product() {
    let mut campaign = Campaign::new("mixed", "Mixed");
    let mut cola = ProductRuleSet::new("cola-deal", "cola");
    cola.line_value = Some(RuleConfig::fixed("Cola deal", Money::from_cents(20)));
    campaign.product_rules = vec![cola];
    campaign.buy_x_get_y = vec![BuyXGetYConfig {
        config_id: "half-chips".to_string(),
        enabled: true,
        name: "Half-price chips".to_string(),
        trigger_product_id: "cola".to_string(),
        buy_quantity: 1,
        target_product_id: "chips".to_string(),
        get_quantity: 1,
        reward: BuyXGetYReward::Percentage {
            rate: Rate::from_percent(50),
        },
        repeatable: false,
    }];
    campaign.default_rules.line_value = Some(RuleConfig::fixed("Everything", Money::from_cents(10)));

    let result = price(
        &campaign,
        vec![line("l1", "cola", "cola-b1", 250, 1), line("l2", "chips", "chips-b1", 200, 1)],
    );

    // Product discount keeps the default away from cola
    assert_eq!(result.line_items()[0].total_discount().cents(), 20);
    // Chips: 100 reward + 10 default
    let chips = &result.line_items()[1];
    assert_eq!(chips.total_discount().cents(), 110);
    assert_eq!(chips.applied_rules().len(), 2);
    assert_invariants(&result);
}

#[test]
fn test_cart_rule_sees_subtotal_after_item_discounts() {
    let mut campaign = layered_campaign();
    campaign.cart_rules.cart_price =
        Some(RuleConfig::fixed("$1 off over $9", Money::from_cents(100)).applied_once().with_min(900));

    // 4 × 250 = 1000, item discounts 30 + 20 + 10 + 10 = 70 → 930
    let result = price(
        &campaign,
        vec![
            line("l1", "cola", "cola-b1", 250, 1),
            line("l2", "cola", "cola-b2", 250, 1),
            line("l3", "chips", "chips-b1", 250, 1),
            line("l4", "bread", "bread-b1", 250, 1),
        ],
    );
    assert_eq!(result.subtotal_after_item_discounts().cents(), 930);
    assert_eq!(result.total_cart_discount().cents(), 100);
    assert_eq!(result.final_total().cents(), 830);
    assert_invariants(&result);
}

// =============================================================================
// One-time rules
// =============================================================================

#[test]
fn test_one_time_rule_applied_twice_discounts_once() {
    let offer = BuyXGetYConfig {
        config_id: "half-chips".to_string(),
        enabled: true,
        name: "Half-price chips".to_string(),
        trigger_product_id: "cola".to_string(),
        buy_quantity: 1,
        target_product_id: "chips".to_string(),
        get_quantity: 1,
        reward: BuyXGetYReward::Percentage {
            rate: Rate::from_percent(50),
        },
        repeatable: false,
    };
    let mut campaign = Campaign::new("once", "Once");
    campaign.buy_x_get_y = vec![offer.clone(), offer];

    let result = price(
        &campaign,
        vec![line("l1", "cola", "cola-b1", 250, 2), line("l2", "chips", "chips-b1", 300, 2)],
    );

    let chips = &result.line_items()[1];
    assert_eq!(chips.total_discount().cents(), 150);
    assert_eq!(chips.applied_rules().len(), 1);
    assert!(chips.has_consumed("bxgy-half-chips-buy_x_get_y-chips"));
}

#[test]
fn test_campaign_one_time_flag_marks_applications() {
    let mut campaign = Campaign::new("flag", "Flag");
    campaign.one_time_per_transaction = true;
    campaign.default_rules.line_value = Some(RuleConfig::fixed("10c", Money::from_cents(10)));

    let result = price(&campaign, vec![line("l1", "cola", "cola-b1", 250, 1)]);
    assert!(result.line_items()[0].applied_rules()[0].is_one_time);
}

// =============================================================================
// Properties
// =============================================================================

fn busy_campaign() -> Campaign {
    let mut campaign = layered_campaign();
    campaign.default_rules.line_quantity =
        Some(RuleConfig::percentage("Bulk", Rate::from_percent(20)).with_min(5));
    campaign.cart_rules.cart_quantity =
        Some(RuleConfig::fixed("Per item", Money::from_cents(15)).with_min(3));
    campaign.buy_x_get_y = vec![BuyXGetYConfig {
        config_id: "b2g1".to_string(),
        enabled: true,
        name: "Buy 2 get 1".to_string(),
        trigger_product_id: "cola".to_string(),
        buy_quantity: 2,
        target_product_id: "cola".to_string(),
        get_quantity: 1,
        reward: BuyXGetYReward::Free,
        repeatable: true,
    }];
    campaign
}

#[test]
fn test_invariants_hold_across_carts() {
    let campaign = busy_campaign();
    let products = ["cola", "chips", "bread"];

    for seed in 0..40_i64 {
        let lines: Vec<_> = (0..(seed % 5 + 1))
            .map(|i| {
                let product = products[((seed + i) % 3) as usize];
                let batch = format!("{}-b{}", product, (seed + i) % 2 + 1);
                let mut item = line(
                    &format!("l{}", i),
                    product,
                    &batch,
                    (seed * 37 + i * 11) % 900 + 1,
                    (seed + i) % 7 + 1,
                );
                if (seed + i) % 6 == 0 {
                    item = item.with_custom_discount(CustomDiscount::percentage(Rate::from_percent(25)));
                }
                item
            })
            .collect();

        let result = price(&campaign, lines);
        assert_invariants(&result);
    }
}

#[test]
fn test_process_is_deterministic() {
    let campaign = busy_campaign();
    let lines = vec![
        line("l1", "cola", "cola-b1", 250, 4),
        line("l2", "cola", "cola-b2", 240, 3),
        line("l3", "chips", "chips-b1", 199, 6),
    ];

    let engine = DiscountEngine::default();
    let context = DiscountContext::new(lines);
    let first = engine.process(&campaign, &context);
    for _ in 0..5 {
        assert_eq!(engine.process(&campaign, &context), first);
    }

    // A fresh engine (cold cache) agrees too
    assert_eq!(DiscountEngine::default().process(&campaign, &context), first);
}

#[test]
fn test_empty_cart() {
    let result = price(&busy_campaign(), Vec::new());
    assert!(result.line_items().is_empty());
    assert!(result.final_total().is_zero());
    assert!(!result.has_discount());
}

#[test]
fn test_oversized_line_saturates_instead_of_overflowing() {
    let mut campaign = Campaign::new("huge", "Huge");
    campaign.default_rules.line_value =
        Some(RuleConfig::percentage("10% off", Rate::from_percent(10)));

    let result = price(&campaign, vec![line("l1", "yacht", "yacht-b1", i64::MAX / 2, 3)]);

    let yacht = &result.line_items()[0];
    assert_eq!(yacht.line_total().cents(), i64::MAX);
    assert_eq!(yacht.total_discount(), Money::from_cents(i64::MAX).percentage(Rate::from_percent(10)));
    assert_invariants(&result);
}
