//! # Campaign Configuration
//!
//! A campaign is a named, versioned bundle of rule configurations. The
//! engine receives it fully formed from the caller.
//!
//! ## Configuration Shapes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Campaign                                                               │
//! │  ├── default_rules      line_value, line_quantity      (every line)    │
//! │  ├── cart_rules         cart_price, cart_quantity      (whole cart)    │
//! │  ├── product_rules[]    line_value, line_quantity,     (by product,    │
//! │  │                      specific_quantity,              priority asc)  │
//! │  │                      specific_unit_price                            │
//! │  ├── batch_rules[]      line_value, line_quantity      (by batch)      │
//! │  └── buy_x_get_y[]      trigger → target reward                        │
//! │                                                                         │
//! │  Every slot is optional. Evaluation sees it as a RuleSlot:             │
//! │     Absent │ Disabled(&RuleConfig) │ Enabled(&RuleConfig)               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example (JSON)
//! ```json
//! {
//!   "id": "summer-24",
//!   "name": "Summer Sale",
//!   "default_rules": {
//!     "line_quantity": {
//!       "name": "3+ units, $1 off each",
//!       "discount_type": "fixed",
//!       "discount_value": 100,
//!       "condition_min": 3
//!     }
//!   }
//! }
//! ```

use serde::{Deserialize, Serialize};
use vantage_core::{DiscountType, Money, Rate};

fn default_enabled() -> bool {
    true
}

// =============================================================================
// Rule Kind
// =============================================================================

/// Which configuration slot a discount came from.
///
/// The snake_case name is the `ruleType` segment of rule identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    LineValue,
    LineQuantity,
    SpecificQuantity,
    SpecificUnitPrice,
    CartPrice,
    CartQuantity,
    BuyXGetY,
    Custom,
}

impl RuleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleKind::LineValue => "line_value",
            RuleKind::LineQuantity => "line_quantity",
            RuleKind::SpecificQuantity => "specific_quantity",
            RuleKind::SpecificUnitPrice => "specific_unit_price",
            RuleKind::CartPrice => "cart_price",
            RuleKind::CartQuantity => "cart_quantity",
            RuleKind::BuyXGetY => "buy_x_get_y",
            RuleKind::Custom => "custom",
        }
    }

    /// Quantity-gated kinds test their window against a unit count rather
    /// than a money value.
    pub fn is_quantity_gated(&self) -> bool {
        matches!(
            self,
            RuleKind::LineQuantity
                | RuleKind::SpecificQuantity
                | RuleKind::SpecificUnitPrice
                | RuleKind::CartQuantity
        )
    }
}

impl std::fmt::Display for RuleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Rule Config
// =============================================================================

/// One discount mechanism's settings.
///
/// ## Value Units
/// - `Fixed`: `discount_value` is cents
/// - `Percentage`: `discount_value` is basis points (1500 = 15%)
///
/// ## Activation Window
/// `condition_min ≤ tested ≤ condition_max`, where "tested" is the line
/// total in cents for value-gated slots or a unit count for
/// quantity-gated slots. Missing bounds default to 0 and unbounded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    pub name: String,
    pub discount_type: DiscountType,
    pub discount_value: i64,
    #[serde(default)]
    pub condition_min: Option<i64>,
    #[serde(default)]
    pub condition_max: Option<i64>,
    /// Fixed discounts only: deduct `discount_value` once for the whole line
    /// instead of once per unit.
    #[serde(default)]
    pub apply_fixed_once: bool,
    /// Rule-level one-time override. `None` falls back to the campaign's
    /// `one_time_per_transaction`.
    #[serde(default)]
    pub one_time: Option<bool>,
}

impl RuleConfig {
    /// Fixed amount off per unit.
    pub fn fixed(name: impl Into<String>, amount: Money) -> Self {
        RuleConfig {
            enabled: true,
            name: name.into(),
            discount_type: DiscountType::Fixed,
            discount_value: amount.cents(),
            condition_min: None,
            condition_max: None,
            apply_fixed_once: false,
            one_time: None,
        }
    }

    /// Percentage of the pre-discount line total.
    pub fn percentage(name: impl Into<String>, rate: Rate) -> Self {
        RuleConfig {
            discount_type: DiscountType::Percentage,
            discount_value: i64::from(rate.bps()),
            ..RuleConfig::fixed(name, Money::zero())
        }
    }

    pub fn with_min(mut self, min: i64) -> Self {
        self.condition_min = Some(min);
        self
    }

    pub fn with_max(mut self, max: i64) -> Self {
        self.condition_max = Some(max);
        self
    }

    /// One flat deduction for the whole line.
    pub fn applied_once(mut self) -> Self {
        self.apply_fixed_once = true;
        self
    }

    pub fn with_one_time(mut self, one_time: bool) -> Self {
        self.one_time = Some(one_time);
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Lower bound of the activation window.
    #[inline]
    pub fn min_condition(&self) -> i64 {
        self.condition_min.unwrap_or(0)
    }

    /// Upper bound of the activation window.
    #[inline]
    pub fn max_condition(&self) -> i64 {
        self.condition_max.unwrap_or(i64::MAX)
    }
}

// =============================================================================
// Rule Slot
// =============================================================================

/// A configuration slot as seen by the evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleSlot<'a> {
    Absent,
    Disabled(&'a RuleConfig),
    Enabled(&'a RuleConfig),
}

impl<'a> RuleSlot<'a> {
    pub fn of(config: Option<&'a RuleConfig>) -> Self {
        match config {
            None => RuleSlot::Absent,
            Some(c) if c.enabled => RuleSlot::Enabled(c),
            Some(c) => RuleSlot::Disabled(c),
        }
    }

    /// The config, only when present and enabled.
    pub fn enabled(self) -> Option<&'a RuleConfig> {
        match self {
            RuleSlot::Enabled(c) => Some(c),
            RuleSlot::Absent | RuleSlot::Disabled(_) => None,
        }
    }
}

impl<'a> From<&'a Option<RuleConfig>> for RuleSlot<'a> {
    fn from(config: &'a Option<RuleConfig>) -> Self {
        RuleSlot::of(config.as_ref())
    }
}

// =============================================================================
// Campaign-wide Rules
// =============================================================================

/// Catch-all item rules applied to lines no specific rule touched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultRules {
    #[serde(default)]
    pub line_value: Option<RuleConfig>,
    #[serde(default)]
    pub line_quantity: Option<RuleConfig>,
}

/// Rules evaluated once against the whole cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartRules {
    /// Gated on the subtotal left after item-level discounts.
    #[serde(default)]
    pub cart_price: Option<RuleConfig>,
    /// Gated on the total unit count of the cart.
    #[serde(default)]
    pub cart_quantity: Option<RuleConfig>,
}

// =============================================================================
// Product Rules
// =============================================================================

/// Discount only the first `units` units of a line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecificQuantityRule {
    pub units: i64,
    pub rule: RuleConfig,
}

/// Sell the product at a special unit price while the line quantity sits
/// inside the activation window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecificUnitPriceRule {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    pub name: String,
    pub unit_price: Money,
    #[serde(default)]
    pub condition_min: Option<i64>,
    #[serde(default)]
    pub condition_max: Option<i64>,
    #[serde(default)]
    pub one_time: Option<bool>,
}

impl SpecificUnitPriceRule {
    /// Expresses the special price as a per-unit fixed discount against
    /// `list_price`, so it shares the common evaluation contract.
    pub fn as_rule_config(&self, list_price: Money) -> RuleConfig {
        let per_unit = (list_price - self.unit_price).max(Money::zero());
        RuleConfig {
            enabled: self.enabled,
            name: self.name.clone(),
            discount_type: DiscountType::Fixed,
            discount_value: per_unit.cents(),
            condition_min: self.condition_min,
            condition_max: self.condition_max,
            apply_fixed_once: false,
            one_time: self.one_time,
        }
    }
}

/// Every rule targeting one product, across all of its batches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRuleSet {
    pub config_id: String,
    pub product_id: String,
    /// Lower runs first when several sets target the same product.
    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub line_value: Option<RuleConfig>,
    #[serde(default)]
    pub line_quantity: Option<RuleConfig>,
    #[serde(default)]
    pub specific_quantity: Option<SpecificQuantityRule>,
    #[serde(default)]
    pub specific_unit_price: Option<SpecificUnitPriceRule>,
}

impl ProductRuleSet {
    pub fn new(config_id: impl Into<String>, product_id: impl Into<String>) -> Self {
        ProductRuleSet {
            config_id: config_id.into(),
            product_id: product_id.into(),
            priority: 0,
            line_value: None,
            line_quantity: None,
            specific_quantity: None,
            specific_unit_price: None,
        }
    }
}

// =============================================================================
// Batch Rules
// =============================================================================

/// Rules targeting one received stock batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchRuleSet {
    pub config_id: String,
    pub batch_id: String,
    #[serde(default)]
    pub line_value: Option<RuleConfig>,
    #[serde(default)]
    pub line_quantity: Option<RuleConfig>,
}

impl BatchRuleSet {
    pub fn new(config_id: impl Into<String>, batch_id: impl Into<String>) -> Self {
        BatchRuleSet {
            config_id: config_id.into(),
            batch_id: batch_id.into(),
            line_value: None,
            line_quantity: None,
        }
    }
}

// =============================================================================
// Buy X, Get Y
// =============================================================================

/// What each rewarded unit of the target product receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BuyXGetYReward {
    /// Rewarded units are free.
    Free,
    /// Rewarded units get `rate` off.
    Percentage { rate: Rate },
    /// Rewarded units get a fixed amount off each.
    FixedAmount { amount: Money },
}

/// "Buy `buy_quantity` of the trigger, get `get_quantity` of the target."
///
/// ```text
/// Buy 2 Cola, get 1 Chips free  (repeatable)
///   cart: 5 Cola, 3 Chips
///   groups = 5 / 2 = 2  → 2 Chips free
///
/// Buy 2 Cola, get 1 Cola free   (same product)
///   cart: 7 Cola
///   groups = 7 / (2 + 1) = 2 → 2 Cola free
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuyXGetYConfig {
    pub config_id: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    pub name: String,
    pub trigger_product_id: String,
    pub buy_quantity: i64,
    pub target_product_id: String,
    pub get_quantity: i64,
    pub reward: BuyXGetYReward,
    /// Reward every qualifying multiple instead of only the first.
    #[serde(default)]
    pub repeatable: bool,
}

impl BuyXGetYConfig {
    /// True when trigger and reward units come out of the same product.
    pub fn is_same_product(&self) -> bool {
        self.trigger_product_id == self.target_product_id
    }
}

// =============================================================================
// Campaign
// =============================================================================

/// A named, versioned bundle of discount rules active for a period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Campaign {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub version: u32,
    /// Campaign-level one-time flag. Rule-level `one_time` wins when set.
    #[serde(default)]
    pub one_time_per_transaction: bool,
    #[serde(default)]
    pub default_rules: DefaultRules,
    #[serde(default)]
    pub cart_rules: CartRules,
    #[serde(default)]
    pub product_rules: Vec<ProductRuleSet>,
    #[serde(default)]
    pub batch_rules: Vec<BatchRuleSet>,
    #[serde(default)]
    pub buy_x_get_y: Vec<BuyXGetYConfig>,
}

impl Campaign {
    /// An empty campaign: only cashier overrides will apply.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Campaign {
            id: id.into(),
            name: name.into(),
            version: 1,
            one_time_per_transaction: false,
            default_rules: DefaultRules::default(),
            cart_rules: CartRules::default(),
            product_rules: Vec::new(),
            batch_rules: Vec::new(),
            buy_x_get_y: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_slot_states() {
        let enabled = RuleConfig::fixed("A", Money::from_cents(100));
        let disabled = enabled.clone().disabled();

        assert_eq!(RuleSlot::of(None), RuleSlot::Absent);
        assert!(matches!(RuleSlot::of(Some(&enabled)), RuleSlot::Enabled(_)));
        assert!(matches!(RuleSlot::of(Some(&disabled)), RuleSlot::Disabled(_)));
        assert!(RuleSlot::of(Some(&disabled)).enabled().is_none());
    }

    #[test]
    fn test_condition_defaults() {
        let rule = RuleConfig::percentage("A", Rate::from_percent(10));
        assert_eq!(rule.min_condition(), 0);
        assert_eq!(rule.max_condition(), i64::MAX);
        assert_eq!(rule.discount_value, 1000);
        assert_eq!(rule.discount_type, DiscountType::Percentage);
    }

    #[test]
    fn test_specific_unit_price_as_rule_config() {
        let special = SpecificUnitPriceRule {
            enabled: true,
            name: "Cola at $2".to_string(),
            unit_price: Money::from_cents(200),
            condition_min: Some(2),
            condition_max: None,
            one_time: None,
        };
        let rule = special.as_rule_config(Money::from_cents(250));
        assert_eq!(rule.discount_type, DiscountType::Fixed);
        assert_eq!(rule.discount_value, 50);
        assert_eq!(rule.condition_min, Some(2));

        // A special price above list never becomes a surcharge
        let rule = special.as_rule_config(Money::from_cents(150));
        assert_eq!(rule.discount_value, 0);
    }

    #[test]
    fn test_campaign_deserializes_with_defaults() {
        let json = r#"{
            "id": "summer-24",
            "name": "Summer Sale",
            "default_rules": {
                "line_quantity": {
                    "name": "3+ units",
                    "discount_type": "fixed",
                    "discount_value": 100,
                    "condition_min": 3
                }
            },
            "buy_x_get_y": [{
                "config_id": "b2g1",
                "name": "Buy 2 get 1",
                "trigger_product_id": "cola",
                "buy_quantity": 2,
                "target_product_id": "cola",
                "get_quantity": 1,
                "reward": { "kind": "free" }
            }]
        }"#;
        let campaign: Campaign = serde_json::from_str(json).unwrap();
        assert!(!campaign.one_time_per_transaction);
        assert!(campaign.cart_rules.cart_price.is_none());

        let line_quantity = campaign.default_rules.line_quantity.as_ref().unwrap();
        assert!(line_quantity.enabled);
        assert!(!line_quantity.apply_fixed_once);

        let bxgy = &campaign.buy_x_get_y[0];
        assert!(bxgy.is_same_product());
        assert_eq!(bxgy.reward, BuyXGetYReward::Free);
        assert!(!bxgy.repeatable);
    }
}
