//! # Rule Evaluation
//!
//! The one function every configured rule goes through, plus the helpers
//! rules share for naming and one-time resolution.
//!
//! ## Evaluation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  RuleSlot ──► Absent / Disabled ─────────────────────────────► 0        │
//! │     │                                                                   │
//! │     ▼ Enabled                                                           │
//! │  validate_rule_config ──► Err ──► warn! ─────────────────────► 0        │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  tested = condition_value (quantity-gated) or line_total (value-gated) │
//! │  min ≤ tested ≤ max ? ──► no ────────────────────────────────► 0        │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  fixed once   → value                                                   │
//! │  fixed        → value × quantity                                        │
//! │  percentage   → line_total × bps   (pre-discount, never compounded)     │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  clamp into 0..=line_total                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tracing::warn;
use vantage_core::{DiscountType, Money, Rate};

use crate::campaign::{RuleConfig, RuleKind, RuleSlot};
use crate::error::RuleConfigError;

// =============================================================================
// Evaluation Input
// =============================================================================

/// What a rule is evaluated against: a line, or the cart as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvaluationInput {
    pub quantity: i64,
    pub line_total: Money,
    /// Overrides the tested value for quantity-gated rules.
    pub condition_value: Option<i64>,
}

impl EvaluationInput {
    /// A cart line at `quantity` units of `unit_price`.
    pub fn for_line(unit_price: Money, quantity: i64) -> Self {
        EvaluationInput {
            quantity,
            line_total: unit_price.multiply_quantity(quantity),
            condition_value: None,
        }
    }

    /// The whole cart: `subtotal` spread over `quantity` units.
    pub fn for_cart(subtotal: Money, quantity: i64) -> Self {
        EvaluationInput {
            quantity,
            line_total: subtotal,
            condition_value: None,
        }
    }

    /// Tests the activation window against the unit count.
    pub fn gated_by_quantity(self) -> Self {
        let quantity = self.quantity;
        self.with_condition(quantity)
    }

    pub fn with_condition(mut self, value: i64) -> Self {
        self.condition_value = Some(value);
        self
    }

    /// The number compared with `condition_min..=condition_max`.
    pub fn tested_value(&self) -> i64 {
        self.condition_value.unwrap_or_else(|| self.line_total.cents())
    }
}

// =============================================================================
// Evaluation
// =============================================================================

/// Computes the discount one rule slot offers for `input`.
///
/// Never fails: absent, disabled, invalid and non-matching rules all
/// yield zero.
///
/// ## Example
/// ```rust
/// use vantage_core::Money;
/// use vantage_pricing::campaign::{RuleConfig, RuleSlot};
/// use vantage_pricing::evaluate::{evaluate_rule, EvaluationInput};
///
/// // $1.00 off each unit from 2 units up
/// let rule = RuleConfig::fixed("2+ units", Money::from_cents(100)).with_min(2);
/// let input = EvaluationInput::for_line(Money::from_cents(1000), 3).gated_by_quantity();
///
/// assert_eq!(evaluate_rule(RuleSlot::of(Some(&rule)), &input).cents(), 300);
/// ```
pub fn evaluate_rule(slot: RuleSlot<'_>, input: &EvaluationInput) -> Money {
    let Some(config) = slot.enabled() else {
        return Money::zero();
    };

    if let Err(err) = validate_rule_config(config) {
        warn!(rule = %config.name, error = %err, "Skipping invalid rule configuration");
        return Money::zero();
    }

    let tested = input.tested_value();
    if tested < config.min_condition() || tested > config.max_condition() {
        return Money::zero();
    }

    let amount = match config.discount_type {
        DiscountType::Fixed if config.apply_fixed_once => Money::from_cents(config.discount_value),
        DiscountType::Fixed => {
            Money::from_cents(config.discount_value.saturating_mul(input.quantity))
        }
        DiscountType::Percentage => input.line_total.percentage(rate_of(config.discount_value)),
    };

    amount.clamp_to(input.line_total)
}

/// Basis points from a validated percentage value.
pub(crate) fn rate_of(bps: i64) -> Rate {
    Rate::from_bps(bps.clamp(0, i64::from(Rate::FULL_BPS)) as u32)
}

// =============================================================================
// Validation
// =============================================================================

/// Checks a rule configuration before it is evaluated.
pub fn validate_rule_config(config: &RuleConfig) -> Result<(), RuleConfigError> {
    if config.name.trim().is_empty() {
        return Err(RuleConfigError::MissingName);
    }

    if config.discount_value < 0 {
        return Err(RuleConfigError::NegativeValue {
            name: config.name.clone(),
            value: config.discount_value,
        });
    }

    if config.discount_type == DiscountType::Percentage
        && config.discount_value > i64::from(Rate::FULL_BPS)
    {
        return Err(RuleConfigError::PercentageTooLarge {
            name: config.name.clone(),
            bps: config.discount_value,
        });
    }

    if config.condition_min.is_some_and(|v| v < 0) || config.condition_max.is_some_and(|v| v < 0)
    {
        return Err(RuleConfigError::NegativeCondition {
            name: config.name.clone(),
        });
    }

    if config.max_condition() < config.min_condition() {
        return Err(RuleConfigError::InvertedCondition {
            name: config.name.clone(),
            min: config.min_condition(),
            max: config.max_condition(),
        });
    }

    Ok(())
}

// =============================================================================
// Helpers
// =============================================================================

/// Builds the identifier a rule application is recorded under.
///
/// Format: `prefix-configId-ruleType[-productId][-batchId]`.
///
/// ```rust
/// use vantage_pricing::campaign::RuleKind;
/// use vantage_pricing::evaluate::rule_id;
///
/// let id = rule_id("product", "p1", RuleKind::LineValue, Some("cola"), None);
/// assert_eq!(id, "product-p1-line_value-cola");
/// ```
pub fn rule_id(
    prefix: &str,
    config_id: &str,
    kind: RuleKind,
    product_id: Option<&str>,
    batch_id: Option<&str>,
) -> String {
    let mut id = format!("{}-{}-{}", prefix, config_id, kind.as_str());
    for part in [product_id, batch_id].into_iter().flatten() {
        id.push('-');
        id.push_str(part);
    }
    id
}

/// Rule-level `one_time` wins; otherwise the campaign flag applies.
#[inline]
pub fn resolve_one_time(rule_one_time: Option<bool>, campaign_one_time: bool) -> bool {
    rule_one_time.unwrap_or(campaign_one_time)
}

/// Human-readable summary of what a rule takes off.
pub(crate) fn describe(config: &RuleConfig) -> String {
    match config.discount_type {
        DiscountType::Fixed if config.apply_fixed_once => format!(
            "{} ({} off)",
            config.name,
            Money::from_cents(config.discount_value)
        ),
        DiscountType::Fixed => format!(
            "{} ({} off each)",
            config.name,
            Money::from_cents(config.discount_value)
        ),
        DiscountType::Percentage => {
            format!("{} ({} off)", config.name, rate_of(config.discount_value))
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
