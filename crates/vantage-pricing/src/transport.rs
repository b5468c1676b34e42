//! # Transport Records
//!
//! What crosses the boundary to the storefront: a flat, camelCase summary
//! of a [`DiscountResult`] with every amount in cents.
//!
//! ## Wire Shape
//! ```json
//! {
//!   "lines": [{
//!     "lineId": "l1", "productId": "cola", "batchId": "cola-b1",
//!     "unitPriceCents": 1000, "quantity": 3,
//!     "lineTotalCents": 3000, "discountCents": 300, "netPriceCents": 2700,
//!     "locked": false,
//!     "appliedRules": [{ "ruleId": "default-summer-line_quantity", ... }]
//!   }],
//!   "cartDiscounts": [],
//!   "subtotalCents": 3000,
//!   "itemDiscountCents": 300,
//!   "cartDiscountCents": 0,
//!   "totalDiscountCents": 300,
//!   "finalTotalCents": 2700
//! }
//! ```
//!
//! ## Zero-Discount Default
//! When a stored or relayed result is missing or malformed, the storefront
//! falls back to [`DiscountSummary::zero_discount`]: the subtotal is
//! charged in full and the fallback is logged.

use serde::{Deserialize, Serialize};
use tracing::warn;
use ts_rs::TS;
use vantage_core::{DiscountType, Money};

use crate::result::{DiscountApplication, DiscountResult, LineItemResult};

/// One applied rule, line- or cart-level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct AppliedDiscountSummary {
    pub rule_id: String,
    /// Rule family (`custom`, `batch`, `product`, …).
    pub source: String,
    pub rule_name: String,
    pub description: String,
    pub amount_cents: i64,
    pub discount_type: DiscountType,
    pub discount_value: i64,
    pub is_one_time: bool,
}

impl From<&DiscountApplication> for AppliedDiscountSummary {
    fn from(application: &DiscountApplication) -> Self {
        AppliedDiscountSummary {
            rule_id: application.rule_id.clone(),
            source: application.info.source.as_str().to_string(),
            rule_name: application.info.rule_name.clone(),
            description: application.description.clone(),
            amount_cents: application.amount.cents(),
            discount_type: application.info.discount_type,
            discount_value: application.info.discount_value,
            is_one_time: application.is_one_time,
        }
    }
}

/// Discount breakdown of one cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct LineDiscountSummary {
    pub line_id: String,
    pub product_id: String,
    pub batch_id: String,
    pub unit_price_cents: i64,
    pub quantity: i64,
    pub line_total_cents: i64,
    pub discount_cents: i64,
    pub net_price_cents: i64,
    /// True when a manual discount blocked campaign rules.
    pub locked: bool,
    pub applied_rules: Vec<AppliedDiscountSummary>,
}

impl From<&LineItemResult> for LineDiscountSummary {
    fn from(line: &LineItemResult) -> Self {
        LineDiscountSummary {
            line_id: line.line_id().to_string(),
            product_id: line.product_id().to_string(),
            batch_id: line.batch_id().to_string(),
            unit_price_cents: line.unit_price().cents(),
            quantity: line.quantity(),
            line_total_cents: line.line_total().cents(),
            discount_cents: line.total_discount().cents(),
            net_price_cents: line.net_price().cents(),
            locked: line.is_locked(),
            applied_rules: line.applied_rules().iter().map(Into::into).collect(),
        }
    }
}

/// Full discount summary sent to the storefront.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DiscountSummary {
    pub lines: Vec<LineDiscountSummary>,
    pub cart_discounts: Vec<AppliedDiscountSummary>,
    pub subtotal_cents: i64,
    pub item_discount_cents: i64,
    pub cart_discount_cents: i64,
    pub total_discount_cents: i64,
    pub final_total_cents: i64,
}

impl From<&DiscountResult> for DiscountSummary {
    fn from(result: &DiscountResult) -> Self {
        DiscountSummary {
            lines: result.line_items().iter().map(Into::into).collect(),
            cart_discounts: result.applied_cart_rules().iter().map(Into::into).collect(),
            subtotal_cents: result.original_subtotal().cents(),
            item_discount_cents: result.total_item_discount().cents(),
            cart_discount_cents: result.total_cart_discount().cents(),
            total_discount_cents: result.total_discount().cents(),
            final_total_cents: result.final_total().cents(),
        }
    }
}

impl DiscountSummary {
    /// No discounts: the customer pays `subtotal`.
    pub fn zero_discount(subtotal: Money) -> Self {
        DiscountSummary {
            lines: Vec::new(),
            cart_discounts: Vec::new(),
            subtotal_cents: subtotal.cents(),
            item_discount_cents: 0,
            cart_discount_cents: 0,
            total_discount_cents: 0,
            final_total_cents: subtotal.cents(),
        }
    }

    /// Parses a relayed summary, falling back to [`zero_discount`] when it
    /// is missing, malformed, or inconsistent with `subtotal`.
    ///
    /// [`zero_discount`]: DiscountSummary::zero_discount
    ///
    /// ## Example
    /// ```rust
    /// use vantage_core::Money;
    /// use vantage_pricing::transport::DiscountSummary;
    ///
    /// let summary = DiscountSummary::from_json_or_default(Some("{not json"), Money::from_cents(1500));
    /// assert_eq!(summary.total_discount_cents, 0);
    /// assert_eq!(summary.final_total_cents, 1500);
    /// ```
    pub fn from_json_or_default(raw: Option<&str>, subtotal: Money) -> Self {
        let Some(raw) = raw else {
            warn!(subtotal = %subtotal, "Discount result missing, charging full subtotal");
            return Self::zero_discount(subtotal);
        };

        match serde_json::from_str::<DiscountSummary>(raw) {
            Ok(summary) if summary.is_consistent(subtotal) => summary,
            Ok(summary) => {
                warn!(
                    subtotal = %subtotal,
                    reported_subtotal = summary.subtotal_cents,
                    reported_total = summary.final_total_cents,
                    "Discount result inconsistent, charging full subtotal"
                );
                Self::zero_discount(subtotal)
            }
            Err(err) => {
                warn!(subtotal = %subtotal, error = %err, "Discount result malformed, charging full subtotal");
                Self::zero_discount(subtotal)
            }
        }
    }

    /// Totals add up and no discount exceeds what it discounts.
    ///
    /// Arithmetic is checked: an overflowing summary is inconsistent.
    pub fn is_consistent(&self, subtotal: Money) -> bool {
        let lines_ok = self.lines.iter().all(|l| {
            l.discount_cents >= 0
                && l.discount_cents <= l.line_total_cents
                && l.line_total_cents.checked_sub(l.discount_cents) == Some(l.net_price_cents)
        });

        self.subtotal_cents == subtotal.cents()
            && self.item_discount_cents >= 0
            && self.cart_discount_cents >= 0
            && self.item_discount_cents.checked_add(self.cart_discount_cents)
                == Some(self.total_discount_cents)
            && self.total_discount_cents <= self.subtotal_cents
            && self.subtotal_cents.checked_sub(self.total_discount_cents)
                == Some(self.final_total_cents)
            && lines_ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::campaign::{Campaign, RuleConfig};
    use crate::context::{DiscountContext, LineItem};
    use crate::engine::DiscountEngine;

    fn summary() -> DiscountSummary {
        let mut campaign = Campaign::new("summer", "Summer Sale");
        campaign.default_rules.line_quantity =
            Some(RuleConfig::fixed("2+ units", Money::from_cents(100)).with_min(2));
        let context = DiscountContext::new(vec![LineItem::new(
            "l1",
            "cola",
            "b1",
            Money::from_cents(1000),
            3,
        )]);
        let result = DiscountEngine::default().process(&campaign, &context);
        DiscountSummary::from(&result)
    }

    #[test]
    fn test_summary_from_result() {
        let summary = summary();
        assert_eq!(summary.subtotal_cents, 3000);
        assert_eq!(summary.total_discount_cents, 300);
        assert_eq!(summary.final_total_cents, 2700);
        assert_eq!(summary.lines[0].applied_rules[0].source, "campaign_default");
        assert!(summary.is_consistent(Money::from_cents(3000)));
    }

    #[test]
    fn test_camel_case_wire_names() {
        let json = serde_json::to_value(summary()).unwrap();
        assert_eq!(json["finalTotalCents"], 2700);
        assert_eq!(json["lines"][0]["appliedRules"][0]["isOneTime"], false);
        assert_eq!(json["lines"][0]["appliedRules"][0]["discountType"], "fixed");
    }

    #[test]
    fn test_from_json_round_trip_keeps_valid_summary() {
        let raw = serde_json::to_string(&summary()).unwrap();
        let parsed = DiscountSummary::from_json_or_default(Some(&raw), Money::from_cents(3000));
        assert_eq!(parsed, summary());
    }

    #[test]
    fn test_fallbacks() {
        let subtotal = Money::from_cents(3000);
        assert_eq!(
            DiscountSummary::from_json_or_default(None, subtotal),
            DiscountSummary::zero_discount(subtotal)
        );

        // Valid JSON for a different cart
        let raw = serde_json::to_string(&summary()).unwrap();
        let parsed = DiscountSummary::from_json_or_default(Some(&raw), Money::from_cents(5000));
        assert_eq!(parsed.total_discount_cents, 0);
        assert_eq!(parsed.final_total_cents, 5000);

        // Tampered totals
        let mut tampered = summary();
        tampered.final_total_cents = 100;
        let raw = serde_json::to_string(&tampered).unwrap();
        let parsed = DiscountSummary::from_json_or_default(Some(&raw), subtotal);
        assert_eq!(parsed, DiscountSummary::zero_discount(subtotal));
    }

    #[test]
    fn test_overflowing_summary_falls_back() {
        let subtotal = Money::from_cents(3000);

        let mut huge = summary();
        huge.item_discount_cents = i64::MAX;
        huge.cart_discount_cents = 1;
        let raw = serde_json::to_string(&huge).unwrap();
        assert_eq!(
            DiscountSummary::from_json_or_default(Some(&raw), subtotal),
            DiscountSummary::zero_discount(subtotal)
        );
    }
}
