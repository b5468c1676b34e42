//! # Discount Service
//!
//! The sale-flow entry point: takes the cart as sale lines plus the active
//! campaign and returns the engine's result.
//!
//! ## Sale Flow
//! ```text
//! Cart (SaleItem[]) + active Campaign
//!      │
//!      ▼
//! DiscountService.calculate_discounts
//!      │   DiscountContext::from_sale_items
//!      │   DiscountEngine.process
//!      ▼
//! DiscountResult ──► priced_items() ──► SaleItem.discount_cents filled in
//!      │
//!      └──► DiscountSummary (transport)
//! ```

use std::sync::Arc;

use tracing::debug;
use vantage_core::SaleItem;

use crate::campaign::Campaign;
use crate::context::DiscountContext;
use crate::engine::DiscountEngine;
use crate::result::DiscountResult;
use crate::rules::{CustomRule, DiscountRule};

/// Adapts sale lines to the engine. Clones share one engine and cache.
#[derive(Debug, Clone, Default)]
pub struct DiscountService {
    engine: Arc<DiscountEngine>,
}

impl DiscountService {
    pub fn new(engine: Arc<DiscountEngine>) -> Self {
        DiscountService { engine }
    }

    pub fn engine(&self) -> &DiscountEngine {
        &self.engine
    }

    /// Prices `cart` under `campaign`.
    ///
    /// Without a campaign only cashier overrides apply.
    pub fn calculate_discounts(
        &self,
        cart: &[SaleItem],
        campaign: Option<&Campaign>,
    ) -> DiscountResult {
        let context = DiscountContext::from_sale_items(cart);
        match campaign {
            Some(campaign) => self.engine.process(campaign, &context),
            None => {
                debug!(lines = cart.len(), "No active campaign, applying manual discounts only");
                DiscountEngine::run(&[DiscountRule::Custom(CustomRule::new())], &context)
            }
        }
    }

    /// Copies each line's discount back onto the sale lines.
    ///
    /// Lines are matched by id; a line missing from `result` keeps a zero
    /// discount.
    pub fn priced_items(cart: &[SaleItem], result: &DiscountResult) -> Vec<SaleItem> {
        cart.iter()
            .map(|item| {
                let discount = result
                    .line(&item.id)
                    .map(|line| line.total_discount().cents())
                    .unwrap_or(0);
                SaleItem {
                    discount_cents: discount,
                    ..item.clone()
                }
            })
            .collect()
    }
}
