//! # Refund Recomputation
//!
//! A partial return can cost the customer a discount tier: the items they
//! keep are repriced under the original campaign and the difference from
//! what they paid decides which way cash moves.
//!
//! ## Refund Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Original sale: 3 × Cola @ $10, "3+ units $1 off each" → paid $27.00    │
//! │  Customer returns 1 Cola, keeps 2                                       │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  validate_kept_items(original, kept)                                    │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  catalog.find_campaign(id) ──► None ──► CampaignNotFound                │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  reprice kept: 2 × $10, tier lost → $20.00                              │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  net_cash_delta = 20.00 − 27.00 = −7.00  → refund $7.00                 │
//! │  Transaction { kind: Refund, paid_amount: −700, … }                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A positive delta means the customer owes money and the record is an
//! exchange. The campaign is never replaced by "no discount" when it is
//! missing; that would hand back more than the customer paid.

use std::collections::HashMap;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;
use vantage_core::validation::validate_kept_items;
use vantage_core::{Money, SaleItem, Transaction, TransactionKind};

use crate::campaign::Campaign;
use crate::error::{PricingError, PricingResult};
use crate::result::DiscountResult;
use crate::service::DiscountService;

// =============================================================================
// Campaign Lookup
// =============================================================================

/// Where refunds find the campaign that priced the original sale.
pub trait CampaignCatalog {
    fn find_campaign(&self, campaign_id: &str) -> Option<&Campaign>;
}

impl CampaignCatalog for HashMap<String, Campaign> {
    fn find_campaign(&self, campaign_id: &str) -> Option<&Campaign> {
        self.get(campaign_id)
    }
}

impl CampaignCatalog for [Campaign] {
    fn find_campaign(&self, campaign_id: &str) -> Option<&Campaign> {
        self.iter().find(|c| c.id == campaign_id)
    }
}

impl CampaignCatalog for Vec<Campaign> {
    fn find_campaign(&self, campaign_id: &str) -> Option<&Campaign> {
        self.as_slice().find_campaign(campaign_id)
    }
}

// =============================================================================
// Request / Outcome
// =============================================================================

/// A return against a completed sale.
#[derive(Debug, Clone)]
pub struct RefundRequest {
    pub original: Transaction,
    /// Lines (and quantities) the customer takes home.
    pub kept_items: Vec<SaleItem>,
    /// Campaign that priced the original sale. `None` when it had none.
    pub campaign_id: Option<String>,
}

impl RefundRequest {
    /// Uses the campaign recorded on the original transaction.
    pub fn new(original: Transaction, kept_items: Vec<SaleItem>) -> Self {
        let campaign_id = original.campaign_id.clone();
        RefundRequest {
            original,
            kept_items,
            campaign_id,
        }
    }
}

/// Which way money moves at the till.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CashDirection {
    CustomerOwes,
    RefundDue,
    NoChange,
}

/// Result of a refund recomputation.
#[derive(Debug, Clone)]
pub struct RefundOutcome {
    /// Engine result for the kept items.
    pub result: DiscountResult,
    /// New final total minus what was originally paid.
    pub net_cash_delta: Money,
    /// The refund/exchange record to persist.
    pub transaction: Transaction,
}

impl RefundOutcome {
    pub fn direction(&self) -> CashDirection {
        if self.net_cash_delta.is_positive() {
            CashDirection::CustomerOwes
        } else if self.net_cash_delta.is_negative() {
            CashDirection::RefundDue
        } else {
            CashDirection::NoChange
        }
    }
}

// =============================================================================
// Calculator
// =============================================================================

/// Reprices kept items and produces the adjustment transaction.
#[derive(Debug, Clone)]
pub struct RefundCalculator<C> {
    service: DiscountService,
    catalog: C,
}

impl<C: CampaignCatalog> RefundCalculator<C> {
    pub fn new(service: DiscountService, catalog: C) -> Self {
        RefundCalculator { service, catalog }
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    /// Recomputes totals for the kept items.
    ///
    /// ## Errors
    /// - [`PricingError::Core`] if a kept line is unknown, invalid, or keeps
    ///   more units than were sold
    /// - [`PricingError::CampaignNotFound`] if the original campaign is gone
    pub fn recompute(&self, request: &RefundRequest) -> PricingResult<RefundOutcome> {
        let original = &request.original;
        validate_kept_items(original, &request.kept_items)?;

        let campaign = match request.campaign_id.as_deref() {
            Some(id) => match self.catalog.find_campaign(id) {
                Some(campaign) => Some(campaign),
                None => {
                    warn!(
                        transaction_id = %original.id,
                        campaign_id = id,
                        "Refund blocked: original campaign not found"
                    );
                    return Err(PricingError::CampaignNotFound(id.to_string()));
                }
            },
            None => None,
        };

        let result = self.service.calculate_discounts(&request.kept_items, campaign);
        let net_cash_delta = result.final_total() - original.paid_amount();

        let kind = if net_cash_delta.is_positive() {
            TransactionKind::Exchange
        } else {
            TransactionKind::Refund
        };

        let transaction = Transaction {
            id: Uuid::new_v4().to_string(),
            kind,
            campaign_id: request.campaign_id.clone(),
            original_transaction_id: Some(original.id.clone()),
            items: DiscountService::priced_items(&request.kept_items, &result),
            subtotal_cents: result.original_subtotal().cents(),
            discount_cents: result.total_discount().cents(),
            total_cents: result.final_total().cents(),
            paid_amount_cents: net_cash_delta.cents(),
            created_at: Utc::now(),
        };

        info!(
            original_id = %original.id,
            refund_id = %transaction.id,
            kept_lines = request.kept_items.len(),
            original_paid = %original.paid_amount(),
            new_total = %result.final_total(),
            delta = %net_cash_delta,
            "Refund recomputed"
        );

        Ok(RefundOutcome {
            result,
            net_cash_delta,
            transaction,
        })
    }
}
