//! # Harness Commands
//!
//! Each command reads its JSON inputs, runs the engine, and returns a
//! serializable report. Printing is left to `main`.

use std::path::Path;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::info;
use vantage_core::validation::{validate_cart_size, validate_sale_item};
use vantage_core::{SaleItem, Transaction};
use vantage_pricing::refund::{CampaignCatalog, RefundCalculator, RefundRequest};
use vantage_pricing::{Campaign, DiscountEngine, DiscountService, DiscountSummary};

use crate::error::{QuoteError, QuoteResult};

/// Reads and parses one JSON input file.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> QuoteResult<T> {
    let failed = |reason: String| QuoteError::InputFailed {
        path: path.display().to_string(),
        reason,
    };
    let contents = std::fs::read_to_string(path).map_err(|e| failed(e.to_string()))?;
    serde_json::from_str(&contents).map_err(|e| failed(e.to_string()))
}

/// Loads a campaign catalog (a JSON array of campaigns).
pub fn load_catalog(path: &Path) -> QuoteResult<Vec<Campaign>> {
    let campaigns: Vec<Campaign> = read_json(path)?;
    info!(path = %path.display(), campaigns = campaigns.len(), "Campaign catalog loaded");
    Ok(campaigns)
}

fn validate_cart(cart: &[SaleItem]) -> QuoteResult<()> {
    validate_cart_size(cart.len())?;
    for item in cart {
        validate_sale_item(item)?;
    }
    Ok(())
}

/// Prices `cart` under the catalog campaign `campaign_id`, or with manual
/// discounts only when no campaign is named.
pub fn price(
    engine: Arc<DiscountEngine>,
    catalog: &[Campaign],
    cart: &[SaleItem],
    campaign_id: Option<&str>,
) -> QuoteResult<DiscountSummary> {
    validate_cart(cart)?;

    let campaign = match campaign_id {
        Some(id) => Some(
            catalog
                .find_campaign(id)
                .ok_or_else(|| QuoteError::MissingCampaign(id.to_string()))?,
        ),
        None => None,
    };

    let result = DiscountService::new(engine).calculate_discounts(cart, campaign);
    Ok(DiscountSummary::from(&result))
}

/// Output of the `refund` command.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefundReport {
    pub net_cash_delta_cents: i64,
    pub transaction: Transaction,
    pub summary: DiscountSummary,
}

/// Recomputes a refund for `kept` items of `original`.
pub fn refund(
    engine: Arc<DiscountEngine>,
    catalog: Vec<Campaign>,
    original: Transaction,
    kept: Vec<SaleItem>,
) -> QuoteResult<RefundReport> {
    let calculator = RefundCalculator::new(DiscountService::new(engine), catalog);
    let outcome = calculator.recompute(&RefundRequest::new(original, kept))?;

    Ok(RefundReport {
        net_cash_delta_cents: outcome.net_cash_delta.cents(),
        summary: DiscountSummary::from(&outcome.result),
        transaction: outcome.transaction,
    })
}
