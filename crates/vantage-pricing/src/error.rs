//! # Pricing Error Types
//!
//! ## Error Categories
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Pricing Error Handling                              │
//! │                                                                         │
//! │  RuleConfigError          PricingError              (never an error)    │
//! │  ───────────────          ────────────              ────────────────    │
//! │  MissingName              CampaignNotFound          Over-discount       │
//! │  NegativeValue            InvalidRule               → silently clamped  │
//! │  PercentageTooLarge       InvalidSettings                               │
//! │  InvertedCondition        Core (kept items)                             │
//! │  InvalidQuantity                                                        │
//! │       │                        │                                        │
//! │       ▼                        ▼                                        │
//! │  warn! + rule skipped     returned to the caller                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;
use vantage_core::CoreError;

/// Result type alias for pricing operations.
pub type PricingResult<T> = Result<T, PricingError>;

/// A campaign rule that cannot be evaluated safely.
///
/// The engine logs these and skips the rule; the rest of the pipeline
/// proceeds.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleConfigError {
    #[error("Rule name is required")]
    MissingName,

    #[error("Rule '{name}' has negative discount value {value}")]
    NegativeValue { name: String, value: i64 },

    #[error("Rule '{name}' percentage {bps} bps exceeds 100%")]
    PercentageTooLarge { name: String, bps: i64 },

    #[error("Rule '{name}' condition_max {max} is below condition_min {min}")]
    InvertedCondition { name: String, min: i64, max: i64 },

    #[error("Rule '{name}' has a negative condition bound")]
    NegativeCondition { name: String },

    /// Quantity-shaped settings (buy/get counts, unit caps) must be positive.
    #[error("Rule '{name}' requires {field} to be positive")]
    InvalidQuantity { name: String, field: &'static str },
}

/// Errors surfaced to callers of the pricing crate.
#[derive(Debug, Error)]
pub enum PricingError {
    /// The campaign that priced the original sale can no longer be found.
    ///
    /// Refunds refuse to proceed rather than guess at "no discount".
    #[error("Campaign not found: {0}")]
    CampaignNotFound(String),

    #[error("Invalid rule configuration: {0}")]
    InvalidRule(#[from] RuleConfigError),

    #[error("Invalid engine settings: {0}")]
    InvalidSettings(String),

    #[error(transparent)]
    Core(#[from] CoreError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use vantage_core::ValidationError;

    #[test]
    fn test_error_messages() {
        let err = RuleConfigError::PercentageTooLarge {
            name: "Mega Sale".to_string(),
            bps: 12_000,
        };
        assert_eq!(
            err.to_string(),
            "Rule 'Mega Sale' percentage 12000 bps exceeds 100%"
        );

        let err = PricingError::CampaignNotFound("summer-24".to_string());
        assert_eq!(err.to_string(), "Campaign not found: summer-24");
    }

    #[test]
    fn test_core_error_converts() {
        let core: CoreError = ValidationError::MustBePositive {
            field: "quantity".to_string(),
        }
        .into();
        let err: PricingError = core.into();
        assert!(matches!(err, PricingError::Core(CoreError::Validation(_))));
    }
}
