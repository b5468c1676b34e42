//! Harness error type.

use thiserror::Error;
use vantage_core::{CoreError, ValidationError};
use vantage_pricing::PricingError;

pub type QuoteResult<T> = Result<T, QuoteError>;

#[derive(Debug, Error)]
pub enum QuoteError {
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to read {path}: {reason}")]
    InputFailed { path: String, reason: String },

    #[error("No campaign catalog configured (pass --campaigns or set VANTAGE_CAMPAIGN_FILE)")]
    NoCatalog,

    #[error("Campaign not found in catalog: {0}")]
    MissingCampaign(String),

    #[error(transparent)]
    Pricing(#[from] PricingError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Failed to write output: {0}")]
    Output(String),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<ValidationError> for QuoteError {
    fn from(err: ValidationError) -> Self {
        QuoteError::Core(CoreError::Validation(err))
    }
}

impl From<std::io::Error> for QuoteError {
    fn from(err: std::io::Error) -> Self {
        QuoteError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for QuoteError {
    fn from(err: toml::de::Error) -> Self {
        QuoteError::ConfigLoadFailed(err.to_string())
    }
}

impl From<serde_json::Error> for QuoteError {
    fn from(err: serde_json::Error) -> Self {
        QuoteError::Output(err.to_string())
    }
}

impl QuoteError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            QuoteError::ConfigLoadFailed(_) | QuoteError::InvalidConfig(_) | QuoteError::NoCatalog => 2,
            QuoteError::InputFailed { .. } | QuoteError::Core(_) => 3,
            QuoteError::MissingCampaign(_) | QuoteError::Pricing(_) => 4,
            QuoteError::Output(_) => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_wraps_through_core() {
        let err: QuoteError = ValidationError::MustBePositive {
            field: "quantity".to_string(),
        }
        .into();
        assert!(matches!(err, QuoteError::Core(CoreError::Validation(_))));
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(QuoteError::NoCatalog.exit_code(), 2);
        assert_eq!(QuoteError::MissingCampaign("x".into()).exit_code(), 4);
        assert_eq!(
            QuoteError::Pricing(PricingError::CampaignNotFound("x".into())).exit_code(),
            4
        );
    }
}
