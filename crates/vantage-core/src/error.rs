//! # Error Types
//!
//! Domain-specific error types for vantage-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  vantage-core errors (this file)                                       │
//! │  ├── CoreError        - General domain errors                          │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  vantage-pricing errors (separate crate)                               │
//! │  ├── RuleConfigError  - Bad campaign rule (logged, rule skipped)       │
//! │  └── PricingError     - Refund failures surfaced to the caller         │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → PricingError → caller             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (line id, transaction id, etc.)
//! 3. Errors are enum variants, never String

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A line referenced by a refund does not exist on the original sale.
    ///
    /// ## When This Occurs
    /// - The kept-items list was built from a different receipt
    /// - A line was split or renamed after the sale
    #[error("Line {line_id} not found on transaction {transaction_id}")]
    LineNotFound {
        transaction_id: String,
        line_id: String,
    },

    /// A refund tries to keep more units than were sold.
    ///
    /// ## User Workflow
    /// ```text
    /// Original line: 3 × Cola
    ///      │
    ///      ▼
    /// Return screen: keep 5   ← typo
    ///      │
    ///      ▼
    /// QuantityExceedsOriginal { line_id, original: 3, requested: 5 }
    /// ```
    #[error("Line {line_id}: cannot keep {requested}, only {original} were sold")]
    QuantityExceedsOriginal {
        line_id: String,
        original: i64,
        requested: i64,
    },

    /// A kept line no longer matches what was sold on that line.
    ///
    /// Kept lines are repriced, so price, product, batch and the cashier
    /// override must be the sold ones.
    #[error("Line {line_id}: kept {field} differs from the original sale")]
    KeptLineMismatch {
        line_id: String,
        field: &'static str,
    },

    /// Cart has exceeded maximum allowed items.
    #[error("Cart cannot have more than {max} items")]
    CartTooLarge { max: usize },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format.
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::QuantityExceedsOriginal {
            line_id: "line-1".to_string(),
            original: 3,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "Line line-1: cannot keep 5, only 3 were sold"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "product_id".to_string(),
        };
        assert_eq!(err.to_string(), "product_id is required");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::MustBePositive {
            field: "quantity".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
