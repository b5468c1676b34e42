//! # Validation Module
//!
//! Input validation utilities for Vantage POS.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Storefront (TypeScript)                                      │
//! │  └── Immediate cashier feedback                                        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Line identifiers, quantities, prices                              │
//! │  └── Refund kept-items vs. original sale                               │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Discount engine                                              │
//! │  └── Never rejects; clamps every discount to the value it discounts    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use vantage_core::validation::{validate_identifier, validate_quantity};
//!
//! validate_identifier("product_id", "cola-330").unwrap();
//! validate_quantity(5).unwrap();
//! ```

use std::collections::HashMap;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::{Rate, SaleItem, Transaction};
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest identifier accepted for lines, products and batches.
const MAX_IDENTIFIER_LEN: usize = 64;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a line/product/batch identifier.
///
/// ## Rules
/// - Must not be empty
/// - At most 64 characters
/// - Only letters, numbers, hyphens and underscores (identifiers are
///   joined with `-` into rule ids, so whitespace is rejected)
///
/// ## Example
/// ```rust
/// use vantage_core::validation::validate_identifier;
///
/// assert!(validate_identifier("batch_id", "COLA-2024-07").is_ok());
/// assert!(validate_identifier("batch_id", "").is_err());
/// assert!(validate_identifier("batch_id", "has space").is_err());
/// ```
pub fn validate_identifier(field: &str, value: &str) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.len() > MAX_IDENTIFIER_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_IDENTIFIER_LEN,
        });
    }

    if !value
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a quantity value.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a price in cents.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed (free items)
///
/// ## Example
/// ```rust
/// use vantage_core::validation::validate_price_cents;
///
/// assert!(validate_price_cents(1099).is_ok());
/// assert!(validate_price_cents(0).is_ok());
/// assert!(validate_price_cents(-100).is_err());
/// ```
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a percentage rate.
///
/// ## Rules
/// - Must be between 0 and 10000 bps (0% to 100%)
pub fn validate_rate(field: &str, rate: Rate) -> ValidationResult<()> {
    if rate.exceeds_full() {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::from(Rate::FULL_BPS),
        });
    }

    Ok(())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates cart size (number of lines).
///
/// ## Rules
/// - Must not exceed MAX_CART_ITEMS (100)
pub fn validate_cart_size(lines: usize) -> CoreResult<()> {
    if lines > MAX_CART_ITEMS {
        return Err(CoreError::CartTooLarge {
            max: MAX_CART_ITEMS,
        });
    }

    Ok(())
}

/// Validates a single sale line.
pub fn validate_sale_item(item: &SaleItem) -> ValidationResult<()> {
    validate_identifier("line_id", &item.id)?;
    validate_identifier("product_id", &item.product_id)?;
    validate_identifier("batch_id", &item.batch_id)?;
    validate_price_cents(item.unit_price_cents)?;
    validate_quantity(item.quantity)?;
    Ok(())
}

/// Validates the lines a customer keeps during a refund.
///
/// ## Rules
/// - Every kept line is itself valid
/// - Every kept line exists on the original transaction
/// - Price, product, batch and cashier override match the sold line
/// - Kept units per line id, summed across entries, never exceed the
///   units originally sold
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Return Screen                                                          │
/// │                                                                         │
/// │  Original: 3 × Cola, 2 × Chips                                         │
/// │  Customer returns 1 Cola → kept: 2 × Cola, 2 × Chips                   │
/// │       │                                                                 │
/// │       ▼                                                                 │
/// │  validate_kept_items(original, kept) ← THIS FUNCTION                   │
/// │       │                                                                 │
/// │       ├── unknown line?   → CoreError::LineNotFound                    │
/// │       ├── line altered?   → CoreError::KeptLineMismatch                │
/// │       ├── keeps too many? → CoreError::QuantityExceedsOriginal         │
/// │       └── OK → reprice kept items with the original campaign           │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn validate_kept_items(original: &Transaction, kept: &[SaleItem]) -> CoreResult<()> {
    validate_cart_size(kept.len())?;

    // Summed per line id: one sold line may be kept as several entries
    let mut kept_units: HashMap<&str, i64> = HashMap::new();

    for item in kept {
        validate_sale_item(item)?;

        let sold = original
            .item(&item.id)
            .ok_or_else(|| CoreError::LineNotFound {
                transaction_id: original.id.clone(),
                line_id: item.id.clone(),
            })?;

        if let Some(field) = mismatched_field(sold, item) {
            return Err(CoreError::KeptLineMismatch {
                line_id: item.id.clone(),
                field,
            });
        }

        let units = kept_units.entry(item.id.as_str()).or_insert(0);
        *units = units.saturating_add(item.quantity);
        if *units > sold.quantity {
            return Err(CoreError::QuantityExceedsOriginal {
                line_id: item.id.clone(),
                original: sold.quantity,
                requested: *units,
            });
        }
    }

    Ok(())
}

/// First field a kept line changed relative to the sold line.
fn mismatched_field(sold: &SaleItem, kept: &SaleItem) -> Option<&'static str> {
    if kept.product_id != sold.product_id {
        Some("product_id")
    } else if kept.batch_id != sold.batch_id {
        Some("batch_id")
    } else if kept.unit_price_cents != sold.unit_price_cents {
        Some("unit_price_cents")
    } else if kept.custom_discount != sold.custom_discount {
        Some("custom_discount")
    } else {
        None
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
