//! # Domain Types
//!
//! Core domain types used throughout Vantage POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  Transaction    │   │    SaleItem     │   │ CustomDiscount  │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │──►│  id (line id)   │──►│  discount_type  │       │
//! │  │  kind           │   │  product_id     │   │  value          │       │
//! │  │  campaign_id    │   │  batch_id       │   │  apply_once     │       │
//! │  │  paid_amount    │   │  unit_price     │   └─────────────────┘       │
//! │  └─────────────────┘   └─────────────────┘                              │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      Rate       │   │  DiscountType   │   │ TransactionKind │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  bps (u32)      │   │  Fixed          │   │  Sale           │       │
//! │  │  1500 = 15%     │   │  Percentage     │   │  Refund         │       │
//! │  └─────────────────┘   └─────────────────┘   │  Exchange       │       │
//! │                                              └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Batch vs Product
//! A `product_id` names the general product ("Cola 330ml"). A `batch_id`
//! names one received lot of it. Discount rules can target either.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Rate
// =============================================================================

/// A percentage represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 1500 bps = 15%, 1250 bps = 12.5%
///
/// Whole-number percentages stay exact, and fractional ones never touch
/// floating point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(transparent)]
#[ts(export)]
pub struct Rate(u32);

impl Rate {
    /// 100% expressed in basis points.
    pub const FULL_BPS: u32 = 10_000;

    /// Creates a rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        Rate(bps)
    }

    /// Creates a rate from a whole percentage (15 → 15%).
    #[inline]
    pub const fn from_percent(percent: u32) -> Self {
        Rate(percent * 100)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Zero rate.
    #[inline]
    pub const fn zero() -> Self {
        Rate(0)
    }

    /// Checks if the rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// True when the rate is above 100%.
    #[inline]
    pub const fn exceeds_full(&self) -> bool {
        self.0 > Self::FULL_BPS
    }
}

impl Default for Rate {
    fn default() -> Self {
        Rate::zero()
    }
}

impl std::fmt::Display for Rate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let whole = self.0 / 100;
        let frac = self.0 % 100;
        if frac == 0 {
            write!(f, "{}%", whole)
        } else {
            write!(f, "{}.{:02}%", whole, frac)
        }
    }
}

// =============================================================================
// Discount Type
// =============================================================================

/// How a discount value is interpreted.
///
/// - `Fixed`: value is an amount in cents
/// - `Percentage`: value is a rate in basis points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum DiscountType {
    Fixed,
    Percentage,
}

impl std::fmt::Display for DiscountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiscountType::Fixed => write!(f, "fixed"),
            DiscountType::Percentage => write!(f, "percentage"),
        }
    }
}

// =============================================================================
// Custom Discount
// =============================================================================

/// A discount typed in by the cashier for one cart line.
///
/// ## User Workflow
/// ```text
/// Cashier selects line ──► "Discount" ──► enters 10% or $2.00
///                                              │
///                                              ▼
///                               SaleItem.custom_discount = Some(..)
///                                              │
///                                              ▼
///             Engine applies it first and locks the line against
///             every other rule
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CustomDiscount {
    pub discount_type: DiscountType,

    /// Cents for `Fixed`, basis points for `Percentage`.
    pub value: i64,

    /// For `Fixed`: one flat deduction for the whole line instead of
    /// `value × quantity`.
    #[serde(default)]
    pub apply_once: bool,
}

impl CustomDiscount {
    /// Fixed amount per unit.
    pub fn fixed_per_unit(amount: Money) -> Self {
        CustomDiscount {
            discount_type: DiscountType::Fixed,
            value: amount.cents(),
            apply_once: false,
        }
    }

    /// Fixed amount once for the whole line.
    pub fn fixed_once(amount: Money) -> Self {
        CustomDiscount {
            discount_type: DiscountType::Fixed,
            value: amount.cents(),
            apply_once: true,
        }
    }

    /// Percentage of the line total.
    pub fn percentage(rate: Rate) -> Self {
        CustomDiscount {
            discount_type: DiscountType::Percentage,
            value: i64::from(rate.bps()),
            apply_once: false,
        }
    }
}

// =============================================================================
// Sale Item
// =============================================================================

/// A line item in a sale.
/// Uses snapshot pattern to freeze product data at time of sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleItem {
    /// Unique line identifier within the transaction.
    pub id: String,
    /// General product this line belongs to.
    pub product_id: String,
    /// Received stock lot this line was sold from.
    pub batch_id: String,
    /// Product name at time of sale (frozen).
    #[serde(default)]
    pub name_snapshot: String,
    /// Unit price in cents at time of sale (frozen).
    pub unit_price_cents: i64,
    /// Quantity sold.
    pub quantity: i64,
    /// Discount applied to this line by the engine.
    #[serde(default)]
    pub discount_cents: i64,
    /// Cashier-entered override, if any.
    #[serde(default)]
    pub custom_discount: Option<CustomDiscount>,
}

impl SaleItem {
    /// Returns the unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Line total before discounts (unit_price × quantity).
    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price().multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Transaction
// =============================================================================

/// What a transaction record represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// A regular sale.
    #[default]
    Sale,
    /// Items returned, money goes back to the customer (or nothing moves).
    Refund,
    /// Items returned but the customer owes more (lost a discount tier).
    Exchange,
}

/// A completed sale, refund or exchange.
///
/// ## Signed Paid Amount
/// `paid_amount_cents` is what moved at the till for THIS record:
/// ```text
///   Sale      →  +4500  (customer paid)
///   Refund    →  -1200  (store paid back)
///   Exchange  →   +300  (customer topped up)
/// ```
/// Downstream bookkeeping sums it without caring about the kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Transaction {
    pub id: String,
    pub kind: TransactionKind,
    /// Campaign whose rules priced this transaction.
    pub campaign_id: Option<String>,
    /// For refunds/exchanges: the sale being adjusted.
    pub original_transaction_id: Option<String>,
    pub items: Vec<SaleItem>,
    pub subtotal_cents: i64,
    pub discount_cents: i64,
    pub total_cents: i64,
    pub paid_amount_cents: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// Returns the paid amount as Money.
    #[inline]
    pub fn paid_amount(&self) -> Money {
        Money::from_cents(self.paid_amount_cents)
    }

    /// Returns the total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    /// Looks up a line by its identifier.
    pub fn item(&self, line_id: &str) -> Option<&SaleItem> {
        self.items.iter().find(|i| i.id == line_id)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
