//! # vantage-pricing: Discount Rule Engine for Vantage POS
//!
//! Given a cart and a campaign, computes how much discount applies to each
//! line and to the cart, deterministically. The refund flow re-runs the
//! same engine over the items a customer keeps.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        vantage-pricing                                  │
//! │                                                                         │
//! │   DiscountService ──────────────► DiscountEngine ◄──── RuleCache        │
//! │   (SaleItem[] + Campaign)          │  build_rules        (per campaign, │
//! │          ▲                         │  process             TTL + cap)    │
//! │          │                         ▼                                    │
//! │   RefundCalculator         DiscountRule (closed enum)                   │
//! │   (kept items, catalog)      Custom → Batch → Product → BuyXGetY        │
//! │                              → CampaignDefault → CartTotal              │
//! │                                    │                                    │
//! │                                    ▼                                    │
//! │                     evaluate_rule(RuleSlot, input)                      │
//! │                                    │                                    │
//! │                                    ▼                                    │
//! │           DiscountResult (clamping, one-time bookkeeping, locks)        │
//! │                                    │                                    │
//! │                                    ▼                                    │
//! │                      DiscountSummary (transport)                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`context`] - Engine input (cart lines, customer)
//! - [`result`] - Engine output and its invariants
//! - [`campaign`] - Campaign and rule configuration shapes
//! - [`evaluate`] - The shared rule evaluation primitive
//! - [`rules`] - Rule families and their precedence
//! - [`engine`] - Orchestrator
//! - [`cache`] - Compiled rule-list cache
//! - [`service`] - Sale-flow adapter
//! - [`refund`] - Refund recomputation
//! - [`transport`] - Storefront-facing summary records
//!
//! ## Guarantees
//!
//! 1. A line's discount never exceeds its value; the cart discount never
//!    exceeds what is left after item discounts
//! 2. A one-time rule fires at most once per line (and once per cart)
//! 3. Same campaign + same cart = same result
//! 4. Bad configuration is logged and skipped, never a panic

pub mod cache;
pub mod campaign;
pub mod context;
pub mod engine;
pub mod error;
pub mod evaluate;
pub mod refund;
pub mod result;
pub mod rules;
pub mod service;
pub mod settings;
pub mod transport;

pub use cache::RuleCache;
pub use campaign::{Campaign, RuleConfig, RuleKind, RuleSlot};
pub use context::{CustomerInfo, DiscountContext, LineItem};
pub use engine::DiscountEngine;
pub use error::{PricingError, PricingResult, RuleConfigError};
pub use refund::{CampaignCatalog, RefundCalculator, RefundOutcome, RefundRequest};
pub use result::{DiscountApplication, DiscountResult, LineItemResult};
pub use rules::{DiscountRule, RuleStrategy};
pub use service::DiscountService;
pub use settings::EngineSettings;
pub use transport::DiscountSummary;
