//! # Larder Common
//!
//! Shared inventory types and the rules derived from them, used by the backend
//! and its storage layer.
//!
//! ## Modules
//!
//! - `item`: Inventory rows, item status and form-field normalisation
//! - `lifecycle`: Days-left computation and freshness classification
//! - `pricing`: Price records and per-(item, store) trend summaries

pub mod item;
pub mod lifecycle;
pub mod pricing;

pub use item::{
    parse_price, parse_store, InventoryItem, ItemFields, ItemStatus, ValidationError,
    DEFAULT_CATEGORY, DEFAULT_LOCATION, DEFAULT_QUANTITY,
};
pub use lifecycle::{days_left, parse_iso_date, Freshness, UNKNOWN_DAYS_LEFT};
pub use pricing::{classify_trend, summarize, NewPriceRecord, PriceRecord, PriceSummary, PriceTrend};
