//! # ledger-core: Pure Business Logic for the Merch Ledger
//!
//! Order ledger and pricing engine as pure functions with zero I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Merch Ledger Architecture                        │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  ledger-app (boundary operations)               │   │
//! │  │   create, update, list, reorder, summary, obracun, ...          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ ledger-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   search ──► pricing ──► items ──► order                        │   │
//! │  │                            │                                    │   │
//! │  │                            ▼                                    │   │
//! │  │                  totals ──► filter, shipping                    │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  ledger-db (Database Layer)                     │   │
//! │  │        SQLite queries, migrations, repositories                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Order, OrderItem, ShippingAccount, Customer)
//! - [`money`] - Money type with integer arithmetic
//! - [`search`] - Diacritic/case folding for matching and owner keys
//! - [`catalog`] - Read-only catalog views and the [`CatalogLookup`] seam
//! - [`pricing`] - Supplier offer selection
//! - [`items`] - Line-item normalization
//! - [`order`] - Full order construction for create/update
//! - [`totals`] - Order and cross-order totals
//! - [`filter`] - List filtering, sorting and pagination
//! - [`shipping`] - Shipping ledger (obracun) and owner suggestions
//! - [`validation`] - Input validation
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::Utc;
//! use ledger_core::{build_order, order_totals, CatalogSnapshot, OrderIdentity};
//! use ledger_core::{OrderInput, OrderItemInput, Scope, Stage};
//!
//! let input = OrderInput {
//!     title: "Lampa".to_string(),
//!     items: vec![OrderItemInput {
//!         title: Some("Lampa".to_string()),
//!         nabavna_cena: Some(200.0),
//!         prodajna_cena: Some(300.0),
//!         ..Default::default()
//!     }],
//!     stage: Stage::LeglePare,
//!     customer_name: "Petar".to_string(),
//!     my_profit_percent: Some(40.0),
//!     ..Default::default()
//! };
//!
//! let identity = OrderIdentity::new_order("tenant-a", Scope::Default, Utc::now());
//! let order = build_order(identity, &input, &CatalogSnapshot::new()).unwrap();
//!
//! let totals = order_totals(&order);
//! assert_eq!(totals.profit.cents(), 10000);
//! assert_eq!(totals.my_share.cents(), 4000);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod catalog;
pub mod error;
pub mod filter;
pub mod items;
pub mod money;
pub mod order;
pub mod pricing;
pub mod search;
pub mod shipping;
pub mod totals;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use catalog::{CatalogLookup, CatalogProduct, CatalogSnapshot, ProductVariant, Supplier, SupplierOffer};
pub use error::{CoreError, CoreResult, ValidationError};
pub use filter::{list_orders, ListFilter, OrderPage, OrderSort, OrderView, PageRequest, Pagination};
pub use items::normalize_items;
pub use money::Money;
pub use order::{build_order, OrderIdentity};
pub use pricing::{resolve_price, PriceResolution};
pub use search::normalize;
pub use shipping::{owner_suggestions, resolve_shipping, ObracunReport, OwnerSuggestion};
pub use totals::{order_totals, summarize_items, ItemSummary, LedgerTotals, OrderTotals, ScopeSummary};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Fixed fee deducted from aggregate profit for every paid order shipped
/// through the `aks` carrier account.
pub const AKS_SHIPMENT_FEE: Money = Money::from_cents(5_000);

/// Page size used when the caller does not ask for one.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Upper bound for any requested page size.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Quantities above this are clamped.
pub const MAX_ITEM_QUANTITY: i64 = 1_000_000;

/// Largest accepted amount for one item line (price × quantity) and for any
/// single operator-entered amount.
pub const MAX_LINE_TOTAL: Money = Money::from_cents(1_000_000_000_000);
