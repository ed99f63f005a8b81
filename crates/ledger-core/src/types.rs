//! # Domain Types
//!
//! Core domain types of the order ledger.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   owns   ┌─────────────────┐                       │
//! │  │     Order       │─────────►│   OrderItem     │                       │
//! │  │  ─────────────  │  1..n    │  ─────────────  │                       │
//! │  │  tenant + scope │          │  product/variant│                       │
//! │  │  stage          │          │  supplier       │                       │
//! │  │  shipping meta  │          │  kolicina       │                       │
//! │  │  sort_index     │          │  nabavna/prodaj │                       │
//! │  └─────────────────┘          └─────────────────┘                       │
//! │                                                                         │
//! │  Side tables (tenant + scope, independent of any single order):        │
//! │  ┌─────────────────┐   ┌─────────────────┐                              │
//! │  │ ShippingAccount │   │    Customer     │                              │
//! │  │ owner_key (uniq)│   │ phone_key (uniq)│                              │
//! │  └─────────────────┘   └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Legacy Records
//! Orders written before line items existed have an empty `items` vector.
//! [`Order::resolved_items`] synthesizes the implicit item on every read;
//! nothing is migrated or written back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Scope
// =============================================================================

/// Logical ledger partition. Scopes share one schema but are never mixed in
/// aggregates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Default,
    Kalaba,
}

impl Scope {
    pub const ALL: [Scope; 2] = [Scope::Default, Scope::Kalaba];

    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Default => "default",
            Scope::Kalaba => "kalaba",
        }
    }

    /// Parses a scope tag, case-insensitively.
    pub fn parse(tag: &str) -> Option<Scope> {
        Scope::ALL
            .into_iter()
            .find(|s| s.as_str().eq_ignore_ascii_case(tag.trim()))
    }
}

impl Default for Scope {
    fn default() -> Self {
        Scope::Default
    }
}

// =============================================================================
// Stage
// =============================================================================

/// Fulfillment stage. Operator-set, not a strict state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Order received.
    Poruceno,
    /// Shipped, delivery pending.
    Poslato,
    /// Arrived at the customer.
    Stiglo,
    /// Money collected. Only this stage realizes profit.
    LeglePare,
}

impl Stage {
    pub const ALL: [Stage; 4] = [
        Stage::Poruceno,
        Stage::Poslato,
        Stage::Stiglo,
        Stage::LeglePare,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Poruceno => "poruceno",
            Stage::Poslato => "poslato",
            Stage::Stiglo => "stiglo",
            Stage::LeglePare => "legle_pare",
        }
    }

    #[inline]
    pub fn is_paid(&self) -> bool {
        matches!(self, Stage::LeglePare)
    }
}

impl Default for Stage {
    fn default() -> Self {
        Stage::Poruceno
    }
}

// =============================================================================
// Shipping Enums
// =============================================================================

/// How the goods travel to the customer.
///
/// `Kol` and `Joe` are legacy values that named the account holder before
/// `slanjeOwner` existed; the shipping ledger still reads them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum TransportMode {
    Kol,
    Joe,
    Smg,
    Posta,
}

impl TransportMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportMode::Kol => "kol",
            TransportMode::Joe => "joe",
            TransportMode::Smg => "smg",
            TransportMode::Posta => "posta",
        }
    }
}

/// Carrier account the shipment was sent through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum SlanjeMode {
    /// Plain mail. No starting balances.
    Posta,
    /// Carrier account, charges a fixed fee per paid shipment.
    Aks,
    /// Carrier account.
    Bex,
}

impl SlanjeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SlanjeMode::Posta => "posta",
            SlanjeMode::Aks => "aks",
            SlanjeMode::Bex => "bex",
        }
    }

    #[inline]
    pub fn is_carrier_account(&self) -> bool {
        !matches!(self, SlanjeMode::Posta)
    }
}

// =============================================================================
// Order Item
// =============================================================================

/// A priced line item. Owned exclusively by its order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    /// Stable across edits when the caller echoes it back.
    pub id: String,
    pub product_id: Option<String>,
    pub variant_id: Option<String>,
    pub supplier_id: Option<String>,
    pub title: String,
    /// Display label, prefixed with the product name.
    pub variant_label: Option<String>,
    /// Quantity, always >= 1 once normalized.
    pub kolicina: i64,
    /// Unit cost price.
    pub nabavna_cena: Money,
    /// Unit sale price.
    pub prodajna_cena: Money,
    /// Sale price was entered by the operator, not derived from the catalog.
    pub manual_prodajna: bool,
}

impl OrderItem {
    /// Sale price × quantity.
    #[inline]
    pub fn line_prodajno(&self) -> Money {
        self.prodajna_cena.multiply_quantity(self.kolicina)
    }

    /// Cost price × quantity.
    #[inline]
    pub fn line_nabavno(&self) -> Money {
        self.nabavna_cena.multiply_quantity(self.kolicina)
    }
}

// =============================================================================
// Order
// =============================================================================

/// The ledger's primary entity.
///
/// Top-level product/price fields mirror the first item so single-item
/// consumers keep working.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub tenant_id: String,
    pub scope: Scope,
    pub stage: Stage,

    pub title: String,
    pub product_id: Option<String>,
    pub variant_id: Option<String>,
    pub supplier_id: Option<String>,
    pub variant_label: Option<String>,
    pub kolicina: i64,
    pub nabavna_cena: Money,
    pub prodajna_cena: Money,
    pub manual_prodajna: bool,

    /// Empty on legacy records. Read through [`Order::resolved_items`].
    pub items: Vec<OrderItem>,

    pub customer_name: String,
    pub customer_address: String,
    pub customer_phone: String,

    pub transport_cost: Option<Money>,
    pub transport_mode: Option<TransportMode>,
    pub slanje_mode: Option<SlanjeMode>,
    pub slanje_owner: Option<String>,
    pub broj_posiljke: Option<String>,
    pub povrat_vracen: bool,
    pub pickup: bool,

    /// 0-100 inclusive.
    pub my_profit_percent: f64,
    pub note: Option<String>,

    /// Manual ordering key, larger sorts first.
    pub sort_index: i64,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Returns the line items, synthesizing the implicit legacy item when the
    /// record predates multi-item orders.
    pub fn resolved_items(&self) -> Vec<OrderItem> {
        if !self.items.is_empty() {
            return self.items.clone();
        }

        vec![OrderItem {
            id: format!("{}-legacy", self.id),
            product_id: self.product_id.clone(),
            variant_id: self.variant_id.clone(),
            supplier_id: self.supplier_id.clone(),
            title: self.title.clone(),
            variant_label: self.variant_label.clone(),
            kolicina: self.kolicina.max(1),
            nabavna_cena: self.nabavna_cena,
            prodajna_cena: self.prodajna_cena,
            manual_prodajna: self.manual_prodajna,
        }]
    }

    /// True when any item (or the legacy top-level reference) points at the
    /// given product.
    pub fn references_product(&self, product_id: &str) -> bool {
        self.resolved_items()
            .iter()
            .any(|item| item.product_id.as_deref() == Some(product_id))
    }
}

// =============================================================================
// Shipping Account
// =============================================================================

/// Manually maintained starting balance for one carrier account holder.
///
/// Unique per (tenant, scope, owner_key); re-saving overwrites.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAccount {
    pub id: String,
    pub tenant_id: String,
    pub scope: Scope,
    /// Normalized owner string; the merge key.
    pub owner_key: String,
    /// Display name as last registered.
    pub owner_name: String,
    pub starting_amount: Money,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Customer
// =============================================================================

/// Autocomplete side-record keyed by phone digits. Not authoritative for
/// order data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: String,
    pub tenant_id: String,
    pub scope: Scope,
    pub phone_key: String,
    pub name: String,
    pub address: String,
    pub phone: String,
    pub order_count: i64,
    #[ts(as = "String")]
    pub last_used_at: DateTime<Utc>,
}

// =============================================================================
// Write Requests
// =============================================================================

/// Raw line item as submitted by the caller. Every field is optional; the
/// item normalizer decides what survives.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderItemInput {
    pub id: Option<String>,
    pub product_id: Option<String>,
    pub variant_id: Option<String>,
    pub supplier_id: Option<String>,
    pub title: Option<String>,
    pub kolicina: Option<f64>,
    pub nabavna_cena: Option<f64>,
    pub prodajna_cena: Option<f64>,
    pub manual_prodajna: bool,
}

/// Order fields for `create` and `update`. `update` rewrites every field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderInput {
    /// Fallback title for items that end up without one.
    pub title: String,
    pub items: Vec<OrderItemInput>,
    pub stage: Stage,
    pub customer_name: String,
    pub customer_address: String,
    pub customer_phone: String,
    pub transport_cost: Option<f64>,
    pub transport_mode: Option<TransportMode>,
    pub slanje_mode: Option<SlanjeMode>,
    pub slanje_owner: Option<String>,
    pub broj_posiljke: Option<String>,
    pub povrat_vracen: bool,
    pub pickup: bool,
    pub my_profit_percent: Option<f64>,
    pub note: Option<String>,
}

// =============================================================================
// Unit Tests
// =============================================================================
