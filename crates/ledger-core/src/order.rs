//! # Order Builder
//!
//! Turns an [`OrderInput`] into a complete [`Order`] ready to persist.
//! `create` and `update` share this path; the only difference is the
//! [`OrderIdentity`] they pass in.
//!
//! ```text
//! OrderInput ──► validate customer, percent, transport, pickup
//!            ──► normalize_items (catalog + price resolver)
//!            ──► reject if no items survive
//!            ──► mirror first item onto top-level fields
//!            ──► Order
//! ```
//!
//! Everything here runs before any write, so a rejected request leaves no
//! partial state behind.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::catalog::CatalogLookup;
use crate::error::{CoreError, CoreResult};
use crate::items::normalize_items;
use crate::types::{Order, OrderInput, Scope};
use crate::validation::{
    validate_customer_name, validate_profit_percent, validate_transport_cost,
};

/// Fields that are not taken from the request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderIdentity {
    pub id: String,
    pub tenant_id: String,
    pub scope: Scope,
    pub sort_index: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OrderIdentity {
    /// Fresh order: new id, `sortIndex` defaults to the creation time.
    pub fn new_order(tenant_id: &str, scope: Scope, now: DateTime<Utc>) -> Self {
        OrderIdentity {
            id: Uuid::new_v4().to_string(),
            tenant_id: tenant_id.to_string(),
            scope,
            sort_index: now.timestamp_millis(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Rewrite of a stored order; ordering and creation time survive edits.
    pub fn existing(order: &Order, now: DateTime<Utc>) -> Self {
        OrderIdentity {
            id: order.id.clone(),
            tenant_id: order.tenant_id.clone(),
            scope: order.scope,
            sort_index: order.sort_index,
            created_at: order.created_at,
            updated_at: now,
        }
    }
}

/// Validates and normalizes a write request into a full order.
///
/// ## Errors
/// - [`CoreError::Validation`] for a blank customer name, bad percent or a
///   negative transport cost
/// - [`CoreError::PickupTransportMode`] when a pickup order names a mode
/// - [`CoreError::ManualPriceMissing`] from item normalization
/// - [`CoreError::EmptyOrder`] when no item survives normalization
pub fn build_order<C: CatalogLookup + ?Sized>(
    identity: OrderIdentity,
    input: &OrderInput,
    catalog: &C,
) -> CoreResult<Order> {
    validate_customer_name(&input.customer_name)?;
    let my_profit_percent = validate_profit_percent(input.my_profit_percent)?;

    let (transport_mode, transport_cost) = if input.pickup {
        if let Some(mode) = input.transport_mode {
            return Err(CoreError::PickupTransportMode {
                mode: mode.as_str().to_string(),
            });
        }
        (None, None)
    } else {
        (
            input.transport_mode,
            validate_transport_cost(input.transport_cost)?,
        )
    };

    let items = normalize_items(&identity.tenant_id, &input.items, &input.title, catalog)?;
    let Some(first) = items.first().cloned() else {
        return Err(CoreError::EmptyOrder);
    };

    Ok(Order {
        id: identity.id,
        tenant_id: identity.tenant_id,
        scope: identity.scope,
        stage: input.stage,

        title: first.title,
        product_id: first.product_id,
        variant_id: first.variant_id,
        supplier_id: first.supplier_id,
        variant_label: first.variant_label,
        kolicina: first.kolicina,
        nabavna_cena: first.nabavna_cena,
        prodajna_cena: first.prodajna_cena,
        manual_prodajna: first.manual_prodajna,

        items,

        customer_name: input.customer_name.trim().to_string(),
        customer_address: input.customer_address.trim().to_string(),
        customer_phone: input.customer_phone.trim().to_string(),

        transport_cost,
        transport_mode,
        slanje_mode: input.slanje_mode,
        slanje_owner: trimmed(input.slanje_owner.as_deref()),
        broj_posiljke: trimmed(input.broj_posiljke.as_deref()),
        povrat_vracen: input.povrat_vracen,
        pickup: input.pickup,

        my_profit_percent,
        note: trimmed(input.note.as_deref()),

        sort_index: identity.sort_index,
        created_at: identity.created_at,
        updated_at: identity.updated_at,
    })
}

fn trimmed(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

// =============================================================================
// Unit Tests
// =============================================================================
