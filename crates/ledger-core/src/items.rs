//! # Item Normalizer
//!
//! Turns raw line-item input into validated, priced [`OrderItem`] records.
//!
//! ## Per-Item Pipeline
//! ```text
//! OrderItemInput
//!      │
//!      ├── kolicina ──────────► integer >= 1 (NaN / <= 0 become 1)
//!      │
//!      ├── productId ─────────► catalog lookup + tenant check
//!      │                         (foreign or missing → drop product,
//!      │                          variant and supplier references)
//!      │
//!      ├── variantId ─────────► requested / default / first variant
//!      │                         label prefixed with product name
//!      │
//!      ├── prodajnaCena ──────► manual? keep verbatim (must be set)
//!      │                         else variant → product → input
//!      │
//!      ├── nabavnaCena ───────► Price Resolver → variant → product → input
//!      │
//!      └── title ─────────────► input → variant label → product → fallback
//!
//! Items with an empty title are dropped afterwards.
//! ```

use std::collections::HashSet;

use uuid::Uuid;

use crate::catalog::{CatalogLookup, CatalogProduct, ProductVariant};
use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::pricing::resolve_price;
use crate::search::normalize;
use crate::types::{OrderItem, OrderItemInput};
use crate::{MAX_ITEM_QUANTITY, MAX_LINE_TOTAL};

/// Normalizes every raw item for the given tenant.
///
/// Returns an empty vector when nothing survives; rejecting an empty order is
/// the caller's decision.
///
/// ## Errors
/// - [`CoreError::ManualPriceMissing`] when an item is flagged `manualProdajna`
///   without a usable sale price
/// - [`ValidationError::OutOfRange`] when a line total exceeds [`MAX_LINE_TOTAL`]
pub fn normalize_items<C: CatalogLookup + ?Sized>(
    tenant_id: &str,
    raw_items: &[OrderItemInput],
    fallback_title: &str,
    catalog: &C,
) -> CoreResult<Vec<OrderItem>> {
    let mut items = Vec::with_capacity(raw_items.len());
    let mut seen_ids = HashSet::new();

    for raw in raw_items {
        let mut item = normalize_item(tenant_id, raw, fallback_title, catalog)?;
        if item.title.is_empty() || item.kolicina <= 0 {
            continue;
        }
        // Item ids are unique within an order
        if !seen_ids.insert(item.id.clone()) {
            item.id = Uuid::new_v4().to_string();
            seen_ids.insert(item.id.clone());
        }
        items.push(item);
    }

    Ok(items)
}

fn normalize_item<C: CatalogLookup + ?Sized>(
    tenant_id: &str,
    raw: &OrderItemInput,
    fallback_title: &str,
    catalog: &C,
) -> CoreResult<OrderItem> {
    let kolicina = clamp_quantity(raw.kolicina);

    let product_requested = non_blank(raw.product_id.as_deref()).is_some();
    let product = non_blank(raw.product_id.as_deref())
        .and_then(|id| catalog.product(id))
        .filter(|p| p.tenant_id == tenant_id);

    // A dropped product takes the supplier reference with it
    let supplier_id = if product_requested && product.is_none() {
        None
    } else {
        non_blank(raw.supplier_id.as_deref())
            .and_then(|id| catalog.supplier(id))
            .filter(|s| s.tenant_id == tenant_id)
            .map(|s| s.id.clone())
    };

    let priced = match product {
        Some(product) => price_from_catalog(product, raw, supplier_id),
        None => CatalogPricing {
            product_id: None,
            variant_id: None,
            variant_label: None,
            supplier_id,
            display_name: None,
            catalog_prodajna: None,
            nabavna_cena: coerce_price(raw.nabavna_cena),
        },
    };

    let title = non_blank(raw.title.as_deref())
        .map(str::to_string)
        .or_else(|| priced.display_name.clone())
        .unwrap_or_else(|| fallback_title.trim().to_string());

    let prodajna_cena = if raw.manual_prodajna {
        manual_price(raw.prodajna_cena, &title)?
    } else {
        priced
            .catalog_prodajna
            .unwrap_or_else(|| coerce_price(raw.prodajna_cena))
    };

    check_line_total("prodajnaCena", prodajna_cena, kolicina)?;
    check_line_total("nabavnaCena", priced.nabavna_cena, kolicina)?;

    let id = non_blank(raw.id.as_deref())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    Ok(OrderItem {
        id,
        product_id: priced.product_id,
        variant_id: priced.variant_id,
        supplier_id: priced.supplier_id,
        title,
        variant_label: priced.variant_label,
        kolicina,
        nabavna_cena: priced.nabavna_cena,
        prodajna_cena,
        manual_prodajna: raw.manual_prodajna,
    })
}

/// What the catalog contributes to one item.
struct CatalogPricing {
    product_id: Option<String>,
    variant_id: Option<String>,
    variant_label: Option<String>,
    supplier_id: Option<String>,
    display_name: Option<String>,
    catalog_prodajna: Option<Money>,
    nabavna_cena: Money,
}

fn price_from_catalog(
    product: &CatalogProduct,
    raw: &OrderItemInput,
    supplier_id: Option<String>,
) -> CatalogPricing {
    let variant: Option<&ProductVariant> =
        product.variant_or_default(non_blank(raw.variant_id.as_deref()));

    let variant_id = variant.map(|v| v.id.clone());
    let variant_label = variant.map(|v| prefixed_label(&product.name, &v.label));

    let resolution = resolve_price(product, variant_id.as_deref(), supplier_id.as_deref());

    let catalog_nabavna = variant
        .and_then(|v| v.nabavna_cena)
        .or(product.nabavna_cena);
    let nabavna_cena = resolution
        .price
        .or(catalog_nabavna)
        .unwrap_or_else(|| coerce_price(raw.nabavna_cena));

    // Without offers the operator's supplier choice stands; with offers the
    // resolver decides whether a supplier identity is unambiguous
    let supplier_id = if product.offers.is_empty() {
        supplier_id
    } else {
        resolution.supplier_id
    };

    let catalog_prodajna = variant
        .and_then(|v| v.prodajna_cena)
        .or(product.prodajna_cena);

    let display_name = variant_label
        .clone()
        .or_else(|| non_blank(Some(&product.name)).map(str::to_string));

    CatalogPricing {
        product_id: Some(product.id.clone()),
        variant_id,
        variant_label,
        supplier_id,
        display_name,
        catalog_prodajna,
        nabavna_cena,
    }
}

/// Prefixes a variant label with the product name unless it already starts
/// with it ("Lampa" + "Crna" → "Lampa Crna", "Lampa Crna" stays).
pub fn prefixed_label(product_name: &str, label: &str) -> String {
    let name = product_name.trim();
    let label = label.trim();

    if label.is_empty() {
        return name.to_string();
    }
    if name.is_empty() || normalize(label).starts_with(&normalize(name)) {
        return label.to_string();
    }
    format!("{} {}", name, label)
}

/// Clamps a raw quantity to an integer >= 1.
pub fn clamp_quantity(raw: Option<f64>) -> i64 {
    match raw {
        Some(q) if q.is_finite() && q >= 1.0 => q.floor().min(MAX_ITEM_QUANTITY as f64) as i64,
        _ => 1,
    }
}

/// Catalog-side or optional prices: non-finite or negative become zero.
pub fn coerce_price(raw: Option<f64>) -> Money {
    raw.and_then(Money::from_major)
        .filter(|m| !m.is_negative())
        .unwrap_or_default()
}

fn manual_price(raw: Option<f64>, title: &str) -> CoreResult<Money> {
    raw.and_then(Money::from_major)
        .filter(|m| !m.is_negative())
        .ok_or_else(|| CoreError::ManualPriceMissing {
            title: title.to_string(),
        })
}

fn check_line_total(field: &str, price: Money, kolicina: i64) -> CoreResult<()> {
    match price.checked_multiply_quantity(kolicina) {
        Some(total) if total <= MAX_LINE_TOTAL => Ok(()),
        _ => Err(ValidationError::OutOfRange {
            field: format!("{} × kolicina", field),
            min: 0,
            max: MAX_LINE_TOTAL.major(),
        }
        .into()),
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

// =============================================================================
// Unit Tests
// =============================================================================
