//! # Price Resolver
//!
//! Chooses a supplier offer for a product/variant pair.
//!
//! ```text
//! offers ──► partition by variant ──┬── empty? ─────────────► unresolved
//!                                   │
//!                                   ├── requested supplier ─► its price + supplier
//!                                   │   present?
//!                                   ├── exactly one offer ──► its price + supplier
//!                                   │
//!                                   └── several offers ─────► min price, supplier
//!                                                             left unresolved
//! ```
//!
//! Price is always picked when any offer matches; supplier identity only when
//! it is explicit or unambiguous, so cost is never attributed to the wrong
//! vendor.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::catalog::{CatalogProduct, SupplierOffer};
use crate::money::Money;

/// Outcome of [`resolve_price`]. Both fields `None` means "use the catalog
/// default cost".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PriceResolution {
    pub supplier_id: Option<String>,
    pub price: Option<Money>,
}

impl PriceResolution {
    fn from_offer(offer: &SupplierOffer) -> Self {
        PriceResolution {
            supplier_id: Some(offer.supplier_id.clone()),
            price: Some(offer.price),
        }
    }
}

/// Resolves the cost price for a product, variant and optional supplier.
///
/// When several offers share the minimum price the one with the lowest
/// supplier id wins, which keeps the result deterministic.
pub fn resolve_price(
    product: &CatalogProduct,
    variant_id: Option<&str>,
    supplier_id: Option<&str>,
) -> PriceResolution {
    if product.offers.is_empty() {
        return PriceResolution::default();
    }

    let candidates: Vec<&SupplierOffer> = product
        .offers
        .iter()
        .filter(|offer| offer.variant_id.as_deref() == variant_id)
        .collect();

    if candidates.is_empty() {
        return PriceResolution::default();
    }

    if let Some(requested) = supplier_id {
        if let Some(offer) = candidates.iter().find(|o| o.supplier_id == requested) {
            return PriceResolution::from_offer(offer);
        }
    }

    if let [only] = candidates.as_slice() {
        return PriceResolution::from_offer(only);
    }

    let cheapest = candidates
        .iter()
        .min_by(|a, b| {
            a.price
                .cmp(&b.price)
                .then_with(|| a.supplier_id.cmp(&b.supplier_id))
        })
        .map(|offer| offer.price);

    PriceResolution {
        supplier_id: None,
        price: cheapest,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn offer(supplier: &str, variant: Option<&str>, cents: i64) -> SupplierOffer {
        SupplierOffer {
            supplier_id: supplier.to_string(),
            variant_id: variant.map(str::to_string),
            price: Money::from_cents(cents),
        }
    }

    fn product(offers: Vec<SupplierOffer>) -> CatalogProduct {
        CatalogProduct {
            id: "p1".to_string(),
            tenant_id: "tenant-a".to_string(),
            name: "Lampa".to_string(),
            prodajna_cena: Some(Money::from_cents(3000)),
            nabavna_cena: Some(Money::from_cents(1200)),
            default_variant_id: None,
            variants: vec![],
            offers,
            image_url: None,
        }
    }

    #[test]
    fn test_no_offers_is_unresolved() {
        let resolution = resolve_price(&product(vec![]), None, Some("s1"));
        assert_eq!(resolution, PriceResolution::default());
    }

    #[test]
    fn test_single_offer_wins_regardless_of_requested_supplier() {
        let p = product(vec![offer("s1", None, 1000)]);

        for requested in [None, Some("s1"), Some("s9")] {
            let resolution = resolve_price(&p, None, requested);
            assert_eq!(resolution.supplier_id.as_deref(), Some("s1"));
            assert_eq!(resolution.price, Some(Money::from_cents(1000)));
        }
    }

    #[test]
    fn test_multiple_offers_pick_min_price_without_supplier() {
        let p = product(vec![offer("s1", None, 1500), offer("s2", None, 1000)]);
        let resolution = resolve_price(&p, None, None);
        assert_eq!(resolution.price, Some(Money::from_cents(1000)));
        assert_eq!(resolution.supplier_id, None);
    }

    #[test]
    fn test_explicit_supplier_wins_outright() {
        let p = product(vec![offer("s1", None, 1500), offer("s2", None, 1000)]);
        let resolution = resolve_price(&p, None, Some("s1"));
        assert_eq!(resolution.price, Some(Money::from_cents(1500)));
        assert_eq!(resolution.supplier_id.as_deref(), Some("s1"));
    }

    #[test]
    fn test_unknown_supplier_falls_back_to_min() {
        let p = product(vec![offer("s1", None, 1500), offer("s2", None, 1000)]);
        let resolution = resolve_price(&p, None, Some("s3"));
        assert_eq!(resolution.price, Some(Money::from_cents(1000)));
        assert_eq!(resolution.supplier_id, None);
    }

    #[test]
    fn test_variant_partitioning() {
        let p = product(vec![
            offer("s1", None, 900),
            offer("s2", Some("red"), 1100),
            offer("s3", Some("blue"), 1300),
        ]);

        let red = resolve_price(&p, Some("red"), None);
        assert_eq!(red.supplier_id.as_deref(), Some("s2"));
        assert_eq!(red.price, Some(Money::from_cents(1100)));

        // Product-level offers never answer a variant request
        let green = resolve_price(&p, Some("green"), None);
        assert_eq!(green.price, None);

        // No variant requested: only product-level offers qualify
        let plain = resolve_price(&p, None, None);
        assert_eq!(plain.supplier_id.as_deref(), Some("s1"));
    }

    #[test]
    fn test_equal_minimum_is_deterministic() {
        let p = product(vec![
            offer("s9", None, 1000),
            offer("s1", None, 1000),
            offer("s5", None, 2000),
        ]);
        let first = resolve_price(&p, None, None);
        let again = resolve_price(&p, None, None);
        assert_eq!(first, again);
        assert_eq!(first.price, Some(Money::from_cents(1000)));
        assert_eq!(first.supplier_id, None);
    }
}
