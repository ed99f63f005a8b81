//! # Catalog References
//!
//! Read-only views of the product/variant/supplier catalogs. The ledger never
//! writes these; it only resolves prices and labels from them.
//!
//! The item normalizer reads through [`CatalogLookup`], so the database layer
//! can hand it a snapshot loaded inside the same write transaction.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

/// One supplier's price for a product (optionally for one variant).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SupplierOffer {
    pub supplier_id: String,
    /// `None` means the offer covers the product as a whole.
    pub variant_id: Option<String>,
    pub price: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ProductVariant {
    pub id: String,
    pub label: String,
    pub prodajna_cena: Option<Money>,
    pub nabavna_cena: Option<Money>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CatalogProduct {
    pub id: String,
    pub tenant_id: String,
    pub name: String,
    pub prodajna_cena: Option<Money>,
    pub nabavna_cena: Option<Money>,
    pub default_variant_id: Option<String>,
    pub variants: Vec<ProductVariant>,
    pub offers: Vec<SupplierOffer>,
    /// Opaque storage URL, passed through untouched.
    pub image_url: Option<String>,
}

impl CatalogProduct {
    /// Looks up a variant by id, falling back to the designated default
    /// variant, then to the first one.
    pub fn variant_or_default(&self, requested: Option<&str>) -> Option<&ProductVariant> {
        if let Some(id) = requested {
            if let Some(v) = self.variants.iter().find(|v| v.id == id) {
                return Some(v);
            }
        }
        self.default_variant_id
            .as_deref()
            .and_then(|id| self.variants.iter().find(|v| v.id == id))
            .or_else(|| self.variants.first())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Supplier {
    pub id: String,
    pub tenant_id: String,
    pub name: String,
}

/// Read-only catalog access: `get(id) -> record | null`.
///
/// Implementations return records regardless of tenant; ownership checks are
/// the caller's job so a foreign record can be recognised and dropped.
pub trait CatalogLookup {
    fn product(&self, id: &str) -> Option<&CatalogProduct>;
    fn supplier(&self, id: &str) -> Option<&Supplier>;
}

/// In-memory catalog view, typically loaded for the ids one write touches.
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    products: HashMap<String, CatalogProduct>,
    suppliers: HashMap<String, Supplier>,
}

impl CatalogSnapshot {
    pub fn new() -> Self {
        CatalogSnapshot::default()
    }

    pub fn insert_product(&mut self, product: CatalogProduct) {
        self.products.insert(product.id.clone(), product);
    }

    pub fn insert_supplier(&mut self, supplier: Supplier) {
        self.suppliers.insert(supplier.id.clone(), supplier);
    }

    pub fn with_product(mut self, product: CatalogProduct) -> Self {
        self.insert_product(product);
        self
    }

    pub fn with_supplier(mut self, supplier: Supplier) -> Self {
        self.insert_supplier(supplier);
        self
    }
}

impl CatalogLookup for CatalogSnapshot {
    fn product(&self, id: &str) -> Option<&CatalogProduct> {
        self.products.get(id)
    }

    fn supplier(&self, id: &str) -> Option<&Supplier> {
        self.suppliers.get(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variant(id: &str) -> ProductVariant {
        ProductVariant {
            id: id.to_string(),
            label: id.to_uppercase(),
            prodajna_cena: None,
            nabavna_cena: None,
        }
    }

    fn product(default_variant: Option<&str>, variants: Vec<ProductVariant>) -> CatalogProduct {
        CatalogProduct {
            id: "p1".to_string(),
            tenant_id: "tenant-a".to_string(),
            name: "Lampa".to_string(),
            prodajna_cena: None,
            nabavna_cena: None,
            default_variant_id: default_variant.map(str::to_string),
            variants,
            offers: vec![],
            image_url: None,
        }
    }

    #[test]
    fn test_variant_lookup_falls_back_to_default_then_first() {
        let p = product(Some("v2"), vec![variant("v1"), variant("v2")]);
        assert_eq!(p.variant_or_default(Some("v1")).map(|v| v.id.as_str()), Some("v1"));
        assert_eq!(p.variant_or_default(Some("gone")).map(|v| v.id.as_str()), Some("v2"));
        assert_eq!(p.variant_or_default(None).map(|v| v.id.as_str()), Some("v2"));

        let p = product(None, vec![variant("v1"), variant("v2")]);
        assert_eq!(p.variant_or_default(Some("gone")).map(|v| v.id.as_str()), Some("v1"));

        let p = product(None, vec![]);
        assert!(p.variant_or_default(Some("v1")).is_none());
    }

    #[test]
    fn test_snapshot_lookup() {
        let snapshot = CatalogSnapshot::new()
            .with_product(product(None, vec![]))
            .with_supplier(Supplier {
                id: "s1".to_string(),
                tenant_id: "tenant-a".to_string(),
                name: "Veleprodaja".to_string(),
            });
        assert!(snapshot.product("p1").is_some());
        assert!(snapshot.product("p2").is_none());
        assert_eq!(snapshot.supplier("s1").map(|s| s.name.as_str()), Some("Veleprodaja"));
    }
}
