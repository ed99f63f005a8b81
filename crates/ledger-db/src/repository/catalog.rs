//! # Catalog Repository
//!
//! Read side of the product/variant/supplier catalogs. The ledger never edits
//! catalog rows; the insert helpers exist for the seed binary and tests.
//!
//! ## Snapshot Loading
//! ```text
//! order write tx ──► load_snapshot(&mut tx, product ids, supplier ids)
//!                          │
//!                          ▼
//!                    CatalogSnapshot ──► ledger_core::build_order
//! ```
//! Loading through the write transaction keeps every lookup on the same
//! consistent view the write commits against.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use ledger_core::{CatalogProduct, CatalogSnapshot, Money, ProductVariant, Supplier, SupplierOffer};

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: String,
    tenant_id: String,
    name: String,
    prodajna_cena_cents: Option<i64>,
    nabavna_cena_cents: Option<i64>,
    default_variant_id: Option<String>,
    image_url: Option<String>,
}

#[derive(Debug, sqlx::FromRow)]
struct VariantRow {
    id: String,
    label: String,
    prodajna_cena_cents: Option<i64>,
    nabavna_cena_cents: Option<i64>,
}

#[derive(Debug, sqlx::FromRow)]
struct OfferRow {
    supplier_id: String,
    variant_id: Option<String>,
    price_cents: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct SupplierRow {
    id: String,
    tenant_id: String,
    name: String,
}

impl From<SupplierRow> for Supplier {
    fn from(row: SupplierRow) -> Self {
        Supplier {
            id: row.id,
            tenant_id: row.tenant_id,
            name: row.name,
        }
    }
}

/// Loads one product with its variants and offers, regardless of tenant.
pub(crate) async fn load_product(
    conn: &mut SqliteConnection,
    id: &str,
) -> DbResult<Option<CatalogProduct>> {
    let row: Option<ProductRow> = sqlx::query_as(
        r#"
        SELECT id, tenant_id, name, prodajna_cena_cents, nabavna_cena_cents,
               default_variant_id, image_url
        FROM products
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let variants: Vec<VariantRow> = sqlx::query_as(
        r#"
        SELECT id, label, prodajna_cena_cents, nabavna_cena_cents
        FROM product_variants
        WHERE product_id = ?1
        ORDER BY position, id
        "#,
    )
    .bind(id)
    .fetch_all(&mut *conn)
    .await?;

    let offers: Vec<OfferRow> = sqlx::query_as(
        r#"
        SELECT supplier_id, variant_id, price_cents
        FROM supplier_offers
        WHERE product_id = ?1
        ORDER BY id
        "#,
    )
    .bind(id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(Some(CatalogProduct {
        id: row.id,
        tenant_id: row.tenant_id,
        name: row.name,
        prodajna_cena: row.prodajna_cena_cents.map(Money::from_cents),
        nabavna_cena: row.nabavna_cena_cents.map(Money::from_cents),
        default_variant_id: row.default_variant_id,
        variants: variants
            .into_iter()
            .map(|v| ProductVariant {
                id: v.id,
                label: v.label,
                prodajna_cena: v.prodajna_cena_cents.map(Money::from_cents),
                nabavna_cena: v.nabavna_cena_cents.map(Money::from_cents),
            })
            .collect(),
        offers: offers
            .into_iter()
            .map(|o| SupplierOffer {
                supplier_id: o.supplier_id,
                variant_id: o.variant_id,
                price: Money::from_cents(o.price_cents),
            })
            .collect(),
        image_url: row.image_url,
    }))
}

pub(crate) async fn load_supplier(
    conn: &mut SqliteConnection,
    id: &str,
) -> DbResult<Option<Supplier>> {
    let row: Option<SupplierRow> =
        sqlx::query_as("SELECT id, tenant_id, name FROM suppliers WHERE id = ?1")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;
    Ok(row.map(Supplier::from))
}

/// Loads every referenced product and supplier into a snapshot. Missing ids
/// are simply absent; the normalizer treats them as dropped references.
pub(crate) async fn load_snapshot<'a, P, S>(
    conn: &mut SqliteConnection,
    product_ids: P,
    supplier_ids: S,
) -> DbResult<CatalogSnapshot>
where
    P: IntoIterator<Item = &'a str>,
    S: IntoIterator<Item = &'a str>,
{
    let mut snapshot = CatalogSnapshot::new();

    for id in product_ids {
        if let Some(product) = load_product(conn, id).await? {
            snapshot.insert_product(product);
        }
    }
    for id in supplier_ids {
        if let Some(supplier) = load_supplier(conn, id).await? {
            snapshot.insert_supplier(supplier);
        }
    }

    Ok(snapshot)
}

/// Repository for catalog reads (and development inserts).
#[derive(Debug, Clone)]
pub struct CatalogRepository {
    pool: SqlitePool,
}

impl CatalogRepository {
    /// Creates a new CatalogRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CatalogRepository { pool }
    }

    /// Gets a product with its variants and offers.
    pub async fn get_product(&self, id: &str) -> DbResult<Option<CatalogProduct>> {
        let mut conn = self.pool.acquire().await?;
        load_product(&mut conn, id).await
    }

    /// Gets a supplier by ID.
    pub async fn get_supplier(&self, id: &str) -> DbResult<Option<Supplier>> {
        let mut conn = self.pool.acquire().await?;
        load_supplier(&mut conn, id).await
    }

    /// Counts a tenant's products.
    pub async fn count_products(&self, tenant_id: &str) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE tenant_id = ?1")
            .bind(tenant_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Inserts a product with its variants and offers in one transaction.
    pub async fn insert_product(&self, product: &CatalogProduct) -> DbResult<()> {
        debug!(id = %product.id, name = %product.name, "Inserting product");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO products (
                id, tenant_id, name, prodajna_cena_cents, nabavna_cena_cents,
                default_variant_id, image_url, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&product.id)
        .bind(&product.tenant_id)
        .bind(&product.name)
        .bind(product.prodajna_cena.map(|m| m.cents()))
        .bind(product.nabavna_cena.map(|m| m.cents()))
        .bind(&product.default_variant_id)
        .bind(&product.image_url)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        for (position, variant) in product.variants.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO product_variants (
                    id, product_id, label, prodajna_cena_cents, nabavna_cena_cents, position
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
            )
            .bind(&variant.id)
            .bind(&product.id)
            .bind(&variant.label)
            .bind(variant.prodajna_cena.map(|m| m.cents()))
            .bind(variant.nabavna_cena.map(|m| m.cents()))
            .bind(position as i64)
            .execute(&mut *tx)
            .await?;
        }

        for offer in &product.offers {
            sqlx::query(
                r#"
                INSERT INTO supplier_offers (product_id, supplier_id, variant_id, price_cents)
                VALUES (?1, ?2, ?3, ?4)
                "#,
            )
            .bind(&product.id)
            .bind(&offer.supplier_id)
            .bind(&offer.variant_id)
            .bind(offer.price.cents())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Inserts a supplier.
    pub async fn insert_supplier(&self, supplier: &Supplier) -> DbResult<()> {
        debug!(id = %supplier.id, name = %supplier.name, "Inserting supplier");

        sqlx::query(
            "INSERT INTO suppliers (id, tenant_id, name, created_at) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(&supplier.id)
        .bind(&supplier.tenant_id)
        .bind(&supplier.name)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
