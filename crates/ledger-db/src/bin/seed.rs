//! # Seed Data Generator
//!
//! Populates the database with a small catalog and sample orders for
//! development.
//!
//! ## Usage
//! ```bash
//! # Seed 40 orders into ./ledger_dev.db (default)
//! cargo run -p ledger-db --bin seed
//!
//! # Generate custom amount
//! cargo run -p ledger-db --bin seed -- --count 200
//!
//! # Specify database path and tenant
//! cargo run -p ledger-db --bin seed -- --db ./data/ledger.db --tenant shop-1
//! ```
//!
//! ## Generated Data
//! - Products with color variants, some with supplier offers
//! - Orders spread over every stage, transport mode and shipping owner
//! - A couple of shipping accounts with starting balances
//!
//! Finishes by printing the default-scope summary as JSON.

use std::env;

use ledger_core::{
    CatalogProduct, Money, OrderInput, OrderItemInput, ProductVariant, Scope, ScopeSummary,
    SlanjeMode, Stage, Supplier, SupplierOffer, TransportMode,
};
use ledger_db::{Database, DbConfig};

/// (id, name, base sale price in cents, variant labels)
const PRODUCTS: &[(&str, &str, i64, &[&str])] = &[
    ("majica", "Majica", 2_500, &["Crna", "Bela", "Siva"]),
    ("duks", "Duks", 5_500, &["Crni", "Teget"]),
    ("kacket", "Kačket", 1_800, &[]),
    ("solja", "Šolja", 1_200, &["Bela"]),
    ("ranac", "Ranac", 6_900, &[]),
];

const SUPPLIERS: &[(&str, &str)] = &[("dob-1", "Štamparija Novi Sad"), ("dob-2", "Tekstil Promo")];

const CUSTOMERS: &[(&str, &str, &str)] = &[
    ("Marko Marković", "Bulevar 12, Beograd", "060 111 222"),
    ("Jelena Jović", "Zmaj Jovina 3, Novi Sad", "064/333-444"),
    ("Đorđe Đurić", "Kneza Miloša 8, Niš", "+381 65 555 666"),
    ("Ana Anić", "Glavna 1, Subotica", "061 777 888"),
];

const STAGES: &[Stage] = &[Stage::Poruceno, Stage::Poslato, Stage::Stiglo, Stage::LeglePare];

const OWNERS: &[&str] = &["Kol", "Joe", "Zoran"];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 40;
    let mut db_path = String::from("./ledger_dev.db");
    let mut tenant = String::from("tenant-dev");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(40);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--tenant" | "-t" => {
                if i + 1 < args.len() {
                    tenant = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Merch Ledger Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>      Number of orders to generate (default: 40)");
                println!("  -d, --db <PATH>      Database file path (default: ./ledger_dev.db)");
                println!("  -t, --tenant <ID>    Tenant id (default: tenant-dev)");
                println!("  -h, --help           Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Merch Ledger Seed Data Generator");
    println!("===================================");
    println!("Database: {}", db_path);
    println!("Tenant:   {}", tenant);
    println!("Orders:   {}", count);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.catalog().count_products(&tenant).await?;
    if existing > 0 {
        println!("⚠ Tenant already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    for (id, name) in SUPPLIERS {
        db.catalog()
            .insert_supplier(&Supplier {
                id: scoped_id(&tenant, id),
                tenant_id: tenant.clone(),
                name: name.to_string(),
            })
            .await?;
    }

    for (idx, (id, name, price, variants)) in PRODUCTS.iter().enumerate() {
        db.catalog()
            .insert_product(&generate_product(&tenant, idx, id, name, *price, variants))
            .await?;
    }
    println!("✓ Catalog: {} products, {} suppliers", PRODUCTS.len(), SUPPLIERS.len());

    let start = std::time::Instant::now();
    let mut generated = 0;
    for seed in 0..count {
        let scope = if seed % 5 == 4 { Scope::Kalaba } else { Scope::Default };
        if let Err(e) = db.orders().create(&tenant, scope, &generate_order(&tenant, seed)).await {
            eprintln!("Failed to insert order {}: {}", seed, e);
            continue;
        }
        generated += 1;
    }
    println!("✓ Generated {} orders in {:?}", generated, start.elapsed());

    db.shipping_accounts().upsert(&tenant, Scope::Default, "Kol", 150.0).await?;
    db.shipping_accounts().upsert(&tenant, Scope::Default, "Zoran", 80.0).await?;
    println!("✓ Shipping accounts registered");

    let orders = db.orders().list_all(&tenant, Scope::Default).await?;
    let summary = ScopeSummary::build(Scope::Default, &orders);
    println!();
    println!("{}", serde_json::to_string_pretty(&summary)?);

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// Catalog ids are global, so prefix them with the tenant.
fn scoped_id(tenant: &str, id: &str) -> String {
    format!("{}-{}", tenant, id)
}

fn generate_product(
    tenant: &str,
    idx: usize,
    id: &str,
    name: &str,
    price_cents: i64,
    variants: &[&str],
) -> CatalogProduct {
    let product_id = scoped_id(tenant, id);
    let variants: Vec<ProductVariant> = variants
        .iter()
        .enumerate()
        .map(|(v, label)| ProductVariant {
            id: format!("{}-{}", product_id, label.to_lowercase()),
            label: label.to_string(),
            // later variants cost a bit more
            prodajna_cena: (v > 0).then(|| Money::from_cents(price_cents + 300 * v as i64)),
            nabavna_cena: None,
        })
        .collect();

    // Every other product has supplier offers; the rest carry a flat cost
    let offers = if idx % 2 == 0 {
        SUPPLIERS
            .iter()
            .enumerate()
            .map(|(s, (supplier, _))| SupplierOffer {
                supplier_id: scoped_id(tenant, supplier),
                variant_id: None,
                price: Money::from_cents(price_cents * (40 + 5 * s as i64) / 100),
            })
            .collect()
    } else {
        Vec::new()
    };

    CatalogProduct {
        id: product_id,
        tenant_id: tenant.to_string(),
        name: name.to_string(),
        prodajna_cena: Some(Money::from_cents(price_cents)),
        nabavna_cena: Some(Money::from_cents(price_cents / 2)),
        default_variant_id: variants.first().map(|v| v.id.clone()),
        variants,
        offers,
        image_url: None,
    }
}

fn generate_order(tenant: &str, seed: usize) -> OrderInput {
    let (name, address, phone) = CUSTOMERS[seed % CUSTOMERS.len()];
    let (product, _, _, variants) = PRODUCTS[seed % PRODUCTS.len()];

    let mut items = vec![OrderItemInput {
        product_id: Some(scoped_id(tenant, product)),
        variant_id: variants
            .get(seed % variants.len().max(1))
            .map(|label| format!("{}-{}", scoped_id(tenant, product), label.to_lowercase())),
        kolicina: Some((1 + seed % 3) as f64),
        ..Default::default()
    }];
    if seed % 4 == 0 {
        items.push(OrderItemInput {
            title: Some("Pakovanje".to_string()),
            kolicina: Some(1.0),
            nabavna_cena: Some(1.0),
            prodajna_cena: Some(3.0),
            manual_prodajna: true,
            ..Default::default()
        });
    }

    let pickup = seed % 7 == 3;
    let (slanje_mode, slanje_owner) = match seed % 4 {
        0 => (Some(SlanjeMode::Aks), Some(OWNERS[seed % OWNERS.len()].to_string())),
        1 => (Some(SlanjeMode::Bex), Some(OWNERS[(seed + 1) % OWNERS.len()].to_string())),
        2 => (Some(SlanjeMode::Posta), None),
        _ => (None, None),
    };

    OrderInput {
        title: String::new(),
        items,
        stage: STAGES[seed % STAGES.len()],
        customer_name: name.to_string(),
        customer_address: address.to_string(),
        customer_phone: phone.to_string(),
        transport_cost: (!pickup).then_some(4.5),
        transport_mode: (!pickup).then_some(TransportMode::Kol),
        slanje_mode,
        slanje_owner,
        broj_posiljke: (seed % 2 == 0).then(|| format!("PE{:08}RS", seed)),
        povrat_vracen: seed % 6 == 0,
        pickup,
        my_profit_percent: Some(if seed % 3 == 0 { 50.0 } else { 30.0 }),
        note: None,
    }
}
