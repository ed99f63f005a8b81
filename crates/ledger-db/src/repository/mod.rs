//! # Repository Module
//!
//! Database repository implementations for the merch ledger.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Boundary operation                                                    │
//! │       │                                                                 │
//! │       │  db.orders().create("tenant-a", Scope::Default, &input)        │
//! │       ▼                                                                 │
//! │  OrderRepository                                                       │
//! │  ├── create / update / remove   (one transaction each)                │
//! │  ├── get / list_all / by_product                                       │
//! │  └── reorder                                                            │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`OrderRepository`](order::OrderRepository) - Orders, items, manual ordering
//! - [`CatalogRepository`](catalog::CatalogRepository) - Products, variants, suppliers (read side)
//! - [`ShippingAccountRepository`](shipping_account::ShippingAccountRepository) - Starting balances
//! - [`CustomerRepository`](customer::CustomerRepository) - Autocomplete side-records

pub mod catalog;
pub mod customer;
pub mod order;
pub mod shipping_account;
