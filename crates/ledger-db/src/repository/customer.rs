//! # Customer Repository
//!
//! Autocomplete side-records keyed by phone digits. Upserted from inside the
//! order write transaction; never authoritative for order data.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use ledger_core::search::{matches, phone_digits};
use ledger_core::{Customer, Order, Scope};

#[derive(Debug, sqlx::FromRow)]
struct CustomerRow {
    id: String,
    tenant_id: String,
    scope: Scope,
    phone_key: String,
    name: String,
    address: String,
    phone: String,
    order_count: i64,
    last_used_at: DateTime<Utc>,
}

impl From<CustomerRow> for Customer {
    fn from(row: CustomerRow) -> Self {
        Customer {
            id: row.id,
            tenant_id: row.tenant_id,
            scope: row.scope,
            phone_key: row.phone_key,
            name: row.name,
            address: row.address,
            phone: row.phone,
            order_count: row.order_count,
            last_used_at: row.last_used_at,
        }
    }
}

/// Records the order's customer. Skipped when the phone has no digits.
///
/// `new_order` bumps the usage count; edits only refresh the contact fields.
pub(crate) async fn upsert_from_order(
    conn: &mut SqliteConnection,
    order: &Order,
    new_order: bool,
) -> DbResult<()> {
    let phone_key = phone_digits(&order.customer_phone);
    if phone_key.is_empty() {
        return Ok(());
    }

    debug!(order_id = %order.id, phone_key = %phone_key, "Upserting customer");

    sqlx::query(
        r#"
        INSERT INTO customers (
            id, tenant_id, scope, phone_key, name, address, phone, order_count, last_used_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        ON CONFLICT (tenant_id, scope, phone_key) DO UPDATE SET
            name = excluded.name,
            address = excluded.address,
            phone = excluded.phone,
            order_count = customers.order_count + excluded.order_count,
            last_used_at = excluded.last_used_at
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(&order.tenant_id)
    .bind(order.scope)
    .bind(&phone_key)
    .bind(&order.customer_name)
    .bind(&order.customer_address)
    .bind(&order.customer_phone)
    .bind(if new_order { 1_i64 } else { 0_i64 })
    .bind(order.updated_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Repository for customer suggestions.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    /// Creates a new CustomerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// All customers of a tenant and scope, most recently used first.
    pub async fn list(&self, tenant_id: &str, scope: Scope) -> DbResult<Vec<Customer>> {
        let rows: Vec<CustomerRow> = sqlx::query_as(
            r#"
            SELECT id, tenant_id, scope, phone_key, name, address, phone,
                   order_count, last_used_at
            FROM customers
            WHERE tenant_id = ?1 AND scope = ?2
            "#,
        )
        .bind(tenant_id)
        .bind(scope)
        .fetch_all(&self.pool)
        .await?;

        let mut customers: Vec<Customer> = rows.into_iter().map(Customer::from).collect();
        // TEXT timestamps don't sort reliably across fractional-second widths
        customers.sort_by(|a, b| b.last_used_at.cmp(&a.last_used_at).then_with(|| a.id.cmp(&b.id)));
        Ok(customers)
    }

    /// Customers whose name, address or phone match the query, most recently
    /// used first. A query with digits also matches on the phone key.
    pub async fn search(
        &self,
        tenant_id: &str,
        scope: Scope,
        query: &str,
        limit: usize,
    ) -> DbResult<Vec<Customer>> {
        let digits = phone_digits(query);

        let found: Vec<Customer> = self
            .list(tenant_id, scope)
            .await?
            .into_iter()
            .filter(|c| {
                matches(&c.name, query)
                    || matches(&c.address, query)
                    || matches(&c.phone, query)
                    || (!digits.is_empty() && c.phone_key.contains(&digits))
            })
            .take(limit)
            .collect();

        debug!(query = %query, count = found.len(), "Customer search");
        Ok(found)
    }
}
