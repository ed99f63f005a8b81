//! # Order Repository
//!
//! Persistence, tenant + scope authorization and manual ordering for orders.
//!
//! ## Write Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  BEGIN                                                                  │
//! │    (update/remove) load owner row ──► tenant/scope mismatch? Forbidden │
//! │    load catalog snapshot for referenced product/supplier ids           │
//! │    ledger_core::build_order ──► CoreError? rollback, nothing written   │
//! │    write orders row, replace order_items rows                          │
//! │    upsert customer side-record                                         │
//! │  COMMIT                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Read Path
//! Reads load rows plus item rows and hand back [`Order`] values. Legacy
//! orders have no item rows; [`Order::resolved_items`] fills in the implicit
//! item wherever totals are computed.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::repository::catalog::load_snapshot;
use crate::repository::customer::upsert_from_order;
use ledger_core::{
    build_order, Money, Order, OrderIdentity, OrderInput, OrderItem, Scope, SlanjeMode, Stage,
    TransportMode, ValidationError,
};

// =============================================================================
// Row Types
// =============================================================================

const ORDER_COLUMNS: &str = r#"
    id, tenant_id, scope, stage,
    title, product_id, variant_id, supplier_id, variant_label,
    kolicina, nabavna_cena_cents, prodajna_cena_cents, manual_prodajna,
    customer_name, customer_address, customer_phone,
    transport_cost_cents, transport_mode, slanje_mode, slanje_owner,
    broj_posiljke, povrat_vracen, pickup,
    my_profit_percent, note, sort_index, created_at, updated_at
"#;

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: String,
    tenant_id: String,
    scope: Scope,
    stage: Stage,
    title: String,
    product_id: Option<String>,
    variant_id: Option<String>,
    supplier_id: Option<String>,
    variant_label: Option<String>,
    kolicina: i64,
    nabavna_cena_cents: i64,
    prodajna_cena_cents: i64,
    manual_prodajna: bool,
    customer_name: String,
    customer_address: String,
    customer_phone: String,
    transport_cost_cents: Option<i64>,
    transport_mode: Option<TransportMode>,
    slanje_mode: Option<SlanjeMode>,
    slanje_owner: Option<String>,
    broj_posiljke: Option<String>,
    povrat_vracen: bool,
    pickup: bool,
    my_profit_percent: f64,
    note: Option<String>,
    sort_index: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_order(self, items: Vec<OrderItem>) -> Order {
        Order {
            id: self.id,
            tenant_id: self.tenant_id,
            scope: self.scope,
            stage: self.stage,
            title: self.title,
            product_id: self.product_id,
            variant_id: self.variant_id,
            supplier_id: self.supplier_id,
            variant_label: self.variant_label,
            kolicina: self.kolicina,
            nabavna_cena: Money::from_cents(self.nabavna_cena_cents),
            prodajna_cena: Money::from_cents(self.prodajna_cena_cents),
            manual_prodajna: self.manual_prodajna,
            items,
            customer_name: self.customer_name,
            customer_address: self.customer_address,
            customer_phone: self.customer_phone,
            transport_cost: self.transport_cost_cents.map(Money::from_cents),
            transport_mode: self.transport_mode,
            slanje_mode: self.slanje_mode,
            slanje_owner: self.slanje_owner,
            broj_posiljke: self.broj_posiljke,
            povrat_vracen: self.povrat_vracen,
            pickup: self.pickup,
            my_profit_percent: self.my_profit_percent,
            note: self.note,
            sort_index: self.sort_index,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OrderItemRow {
    order_id: String,
    id: String,
    product_id: Option<String>,
    variant_id: Option<String>,
    supplier_id: Option<String>,
    title: String,
    variant_label: Option<String>,
    kolicina: i64,
    nabavna_cena_cents: i64,
    prodajna_cena_cents: i64,
    manual_prodajna: bool,
}

impl From<OrderItemRow> for OrderItem {
    fn from(row: OrderItemRow) -> Self {
        OrderItem {
            id: row.id,
            product_id: row.product_id,
            variant_id: row.variant_id,
            supplier_id: row.supplier_id,
            title: row.title,
            variant_label: row.variant_label,
            kolicina: row.kolicina,
            nabavna_cena: Money::from_cents(row.nabavna_cena_cents),
            prodajna_cena: Money::from_cents(row.prodajna_cena_cents),
            manual_prodajna: row.manual_prodajna,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OwnerRow {
    tenant_id: String,
    scope: Scope,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Creates an order in the caller's tenant and scope.
    ///
    /// ## Errors
    /// [`DbError::Domain`] for any validation or normalization failure; no
    /// row is written in that case.
    pub async fn create(&self, tenant_id: &str, scope: Scope, input: &OrderInput) -> DbResult<Order> {
        let mut tx = self.pool.begin().await?;

        let snapshot = snapshot_for(&mut *tx, input).await?;
        let identity = OrderIdentity::new_order(tenant_id, scope, Utc::now());
        let order = build_order(identity, input, &snapshot)?;

        insert_order_row(&mut *tx, &order).await?;
        insert_items(&mut *tx, &order).await?;
        upsert_from_order(&mut *tx, &order, true).await?;

        tx.commit().await?;

        info!(
            order_id = %order.id,
            tenant = %tenant_id,
            scope = scope.as_str(),
            items = order.items.len(),
            "Order created"
        );
        Ok(order)
    }

    /// Rewrites every field of an order, items included. Last write wins.
    ///
    /// ## Errors
    /// - [`DbError::NotFound`] if the id doesn't exist
    /// - [`DbError::Forbidden`] if it belongs to another tenant or scope
    /// - [`DbError::Domain`] for validation failures
    pub async fn update(
        &self,
        tenant_id: &str,
        scope: Scope,
        id: &str,
        input: &OrderInput,
    ) -> DbResult<Order> {
        let mut tx = self.pool.begin().await?;

        let existing = fetch_order(&mut *tx, id)
            .await?
            .ok_or_else(|| DbError::not_found("Order", id))?;
        if existing.tenant_id != tenant_id || existing.scope != scope {
            return Err(DbError::forbidden("Order", id));
        }

        let snapshot = snapshot_for(&mut *tx, input).await?;
        let identity = OrderIdentity::existing(&existing, Utc::now());
        let order = build_order(identity, input, &snapshot)?;

        update_order_row(&mut *tx, &order).await?;
        sqlx::query("DELETE FROM order_items WHERE order_id = ?1")
            .bind(&order.id)
            .execute(&mut *tx)
            .await?;
        insert_items(&mut *tx, &order).await?;
        upsert_from_order(&mut *tx, &order, false).await?;

        tx.commit().await?;

        info!(order_id = %order.id, tenant = %tenant_id, "Order updated");
        Ok(order)
    }

    /// Deletes an order and its items. Immediate and irreversible.
    pub async fn remove(&self, tenant_id: &str, scope: Scope, id: &str) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;

        let owner = fetch_owner(&mut *tx, id)
            .await?
            .ok_or_else(|| DbError::not_found("Order", id))?;
        if owner.tenant_id != tenant_id || owner.scope != scope {
            return Err(DbError::forbidden("Order", id));
        }

        sqlx::query("DELETE FROM orders WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(order_id = %id, tenant = %tenant_id, "Order removed");
        Ok(())
    }

    /// Gets an order visible to the caller. Foreign orders read as absent.
    pub async fn get(&self, tenant_id: &str, scope: Scope, id: &str) -> DbResult<Option<Order>> {
        let mut conn = self.pool.acquire().await?;
        let order = fetch_order(&mut conn, id).await?;
        Ok(order.filter(|o| o.tenant_id == tenant_id && o.scope == scope))
    }

    /// Every order of a tenant and scope with its items (full scan).
    pub async fn list_all(&self, tenant_id: &str, scope: Scope) -> DbResult<Vec<Order>> {
        let rows: Vec<OrderRow> = sqlx::query_as(&format!(
            "SELECT {} FROM orders WHERE tenant_id = ?1 AND scope = ?2",
            ORDER_COLUMNS
        ))
        .bind(tenant_id)
        .bind(scope)
        .fetch_all(&self.pool)
        .await?;

        let item_rows: Vec<OrderItemRow> = sqlx::query_as(
            r#"
            SELECT oi.order_id, oi.id, oi.product_id, oi.variant_id, oi.supplier_id,
                   oi.title, oi.variant_label, oi.kolicina,
                   oi.nabavna_cena_cents, oi.prodajna_cena_cents, oi.manual_prodajna
            FROM order_items oi
            JOIN orders o ON o.id = oi.order_id
            WHERE o.tenant_id = ?1 AND o.scope = ?2
            ORDER BY oi.order_id, oi.position
            "#,
        )
        .bind(tenant_id)
        .bind(scope)
        .fetch_all(&self.pool)
        .await?;

        let orders = assemble(rows, item_rows);
        debug!(tenant = %tenant_id, scope = scope.as_str(), count = orders.len(), "Loaded orders");
        Ok(orders)
    }

    /// Orders of a tenant and scope where any item (or the legacy top-level
    /// reference) points at the product.
    pub async fn by_product(
        &self,
        tenant_id: &str,
        scope: Scope,
        product_id: &str,
    ) -> DbResult<Vec<Order>> {
        let rows: Vec<OrderRow> = sqlx::query_as(&format!(
            r#"
            SELECT {} FROM orders
            WHERE tenant_id = ?1 AND scope = ?2
              AND (product_id = ?3
                   OR EXISTS (SELECT 1 FROM order_items oi
                              WHERE oi.order_id = orders.id AND oi.product_id = ?3))
            "#,
            ORDER_COLUMNS
        ))
        .bind(tenant_id)
        .bind(scope)
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        let mut conn = self.pool.acquire().await?;
        let mut orders = Vec::with_capacity(rows.len());
        for row in rows {
            let items = fetch_items(&mut conn, &row.id).await?;
            orders.push(row.into_order(items));
        }

        // The first-item mirror can name a product no item references any more
        orders.retain(|o| o.references_product(product_id));
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(orders)
    }

    /// Assigns strictly decreasing sort indices in the given order, starting
    /// at `base` (default: now in milliseconds).
    ///
    /// Duplicate ids are dropped, keeping the first occurrence. If any id is
    /// missing or outside the caller's tenant + scope nothing is changed.
    ///
    /// ## Errors
    /// - [`DbError::Forbidden`] for a missing or foreign id
    /// - [`DbError::Domain`] when `base` leaves no room for the whole sequence
    pub async fn reorder(
        &self,
        tenant_id: &str,
        scope: Scope,
        ids: &[String],
        base: Option<i64>,
    ) -> DbResult<()> {
        let mut seen = HashSet::new();
        let ordered: Vec<&str> = ids
            .iter()
            .map(String::as_str)
            .filter(|id| seen.insert(*id))
            .collect();
        let base = base.unwrap_or_else(|| Utc::now().timestamp_millis());
        let span = ordered.len().saturating_sub(1) as i64;
        if base.checked_sub(span).is_none() {
            return Err(ValidationError::OutOfRange {
                field: "base".to_string(),
                min: i64::MIN.saturating_add(span),
                max: i64::MAX,
            }
            .into());
        }

        let mut tx = self.pool.begin().await?;

        for id in &ordered {
            let owner = fetch_owner(&mut *tx, id).await?;
            let allowed = owner.is_some_and(|o| o.tenant_id == tenant_id && o.scope == scope);
            if !allowed {
                return Err(DbError::forbidden("Order", *id));
            }
        }

        for (position, id) in ordered.iter().enumerate() {
            sqlx::query("UPDATE orders SET sort_index = ?2 WHERE id = ?1")
                .bind(id)
                .bind(base - position as i64)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        info!(tenant = %tenant_id, count = ordered.len(), base, "Orders reordered");
        Ok(())
    }
}

// =============================================================================
// Helpers
// =============================================================================

async fn snapshot_for(
    conn: &mut SqliteConnection,
    input: &OrderInput,
) -> DbResult<ledger_core::CatalogSnapshot> {
    let product_ids: HashSet<&str> = input
        .items
        .iter()
        .filter_map(|i| i.product_id.as_deref())
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .collect();
    let supplier_ids: HashSet<&str> = input
        .items
        .iter()
        .filter_map(|i| i.supplier_id.as_deref())
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .collect();

    load_snapshot(conn, product_ids, supplier_ids).await
}

async fn fetch_owner(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<OwnerRow>> {
    let owner: Option<OwnerRow> = sqlx::query_as("SELECT tenant_id, scope FROM orders WHERE id = ?1")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(owner)
}

async fn fetch_order(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Order>> {
    let row: Option<OrderRow> =
        sqlx::query_as(&format!("SELECT {} FROM orders WHERE id = ?1", ORDER_COLUMNS))
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;

    match row {
        Some(row) => {
            let items = fetch_items(conn, &row.id).await?;
            Ok(Some(row.into_order(items)))
        }
        None => Ok(None),
    }
}

async fn fetch_items(conn: &mut SqliteConnection, order_id: &str) -> DbResult<Vec<OrderItem>> {
    let rows: Vec<OrderItemRow> = sqlx::query_as(
        r#"
        SELECT order_id, id, product_id, variant_id, supplier_id, title, variant_label,
               kolicina, nabavna_cena_cents, prodajna_cena_cents, manual_prodajna
        FROM order_items
        WHERE order_id = ?1
        ORDER BY position
        "#,
    )
    .bind(order_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows.into_iter().map(OrderItem::from).collect())
}

fn assemble(rows: Vec<OrderRow>, item_rows: Vec<OrderItemRow>) -> Vec<Order> {
    let mut items_by_order: HashMap<String, Vec<OrderItem>> = HashMap::new();
    for row in item_rows {
        items_by_order
            .entry(row.order_id.clone())
            .or_default()
            .push(row.into());
    }

    rows.into_iter()
        .map(|row| {
            let items = items_by_order.remove(&row.id).unwrap_or_default();
            row.into_order(items)
        })
        .collect()
}

async fn insert_order_row(conn: &mut SqliteConnection, order: &Order) -> DbResult<()> {
    debug!(order_id = %order.id, "Inserting order");

    sqlx::query(&format!(
        r#"
        INSERT INTO orders ({}) VALUES (
            ?1, ?2, ?3, ?4,
            ?5, ?6, ?7, ?8, ?9,
            ?10, ?11, ?12, ?13,
            ?14, ?15, ?16,
            ?17, ?18, ?19, ?20,
            ?21, ?22, ?23,
            ?24, ?25, ?26, ?27, ?28
        )
        "#,
        ORDER_COLUMNS
    ))
    .bind(&order.id)
    .bind(&order.tenant_id)
    .bind(order.scope)
    .bind(order.stage)
    .bind(&order.title)
    .bind(&order.product_id)
    .bind(&order.variant_id)
    .bind(&order.supplier_id)
    .bind(&order.variant_label)
    .bind(order.kolicina)
    .bind(order.nabavna_cena.cents())
    .bind(order.prodajna_cena.cents())
    .bind(order.manual_prodajna)
    .bind(&order.customer_name)
    .bind(&order.customer_address)
    .bind(&order.customer_phone)
    .bind(order.transport_cost.map(|m| m.cents()))
    .bind(order.transport_mode)
    .bind(order.slanje_mode)
    .bind(&order.slanje_owner)
    .bind(&order.broj_posiljke)
    .bind(order.povrat_vracen)
    .bind(order.pickup)
    .bind(order.my_profit_percent)
    .bind(&order.note)
    .bind(order.sort_index)
    .bind(order.created_at)
    .bind(order.updated_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

async fn update_order_row(conn: &mut SqliteConnection, order: &Order) -> DbResult<()> {
    debug!(order_id = %order.id, "Updating order");

    sqlx::query(
        r#"
        UPDATE orders SET
            stage = ?2,
            title = ?3, product_id = ?4, variant_id = ?5, supplier_id = ?6,
            variant_label = ?7, kolicina = ?8,
            nabavna_cena_cents = ?9, prodajna_cena_cents = ?10, manual_prodajna = ?11,
            customer_name = ?12, customer_address = ?13, customer_phone = ?14,
            transport_cost_cents = ?15, transport_mode = ?16,
            slanje_mode = ?17, slanje_owner = ?18, broj_posiljke = ?19,
            povrat_vracen = ?20, pickup = ?21,
            my_profit_percent = ?22, note = ?23,
            updated_at = ?24
        WHERE id = ?1
        "#,
    )
    .bind(&order.id)
    .bind(order.stage)
    .bind(&order.title)
    .bind(&order.product_id)
    .bind(&order.variant_id)
    .bind(&order.supplier_id)
    .bind(&order.variant_label)
    .bind(order.kolicina)
    .bind(order.nabavna_cena.cents())
    .bind(order.prodajna_cena.cents())
    .bind(order.manual_prodajna)
    .bind(&order.customer_name)
    .bind(&order.customer_address)
    .bind(&order.customer_phone)
    .bind(order.transport_cost.map(|m| m.cents()))
    .bind(order.transport_mode)
    .bind(order.slanje_mode)
    .bind(&order.slanje_owner)
    .bind(&order.broj_posiljke)
    .bind(order.povrat_vracen)
    .bind(order.pickup)
    .bind(order.my_profit_percent)
    .bind(&order.note)
    .bind(order.updated_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

async fn insert_items(conn: &mut SqliteConnection, order: &Order) -> DbResult<()> {
    for (position, item) in order.items.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO order_items (
                order_id, id, position, product_id, variant_id, supplier_id,
                title, variant_label, kolicina,
                nabavna_cena_cents, prodajna_cena_cents, manual_prodajna
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
        )
        .bind(&order.id)
        .bind(&item.id)
        .bind(position as i64)
        .bind(&item.product_id)
        .bind(&item.variant_id)
        .bind(&item.supplier_id)
        .bind(&item.title)
        .bind(&item.variant_label)
        .bind(item.kolicina)
        .bind(item.nabavna_cena.cents())
        .bind(item.prodajna_cena.cents())
        .bind(item.manual_prodajna)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
