//! # Order Commands
//!
//! create / update / remove / get / list / by-product / reorder.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ApiResult;
use crate::state::AppState;
use ledger_core::validation::validate_search_query;
use ledger_core::{list_orders, ListFilter, Order, OrderInput, OrderPage, OrderView, PageRequest, Scope};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCreated {
    pub id: String,
}

/// Filters plus paging for `list_orders`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListOrdersRequest {
    #[serde(flatten)]
    pub filter: ListFilter,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReorderRequest {
    /// Top of the list first.
    pub ids: Vec<String>,
    /// Index given to the first id; current time in milliseconds if absent.
    pub base: Option<i64>,
}

pub async fn create_order(
    state: &AppState,
    token: &str,
    scope: Scope,
    input: OrderInput,
) -> ApiResult<OrderCreated> {
    let session = state.authorize(token)?;
    debug!(tenant = %session.tenant_id, scope = scope.as_str(), "create_order command");

    let order = state.db().orders().create(&session.tenant_id, scope, &input).await?;
    Ok(OrderCreated { id: order.id })
}

pub async fn update_order(
    state: &AppState,
    token: &str,
    scope: Scope,
    id: &str,
    input: OrderInput,
) -> ApiResult<()> {
    let session = state.authorize(token)?;
    debug!(tenant = %session.tenant_id, order_id = %id, "update_order command");

    state.db().orders().update(&session.tenant_id, scope, id, &input).await?;
    Ok(())
}

pub async fn remove_order(state: &AppState, token: &str, scope: Scope, id: &str) -> ApiResult<()> {
    let session = state.authorize(token)?;
    debug!(tenant = %session.tenant_id, order_id = %id, "remove_order command");

    state.db().orders().remove(&session.tenant_id, scope, id).await?;
    Ok(())
}

/// The order with resolved items and computed totals, or `None` if it isn't
/// visible to the caller.
pub async fn get_order(
    state: &AppState,
    token: &str,
    scope: Scope,
    id: &str,
) -> ApiResult<Option<OrderView>> {
    let session = state.authorize(token)?;
    let order = state.db().orders().get(&session.tenant_id, scope, id).await?;
    Ok(order.map(OrderView::from))
}

/// One page of the filtered orders plus totals over every match.
pub async fn list_orders_page(
    state: &AppState,
    token: &str,
    scope: Scope,
    request: ListOrdersRequest,
) -> ApiResult<OrderPage> {
    let session = state.authorize(token)?;

    let mut filter = request.filter;
    if let Some(search) = filter.search.take() {
        let search = validate_search_query(&search)?;
        filter.search = (!search.is_empty()).then_some(search);
    }
    let page_request = PageRequest::new(request.page, request.page_size, state.config().page_size);

    let orders = state.db().orders().list_all(&session.tenant_id, scope).await?;
    let page = list_orders(orders, &filter, page_request);

    debug!(
        tenant = %session.tenant_id,
        scope = scope.as_str(),
        matched = page.pagination.total_items,
        page = page.pagination.page,
        "list_orders command"
    );
    Ok(page)
}

pub async fn orders_by_product(
    state: &AppState,
    token: &str,
    scope: Scope,
    product_id: &str,
) -> ApiResult<Vec<Order>> {
    let session = state.authorize(token)?;
    let orders = state
        .db()
        .orders()
        .by_product(&session.tenant_id, scope, product_id.trim())
        .await?;
    Ok(orders)
}

pub async fn reorder_orders(
    state: &AppState,
    token: &str,
    scope: Scope,
    request: ReorderRequest,
) -> ApiResult<()> {
    let session = state.authorize(token)?;

    state
        .db()
        .orders()
        .reorder(&session.tenant_id, scope, &request.ids, request.base)
        .await?;

    info!(tenant = %session.tenant_id, count = request.ids.len(), "reorder_orders command");
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::tests::{test_state, TOKEN_A, TOKEN_B};
    use crate::error::ErrorCode;
    use chrono::NaiveDate;
    use ledger_core::{OrderItemInput, Stage, TransportMode};

    fn input(title: &str, stage: Stage) -> OrderInput {
        OrderInput {
            title: title.to_string(),
            stage,
            items: vec![OrderItemInput {
                title: Some(title.to_string()),
                kolicina: Some(2.0),
                nabavna_cena: Some(10.0),
                prodajna_cena: Some(25.0),
                ..Default::default()
            }],
            customer_name: "Petar".to_string(),
            transport_cost: Some(5.0),
            my_profit_percent: Some(40.0),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_unknown_token_is_rejected_first() {
        let state = test_state().await;
        let err = create_order(&state, "bogus", Scope::Default, OrderInput::default())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Unauthorized);
    }

    #[tokio::test]
    async fn test_pickup_with_transport_mode_is_rejected() {
        let state = test_state().await;
        let mut order = input("Lampa", Stage::Poruceno);
        order.pickup = true;
        order.transport_mode = Some(TransportMode::Smg);

        let err = create_order(&state, TOKEN_A, Scope::Default, order.clone())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        order.transport_mode = None;
        let created = create_order(&state, TOKEN_A, Scope::Default, order).await.unwrap();
        let view = get_order(&state, TOKEN_A, Scope::Default, &created.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(view.order.transport_cost, None);
    }

    #[tokio::test]
    async fn test_oversized_line_total_is_a_validation_error() {
        let state = test_state().await;
        let mut order = input("Zlatna lampa", Stage::Poruceno);
        order.items[0].kolicina = Some(1e6);
        order.items[0].prodajna_cena = Some(1e14);

        let err = create_order(&state, TOKEN_A, Scope::Default, order).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        // nothing was stored, so listing still works
        let page = list_orders_page(&state, TOKEN_A, Scope::Default, ListOrdersRequest::default())
            .await
            .unwrap();
        assert_eq!(page.pagination.total_items, 0);
    }

    #[tokio::test]
    async fn test_tenant_comes_from_session() {
        let state = test_state().await;
        let created = create_order(&state, TOKEN_A, Scope::Default, input("Lampa", Stage::Poruceno))
            .await
            .unwrap();

        assert!(get_order(&state, TOKEN_B, Scope::Default, &created.id)
            .await
            .unwrap()
            .is_none());

        let err = update_order(&state, TOKEN_B, Scope::Default, &created.id, input("X", Stage::Poruceno))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);

        let err = remove_order(&state, TOKEN_B, Scope::Default, &created.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);

        remove_order(&state, TOKEN_A, Scope::Default, &created.id).await.unwrap();
    }

    #[tokio::test]
    async fn test_get_resolves_totals() {
        let state = test_state().await;
        let created = create_order(&state, TOKEN_A, Scope::Default, input("Lampa", Stage::LeglePare))
            .await
            .unwrap();

        let view = get_order(&state, TOKEN_A, Scope::Default, &created.id)
            .await
            .unwrap()
            .unwrap();
        // 2 × 25 − 2 × 10 − 5 transport = 25, 40% of it
        assert_eq!(view.summary.total_qty, 2);
        assert_eq!(view.profit.cents(), 2500);
        assert_eq!(view.my_share.cents(), 1000);
    }

    #[tokio::test]
    async fn test_list_totals_cover_every_page() {
        let state = test_state().await;
        for i in 0..3 {
            create_order(&state, TOKEN_A, Scope::Default, input(&format!("Lampa {}", i), Stage::Poslato))
                .await
                .unwrap();
        }
        create_order(&state, TOKEN_A, Scope::Default, input("Stolica", Stage::Poslato))
            .await
            .unwrap();

        let page = list_orders_page(
            &state,
            TOKEN_A,
            Scope::Default,
            ListOrdersRequest {
                filter: ListFilter {
                    search: Some("  LAMPA ".to_string()),
                    ..Default::default()
                },
                page: Some(1),
                page_size: Some(2),
            },
        )
        .await
        .unwrap();

        assert_eq!(page.items.len(), 2);
        assert_eq!(page.pagination.total_items, 3);
        assert_eq!(page.pagination.total_pages, 2);
        assert_eq!(page.totals.nabavno.cents(), 3 * 2000);
        assert_eq!(page.totals.prodajno.cents(), 3 * 5000);
    }

    #[tokio::test]
    async fn test_reversed_dates_match_ordered_dates() {
        let state = test_state().await;
        create_order(&state, TOKEN_A, Scope::Default, input("Lampa", Stage::Poruceno))
            .await
            .unwrap();

        let today = chrono::Utc::now().date_naive();
        let earlier = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let request = |from, to| ListOrdersRequest {
            filter: ListFilter {
                date_from: Some(from),
                date_to: Some(to),
                ..Default::default()
            },
            ..Default::default()
        };

        let ordered = list_orders_page(&state, TOKEN_A, Scope::Default, request(earlier, today))
            .await
            .unwrap();
        let reversed = list_orders_page(&state, TOKEN_A, Scope::Default, request(today, earlier))
            .await
            .unwrap();
        assert_eq!(ordered.pagination.total_items, 1);
        assert_eq!(ordered, reversed);
    }

    #[tokio::test]
    async fn test_reorder_sequence_is_listed() {
        let state = test_state().await;
        let mut ids = Vec::new();
        for title in ["a", "b", "c"] {
            ids.push(
                create_order(&state, TOKEN_A, Scope::Default, input(title, Stage::Poruceno))
                    .await
                    .unwrap()
                    .id,
            );
        }

        let wanted = vec![ids[2].clone(), ids[0].clone(), ids[1].clone()];
        reorder_orders(
            &state,
            TOKEN_A,
            Scope::Default,
            ReorderRequest {
                ids: wanted.clone(),
                base: None,
            },
        )
        .await
        .unwrap();

        let page = list_orders_page(&state, TOKEN_A, Scope::Default, ListOrdersRequest::default())
            .await
            .unwrap();
        let listed: Vec<String> = page.items.iter().map(|v| v.order.id.clone()).collect();
        assert_eq!(listed, wanted);

        let err = reorder_orders(
            &state,
            TOKEN_B,
            Scope::Default,
            ReorderRequest {
                ids: wanted,
                base: Some(1),
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);
    }

    #[tokio::test]
    async fn test_search_query_too_long() {
        let state = test_state().await;
        let request = ListOrdersRequest {
            filter: ListFilter {
                search: Some("x".repeat(101)),
                ..Default::default()
            },
            ..Default::default()
        };
        let err = list_orders_page(&state, TOKEN_A, Scope::Default, request).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }
}
