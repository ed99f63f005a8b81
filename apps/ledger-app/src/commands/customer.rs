//! # Customer Suggestion Commands

use tracing::debug;

use crate::error::ApiResult;
use crate::state::AppState;
use ledger_core::validation::validate_search_query;
use ledger_core::{Customer, Scope};

/// Default number of suggestions.
pub const DEFAULT_SUGGESTION_LIMIT: usize = 10;

/// Upper bound on `limit`.
pub const MAX_SUGGESTION_LIMIT: usize = 50;

/// Customers matching the query on name, address or phone, most recently
/// used first. An empty query returns the most recent customers.
pub async fn suggest_customers(
    state: &AppState,
    token: &str,
    scope: Scope,
    query: &str,
    limit: Option<usize>,
) -> ApiResult<Vec<Customer>> {
    let session = state.authorize(token)?;
    let query = validate_search_query(query)?;
    let limit = limit
        .unwrap_or(DEFAULT_SUGGESTION_LIMIT)
        .clamp(1, MAX_SUGGESTION_LIMIT);

    debug!(tenant = %session.tenant_id, query = %query, limit, "suggest_customers command");

    let customers = state
        .db()
        .customers()
        .search(&session.tenant_id, scope, &query, limit)
        .await?;
    Ok(customers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::order::create_order;
    use crate::commands::tests::{test_state, TOKEN_A};
    use ledger_core::{OrderInput, OrderItemInput};

    fn order_for(name: &str, address: &str, phone: &str) -> OrderInput {
        OrderInput {
            items: vec![OrderItemInput {
                title: Some("Šolja".to_string()),
                prodajna_cena: Some(12.0),
                ..Default::default()
            }],
            customer_name: name.to_string(),
            customer_address: address.to_string(),
            customer_phone: phone.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_suggestions_fold_diacritics() {
        let state = test_state().await;
        create_order(&state, TOKEN_A, Scope::Default, order_for("Đorđe Đurić", "Niš", "065 555 666"))
            .await
            .unwrap();
        create_order(&state, TOKEN_A, Scope::Default, order_for("Ana", "Subotica", "061 777 888"))
            .await
            .unwrap();

        let hits = suggest_customers(&state, TOKEN_A, Scope::Default, "djuric", None)
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Đorđe Đurić");

        // đ folds to dj, never a bare d
        let hits = suggest_customers(&state, TOKEN_A, Scope::Default, "duric", None)
            .await
            .unwrap();
        assert!(hits.is_empty());

        let hits = suggest_customers(&state, TOKEN_A, Scope::Default, "nis", None)
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);

        let recent = suggest_customers(&state, TOKEN_A, Scope::Default, "", Some(1))
            .await
            .unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].name, "Ana");
    }
}
