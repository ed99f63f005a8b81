//! # Shipping Owner Commands

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ApiResult;
use crate::state::AppState;
use ledger_core::{owner_suggestions, Money, OwnerSuggestion, Scope};

/// Response of `upsert_shipping_account`. `value` is the owner display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAccountSaved {
    pub id: String,
    pub value: String,
    pub owner_key: String,
    pub starting_amount: Money,
}

/// Known owners (from orders of any stage and from the account registry),
/// most used first.
pub async fn shipping_owners(
    state: &AppState,
    token: &str,
    scope: Scope,
) -> ApiResult<Vec<OwnerSuggestion>> {
    let session = state.authorize(token)?;

    let orders = state.db().orders().list_all(&session.tenant_id, scope).await?;
    let accounts = state.db().shipping_accounts().list(&session.tenant_id, scope).await?;
    Ok(owner_suggestions(scope, &orders, &accounts))
}

/// Registers or overwrites an owner's starting balance.
pub async fn upsert_shipping_account(
    state: &AppState,
    token: &str,
    scope: Scope,
    owner_name: &str,
    starting_amount: f64,
) -> ApiResult<ShippingAccountSaved> {
    let session = state.authorize(token)?;

    let account = state
        .db()
        .shipping_accounts()
        .upsert(&session.tenant_id, scope, owner_name, starting_amount)
        .await?;

    info!(tenant = %session.tenant_id, owner_key = %account.owner_key, "upsert_shipping_account command");
    Ok(ShippingAccountSaved {
        id: account.id,
        value: account.owner_name,
        owner_key: account.owner_key,
        starting_amount: account.starting_amount,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::order::create_order;
    use crate::commands::tests::{test_state, TOKEN_A, TOKEN_B};
    use crate::error::ErrorCode;
    use ledger_core::{OrderInput, OrderItemInput, Stage, TransportMode};

    #[tokio::test]
    async fn test_upsert_validates_and_overwrites() {
        let state = test_state().await;

        let err = upsert_shipping_account(&state, TOKEN_A, Scope::Default, " ", 1.0)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        let err = upsert_shipping_account(&state, TOKEN_A, Scope::Default, "Ana", -1.0)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let first = upsert_shipping_account(&state, TOKEN_A, Scope::Default, "Ana", 10.0)
            .await
            .unwrap();
        let second = upsert_shipping_account(&state, TOKEN_A, Scope::Default, "ANA", 12.5)
            .await
            .unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(second.value, "ANA");
        assert_eq!(second.starting_amount.cents(), 1_250);
    }

    #[tokio::test]
    async fn test_owners_include_legacy_and_accounts() {
        let state = test_state().await;
        let legacy = OrderInput {
            items: vec![OrderItemInput {
                title: Some("Duks".to_string()),
                prodajna_cena: Some(30.0),
                ..Default::default()
            }],
            customer_name: "Kupac".to_string(),
            stage: Stage::Poruceno,
            transport_mode: Some(TransportMode::Kol),
            ..Default::default()
        };
        create_order(&state, TOKEN_A, Scope::Default, legacy).await.unwrap();
        upsert_shipping_account(&state, TOKEN_A, Scope::Default, "Zoran", 5.0)
            .await
            .unwrap();

        let owners = shipping_owners(&state, TOKEN_A, Scope::Default).await.unwrap();
        let names: Vec<&str> = owners.iter().map(|o| o.owner_name.as_str()).collect();
        assert_eq!(names, vec!["Kol", "Zoran"]);
        assert_eq!(owners[0].order_count, 1);
        assert!(owners[1].has_account);

        assert!(shipping_owners(&state, TOKEN_B, Scope::Default).await.unwrap().is_empty());
    }
}
