//! # Shipping Account Repository
//!
//! Manually maintained starting balances, one row per normalized owner key
//! per tenant and scope.
//!
//! ```text
//! upsert("Racun A", 100) ──► key "racun a" ──► INSERT
//! upsert("RAČUN A", 250) ──► key "racun a" ──► ON CONFLICT → overwrite
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use crate::error::DbResult;
use ledger_core::validation::{validate_owner_name, validate_starting_amount};
use ledger_core::{Money, Scope, ShippingAccount};

#[derive(Debug, sqlx::FromRow)]
struct ShippingAccountRow {
    id: String,
    tenant_id: String,
    scope: Scope,
    owner_key: String,
    owner_name: String,
    starting_amount_cents: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ShippingAccountRow> for ShippingAccount {
    fn from(row: ShippingAccountRow) -> Self {
        ShippingAccount {
            id: row.id,
            tenant_id: row.tenant_id,
            scope: row.scope,
            owner_key: row.owner_key,
            owner_name: row.owner_name,
            starting_amount: Money::from_cents(row.starting_amount_cents),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Repository for shipping account ledger entries.
#[derive(Debug, Clone)]
pub struct ShippingAccountRepository {
    pool: SqlitePool,
}

impl ShippingAccountRepository {
    /// Creates a new ShippingAccountRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ShippingAccountRepository { pool }
    }

    /// Registers or overwrites the starting balance for an owner.
    ///
    /// The display name is replaced by the latest spelling; `created_at` and
    /// `id` survive the overwrite.
    ///
    /// ## Errors
    /// Validation errors for a blank/short owner name or a negative or
    /// non-finite amount.
    pub async fn upsert(
        &self,
        tenant_id: &str,
        scope: Scope,
        owner_name: &str,
        starting_amount: f64,
    ) -> DbResult<ShippingAccount> {
        let owner_key = validate_owner_name(owner_name)?;
        let amount = validate_starting_amount(starting_amount)?;
        let now = Utc::now();

        let row: ShippingAccountRow = sqlx::query_as(
            r#"
            INSERT INTO shipping_accounts (
                id, tenant_id, scope, owner_key, owner_name,
                starting_amount_cents, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
            ON CONFLICT (tenant_id, scope, owner_key) DO UPDATE SET
                owner_name = excluded.owner_name,
                starting_amount_cents = excluded.starting_amount_cents,
                updated_at = excluded.updated_at
            RETURNING id, tenant_id, scope, owner_key, owner_name,
                      starting_amount_cents, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(tenant_id)
        .bind(scope)
        .bind(&owner_key)
        .bind(owner_name.trim())
        .bind(amount.cents())
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        info!(
            tenant = %tenant_id,
            scope = scope.as_str(),
            owner_key = %owner_key,
            starting_amount = %amount,
            "Shipping account saved"
        );

        Ok(row.into())
    }

    /// All accounts of a tenant and scope, by owner key.
    pub async fn list(&self, tenant_id: &str, scope: Scope) -> DbResult<Vec<ShippingAccount>> {
        let rows: Vec<ShippingAccountRow> = sqlx::query_as(
            r#"
            SELECT id, tenant_id, scope, owner_key, owner_name,
                   starting_amount_cents, created_at, updated_at
            FROM shipping_accounts
            WHERE tenant_id = ?1 AND scope = ?2
            ORDER BY owner_key
            "#,
        )
        .bind(tenant_id)
        .bind(scope)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ShippingAccount::from).collect())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::{Database, DbConfig};
    use ledger_core::CoreError;

    #[tokio::test]
    async fn test_upsert_overwrites_same_normalized_key() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let accounts = db.shipping_accounts();

        let first = accounts
            .upsert("tenant-a", Scope::Default, "Racun A", 100.0)
            .await
            .unwrap();
        let second = accounts
            .upsert("tenant-a", Scope::Default, " RAČUN a ", 250.5)
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.owner_key, "racun a");
        assert_eq!(second.owner_name, "RAČUN a");
        assert_eq!(second.starting_amount.cents(), 25050);

        let all = accounts.list("tenant-a", Scope::Default).await.unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn test_scopes_and_tenants_are_separate() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let accounts = db.shipping_accounts();

        accounts.upsert("tenant-a", Scope::Default, "Ana", 1.0).await.unwrap();
        accounts.upsert("tenant-a", Scope::Kalaba, "Ana", 2.0).await.unwrap();
        accounts.upsert("tenant-b", Scope::Default, "Ana", 3.0).await.unwrap();

        let kalaba = accounts.list("tenant-a", Scope::Kalaba).await.unwrap();
        assert_eq!(kalaba.len(), 1);
        assert_eq!(kalaba[0].starting_amount.cents(), 200);
    }

    #[tokio::test]
    async fn test_invalid_input_is_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let accounts = db.shipping_accounts();

        let err = accounts
            .upsert("tenant-a", Scope::Default, "  ", 10.0)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::Validation(_))));

        assert!(accounts
            .upsert("tenant-a", Scope::Default, "Ana", -5.0)
            .await
            .is_err());
        assert!(accounts
            .upsert("tenant-a", Scope::Default, "Ana", f64::NAN)
            .await
            .is_err());
        assert!(accounts.list("tenant-a", Scope::Default).await.unwrap().is_empty());
    }
}
