//! # Report Commands
//!
//! Paid-order summary and the shipping settlement (obracun). Both run as
//! independent table scans merged in memory.

use chrono::Utc;
use tracing::debug;

use crate::error::ApiResult;
use crate::state::AppState;
use ledger_core::{ObracunReport, Scope, ScopeSummary};

/// Aggregate totals across every paid order of the scope.
pub async fn summary(state: &AppState, token: &str, scope: Scope) -> ApiResult<ScopeSummary> {
    let session = state.authorize(token)?;

    let orders = state.db().orders().list_all(&session.tenant_id, scope).await?;
    let summary = ScopeSummary::build(scope, &orders);

    debug!(
        tenant = %session.tenant_id,
        scope = scope.as_str(),
        paid = summary.order_count,
        "summary command"
    );
    Ok(summary)
}

/// Settlement per shipping owner: carrier accounts (with starting balances)
/// and mail.
pub async fn obracun(state: &AppState, token: &str, scope: Scope) -> ApiResult<ObracunReport> {
    let session = state.authorize(token)?;

    let orders = state.db().orders().list_all(&session.tenant_id, scope).await?;
    let accounts = state.db().shipping_accounts().list(&session.tenant_id, scope).await?;
    let report = ObracunReport::build(scope, &orders, &accounts, Utc::now());

    debug!(
        tenant = %session.tenant_id,
        scope = scope.as_str(),
        owners = report.carrier_accounts.owners.len(),
        skipped = report.meta.skipped_orders,
        "obracun command"
    );
    Ok(report)
}

// =============================================================================
// Unit Tests
// =============================================================================
