//! # ledger-report
//!
//! Prints the paid-order summary and the obracun for one tenant and scope as
//! JSON on stdout. Logs go to stderr.
//!
//! ## Usage
//! ```bash
//! LEDGER_TOKEN=dev LEDGER_TENANT_ID=tenant-dev LEDGER_DB_PATH=./ledger_dev.db \
//!     cargo run -p ledger-app --bin ledger-report
//!
//! # Kalaba scope
//! LEDGER_SCOPE=kalaba ... cargo run -p ledger-app --bin ledger-report
//! ```

use serde_json::json;
use tracing::{error, info};

use ledger_app::commands::report::{obracun, summary};
use ledger_app::{init_tracing, ApiError, AppConfig, AppState};

#[tokio::main]
async fn main() {
    init_tracing();

    if let Err(e) = run().await {
        error!(error = %e, "Report failed");
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), ApiError> {
    let config = AppConfig::from_env()?;
    let token = config
        .token
        .clone()
        .ok_or_else(|| ApiError::validation("LEDGER_TOKEN must be set"))?;
    let scope = config.scope;

    info!(tenant = %config.tenant_id, scope = scope.as_str(), "Building report");
    let state = AppState::from_config(config).await?;

    let summary = summary(&state, &token, scope).await?;
    let obracun = obracun(&state, &token, scope).await?;

    let output = json!({ "summary": summary, "obracun": obracun });
    let rendered = serde_json::to_string_pretty(&output)
        .map_err(|e| ApiError::internal(e.to_string()))?;
    println!("{}", rendered);

    state.db().close().await;
    Ok(())
}
