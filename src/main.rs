//! Transfer Ledger gateway
//!
//! ```text
//! ┌──────────┐    ┌──────────┐    ┌────────────┐    ┌──────────┐
//! │   HTTP   │───▶│  Engine  │───▶│ Settlement │───▶│  Ledger  │
//! │ Gateway  │    │ (checks) │    │    Lock    │    │ (UoW)    │
//! └──────────┘    └──────────┘    └────────────┘    └──────────┘
//! ```
//!
//! Usage: `transfer_ledger [--env dev|prod] [--port N]`

use std::sync::Arc;

use anyhow::Context;

use transfer_ledger::config::AppConfig;
use transfer_ledger::db::Database;
use transfer_ledger::gateway::{self, AppState};
use transfer_ledger::logging::init_logging;
use transfer_ledger::store::{Ledger, MemoryLedger, PgLedger};

fn get_env() -> String {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if (args[i] == "--env" || args[i] == "-e") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }
    "dev".to_string()
}

/// Get port override from command line (--port argument)
fn get_port_override() -> Option<u16> {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if args[i] == "--port" && i + 1 < args.len() {
            return args[i + 1].parse().ok();
        }
    }
    None
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = get_env();
    let mut app_config = AppConfig::load(&env)?;
    if let Some(port) = get_port_override() {
        app_config.gateway.port = port;
    }
    let _log_guard = init_logging(&app_config);

    tracing::info!("Starting Transfer Ledger in {} mode", env);

    let (ledger, pg_db): (Arc<dyn Ledger>, Option<Database>) = match app_config.postgres_url {
        Some(ref url) => {
            let db = Database::connect(url)
                .await
                .context("Failed to connect to PostgreSQL")?;
            db.init_schema()
                .await
                .context("Failed to initialize schema")?;
            tracing::info!("PostgreSQL ledger ready");
            (Arc::new(PgLedger::new(db.clone())), Some(db))
        }
        None => {
            tracing::warn!("postgres_url not set, balances live in memory only");
            (Arc::new(MemoryLedger::new()), None)
        }
    };

    let lock = app_config.ledger.lock_strategy.build();
    let state = AppState::new(ledger, lock, app_config.ledger.limits(), pg_db);

    gateway::run_server(
        &app_config.gateway.host,
        app_config.gateway.port,
        Arc::new(state),
    )
    .await
}
