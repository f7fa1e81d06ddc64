use std::sync::Arc;

use crate::account::AccountService;
use crate::db::Database;
use crate::store::Ledger;
use crate::transfer::{SettlementLock, TransferEngine, TransferLimits, TransferService};

/// Gateway shared state
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<TransferEngine>,
    pub transfers: Arc<TransferService>,
    pub accounts: Arc<AccountService>,
    /// Backing ledger name, reported by the health check
    pub ledger_name: &'static str,
    /// PostgreSQL pool when the ledger is database-backed
    pub pg_db: Option<Database>,
}

impl AppState {
    pub fn new(
        ledger: Arc<dyn Ledger>,
        lock: Arc<dyn SettlementLock>,
        limits: TransferLimits,
        pg_db: Option<Database>,
    ) -> Self {
        Self {
            engine: Arc::new(TransferEngine::new(ledger.clone(), lock, limits)),
            transfers: Arc::new(TransferService::new(ledger.clone())),
            accounts: Arc::new(AccountService::new(ledger.clone())),
            ledger_name: ledger.name(),
            pg_db,
        }
    }
}
