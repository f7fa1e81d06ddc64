//! Settlement Locks
//!
//! Strategies for serializing the settlement section. The engine holds a
//! [`SettlementPermit`] from before the first account read until after commit;
//! dropping the permit releases the section on every exit path, including a
//! caller abandoning the future.
//!
//! - [`GlobalSettlementLock`]: one process-wide gate, any two settlements exclude each other
//! - [`AccountPairLock`]: one gate per account, taken in ascending id order

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::core_types::AccountId;

/// Proof of exclusive access to the accounts of one settlement
#[must_use = "the settlement section is released as soon as the permit is dropped"]
pub struct SettlementPermit {
    guards: Vec<OwnedMutexGuard<()>>,
}

impl SettlementPermit {
    fn new(guards: Vec<OwnedMutexGuard<()>>) -> Self {
        Self { guards }
    }

    /// Number of gates held by this permit
    pub fn gates(&self) -> usize {
        self.guards.len()
    }
}

/// Serialization strategy injected into the engine
#[async_trait]
pub trait SettlementLock: Send + Sync {
    /// Strategy name for logging
    fn name(&self) -> &'static str;

    /// Wait until the settlement of `source → destination` may run
    async fn acquire(&self, source: AccountId, destination: AccountId) -> SettlementPermit;
}

/// Lock strategy selected in config
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LockStrategy {
    #[default]
    Global,
    AccountPair,
}

impl LockStrategy {
    pub fn build(self) -> Arc<dyn SettlementLock> {
        match self {
            LockStrategy::Global => Arc::new(GlobalSettlementLock::new()),
            LockStrategy::AccountPair => Arc::new(AccountPairLock::new()),
        }
    }
}

/// Single process-wide gate
#[derive(Default)]
pub struct GlobalSettlementLock {
    gate: Arc<Mutex<()>>,
}

impl GlobalSettlementLock {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SettlementLock for GlobalSettlementLock {
    fn name(&self) -> &'static str {
        "global"
    }

    async fn acquire(&self, _source: AccountId, _destination: AccountId) -> SettlementPermit {
        let guard = self.gate.clone().lock_owned().await;
        SettlementPermit::new(vec![guard])
    }
}

/// One gate per account id
///
/// Both gates are taken in ascending id order, so two settlements over a
/// reversed pair cannot deadlock. A self-transfer takes its single gate once.
/// Gates are created on first use and kept for the life of the lock.
#[derive(Default)]
pub struct AccountPairLock {
    gates: DashMap<AccountId, Arc<Mutex<()>>>,
}

impl AccountPairLock {
    pub fn new() -> Self {
        Self::default()
    }

    fn gate(&self, id: AccountId) -> Arc<Mutex<()>> {
        // clone out so no map shard stays locked across the await
        self.gates
            .entry(id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .value()
            .clone()
    }

    /// Number of accounts that have a gate
    pub fn tracked_accounts(&self) -> usize {
        self.gates.len()
    }
}

#[async_trait]
impl SettlementLock for AccountPairLock {
    fn name(&self) -> &'static str {
        "account_pair"
    }

    async fn acquire(&self, source: AccountId, destination: AccountId) -> SettlementPermit {
        let mut ids = vec![source, destination];
        ids.sort();
        ids.dedup();

        let mut guards = Vec::with_capacity(ids.len());
        for id in ids {
            let gate = self.gate(id);
            guards.push(gate.lock_owned().await);
        }
        SettlementPermit::new(guards)
    }
}
