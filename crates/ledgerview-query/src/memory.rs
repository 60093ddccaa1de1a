//! In-memory ledger.
//!
//! A [`LedgerTransport`] over a map of accounts. Key discovery evaluates byte
//! filters exactly as the remote ledger would; every batch load advances the
//! slot by one. Fault hooks make closed accounts, transport failures and slow
//! responses reproducible offline.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use ledgerview_filter::ByteFilter;
use ledgerview_types::{Pubkey, Slot, TransportError};
use tracing::trace;

use crate::transport::{AccountBatch, LedgerTransport};

#[derive(Debug, Clone)]
struct StoredAccount {
    owner: Pubkey,
    data: Vec<u8>,
}

#[derive(Debug, Default)]
struct LedgerState {
    accounts: BTreeMap<Pubkey, StoredAccount>,
    slot: Slot,
    close_after_discovery: BTreeSet<Pubkey>,
    discovery_failure: Option<String>,
    batch_failures: HashMap<Pubkey, String>,
    latency: Option<Duration>,
    discovery_calls: usize,
    batch_calls: usize,
    largest_batch: usize,
}

/// Offline ledger holding accounts in memory.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    state: Mutex<LedgerState>,
}

impl InMemoryLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ledger whose first batch is served at `slot + 1`.
    #[must_use]
    pub fn at_slot(slot: Slot) -> Self {
        let ledger = Self::new();
        ledger.set_slot(slot);
        ledger
    }

    // The lock is never held across an await point.
    fn state(&self) -> MutexGuard<'_, LedgerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Store `data` under `key`, owned by `owner`. Replaces any previous account.
    pub fn insert(&self, owner: Pubkey, key: Pubkey, data: Vec<u8>) {
        self.state().accounts.insert(key, StoredAccount { owner, data });
    }

    /// Close an account. Returns its bytes if it existed.
    pub fn remove(&self, key: &Pubkey) -> Option<Vec<u8>> {
        self.state().accounts.remove(key).map(|a| a.data)
    }

    #[must_use]
    pub fn contains(&self, key: &Pubkey) -> bool {
        self.state().accounts.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.state().accounts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state().accounts.is_empty()
    }

    /// Close `key` right after the next discovery that returns it.
    pub fn close_after_discovery(&self, key: Pubkey) {
        self.state().close_after_discovery.insert(key);
    }

    /// Fail every discovery with `reason` until cleared.
    pub fn fail_discovery(&self, reason: impl Into<String>) {
        self.state().discovery_failure = Some(reason.into());
    }

    /// Fail every batch that requests `key`.
    pub fn fail_batches_containing(&self, key: Pubkey, reason: impl Into<String>) {
        self.state().batch_failures.insert(key, reason.into());
    }

    pub fn clear_failures(&self) {
        let mut state = self.state();
        state.discovery_failure = None;
        state.batch_failures.clear();
    }

    /// Delay every response by `latency`.
    pub fn set_latency(&self, latency: Duration) {
        self.state().latency = Some(latency);
    }

    pub fn set_slot(&self, slot: Slot) {
        self.state().slot = slot;
    }

    #[must_use]
    pub fn slot(&self) -> Slot {
        self.state().slot
    }

    #[must_use]
    pub fn discovery_calls(&self) -> usize {
        self.state().discovery_calls
    }

    #[must_use]
    pub fn batch_calls(&self) -> usize {
        self.state().batch_calls
    }

    /// Most keys requested by a single batch so far.
    #[must_use]
    pub fn largest_batch(&self) -> usize {
        self.state().largest_batch
    }

    async fn delay(&self) {
        let latency = self.state().latency;
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl LedgerTransport for InMemoryLedger {
    async fn discover_keys(
        &self,
        program_id: &Pubkey,
        filters: &[ByteFilter],
    ) -> Result<Vec<Pubkey>, TransportError> {
        self.delay().await;
        let mut state = self.state();
        state.discovery_calls += 1;
        if let Some(reason) = &state.discovery_failure {
            return Err(TransportError::new(reason.clone()));
        }

        let keys: Vec<Pubkey> = state
            .accounts
            .iter()
            .filter(|(_, account)| account.owner == *program_id)
            .filter(|(_, account)| filters.iter().all(|f| f.matches(&account.data)))
            .map(|(key, _)| *key)
            .collect();

        for key in &keys {
            if state.close_after_discovery.remove(key) {
                trace!(key = %key.short(), "closing account after discovery");
                state.accounts.remove(key);
            }
        }
        Ok(keys)
    }

    async fn get_accounts_batch(&self, keys: &[Pubkey]) -> Result<AccountBatch, TransportError> {
        self.delay().await;
        let mut state = self.state();
        state.batch_calls += 1;
        state.largest_batch = state.largest_batch.max(keys.len());
        if let Some((key, reason)) = keys
            .iter()
            .find_map(|k| state.batch_failures.get(k).map(|r| (*k, r.clone())))
        {
            return Err(TransportError::for_key(key, reason));
        }

        state.slot = state.slot.next();
        let accounts = keys
            .iter()
            .map(|k| state.accounts.get(k).map(|a| a.data.clone()))
            .collect();
        Ok(AccountBatch::new(accounts, state.slot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OWNER: Pubkey = Pubkey::new([1; 32]);

    #[tokio::test]
    async fn discovery_applies_owner_and_filters() {
        let ledger = InMemoryLedger::new();
        ledger.insert(OWNER, Pubkey([10; 32]), vec![1, 2, 3]);
        ledger.insert(OWNER, Pubkey([11; 32]), vec![1, 9, 3]);
        ledger.insert(Pubkey([2; 32]), Pubkey([12; 32]), vec![1, 2, 3]);

        let keys = ledger
            .discover_keys(&OWNER, &[ByteFilter::new(1, vec![2])])
            .await
            .unwrap();
        assert_eq!(keys, vec![Pubkey([10; 32])]);
        assert_eq!(ledger.discovery_calls(), 1);
    }

    #[tokio::test]
    async fn batches_advance_slot_and_report_missing() {
        let ledger = InMemoryLedger::at_slot(Slot(100));
        ledger.insert(OWNER, Pubkey([10; 32]), vec![7]);

        let first = ledger
            .get_accounts_batch(&[Pubkey([10; 32]), Pubkey([99; 32])])
            .await
            .unwrap();
        assert_eq!(first.slot, Slot(101));
        assert_eq!(first.accounts, vec![Some(vec![7]), None]);

        let second = ledger.get_accounts_batch(&[Pubkey([10; 32])]).await.unwrap();
        assert_eq!(second.slot, Slot(102));
    }

    #[tokio::test]
    async fn close_after_discovery_removes_account() {
        let ledger = InMemoryLedger::new();
        let key = Pubkey([10; 32]);
        ledger.insert(OWNER, key, vec![7]);
        ledger.close_after_discovery(key);

        assert_eq!(ledger.discover_keys(&OWNER, &[]).await.unwrap(), vec![key]);
        assert!(!ledger.contains(&key));
        let batch = ledger.get_accounts_batch(&[key]).await.unwrap();
        assert_eq!(batch.accounts, vec![None]);
    }

    #[tokio::test]
    async fn injected_failures() {
        let ledger = InMemoryLedger::new();
        let key = Pubkey([10; 32]);
        ledger.insert(OWNER, key, vec![7]);
        ledger.fail_batches_containing(key, "node unhealthy");
        let err = ledger.get_accounts_batch(&[key]).await.unwrap_err();
        assert_eq!(err.key, Some(key));

        ledger.fail_discovery("rate limited");
        assert!(ledger.discover_keys(&OWNER, &[]).await.is_err());

        ledger.clear_failures();
        assert!(ledger.discover_keys(&OWNER, &[]).await.is_ok());
        assert!(ledger.get_accounts_batch(&[key]).await.is_ok());
    }
}
