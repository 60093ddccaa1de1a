//! Ledger transport boundary.
//!
//! The transport owns the wire: key discovery with server-side byte filters
//! and bulk account loads. Retry and backoff live behind this trait, never
//! in the query engine.

use async_trait::async_trait;
use ledgerview_filter::ByteFilter;
use ledgerview_types::{Pubkey, Slot, TransportError};

/// Result of one bulk account request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountBatch {
    /// Account bytes in request order; `None` for accounts that no longer exist.
    pub accounts: Vec<Option<Vec<u8>>>,
    /// Slot the batch was read at.
    pub slot: Slot,
}

impl AccountBatch {
    #[must_use]
    pub fn new(accounts: Vec<Option<Vec<u8>>>, slot: Slot) -> Self {
        Self { accounts, slot }
    }
}

/// Request/response access to the ledger.
#[async_trait]
pub trait LedgerTransport: Send + Sync {
    /// Keys of every account owned by `program_id` whose bytes satisfy all
    /// `filters`. No account data is transferred.
    async fn discover_keys(
        &self,
        program_id: &Pubkey,
        filters: &[ByteFilter],
    ) -> Result<Vec<Pubkey>, TransportError>;

    /// Account bytes for `keys`, one entry per key, plus the slot read at.
    async fn get_accounts_batch(&self, keys: &[Pubkey]) -> Result<AccountBatch, TransportError>;
}
