//! The account query engine.
//!
//! ## Pipeline
//!
//! ```text
//! criteria → compile → discover_keys → chunk → get_accounts_batch (concurrent)
//!          → drop closed → decode (drop failures) → optional sort → FetchResult
//! ```
//!
//! Key discovery happens before any account bytes are requested. All chunk
//! requests of one call run concurrently and are merged only once every one
//! has completed; the first transport failure aborts the call and drops the
//! outstanding requests. Records come back in key-discovery order.
//!
//! The reported slot is the minimum across chunk responses. Chunks may be
//! served at different slots, so this is a conservative watermark rather
//! than a single-snapshot guarantee.

use std::cmp::Ordering;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use futures::future::try_join_all;
use ledgerview_filter::{ByteCriterion, ByteFilter, FieldFilter, compile, ensure_disjoint};
use ledgerview_types::{
    AccountLayout, LedgerviewError, Pubkey, QueryConfig, Result, Slot, constants,
};
use tracing::{debug, trace, warn};

use crate::codec::{AccountCodec, LayoutCodec};
use crate::transport::{AccountBatch, LedgerTransport};

/// One decoded account.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountRecord<T> {
    pub key: Pubkey,
    /// Raw account bytes as loaded.
    pub data: Vec<u8>,
    pub account: T,
    /// Slot of the batch this account was read in.
    pub slot: Slot,
}

/// Outcome of a successful fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchResult<T> {
    pub records: Vec<AccountRecord<T>>,
    /// Minimum slot across batch responses; `None` when nothing was loaded.
    pub slot: Option<Slot>,
    /// Accounts dropped because they were closed or failed to decode.
    pub skipped: usize,
}

impl<T> FetchResult<T> {
    #[must_use]
    pub fn empty() -> Self {
        Self {
            records: Vec::new(),
            slot: None,
            skipped: 0,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &Pubkey> {
        self.records.iter().map(|r| &r.key)
    }

    pub fn accounts(&self) -> impl Iterator<Item = &T> {
        self.records.iter().map(|r| &r.account)
    }

    #[must_use]
    pub fn into_accounts(self) -> Vec<T> {
        self.records.into_iter().map(|r| r.account).collect()
    }

    /// Stable sort by decoded account.
    pub fn sort_by<F>(&mut self, mut compare: F)
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        self.records.sort_by(|a, b| compare(&a.account, &b.account));
    }
}

impl<T> Default for FetchResult<T> {
    fn default() -> Self {
        Self::empty()
    }
}

/// Generic query over every account of type `T` owned by one program.
///
/// Typed entity queries wrap this with their own criteria; ad-hoc byte
/// criteria can also be attached directly with [`with_criterion`](Self::with_criterion).
pub struct AccountQuery<T> {
    program_id: Pubkey,
    transport: Arc<dyn LedgerTransport>,
    codec: Arc<dyn AccountCodec<T>>,
    config: QueryConfig,
    criteria: Vec<FieldFilter>,
    _account: PhantomData<fn() -> T>,
}

impl<T: AccountLayout> AccountQuery<T> {
    /// Query with the layout codec and default configuration.
    #[must_use]
    pub fn new(program_id: Pubkey, transport: Arc<dyn LedgerTransport>) -> Self {
        Self {
            program_id,
            transport,
            codec: Arc::new(LayoutCodec),
            config: QueryConfig::default(),
            criteria: Vec::new(),
            _account: PhantomData,
        }
    }

    #[must_use]
    pub fn with_codec(mut self, codec: Arc<dyn AccountCodec<T>>) -> Self {
        self.codec = codec;
        self
    }

    pub fn with_config(mut self, config: QueryConfig) -> Result<Self> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    /// Attach an ad-hoc byte criterion.
    ///
    /// Rejected immediately if it intrudes on the discriminator or overlaps
    /// a criterion already attached.
    pub fn with_criterion(mut self, criterion: FieldFilter) -> Result<Self> {
        let discriminator = FieldFilter::new(0, T::discriminator().to_vec())?;
        ensure_disjoint(&discriminator, &criterion)?;
        for existing in &self.criteria {
            ensure_disjoint(existing, &criterion)?;
        }
        self.criteria.push(criterion);
        Ok(self)
    }

    #[must_use]
    pub fn program_id(&self) -> &Pubkey {
        &self.program_id
    }

    #[must_use]
    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    /// Compiled filters for this query plus `extra` criteria.
    pub fn filters(&self, extra: &[&dyn ByteCriterion]) -> Result<Vec<ByteFilter>> {
        let mut all: Vec<&dyn ByteCriterion> = Vec::with_capacity(self.criteria.len() + extra.len());
        all.extend(self.criteria.iter().map(|c| c as &dyn ByteCriterion));
        all.extend_from_slice(extra);
        compile(&T::discriminator(), &all)
    }

    // =================================================================
    // Key discovery
    // =================================================================

    pub async fn fetch_keys(&self) -> Result<Vec<Pubkey>> {
        self.fetch_keys_matching(&[]).await
    }

    /// Keys of every account matching this query and `extra`.
    pub async fn fetch_keys_matching(&self, extra: &[&dyn ByteCriterion]) -> Result<Vec<Pubkey>> {
        let filters = self.filters(extra)?;
        self.with_deadline(self.discover(&filters)).await
    }

    // =================================================================
    // Full fetch
    // =================================================================

    pub async fn fetch(&self) -> Result<FetchResult<T>> {
        self.fetch_matching(&[]).await
    }

    /// Discover matching keys, then load and decode their accounts.
    pub async fn fetch_matching(&self, extra: &[&dyn ByteCriterion]) -> Result<FetchResult<T>> {
        let filters = self.filters(extra)?;
        self.with_deadline(async {
            let keys = self.discover(&filters).await?;
            self.load(&keys).await
        })
        .await
    }

    /// [`fetch_matching`](Self::fetch_matching) followed by a stable sort.
    pub async fn fetch_sorted_matching<F>(
        &self,
        extra: &[&dyn ByteCriterion],
        compare: F,
    ) -> Result<FetchResult<T>>
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        let mut result = self.fetch_matching(extra).await?;
        result.sort_by(compare);
        Ok(result)
    }

    /// Fetch, giving up with [`LedgerviewError::Cancelled`] as soon as
    /// `cancel` resolves. Outstanding requests are dropped.
    pub async fn fetch_until<C>(&self, extra: &[&dyn ByteCriterion], cancel: C) -> Result<FetchResult<T>>
    where
        C: Future<Output = ()>,
    {
        tokio::select! {
            biased;
            () = cancel => {
                debug!(account_type = T::TYPE_NAME, "fetch cancelled by caller");
                Err(LedgerviewError::Cancelled)
            }
            result = self.fetch_matching(extra) => result,
        }
    }

    /// Load and decode accounts for keys the caller already holds.
    pub async fn fetch_accounts(&self, keys: &[Pubkey]) -> Result<FetchResult<T>> {
        self.with_deadline(self.load(keys)).await
    }

    // =================================================================
    // Internals
    // =================================================================

    async fn with_deadline<R, F>(&self, fut: F) -> Result<R>
    where
        F: Future<Output = Result<R>>,
    {
        let Some(limit) = self.config.timeout() else {
            return fut.await;
        };
        if let Ok(result) = tokio::time::timeout(limit, fut).await {
            result
        } else {
            let ms = self.config.timeout_ms.unwrap_or_default();
            warn!(account_type = T::TYPE_NAME, timeout_ms = ms, "query deadline exceeded");
            Err(LedgerviewError::Timeout { ms })
        }
    }

    async fn discover(&self, filters: &[ByteFilter]) -> Result<Vec<Pubkey>> {
        let keys = self
            .transport
            .discover_keys(&self.program_id, filters)
            .await
            .map_err(|err| {
                warn!(account_type = T::TYPE_NAME, error = %err, "key discovery failed");
                LedgerviewError::KeyDiscoveryFailed {
                    reason: err.to_string(),
                }
            })?;
        debug!(
            account_type = T::TYPE_NAME,
            filters = filters.len(),
            keys = keys.len(),
            "discovered keys"
        );
        Ok(keys)
    }

    async fn load(&self, keys: &[Pubkey]) -> Result<FetchResult<T>> {
        if keys.is_empty() {
            return Ok(FetchResult::empty());
        }
        let chunk_size = self.config.chunk_size.max(1);
        let batches = try_join_all(keys.chunks(chunk_size).map(|chunk| self.fetch_chunk(chunk))).await?;
        let slot = batches.iter().map(|b| b.slot).min();

        let mut records = Vec::with_capacity(keys.len());
        let mut skipped = 0usize;
        for (chunk, batch) in keys.chunks(chunk_size).zip(batches) {
            let batch_slot = batch.slot;
            for (key, data) in chunk.iter().zip(batch.accounts) {
                let Some(data) = data else {
                    trace!(key = %key.short(), "account closed since discovery");
                    skipped += 1;
                    continue;
                };
                match self.codec.decode(T::TYPE_NAME, &data) {
                    Ok(account) => records.push(AccountRecord {
                        key: *key,
                        data,
                        account,
                        slot: batch_slot,
                    }),
                    Err(err) => {
                        debug!(
                            account_type = T::TYPE_NAME,
                            key = %key.short(),
                            error = %err,
                            "dropping undecodable account"
                        );
                        skipped += 1;
                    }
                }
            }
        }

        debug!(
            account_type = T::TYPE_NAME,
            keys = keys.len(),
            records = records.len(),
            skipped,
            batches = keys.len().div_ceil(chunk_size),
            "loaded accounts"
        );
        Ok(FetchResult {
            records,
            slot,
            skipped,
        })
    }

    async fn fetch_chunk(&self, chunk: &[Pubkey]) -> Result<AccountBatch> {
        debug_assert!(chunk.len() <= constants::MAX_CHUNK_SIZE);
        let batch = self.transport.get_accounts_batch(chunk).await.map_err(|err| {
            warn!(account_type = T::TYPE_NAME, error = %err, keys = chunk.len(), "batch fetch failed");
            LedgerviewError::BatchFetchFailed {
                reason: err.to_string(),
            }
        })?;
        if batch.accounts.len() != chunk.len() {
            return Err(LedgerviewError::BatchLengthMismatch {
                requested: chunk.len(),
                returned: batch.accounts.len(),
            });
        }
        Ok(batch)
    }
}
