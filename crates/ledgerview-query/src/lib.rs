//! # ledgerview-query
//!
//! **Read-only account queries for LedgerView.**
//!
//! A query names an account type and a set of field criteria. The engine
//! compiles them into server-side byte filters, discovers matching keys, loads
//! the accounts in concurrent chunks and decodes them:
//!
//! - **Boundaries**: [`LedgerTransport`] for the wire, [`AccountCodec`] for bytes
//! - **Engine**: [`AccountQuery`] with chunked concurrent loads, a min-slot
//!   watermark, deadlines and caller cancellation
//! - **Typed queries**: [`OrderQuery`], [`MarketQuery`], [`TradeQuery`] and friends
//! - **Liquidity**: per-outcome price ladders built from matching pools
//! - **Offline ledger**: [`InMemoryLedger`] for tests and embedders
//!
//! Nothing here ever writes to the ledger.

pub mod codec;
pub mod engine;
pub mod liquidity;
pub mod memory;
pub mod queries;
pub mod transport;

pub use codec::{AccountCodec, LayoutCodec};
pub use engine::{AccountQuery, AccountRecord, FetchResult};
pub use liquidity::{LiquidityLevel, MarketLiquidity, OutcomeLiquidity, fetch_market_liquidity};
pub use memory::InMemoryLedger;
pub use queries::{
    EntityQuery, MarketMatchingPoolQuery, MarketMatchingQueueQuery, MarketOrderRequestQueueQuery,
    MarketPaymentsQueueQuery, MarketPositionQuery, MarketQuery, MarketQueueQuery, OrderQuery,
    ProductQuery, TradeQuery,
};
pub use transport::{AccountBatch, LedgerTransport};
