//! Typed entity queries.
//!
//! Each query wraps an [`AccountQuery`] for one account type and exposes that
//! type's filterable fields as fluent `filter_by_*` setters. Setters only
//! populate criteria; nothing touches the ledger until a fetch method runs.
//!
//! ```ignore
//! let open_orders = OrderQuery::new(program_id, transport)
//!     .filter_by_market(market)
//!     .filter_by_status(OrderStatus::Open)
//!     .fetch()
//!     .await?;
//! ```

mod market;
mod market_position;
mod matching_pool;
mod order;
mod product;
mod queues;
mod trade;

use std::cmp::Ordering;
use std::future::Future;

use ledgerview_filter::ByteCriterion;
use ledgerview_types::{AccountLayout, Pubkey, Result};

use crate::engine::{AccountQuery, FetchResult};

pub use market::MarketQuery;
pub use market_position::MarketPositionQuery;
pub use matching_pool::MarketMatchingPoolQuery;
pub use order::OrderQuery;
pub use product::ProductQuery;
pub use queues::{
    MarketMatchingQueueQuery, MarketOrderRequestQueueQuery, MarketPaymentsQueueQuery,
    MarketQueueQuery,
};
pub use trade::TradeQuery;

/// Shared fetch surface of the typed queries.
pub trait EntityQuery: Send + Sync {
    type Account: AccountLayout;

    /// The underlying engine.
    fn engine(&self) -> &AccountQuery<Self::Account>;

    /// This query's field criteria, set or not.
    fn criteria(&self) -> Vec<&dyn ByteCriterion>;

    fn fetch_keys(&self) -> impl Future<Output = Result<Vec<Pubkey>>> + Send {
        async move { self.engine().fetch_keys_matching(&self.criteria()).await }
    }

    fn fetch(&self) -> impl Future<Output = Result<FetchResult<Self::Account>>> + Send {
        async move { self.engine().fetch_matching(&self.criteria()).await }
    }

    /// Fetch, then stable-sort the records with `compare`.
    fn fetch_sorted_by<F>(
        &self,
        compare: F,
    ) -> impl Future<Output = Result<FetchResult<Self::Account>>> + Send
    where
        F: FnMut(&Self::Account, &Self::Account) -> Ordering + Send,
    {
        async move {
            self.engine()
                .fetch_sorted_matching(&self.criteria(), compare)
                .await
        }
    }

    /// Fetch, failing with `Cancelled` if `cancel` resolves first.
    fn fetch_until<C>(
        &self,
        cancel: C,
    ) -> impl Future<Output = Result<FetchResult<Self::Account>>> + Send
    where
        C: Future<Output = ()> + Send,
    {
        async move { self.engine().fetch_until(&self.criteria(), cancel).await }
    }
}
