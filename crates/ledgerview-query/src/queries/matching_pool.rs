use std::sync::Arc;

use ledgerview_filter::{ByteCriterion, Criterion};
use ledgerview_types::{MarketMatchingPool, Pubkey};

use super::EntityQuery;
use crate::engine::AccountQuery;
use crate::transport::LedgerTransport;

/// Matching pools: the resting liquidity of one market outcome, side and price.
pub struct MarketMatchingPoolQuery {
    query: AccountQuery<MarketMatchingPool>,
    market: Criterion<Pubkey>,
    market_outcome_index: Criterion<u16>,
    for_outcome: Criterion<bool>,
}

impl MarketMatchingPoolQuery {
    #[must_use]
    pub fn new(program_id: Pubkey, transport: Arc<dyn LedgerTransport>) -> Self {
        Self::from_query(AccountQuery::new(program_id, transport))
    }

    #[must_use]
    pub fn from_query(query: AccountQuery<MarketMatchingPool>) -> Self {
        Self {
            query,
            market: Criterion::new(MarketMatchingPool::MARKET_OFFSET),
            market_outcome_index: Criterion::new(MarketMatchingPool::MARKET_OUTCOME_INDEX_OFFSET),
            for_outcome: Criterion::new(MarketMatchingPool::FOR_OUTCOME_OFFSET),
        }
    }

    #[must_use]
    pub fn filter_by_market(mut self, market: Pubkey) -> Self {
        self.market.set_value(market);
        self
    }

    #[must_use]
    pub fn filter_by_market_outcome_index(mut self, index: u16) -> Self {
        self.market_outcome_index.set_value(index);
        self
    }

    #[must_use]
    pub fn filter_by_for_outcome(mut self, for_outcome: bool) -> Self {
        self.for_outcome.set_value(for_outcome);
        self
    }
}

impl EntityQuery for MarketMatchingPoolQuery {
    type Account = MarketMatchingPool;

    fn engine(&self) -> &AccountQuery<MarketMatchingPool> {
        &self.query
    }

    fn criteria(&self) -> Vec<&dyn ByteCriterion> {
        vec![&self.market, &self.market_outcome_index, &self.for_outcome]
    }
}
