use std::sync::Arc;

use ledgerview_filter::{ByteCriterion, Criterion};
use ledgerview_types::{
    AccountLayout, MarketMatchingQueue, MarketOrderRequestQueue, MarketPaymentsQueue, Pubkey,
    QUEUE_MARKET_OFFSET, QUEUE_TERMINATED_OFFSET,
};

use super::EntityQuery;
use crate::engine::AccountQuery;
use crate::transport::LedgerTransport;

/// Query over one of the per-market queue accounts.
///
/// All three queue kinds start with the same `market`, `terminated` header,
/// so one query shape serves them all.
pub struct MarketQueueQuery<Q> {
    query: AccountQuery<Q>,
    market: Criterion<Pubkey>,
    terminated: Criterion<bool>,
}

pub type MarketMatchingQueueQuery = MarketQueueQuery<MarketMatchingQueue>;
pub type MarketOrderRequestQueueQuery = MarketQueueQuery<MarketOrderRequestQueue>;
pub type MarketPaymentsQueueQuery = MarketQueueQuery<MarketPaymentsQueue>;

impl<Q: AccountLayout> MarketQueueQuery<Q> {
    #[must_use]
    pub fn new(program_id: Pubkey, transport: Arc<dyn LedgerTransport>) -> Self {
        Self::from_query(AccountQuery::new(program_id, transport))
    }

    #[must_use]
    pub fn from_query(query: AccountQuery<Q>) -> Self {
        Self {
            query,
            market: Criterion::new(QUEUE_MARKET_OFFSET),
            terminated: Criterion::new(QUEUE_TERMINATED_OFFSET),
        }
    }

    #[must_use]
    pub fn filter_by_market(mut self, market: Pubkey) -> Self {
        self.market.set_value(market);
        self
    }

    #[must_use]
    pub fn filter_by_terminated(mut self, terminated: bool) -> Self {
        self.terminated.set_value(terminated);
        self
    }
}

impl<Q: AccountLayout> EntityQuery for MarketQueueQuery<Q> {
    type Account = Q;

    fn engine(&self) -> &AccountQuery<Q> {
        &self.query
    }

    fn criteria(&self) -> Vec<&dyn ByteCriterion> {
        vec![&self.market, &self.terminated]
    }
}

#[cfg(test)]
mod tests {
    use ledgerview_types::{OrderMatch, RingBufferQueue};

    use super::*;
    use crate::memory::InMemoryLedger;

    const PROGRAM: Pubkey = Pubkey::new([0x42; 32]);

    fn matching_queue(market: Pubkey, terminated: bool) -> MarketMatchingQueue {
        let items = vec![
            OrderMatch::dummy(Pubkey([5; 32]), 30),
            OrderMatch::dummy(Pubkey([6; 32]), 10),
            OrderMatch::dummy(Pubkey([7; 32]), 20),
        ];
        MarketMatchingQueue {
            market,
            terminated,
            matches: RingBufferQueue::new(items, 2, 2).unwrap(),
        }
    }

    #[tokio::test]
    async fn live_queue_for_market() {
        let ledger = Arc::new(InMemoryLedger::new());
        let market = Pubkey([2; 32]);
        ledger.insert(PROGRAM, Pubkey::from_index(1), matching_queue(market, false).encode());
        ledger.insert(PROGRAM, Pubkey::from_index(2), matching_queue(market, true).encode());
        ledger.insert(PROGRAM, Pubkey::from_index(3), matching_queue(Pubkey([3; 32]), false).encode());

        let result = MarketMatchingQueueQuery::new(PROGRAM, ledger)
            .filter_by_market(market)
            .filter_by_terminated(false)
            .fetch()
            .await
            .unwrap();
        assert_eq!(result.len(), 1);
        let queue = &result.records[0].account;
        let stakes: Vec<u64> = queue.matches.iter().map(|m| m.stake).collect();
        assert_eq!(stakes, vec![20, 30]);
    }

    #[tokio::test]
    async fn queue_kinds_do_not_mix() {
        let ledger = Arc::new(InMemoryLedger::new());
        let market = Pubkey([2; 32]);
        ledger.insert(PROGRAM, Pubkey::from_index(1), matching_queue(market, false).encode());

        let payments = MarketPaymentsQueueQuery::new(PROGRAM, ledger)
            .filter_by_market(market)
            .fetch()
            .await
            .unwrap();
        assert!(payments.is_empty());
        assert_eq!(payments.slot, None);
    }
}
