use std::sync::Arc;

use ledgerview_filter::{ByteCriterion, Criterion};
use ledgerview_types::{Pubkey, Trade};

use super::EntityQuery;
use crate::engine::AccountQuery;
use crate::transport::LedgerTransport;

/// Trades, filterable by purchaser, market, order, outcome and side.
pub struct TradeQuery {
    query: AccountQuery<Trade>,
    purchaser: Criterion<Pubkey>,
    market: Criterion<Pubkey>,
    order: Criterion<Pubkey>,
    market_outcome_index: Criterion<u16>,
    for_outcome: Criterion<bool>,
}

impl TradeQuery {
    #[must_use]
    pub fn new(program_id: Pubkey, transport: Arc<dyn LedgerTransport>) -> Self {
        Self::from_query(AccountQuery::new(program_id, transport))
    }

    #[must_use]
    pub fn from_query(query: AccountQuery<Trade>) -> Self {
        Self {
            query,
            purchaser: Criterion::new(Trade::PURCHASER_OFFSET),
            market: Criterion::new(Trade::MARKET_OFFSET),
            order: Criterion::new(Trade::ORDER_OFFSET),
            market_outcome_index: Criterion::new(Trade::MARKET_OUTCOME_INDEX_OFFSET),
            for_outcome: Criterion::new(Trade::FOR_OUTCOME_OFFSET),
        }
    }

    #[must_use]
    pub fn filter_by_purchaser(mut self, purchaser: Pubkey) -> Self {
        self.purchaser.set_value(purchaser);
        self
    }

    #[must_use]
    pub fn filter_by_market(mut self, market: Pubkey) -> Self {
        self.market.set_value(market);
        self
    }

    #[must_use]
    pub fn filter_by_order(mut self, order: Pubkey) -> Self {
        self.order.set_value(order);
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

impl EntityQuery for TradeQuery {
    type Account = Trade;

    fn engine(&self) -> &AccountQuery<Trade> {
        &self.query
    }

    fn criteria(&self) -> Vec<&dyn ByteCriterion> {
        vec![
            &self.purchaser,
            &self.market,
            &self.order,
            &self.market_outcome_index,
            &self.for_outcome,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryLedger;

    const PROGRAM: Pubkey = Pubkey::new([0x42; 32]);

    #[tokio::test]
    async fn trades_for_one_order() {
        let ledger = Arc::new(InMemoryLedger::new());
        let market = Pubkey([2; 32]);
        let order_a = Pubkey([0xA0; 32]);
        let order_b = Pubkey([0xB0; 32]);
        for (i, order) in [(1u64, order_a), (2, order_b), (3, order_a)] {
            let trade = Trade::dummy(Pubkey([1; 32]), market, order);
            ledger.insert(PROGRAM, Pubkey::from_index(i), trade.encode());
        }

        let query = TradeQuery::new(PROGRAM, ledger).filter_by_order(order_a);
        let keys = query.fetch_keys().await.unwrap();
        assert_eq!(keys, vec![Pubkey::from_index(1), Pubkey::from_index(3)]);
    }

    #[test]
    fn outcome_and_side_are_adjacent() {
        let q = TradeQuery::new(PROGRAM, Arc::new(InMemoryLedger::new()))
            .filter_by_market_outcome_index(1)
            .filter_by_for_outcome(true);
        let filters = q.engine().filters(&q.criteria()).unwrap();
        assert_eq!(filters.len(), 2);
        assert_eq!(filters[1].offset(), Trade::MARKET_OUTCOME_INDEX_OFFSET);
        assert_eq!(filters[1].bytes(), &[1, 0, 1]);
    }
}
