use std::sync::Arc;

use ledgerview_filter::{ByteCriterion, Criterion};
use ledgerview_types::{MarketPosition, Pubkey};

use super::EntityQuery;
use crate::engine::AccountQuery;
use crate::transport::LedgerTransport;

/// Per-purchaser positions in a market.
pub struct MarketPositionQuery {
    query: AccountQuery<MarketPosition>,
    purchaser: Criterion<Pubkey>,
    market: Criterion<Pubkey>,
    paid: Criterion<bool>,
}

impl MarketPositionQuery {
    #[must_use]
    pub fn new(program_id: Pubkey, transport: Arc<dyn LedgerTransport>) -> Self {
        Self::from_query(AccountQuery::new(program_id, transport))
    }

    #[must_use]
    pub fn from_query(query: AccountQuery<MarketPosition>) -> Self {
        Self {
            query,
            purchaser: Criterion::new(MarketPosition::PURCHASER_OFFSET),
            market: Criterion::new(MarketPosition::MARKET_OFFSET),
            paid: Criterion::new(MarketPosition::PAID_OFFSET),
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
    pub fn filter_by_paid(mut self, paid: bool) -> Self {
        self.paid.set_value(paid);
        self
    }
}

impl EntityQuery for MarketPositionQuery {
    type Account = MarketPosition;

    fn engine(&self) -> &AccountQuery<MarketPosition> {
        &self.query
    }

    fn criteria(&self) -> Vec<&dyn ByteCriterion> {
        vec![&self.purchaser, &self.market, &self.paid]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryLedger;

    const PROGRAM: Pubkey = Pubkey::new([0x42; 32]);

    #[tokio::test]
    async fn unpaid_positions_in_market() {
        let ledger = Arc::new(InMemoryLedger::new());
        let market = Pubkey([2; 32]);
        let fixtures = [
            (1u64, market, false),
            (2, market, true),
            (3, Pubkey([9; 32]), false),
        ];
        for (i, m, paid) in fixtures {
            let position = MarketPosition::dummy(Pubkey::from_index(100 + i), m, paid);
            ledger.insert(PROGRAM, Pubkey::from_index(i), position.encode());
        }

        let result = MarketPositionQuery::new(PROGRAM, ledger)
            .filter_by_market(market)
            .filter_by_paid(false)
            .fetch()
            .await
            .unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result.records[0].account.purchaser, Pubkey::from_index(101));
    }
}
