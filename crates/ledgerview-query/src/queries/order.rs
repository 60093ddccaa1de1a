use std::sync::Arc;

use ledgerview_filter::{ByteCriterion, Criterion};
use ledgerview_types::{Order, OrderStatus, Pubkey};

use super::EntityQuery;
use crate::engine::AccountQuery;
use crate::transport::LedgerTransport;

/// Orders.
///
/// The filterable fields sit back to back from the purchaser through the
/// status byte, so any contiguous run of set criteria compiles into a single
/// ledger filter together with the discriminator.
pub struct OrderQuery {
    query: AccountQuery<Order>,
    purchaser: Criterion<Pubkey>,
    market: Criterion<Pubkey>,
    market_outcome_index: Criterion<u16>,
    for_outcome: Criterion<bool>,
    status: Criterion<OrderStatus>,
}

impl OrderQuery {
    #[must_use]
    pub fn new(program_id: Pubkey, transport: Arc<dyn LedgerTransport>) -> Self {
        Self::from_query(AccountQuery::new(program_id, transport))
    }

    #[must_use]
    pub fn from_query(query: AccountQuery<Order>) -> Self {
        Self {
            query,
            purchaser: Criterion::new(Order::PURCHASER_OFFSET),
            market: Criterion::new(Order::MARKET_OFFSET),
            market_outcome_index: Criterion::new(Order::MARKET_OUTCOME_INDEX_OFFSET),
            for_outcome: Criterion::new(Order::FOR_OUTCOME_OFFSET),
            status: Criterion::new(Order::STATUS_OFFSET),
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
    pub fn filter_by_market_outcome_index(mut self, index: u16) -> Self {
        self.market_outcome_index.set_value(index);
        self
    }

    #[must_use]
    pub fn filter_by_for_outcome(mut self, for_outcome: bool) -> Self {
        self.for_outcome.set_value(for_outcome);
        self
    }

    #[must_use]
    pub fn filter_by_status(mut self, status: OrderStatus) -> Self {
        self.status.set_value(status);
        self
    }
}

impl EntityQuery for OrderQuery {
    type Account = Order;

    fn engine(&self) -> &AccountQuery<Order> {
        &self.query
    }

    fn criteria(&self) -> Vec<&dyn ByteCriterion> {
        vec![
            &self.purchaser,
            &self.market,
            &self.market_outcome_index,
            &self.for_outcome,
            &self.status,
        ]
    }
}
