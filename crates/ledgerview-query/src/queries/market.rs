use std::sync::Arc;

use ledgerview_filter::{ByteCriterion, Criterion};
use ledgerview_types::{Market, MarketStatus, Pubkey};

use super::EntityQuery;
use crate::engine::AccountQuery;
use crate::transport::LedgerTransport;

/// Markets, filterable by authority, event and status.
pub struct MarketQuery {
    query: AccountQuery<Market>,
    authority: Criterion<Pubkey>,
    event: Criterion<Pubkey>,
    status: Criterion<MarketStatus>,
}

impl MarketQuery {
    #[must_use]
    pub fn new(program_id: Pubkey, transport: Arc<dyn LedgerTransport>) -> Self {
        Self::from_query(AccountQuery::new(program_id, transport))
    }

    #[must_use]
    pub fn from_query(query: AccountQuery<Market>) -> Self {
        Self {
            query,
            authority: Criterion::new(Market::AUTHORITY_OFFSET),
            event: Criterion::new(Market::EVENT_OFFSET),
            status: Criterion::new(Market::STATUS_OFFSET),
        }
    }

    #[must_use]
    pub fn filter_by_authority(mut self, authority: Pubkey) -> Self {
        self.authority.set_value(authority);
        self
    }

    #[must_use]
    pub fn filter_by_event(mut self, event: Pubkey) -> Self {
        self.event.set_value(event);
        self
    }

    #[must_use]
    pub fn filter_by_status(mut self, status: MarketStatus) -> Self {
        self.status.set_value(status);
        self
    }
}

impl EntityQuery for MarketQuery {
    type Account = Market;

    fn engine(&self) -> &AccountQuery<Market> {
        &self.query
    }

    fn criteria(&self) -> Vec<&dyn ByteCriterion> {
        vec![&self.authority, &self.event, &self.status]
    }
}
