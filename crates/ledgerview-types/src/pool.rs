//! Matching pool accounts.
//!
//! One pool exists per (market, outcome, side, price). It tracks the resting
//! liquidity at that price and queues the orders providing it, oldest first.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::layout::{AccountLayout, LayoutReader};
use crate::{Pubkey, Result, RingBufferQueue};

/// A market matching pool account.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketMatchingPool {
    pub market: Pubkey,
    pub market_outcome_index: u16,
    pub for_outcome: bool,
    pub price: Decimal,
    /// Unmatched stake resting in the pool.
    pub liquidity_amount: u64,
    /// Stake matched out of the pool so far.
    pub matched_amount: u64,
    pub inplay: bool,
    /// Orders resting at this price, in time priority.
    pub orders: RingBufferQueue<Pubkey>,
    pub payer: Pubkey,
}

impl MarketMatchingPool {
    pub const MARKET_OFFSET: usize = 8;
    pub const MARKET_OUTCOME_INDEX_OFFSET: usize = 40;
    pub const FOR_OUTCOME_OFFSET: usize = 42;
    pub const PRICE_OFFSET: usize = 43;

    /// The order that would be matched next at this price.
    #[must_use]
    pub fn next_order(&self) -> Option<&Pubkey> {
        self.orders.peek_front()
    }

    #[must_use]
    pub fn has_liquidity(&self) -> bool {
        self.liquidity_amount > 0
    }
}

impl AccountLayout for MarketMatchingPool {
    const TYPE_NAME: &'static str = "MarketMatchingPool";

    fn read_fields(reader: &mut LayoutReader<'_>) -> Result<Self> {
        Ok(Self {
            market: reader.read()?,
            market_outcome_index: reader.read()?,
            for_outcome: reader.read()?,
            price: reader.read_price()?,
            liquidity_amount: reader.read()?,
            matched_amount: reader.read()?,
            inplay: reader.read()?,
            orders: reader.read()?,
            payer: reader.read()?,
        })
    }
}

/// Test helpers.
#[cfg(any(test, feature = "test-helpers"))]
impl MarketMatchingPool {
    pub fn dummy(market: Pubkey, outcome: u16, for_outcome: bool, price: Decimal, liquidity: u64) -> Self {
        Self {
            market,
            market_outcome_index: outcome,
            for_outcome,
            price,
            liquidity_amount: liquidity,
            matched_amount: 0,
            inplay: false,
            orders: RingBufferQueue::new(vec![Pubkey::default(); 4], 0, 0)
                .unwrap_or_else(|e| panic!("{e}")),
            payer: market,
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut w = crate::layout::LayoutWriter::for_account::<Self>();
        w.write(&self.market);
        w.write(&self.market_outcome_index);
        w.write(&self.for_outcome);
        w.write_price(self.price);
        w.write(&self.liquidity_amount);
        w.write(&self.matched_amount);
        w.write(&self.inplay);
        w.write(&self.orders);
        w.write(&self.payer);
        w.into_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_pool_with_wrapped_order_queue() {
        let mut pool = MarketMatchingPool::dummy(Pubkey([1; 32]), 2, false, Decimal::new(3, 0), 900);
        let slots = vec![Pubkey([10; 32]), Pubkey([11; 32]), Pubkey([12; 32])];
        pool.orders = RingBufferQueue::new(slots, 2, 2).unwrap();

        let bytes = pool.encode();
        assert_eq!(&bytes[MarketMatchingPool::MARKET_OUTCOME_INDEX_OFFSET..][..2], &[2, 0]);
        assert_eq!(bytes[MarketMatchingPool::FOR_OUTCOME_OFFSET], 0);

        let back = MarketMatchingPool::decode(&bytes).unwrap();
        assert_eq!(back.price, Decimal::new(3, 0));
        assert_eq!(back.next_order(), Some(&Pubkey([12; 32])));
        assert_eq!(back.orders.to_vec(), vec![Pubkey([12; 32]), Pubkey([10; 32])]);
    }
}
