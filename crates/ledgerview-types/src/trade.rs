//! Trade accounts: the record of a matched stake between two orders.
//!
//! Every field is fixed width, so the whole account is filterable.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::layout::{AccountLayout, LayoutReader};
use crate::{Pubkey, Result};

/// A trade account.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trade {
    pub purchaser: Pubkey,
    pub market: Pubkey,
    pub order: Pubkey,
    /// The counterpart trade created by the same match.
    pub opposite_trade: Pubkey,
    pub market_outcome_index: u16,
    pub for_outcome: bool,
    pub stake: u64,
    pub price: Decimal,
    pub creation_timestamp: DateTime<Utc>,
    pub payer: Pubkey,
}

impl Trade {
    pub const PURCHASER_OFFSET: usize = 8;
    pub const MARKET_OFFSET: usize = 40;
    pub const ORDER_OFFSET: usize = 72;
    pub const OPPOSITE_TRADE_OFFSET: usize = 104;
    pub const MARKET_OUTCOME_INDEX_OFFSET: usize = 136;
    pub const FOR_OUTCOME_OFFSET: usize = 138;
    pub const STAKE_OFFSET: usize = 139;

    /// Notional exposure of the trade: stake × price.
    #[must_use]
    pub fn notional(&self) -> Decimal {
        Decimal::from(self.stake) * self.price
    }
}

impl AccountLayout for Trade {
    const TYPE_NAME: &'static str = "Trade";

    fn read_fields(reader: &mut LayoutReader<'_>) -> Result<Self> {
        Ok(Self {
            purchaser: reader.read()?,
            market: reader.read()?,
            order: reader.read()?,
            opposite_trade: reader.read()?,
            market_outcome_index: reader.read()?,
            for_outcome: reader.read()?,
            stake: reader.read()?,
            price: reader.read_price()?,
            creation_timestamp: reader.read_timestamp()?,
            payer: reader.read()?,
        })
    }
}

/// Test helpers.
#[cfg(any(test, feature = "test-helpers"))]
impl Trade {
    pub fn dummy(purchaser: Pubkey, market: Pubkey, order: Pubkey) -> Self {
        Self {
            purchaser,
            market,
            order,
            opposite_trade: Pubkey([0xEE; 32]),
            market_outcome_index: 1,
            for_outcome: true,
            stake: 500,
            price: Decimal::new(25, 1),
            creation_timestamp: DateTime::from_timestamp(1_700_000_100, 0).unwrap_or_default(),
            payer: purchaser,
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut w = crate::layout::LayoutWriter::for_account::<Self>();
        w.write(&self.purchaser);
        w.write(&self.market);
        w.write(&self.order);
        w.write(&self.opposite_trade);
        w.write(&self.market_outcome_index);
        w.write(&self.for_outcome);
        w.write(&self.stake);
        w.write_price(self.price);
        w.write_timestamp(self.creation_timestamp);
        w.write(&self.payer);
        w.into_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_layout_is_195_bytes() {
        let trade = Trade::dummy(Pubkey([1; 32]), Pubkey([2; 32]), Pubkey([3; 32]));
        let bytes = trade.encode();
        assert_eq!(bytes.len(), 195);
        assert_eq!(&bytes[Trade::ORDER_OFFSET..][..32], &[3; 32]);
        assert_eq!(&bytes[Trade::OPPOSITE_TRADE_OFFSET..][..32], &[0xEE; 32]);
        assert_eq!(bytes[Trade::FOR_OUTCOME_OFFSET], 1);
        assert_eq!(&bytes[Trade::STAKE_OFFSET..][..8], &500u64.to_le_bytes());
    }

    #[test]
    fn decode_and_notional() {
        let trade = Trade::dummy(Pubkey([1; 32]), Pubkey([2; 32]), Pubkey([3; 32]));
        let back = Trade::decode(&trade.encode()).unwrap();
        assert_eq!(back, trade);
        assert_eq!(back.notional(), Decimal::new(1250, 0));
    }

    #[test]
    fn order_bytes_rejected_as_trade() {
        let order = crate::Order::dummy(Pubkey([1; 32]), Pubkey([2; 32]), crate::OrderStatus::Open);
        assert!(Trade::decode(&order.encode()).is_err());
    }
}
