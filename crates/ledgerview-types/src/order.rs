//! Order accounts.
//!
//! An order is a stake placed by a purchaser for or against one outcome of a
//! market. Everything up to and including the status byte sits at a fixed
//! offset, so market, outcome, side and status filters compile into a single
//! contiguous byte range.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::layout::{AccountLayout, LayoutReader, tagged_enum_layout};
use crate::{Pubkey, Result};

/// Lifecycle status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[repr(u8)]
pub enum OrderStatus {
    Open = 0,
    Matched = 1,
    Settled = 2,
    Cancelled = 3,
    Voided = 4,
}

impl OrderStatus {
    #[must_use]
    pub fn from_tag(tag: u8) -> Option<Self> {
        Some(match tag {
            0 => Self::Open,
            1 => Self::Matched,
            2 => Self::Settled,
            3 => Self::Cancelled,
            4 => Self::Voided,
            _ => return None,
        })
    }
}

tagged_enum_layout!(OrderStatus, "OrderStatus");

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "OPEN"),
            Self::Matched => write!(f, "MATCHED"),
            Self::Settled => write!(f, "SETTLED"),
            Self::Cancelled => write!(f, "CANCELLED"),
            Self::Voided => write!(f, "VOIDED"),
        }
    }
}

/// An order account.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Order {
    pub purchaser: Pubkey,
    pub market: Pubkey,
    pub market_outcome_index: u16,
    /// `true` backs the outcome, `false` lays it.
    pub for_outcome: bool,
    pub status: OrderStatus,
    /// Product (front end) the order was placed through, if any.
    pub product: Option<Pubkey>,
    pub stake: u64,
    pub voided_stake: u64,
    pub expected_price: Decimal,
    pub creation_timestamp: DateTime<Utc>,
    pub stake_unmatched: u64,
    pub payout: u64,
    pub payer: Pubkey,
}

impl Order {
    pub const PURCHASER_OFFSET: usize = 8;
    pub const MARKET_OFFSET: usize = 40;
    pub const MARKET_OUTCOME_INDEX_OFFSET: usize = 72;
    pub const FOR_OUTCOME_OFFSET: usize = 74;
    pub const STATUS_OFFSET: usize = 75;

    /// Stake that has been matched against opposing orders.
    #[must_use]
    pub fn stake_matched(&self) -> u64 {
        self.stake
            .saturating_sub(self.stake_unmatched)
            .saturating_sub(self.voided_stake)
    }

    #[must_use]
    pub fn is_fully_matched(&self) -> bool {
        self.stake_unmatched == 0
    }
}

impl AccountLayout for Order {
    const TYPE_NAME: &'static str = "Order";

    fn read_fields(reader: &mut LayoutReader<'_>) -> Result<Self> {
        Ok(Self {
            purchaser: reader.read()?,
            market: reader.read()?,
            market_outcome_index: reader.read()?,
            for_outcome: reader.read()?,
            status: reader.read()?,
            product: reader.read()?,
            stake: reader.read()?,
            voided_stake: reader.read()?,
            expected_price: reader.read_price()?,
            creation_timestamp: reader.read_timestamp()?,
            stake_unmatched: reader.read()?,
            payout: reader.read()?,
            payer: reader.read()?,
        })
    }
}

/// Test helpers.
#[cfg(any(test, feature = "test-helpers"))]
impl Order {
    pub fn dummy(purchaser: Pubkey, market: Pubkey, status: OrderStatus) -> Self {
        Self {
            purchaser,
            market,
            market_outcome_index: 0,
            for_outcome: true,
            status,
            product: None,
            stake: 10_000,
            voided_stake: 0,
            expected_price: Decimal::new(2, 0),
            creation_timestamp: DateTime::from_timestamp(1_700_000_000, 0).unwrap_or_default(),
            stake_unmatched: 10_000,
            payout: 0,
            payer: purchaser,
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut w = crate::layout::LayoutWriter::for_account::<Self>();
        w.write(&self.purchaser);
        w.write(&self.market);
        w.write(&self.market_outcome_index);
        w.write(&self.for_outcome);
        w.write(&self.status);
        w.write(&self.product);
        w.write(&self.stake);
        w.write(&self.voided_stake);
        w.write_price(self.expected_price);
        w.write_timestamp(self.creation_timestamp);
        w.write(&self.stake_unmatched);
        w.write(&self.payout);
        w.write(&self.payer);
        w.into_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_match_encoding() {
        let mut order = Order::dummy(Pubkey([3; 32]), Pubkey([4; 32]), OrderStatus::Matched);
        order.market_outcome_index = 0x0102;
        order.for_outcome = false;
        let bytes = order.encode();
        assert_eq!(&bytes[Order::PURCHASER_OFFSET..][..32], &[3; 32]);
        assert_eq!(&bytes[Order::MARKET_OFFSET..][..32], &[4; 32]);
        assert_eq!(&bytes[Order::MARKET_OUTCOME_INDEX_OFFSET..][..2], &[0x02, 0x01]);
        assert_eq!(bytes[Order::FOR_OUTCOME_OFFSET], 0);
        assert_eq!(bytes[Order::STATUS_OFFSET], 1);
    }

    #[test]
    fn decode_with_product() {
        let mut order = Order::dummy(Pubkey([3; 32]), Pubkey([4; 32]), OrderStatus::Open);
        order.product = Some(Pubkey([5; 32]));
        order.expected_price = Decimal::new(175, 2);
        let back = Order::decode(&order.encode()).unwrap();
        assert_eq!(back, order);
    }

    #[test]
    fn truncated_order_fails() {
        let bytes = Order::dummy(Pubkey([3; 32]), Pubkey([4; 32]), OrderStatus::Open).encode();
        assert!(Order::decode(&bytes[..60]).is_err());
    }

    #[test]
    fn matched_stake_accounting() {
        let mut order = Order::dummy(Pubkey([3; 32]), Pubkey([4; 32]), OrderStatus::Matched);
        order.stake = 100;
        order.stake_unmatched = 30;
        order.voided_stake = 10;
        assert_eq!(order.stake_matched(), 60);
        assert!(!order.is_fully_matched());
    }
}
