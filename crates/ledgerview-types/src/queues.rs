//! Per-market queue accounts drained by the operator loop.
//!
//! - [`MarketMatchingQueue`]: completed matches awaiting settlement processing
//! - [`MarketOrderRequestQueue`]: order-creation requests awaiting admission
//! - [`MarketPaymentsQueue`]: commission payouts awaiting transfer
//!
//! All three share the prefix `market@8, terminated@40` followed by a
//! [`RingBufferQueue`]. This crate only reads them.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::layout::{AccountLayout, LayoutReader, LayoutWriter, ReadLayout, WriteLayout};
use crate::{Pubkey, Result, RingBufferQueue};

/// Offset of the market key shared by every queue account.
pub const QUEUE_MARKET_OFFSET: usize = 8;
/// Offset of the terminated flag shared by every queue account.
pub const QUEUE_TERMINATED_OFFSET: usize = 40;

// ---------------------------------------------------------------------------
// Queue items
// ---------------------------------------------------------------------------

/// One side of a completed match.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderMatch {
    pub order: Pubkey,
    pub for_outcome: bool,
    pub outcome_index: u16,
    pub price: Decimal,
    pub stake: u64,
}

impl ReadLayout for OrderMatch {
    fn read(reader: &mut LayoutReader<'_>) -> Result<Self> {
        Ok(Self {
            order: reader.read()?,
            for_outcome: reader.read()?,
            outcome_index: reader.read()?,
            price: reader.read_price()?,
            stake: reader.read()?,
        })
    }
}

impl WriteLayout for OrderMatch {
    fn write(&self, writer: &mut LayoutWriter) {
        writer.write(&self.order);
        writer.write(&self.for_outcome);
        writer.write(&self.outcome_index);
        writer.write_price(self.price);
        writer.write(&self.stake);
    }
}

/// A pending request to create an order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderRequest {
    pub purchaser: Pubkey,
    pub market_outcome_index: u16,
    pub for_outcome: bool,
    pub product: Option<Pubkey>,
    pub stake: u64,
    pub expected_price: Decimal,
    /// Earliest time the request may be admitted; used for in-play delay.
    pub delay_expiration_timestamp: DateTime<Utc>,
    pub product_commission_rate: Decimal,
    /// Client-supplied seed making the request's order address unique.
    pub distinct_seed: [u8; 16],
    pub creation_timestamp: DateTime<Utc>,
}

impl ReadLayout for OrderRequest {
    fn read(reader: &mut LayoutReader<'_>) -> Result<Self> {
        Ok(Self {
            purchaser: reader.read()?,
            market_outcome_index: reader.read()?,
            for_outcome: reader.read()?,
            product: reader.read()?,
            stake: reader.read()?,
            expected_price: reader.read_price()?,
            delay_expiration_timestamp: reader.read_timestamp()?,
            product_commission_rate: reader.read_price()?,
            distinct_seed: reader.read()?,
            creation_timestamp: reader.read_timestamp()?,
        })
    }
}

impl WriteLayout for OrderRequest {
    fn write(&self, writer: &mut LayoutWriter) {
        writer.write(&self.purchaser);
        writer.write(&self.market_outcome_index);
        writer.write(&self.for_outcome);
        writer.write(&self.product);
        writer.write(&self.stake);
        writer.write_price(self.expected_price);
        writer.write_timestamp(self.delay_expiration_timestamp);
        writer.write_price(self.product_commission_rate);
        writer.write(&self.distinct_seed);
        writer.write_timestamp(self.creation_timestamp);
    }
}

/// A pending token transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentInfo {
    pub from: Pubkey,
    pub to: Pubkey,
    pub amount: u64,
}

impl ReadLayout for PaymentInfo {
    fn read(reader: &mut LayoutReader<'_>) -> Result<Self> {
        Ok(Self {
            from: reader.read()?,
            to: reader.read()?,
            amount: reader.read()?,
        })
    }
}

impl WriteLayout for PaymentInfo {
    fn write(&self, writer: &mut LayoutWriter) {
        writer.write(&self.from);
        writer.write(&self.to);
        writer.write(&self.amount);
    }
}

// ---------------------------------------------------------------------------
// Queue accounts
// ---------------------------------------------------------------------------

/// Matches produced by the program, awaiting settlement processing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketMatchingQueue {
    pub market: Pubkey,
    /// Set when the market closes; the queue accepts no further items.
    pub terminated: bool,
    pub matches: RingBufferQueue<OrderMatch>,
}

impl AccountLayout for MarketMatchingQueue {
    const TYPE_NAME: &'static str = "MarketMatchingQueue";

    fn read_fields(reader: &mut LayoutReader<'_>) -> Result<Self> {
        Ok(Self {
            market: reader.read()?,
            terminated: reader.read()?,
            matches: reader.read()?,
        })
    }
}

impl MarketMatchingQueue {
    /// Total stake across pending matches.
    #[must_use]
    pub fn pending_stake(&self) -> u64 {
        self.matches
            .iter()
            .fold(0u64, |total, m| total.saturating_add(m.stake))
    }
}

/// Order-creation requests awaiting admission into the book.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketOrderRequestQueue {
    pub market: Pubkey,
    pub terminated: bool,
    pub order_requests: RingBufferQueue<OrderRequest>,
}

impl AccountLayout for MarketOrderRequestQueue {
    const TYPE_NAME: &'static str = "MarketOrderRequestQueue";

    fn read_fields(reader: &mut LayoutReader<'_>) -> Result<Self> {
        Ok(Self {
            market: reader.read()?,
            terminated: reader.read()?,
            order_requests: reader.read()?,
        })
    }
}

impl MarketOrderRequestQueue {
    /// Requests whose delay has elapsed by `now`, oldest first.
    pub fn admissible_requests(&self, now: DateTime<Utc>) -> impl Iterator<Item = &OrderRequest> {
        self.order_requests
            .iter()
            .filter(move |r| r.delay_expiration_timestamp <= now)
    }
}

/// Commission payments awaiting transfer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketPaymentsQueue {
    pub market: Pubkey,
    pub terminated: bool,
    pub pending_payments: RingBufferQueue<PaymentInfo>,
}

impl AccountLayout for MarketPaymentsQueue {
    const TYPE_NAME: &'static str = "MarketPaymentsQueue";

    fn read_fields(reader: &mut LayoutReader<'_>) -> Result<Self> {
        Ok(Self {
            market: reader.read()?,
            terminated: reader.read()?,
            pending_payments: reader.read()?,
        })
    }
}

impl MarketPaymentsQueue {
    /// Total amount owed to `recipient` across pending payments.
    #[must_use]
    pub fn owed_to(&self, recipient: &Pubkey) -> u64 {
        self.pending_payments
            .iter()
            .filter(|p| p.to == *recipient)
            .fold(0u64, |total, p| total.saturating_add(p.amount))
    }
}

/// Test helpers.
#[cfg(any(test, feature = "test-helpers"))]
mod helpers {
    use super::*;

    fn encode_queue<T: AccountLayout, I: WriteLayout>(
        market: &Pubkey,
        terminated: bool,
        queue: &RingBufferQueue<I>,
    ) -> Vec<u8> {
        let mut w = LayoutWriter::for_account::<T>();
        w.write(market);
        w.write(&terminated);
        w.write(queue);
        w.into_bytes()
    }

    impl OrderMatch {
        pub fn dummy(order: Pubkey, stake: u64) -> Self {
            Self {
                order,
                for_outcome: true,
                outcome_index: 0,
                price: Decimal::new(2, 0),
                stake,
            }
        }
    }

    impl OrderRequest {
        pub fn dummy(purchaser: Pubkey, stake: u64, expires_at: i64) -> Self {
            Self {
                purchaser,
                market_outcome_index: 0,
                for_outcome: true,
                product: None,
                stake,
                expected_price: Decimal::new(15, 1),
                delay_expiration_timestamp: DateTime::from_timestamp(expires_at, 0)
                    .unwrap_or_default(),
                product_commission_rate: Decimal::ZERO,
                distinct_seed: [0u8; 16],
                creation_timestamp: DateTime::from_timestamp(1_700_000_000, 0).unwrap_or_default(),
            }
        }
    }

    impl MarketMatchingQueue {
        pub fn encode(&self) -> Vec<u8> {
            encode_queue::<Self, _>(&self.market, self.terminated, &self.matches)
        }
    }

    impl MarketOrderRequestQueue {
        pub fn encode(&self) -> Vec<u8> {
            encode_queue::<Self, _>(&self.market, self.terminated, &self.order_requests)
        }
    }

    impl MarketPaymentsQueue {
        pub fn encode(&self) -> Vec<u8> {
            encode_queue::<Self, _>(&self.market, self.terminated, &self.pending_payments)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payment(to: u8, amount: u64) -> PaymentInfo {
        PaymentInfo {
            from: Pubkey([0xF0; 32]),
            to: Pubkey([to; 32]),
            amount,
        }
    }

    #[test]
    fn matching_queue_reads_oldest_first_across_wrap() {
        let slots = vec![
            OrderMatch::dummy(Pubkey([0; 32]), 10),
            OrderMatch::dummy(Pubkey([1; 32]), 20),
            OrderMatch::dummy(Pubkey([2; 32]), 30),
            OrderMatch::dummy(Pubkey([3; 32]), 40),
            OrderMatch::dummy(Pubkey([4; 32]), 50),
        ];
        let queue = MarketMatchingQueue {
            market: Pubkey([9; 32]),
            terminated: false,
            matches: RingBufferQueue::new(slots, 3, 4).unwrap(),
        };
        let back = MarketMatchingQueue::decode(&queue.encode()).unwrap();
        let orders: Vec<u8> = back.matches.iter().map(|m| m.order.0[0]).collect();
        assert_eq!(orders, vec![3, 4, 0, 1]);
        assert_eq!(back.pending_stake(), 40 + 50 + 10 + 20);
    }

    #[test]
    fn shared_prefix_offsets() {
        let queue = MarketPaymentsQueue {
            market: Pubkey([9; 32]),
            terminated: true,
            pending_payments: RingBufferQueue::new(vec![payment(1, 5)], 0, 1).unwrap(),
        };
        let bytes = queue.encode();
        assert_eq!(&bytes[QUEUE_MARKET_OFFSET..][..32], &[9; 32]);
        assert_eq!(bytes[QUEUE_TERMINATED_OFFSET], 1);
    }

    #[test]
    fn payments_owed_ignores_stale_slots() {
        let slots = vec![payment(1, 100), payment(2, 7), payment(1, 3)];
        let queue = MarketPaymentsQueue {
            market: Pubkey([9; 32]),
            terminated: false,
            pending_payments: RingBufferQueue::new(slots, 1, 2).unwrap(),
        };
        let back = MarketPaymentsQueue::decode(&queue.encode()).unwrap();
        // Slot 0 is stale: only physical 1 and 2 are live.
        assert_eq!(back.owed_to(&Pubkey([1; 32])), 3);
        assert_eq!(back.owed_to(&Pubkey([2; 32])), 7);
    }

    #[test]
    fn only_requests_past_their_delay_are_admissible() {
        let slots = vec![
            OrderRequest::dummy(Pubkey([1; 32]), 10, 100),
            OrderRequest::dummy(Pubkey([2; 32]), 20, 300),
        ];
        let queue = MarketOrderRequestQueue {
            market: Pubkey([9; 32]),
            terminated: false,
            order_requests: RingBufferQueue::new(slots, 0, 2).unwrap(),
        };
        let back = MarketOrderRequestQueue::decode(&queue.encode()).unwrap();
        let now = DateTime::from_timestamp(200, 0).unwrap();
        let ready: Vec<_> = back.admissible_requests(now).map(|r| r.stake).collect();
        assert_eq!(ready, vec![10]);

        let at_expiry = DateTime::from_timestamp(300, 0).unwrap();
        assert_eq!(back.admissible_requests(at_expiry).count(), 2);
    }

    #[test]
    fn pending_stake_saturates() {
        let queue = MarketMatchingQueue {
            market: Pubkey([9; 32]),
            terminated: false,
            matches: RingBufferQueue::new(
                vec![
                    OrderMatch::dummy(Pubkey([1; 32]), u64::MAX),
                    OrderMatch::dummy(Pubkey([2; 32]), 1),
                ],
                0,
                2,
            )
            .unwrap(),
        };
        let back = MarketMatchingQueue::decode(&queue.encode()).unwrap();
        assert_eq!(back.matches.len(), 2);
        assert_eq!(back.pending_stake(), u64::MAX);
    }

    #[test]
    fn owed_to_saturates() {
        let queue = MarketPaymentsQueue {
            market: Pubkey([9; 32]),
            terminated: false,
            pending_payments: RingBufferQueue::new(
                vec![payment(1, u64::MAX), payment(1, 7), payment(2, 3)],
                0,
                3,
            )
            .unwrap(),
        };
        let back = MarketPaymentsQueue::decode(&queue.encode()).unwrap();
        assert_eq!(back.owed_to(&Pubkey([1; 32])), u64::MAX);
        assert_eq!(back.owed_to(&Pubkey([2; 32])), 3);
    }

    #[test]
    fn queue_type_confusion_rejected() {
        let queue = MarketPaymentsQueue {
            market: Pubkey([9; 32]),
            terminated: false,
            pending_payments: RingBufferQueue::new(vec![payment(1, 5)], 0, 0).unwrap(),
        };
        assert!(MarketMatchingQueue::decode(&queue.encode()).is_err());
    }
}
