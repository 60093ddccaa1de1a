//! Market position accounts: a purchaser's net exposure across every outcome
//! of one market.

use serde::Serialize;

use crate::layout::{AccountLayout, LayoutReader};
use crate::{Pubkey, Result};

/// A market position account.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketPosition {
    pub purchaser: Pubkey,
    pub market: Pubkey,
    /// Set once winnings (or refunds) have been paid out.
    pub paid: bool,
    /// Net profit or loss per outcome if that outcome wins.
    pub market_outcome_sums: Vec<i128>,
    /// Worst-case exposure per outcome from unmatched orders.
    pub unmatched_exposures: Vec<u64>,
    pub payer: Pubkey,
}

impl MarketPosition {
    pub const PURCHASER_OFFSET: usize = 8;
    pub const MARKET_OFFSET: usize = 40;
    pub const PAID_OFFSET: usize = 72;

    /// Largest loss across outcomes, as a non-negative amount.
    #[must_use]
    pub fn max_exposure(&self) -> u128 {
        self.market_outcome_sums
            .iter()
            .map(|sum| if *sum < 0 { sum.unsigned_abs() } else { 0 })
            .max()
            .unwrap_or(0)
    }

    /// Payout owed if `outcome` wins, or `None` for an unknown outcome.
    #[must_use]
    pub fn outcome_sum(&self, outcome: u16) -> Option<i128> {
        self.market_outcome_sums.get(usize::from(outcome)).copied()
    }
}

impl AccountLayout for MarketPosition {
    const TYPE_NAME: &'static str = "MarketPosition";

    fn read_fields(reader: &mut LayoutReader<'_>) -> Result<Self> {
        Ok(Self {
            purchaser: reader.read()?,
            market: reader.read()?,
            paid: reader.read()?,
            market_outcome_sums: reader.read()?,
            unmatched_exposures: reader.read()?,
            payer: reader.read()?,
        })
    }
}

/// Test helpers.
#[cfg(any(test, feature = "test-helpers"))]
impl MarketPosition {
    pub fn dummy(purchaser: Pubkey, market: Pubkey, paid: bool) -> Self {
        Self {
            purchaser,
            market,
            paid,
            market_outcome_sums: vec![1_500, -1_000, -1_000],
            unmatched_exposures: vec![0, 0, 0],
            payer: purchaser,
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut w = crate::layout::LayoutWriter::for_account::<Self>();
        w.write(&self.purchaser);
        w.write(&self.market);
        w.write(&self.paid);
        w.write(&self.market_outcome_sums);
        w.write(&self.unmatched_exposures);
        w.write(&self.payer);
        w.into_bytes()
    }
}
