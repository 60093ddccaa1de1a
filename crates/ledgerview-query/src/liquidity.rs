//! Market liquidity ladders built from matching pools.
//!
//! Each outcome of a market has two ladders:
//! - **For**: `BTreeMap<Reverse<Decimal>, LiquidityLevel>` -- highest price first
//! - **Against**: `BTreeMap<Decimal, LiquidityLevel>` -- lowest price first
//!
//! Pools that share outcome, side and price are summed into one level.
//! Pools with no unmatched liquidity are left out.

use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::sync::Arc;

use ledgerview_types::{MarketMatchingPool, Pubkey, Result, Slot};
use rust_decimal::Decimal;
use tracing::debug;

use crate::queries::{EntityQuery, MarketMatchingPoolQuery};
use crate::transport::LedgerTransport;

/// Aggregated liquidity at one price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiquidityLevel {
    pub price: Decimal,
    /// Unmatched stake resting at this price.
    pub liquidity: u64,
    /// Number of pools contributing.
    pub pools: usize,
}

impl LiquidityLevel {
    fn new(price: Decimal) -> Self {
        Self {
            price,
            liquidity: 0,
            pools: 0,
        }
    }

    fn add(&mut self, amount: u64) {
        self.liquidity = self.liquidity.saturating_add(amount);
        self.pools += 1;
    }
}

/// Both ladders for one outcome.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutcomeLiquidity {
    for_levels: BTreeMap<Reverse<Decimal>, LiquidityLevel>,
    against_levels: BTreeMap<Decimal, LiquidityLevel>,
}

impl OutcomeLiquidity {
    fn add_pool(&mut self, pool: &MarketMatchingPool) {
        if pool.for_outcome {
            self.for_levels
                .entry(Reverse(pool.price))
                .or_insert_with(|| LiquidityLevel::new(pool.price))
                .add(pool.liquidity_amount);
        } else {
            self.against_levels
                .entry(pool.price)
                .or_insert_with(|| LiquidityLevel::new(pool.price))
                .add(pool.liquidity_amount);
        }
    }

    /// For-side levels, best (highest) price first.
    pub fn for_levels(&self) -> impl Iterator<Item = &LiquidityLevel> {
        self.for_levels.values()
    }

    /// Against-side levels, best (lowest) price first.
    pub fn against_levels(&self) -> impl Iterator<Item = &LiquidityLevel> {
        self.against_levels.values()
    }

    #[must_use]
    pub fn best_for(&self) -> Option<&LiquidityLevel> {
        self.for_levels.values().next()
    }

    #[must_use]
    pub fn best_against(&self) -> Option<&LiquidityLevel> {
        self.against_levels.values().next()
    }

    #[must_use]
    pub fn total_for(&self) -> u64 {
        self.for_levels
            .values()
            .fold(0u64, |total, l| total.saturating_add(l.liquidity))
    }

    #[must_use]
    pub fn total_against(&self) -> u64 {
        self.against_levels
            .values()
            .fold(0u64, |total, l| total.saturating_add(l.liquidity))
    }
}

/// Liquidity of a whole market, keyed by outcome index.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketLiquidity {
    pub market: Pubkey,
    outcomes: BTreeMap<u16, OutcomeLiquidity>,
    /// Slot of the pool snapshot, when it came from the ledger.
    pub slot: Option<Slot>,
}

impl MarketLiquidity {
    /// Aggregate `pools`. Pools belonging to other markets are ignored.
    #[must_use]
    pub fn from_pools<'a, I>(market: Pubkey, pools: I) -> Self
    where
        I: IntoIterator<Item = &'a MarketMatchingPool>,
    {
        let mut outcomes: BTreeMap<u16, OutcomeLiquidity> = BTreeMap::new();
        for pool in pools {
            if pool.market != market || !pool.has_liquidity() {
                continue;
            }
            outcomes
                .entry(pool.market_outcome_index)
                .or_default()
                .add_pool(pool);
        }
        Self {
            market,
            outcomes,
            slot: None,
        }
    }

    #[must_use]
    pub fn outcome(&self, index: u16) -> Option<&OutcomeLiquidity> {
        self.outcomes.get(&index)
    }

    /// Outcomes with any liquidity, ascending by index.
    pub fn outcomes(&self) -> impl Iterator<Item = (u16, &OutcomeLiquidity)> {
        self.outcomes.iter().map(|(i, o)| (*i, o))
    }

    #[must_use]
    pub fn best_for(&self, outcome: u16) -> Option<&LiquidityLevel> {
        self.outcome(outcome).and_then(OutcomeLiquidity::best_for)
    }

    #[must_use]
    pub fn best_against(&self, outcome: u16) -> Option<&LiquidityLevel> {
        self.outcome(outcome).and_then(OutcomeLiquidity::best_against)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}

/// Load every matching pool of `market` and aggregate them.
pub async fn fetch_market_liquidity(
    program_id: Pubkey,
    transport: Arc<dyn LedgerTransport>,
    market: Pubkey,
) -> Result<MarketLiquidity> {
    let result = MarketMatchingPoolQuery::new(program_id, transport)
        .filter_by_market(market)
        .fetch()
        .await?;
    let mut liquidity = MarketLiquidity::from_pools(market, result.accounts());
    liquidity.slot = result.slot;
    debug!(
        market = %market.short(),
        pools = result.len(),
        outcomes = liquidity.outcomes.len(),
        "aggregated market liquidity"
    );
    Ok(liquidity)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MARKET: Pubkey = Pubkey::new([2; 32]);

    fn pool(outcome: u16, for_outcome: bool, price: Decimal, liquidity: u64) -> MarketMatchingPool {
        MarketMatchingPool::dummy(MARKET, outcome, for_outcome, price, liquidity)
    }

    #[test]
    fn ladders_are_ordered_best_first() {
        let pools = vec![
            pool(0, true, Decimal::new(20, 1), 100),
            pool(0, true, Decimal::new(25, 1), 50),
            pool(0, false, Decimal::new(30, 1), 70),
            pool(0, false, Decimal::new(28, 1), 40),
        ];
        let book = MarketLiquidity::from_pools(MARKET, &pools);

        let for_prices: Vec<_> = book.outcome(0).unwrap().for_levels().map(|l| l.price).collect();
        assert_eq!(for_prices, vec![Decimal::new(25, 1), Decimal::new(20, 1)]);
        assert_eq!(book.best_against(0).unwrap().price, Decimal::new(28, 1));
        assert_eq!(book.outcome(0).unwrap().total_against(), 110);
    }

    #[test]
    fn same_price_pools_are_summed() {
        let pools = vec![
            pool(1, true, Decimal::new(20, 1), 100),
            pool(1, true, Decimal::new(20, 1), 30),
        ];
        let book = MarketLiquidity::from_pools(MARKET, &pools);
        let best = book.best_for(1).unwrap();
        assert_eq!(best.liquidity, 130);
        assert_eq!(best.pools, 2);
    }

    #[test]
    fn totals_saturate_across_levels() {
        let pools = vec![
            pool(0, true, Decimal::new(20, 1), u64::MAX),
            pool(0, true, Decimal::new(30, 1), 5),
            pool(0, false, Decimal::new(40, 1), u64::MAX),
            pool(0, false, Decimal::new(45, 1), u64::MAX),
        ];
        let book = MarketLiquidity::from_pools(MARKET, &pools);
        let outcome = book.outcome(0).unwrap();
        assert_eq!(outcome.total_for(), u64::MAX);
        assert_eq!(outcome.total_against(), u64::MAX);
        assert_eq!(book.best_for(0).unwrap().liquidity, 5);
    }

    #[test]
    fn empty_and_foreign_pools_are_skipped() {
        let mut foreign = pool(0, true, Decimal::new(20, 1), 100);
        foreign.market = Pubkey([9; 32]);
        let pools = vec![foreign, pool(0, true, Decimal::new(20, 1), 0)];
        let book = MarketLiquidity::from_pools(MARKET, &pools);
        assert!(book.is_empty());
        assert!(book.best_for(0).is_none());
    }
}
