//! Realistic multi-entity scenario: one market with orders, trades,
//! positions and matching pools, read back through the typed queries.

use std::sync::Arc;

use ledgerview_query::*;
use ledgerview_types::*;
use rust_decimal::Decimal;
use tracing_subscriber::EnvFilter;

const PROGRAM: Pubkey = Pubkey::new([0x42; 32]);

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

struct Scenario {
    ledger: Arc<InMemoryLedger>,
    market: Pubkey,
    other_market: Pubkey,
    alice: Pubkey,
    bob: Pubkey,
}

impl Scenario {
    fn new() -> Self {
        let scenario = Self {
            ledger: Arc::new(InMemoryLedger::at_slot(Slot(500))),
            market: Pubkey::filled(0x10),
            other_market: Pubkey::filled(0x20),
            alice: Pubkey::filled(0xA1),
            bob: Pubkey::filled(0xB0),
        };
        scenario.seed();
        scenario
    }

    fn put(&self, index: u64, data: Vec<u8>) {
        self.ledger.insert(PROGRAM, Pubkey::from_index(index), data);
    }

    fn seed(&self) {
        let event = Pubkey::filled(0xE0);
        self.put(1, Market::dummy(Pubkey::filled(1), event, MarketStatus::Open).encode());
        self.put(2, Market::dummy(Pubkey::filled(1), event, MarketStatus::Settled).encode());

        let orders = [
            (10, self.alice, self.market, OrderStatus::Open),
            (11, self.alice, self.market, OrderStatus::Matched),
            (12, self.bob, self.market, OrderStatus::Open),
            (13, self.alice, self.other_market, OrderStatus::Open),
        ];
        for (i, purchaser, market, status) in orders {
            self.put(i, Order::dummy(purchaser, market, status).encode());
        }

        self.put(20, Trade::dummy(self.alice, self.market, Pubkey::from_index(11)).encode());
        self.put(21, Trade::dummy(self.bob, self.market, Pubkey::from_index(12)).encode());

        self.put(30, MarketPosition::dummy(self.alice, self.market, false).encode());
        self.put(31, MarketPosition::dummy(self.bob, self.market, false).encode());

        let pools = [
            (40, 0u16, true, Decimal::new(20, 1), 1_000u64),
            (41, 0, true, Decimal::new(22, 1), 400),
            (42, 0, false, Decimal::new(24, 1), 250),
            (43, 1, true, Decimal::new(35, 1), 90),
            (44, 1, false, Decimal::new(40, 1), 0),
        ];
        for (i, outcome, for_outcome, price, liquidity) in pools {
            self.put(
                i,
                MarketMatchingPool::dummy(self.market, outcome, for_outcome, price, liquidity).encode(),
            );
        }
    }

    fn transport(&self) -> Arc<dyn LedgerTransport> {
        self.ledger.clone()
    }
}

#[tokio::test]
async fn each_query_only_sees_its_own_account_type() {
    init_tracing();
    let s = Scenario::new();

    assert_eq!(MarketQuery::new(PROGRAM, s.transport()).fetch().await.unwrap().len(), 2);
    assert_eq!(OrderQuery::new(PROGRAM, s.transport()).fetch().await.unwrap().len(), 4);
    assert_eq!(TradeQuery::new(PROGRAM, s.transport()).fetch().await.unwrap().len(), 2);
    assert_eq!(MarketPositionQuery::new(PROGRAM, s.transport()).fetch().await.unwrap().len(), 2);
    assert_eq!(MarketMatchingPoolQuery::new(PROGRAM, s.transport()).fetch().await.unwrap().len(), 5);
    assert!(ProductQuery::new(PROGRAM, s.transport()).fetch().await.unwrap().is_empty());
}

#[tokio::test]
async fn alice_open_orders_in_market() {
    init_tracing();
    let s = Scenario::new();
    let result = OrderQuery::new(PROGRAM, s.transport())
        .filter_by_purchaser(s.alice)
        .filter_by_market(s.market)
        .filter_by_status(OrderStatus::Open)
        .fetch()
        .await
        .unwrap();
    assert_eq!(result.keys().copied().collect::<Vec<_>>(), vec![Pubkey::from_index(10)]);
}

#[tokio::test]
async fn positions_and_trades_by_purchaser() {
    let s = Scenario::new();
    let positions = MarketPositionQuery::new(PROGRAM, s.transport())
        .filter_by_purchaser(s.bob)
        .fetch()
        .await
        .unwrap();
    assert_eq!(positions.len(), 1);
    assert_eq!(positions.records[0].account.market, s.market);

    let trades = TradeQuery::new(PROGRAM, s.transport())
        .filter_by_market(s.market)
        .filter_by_purchaser(s.alice)
        .fetch()
        .await
        .unwrap();
    assert_eq!(trades.len(), 1);
    assert_eq!(trades.records[0].account.order, Pubkey::from_index(11));
}

#[tokio::test]
async fn market_liquidity_ladders() {
    init_tracing();
    let s = Scenario::new();
    let liquidity = fetch_market_liquidity(PROGRAM, s.transport(), s.market).await.unwrap();

    assert_eq!(liquidity.slot, Some(Slot(501)));
    let best_for = liquidity.best_for(0).unwrap();
    assert_eq!(best_for.price, Decimal::new(22, 1));
    assert_eq!(best_for.liquidity, 400);
    assert_eq!(liquidity.best_against(0).unwrap().liquidity, 250);
    assert_eq!(liquidity.outcome(0).unwrap().total_for(), 1_400);

    assert_eq!(liquidity.best_for(1).unwrap().liquidity, 90);
    assert!(liquidity.best_against(1).is_none());
}

#[tokio::test]
async fn settled_markets_sorted_by_title() {
    let s = Scenario::new();
    let result = MarketQuery::new(PROGRAM, s.transport())
        .filter_by_status(MarketStatus::Settled)
        .fetch_sorted_by(|a, b| a.title.cmp(&b.title))
        .await
        .unwrap();
    assert_eq!(result.len(), 1);
    assert!(result.accounts().all(Market::is_resolved));
}
