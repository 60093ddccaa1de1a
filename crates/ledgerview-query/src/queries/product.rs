use std::sync::Arc;

use ledgerview_filter::{ByteCriterion, Criterion};
use ledgerview_types::{Product, Pubkey};

use super::EntityQuery;
use crate::engine::AccountQuery;
use crate::transport::LedgerTransport;

pub struct ProductQuery {
    query: AccountQuery<Product>,
    authority: Criterion<Pubkey>,
    payer: Criterion<Pubkey>,
}

impl ProductQuery {
    #[must_use]
    pub fn new(program_id: Pubkey, transport: Arc<dyn LedgerTransport>) -> Self {
        Self::from_query(AccountQuery::new(program_id, transport))
    }

    #[must_use]
    pub fn from_query(query: AccountQuery<Product>) -> Self {
        Self {
            query,
            authority: Criterion::new(Product::AUTHORITY_OFFSET),
            payer: Criterion::new(Product::PAYER_OFFSET),
        }
    }

    #[must_use]
    pub fn filter_by_authority(mut self, authority: Pubkey) -> Self {
        self.authority.set_value(authority);
        self
    }

    #[must_use]
    pub fn filter_by_payer(mut self, payer: Pubkey) -> Self {
        self.payer.set_value(payer);
        self
    }
}

impl EntityQuery for ProductQuery {
    type Account = Product;

    fn engine(&self) -> &AccountQuery<Product> {
        &self.query
    }

    fn criteria(&self) -> Vec<&dyn ByteCriterion> {
        vec![&self.authority, &self.payer]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryLedger;

    const PROGRAM: Pubkey = Pubkey::new([0x42; 32]);

    #[tokio::test]
    async fn products_by_payer_sorted_by_title() {
        let ledger = Arc::new(InMemoryLedger::new());
        let payer = Pubkey([3; 32]);
        for (i, p, title) in [(1u64, payer, "zeta"), (2, Pubkey([4; 32]), "alpha"), (3, payer, "beta")] {
            let product = Product::dummy(Pubkey([1; 32]), p, title);
            ledger.insert(PROGRAM, Pubkey::from_index(i), product.encode());
        }

        let result = ProductQuery::new(PROGRAM, ledger)
            .filter_by_payer(payer)
            .fetch_sorted_by(|a, b| a.product_title.cmp(&b.product_title))
            .await
            .unwrap();
        let titles: Vec<_> = result.accounts().map(|p| p.product_title.as_str()).collect();
        assert_eq!(titles, vec!["beta", "zeta"]);
    }
}
