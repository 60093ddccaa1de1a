//! Product accounts: front ends that route orders and earn a commission.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::layout::{AccountLayout, LayoutReader};
use crate::{Pubkey, Result};

/// A product account.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Product {
    pub authority: Pubkey,
    pub payer: Pubkey,
    pub commission_escrow_bump: u8,
    /// Commission percentage taken on winnings routed through this product.
    pub commission_rate: Decimal,
    pub product_title: String,
}

impl Product {
    pub const AUTHORITY_OFFSET: usize = 8;
    pub const PAYER_OFFSET: usize = 40;
}

impl AccountLayout for Product {
    const TYPE_NAME: &'static str = "Product";

    fn read_fields(reader: &mut LayoutReader<'_>) -> Result<Self> {
        Ok(Self {
            authority: reader.read()?,
            payer: reader.read()?,
            commission_escrow_bump: reader.read()?,
            commission_rate: reader.read_price()?,
            product_title: reader.read()?,
        })
    }
}

/// Test helpers.
#[cfg(any(test, feature = "test-helpers"))]
impl Product {
    pub fn dummy(authority: Pubkey, payer: Pubkey, title: &str) -> Self {
        Self {
            authority,
            payer,
            commission_escrow_bump: 254,
            commission_rate: Decimal::new(25, 1),
            product_title: title.to_string(),
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut w = crate::layout::LayoutWriter::for_account::<Self>();
        w.write(&self.authority);
        w.write(&self.payer);
        w.write(&self.commission_escrow_bump);
        w.write_price(self.commission_rate);
        w.write(&self.product_title);
        w.into_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_product() {
        let product = Product::dummy(Pubkey([1; 32]), Pubkey([2; 32]), "Exchange Frontend");
        let bytes = product.encode();
        assert_eq!(&bytes[Product::PAYER_OFFSET..][..32], &[2; 32]);
        assert_eq!(Product::decode(&bytes).unwrap(), product);
    }
}
