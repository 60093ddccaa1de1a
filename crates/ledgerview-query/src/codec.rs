//! Account codec boundary.
//!
//! The engine hands every loaded buffer to an [`AccountCodec`] together with
//! the entity's type name. A codec failure only ever affects that one record.

use ledgerview_types::{AccountLayout, LedgerviewError, Result};

/// Decodes raw account bytes into a typed record.
pub trait AccountCodec<T>: Send + Sync {
    fn decode(&self, type_name: &str, data: &[u8]) -> Result<T>;
}

/// Codec for every [`AccountLayout`] type: checks the type name and the
/// discriminator, then reads the layout.
#[derive(Debug, Clone, Copy, Default)]
pub struct LayoutCodec;

impl<T: AccountLayout> AccountCodec<T> for LayoutCodec {
    fn decode(&self, type_name: &str, data: &[u8]) -> Result<T> {
        if type_name != T::TYPE_NAME {
            return Err(LedgerviewError::UnknownAccountType(type_name.to_string()));
        }
        T::decode(data)
    }
}

#[cfg(test)]
mod tests {
    use ledgerview_types::{Order, OrderStatus, Pubkey, Trade};

    use super::*;

    #[test]
    fn decodes_matching_type() {
        let order = Order::dummy(Pubkey([1; 32]), Pubkey([2; 32]), OrderStatus::Open);
        let decoded: Order = LayoutCodec.decode("Order", &order.encode()).unwrap();
        assert_eq!(decoded, order);
    }

    #[test]
    fn rejects_mismatched_type_name() {
        let order = Order::dummy(Pubkey([1; 32]), Pubkey([2; 32]), OrderStatus::Open);
        let err = AccountCodec::<Order>::decode(&LayoutCodec, "Trade", &order.encode()).unwrap_err();
        assert!(matches!(err, LedgerviewError::UnknownAccountType(name) if name == "Trade"));
    }

    #[test]
    fn rejects_foreign_discriminator() {
        let order = Order::dummy(Pubkey([1; 32]), Pubkey([2; 32]), OrderStatus::Open);
        let err = AccountCodec::<Trade>::decode(&LayoutCodec, "Trade", &order.encode()).unwrap_err();
        assert!(matches!(err, LedgerviewError::DiscriminatorMismatch { .. }));
    }
}
