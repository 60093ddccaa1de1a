//! # ledgerview-types
//!
//! Shared types, errors, layouts, and configuration for **LedgerView**.
//!
//! This crate is the leaf dependency of the workspace: every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`Pubkey`], [`Slot`]
//! - **Binary layout**: [`LayoutReader`], [`LayoutWriter`], [`ReadLayout`], [`WriteLayout`], [`FixedWidth`], [`AccountLayout`]
//! - **Circular queues**: [`RingBufferQueue`]
//! - **Account records**: [`Market`], [`Order`], [`Trade`], [`MarketPosition`], [`MarketMatchingPool`], [`Product`]
//! - **Queue accounts**: [`MarketMatchingQueue`], [`MarketOrderRequestQueue`], [`MarketPaymentsQueue`]
//! - **Configuration**: [`QueryConfig`]
//! - **Errors**: [`LedgerviewError`] with `LV_ERR_` prefix codes, [`TransportError`]
//! - **Constants**: discriminator width, chunk sizes

pub mod config;
pub mod constants;
pub mod error;
pub mod ids;
pub mod layout;
pub mod market;
pub mod order;
pub mod pool;
pub mod position;
pub mod product;
pub mod queue;
pub mod queues;
pub mod trade;

// Re-export all primary types at crate root for ergonomic imports:
//   use ledgerview_types::{Order, OrderStatus, Pubkey, RingBufferQueue, ...};

pub use config::*;
pub use error::*;
pub use ids::*;
pub use layout::{
    AccountLayout, FixedWidth, LayoutReader, LayoutWriter, ReadLayout, WriteLayout,
    account_discriminator,
};
pub use market::*;
pub use order::*;
pub use pool::*;
pub use position::*;
pub use product::*;
pub use queue::RingBufferQueue;
pub use queues::*;
pub use trade::*;

// Constants are accessed via `ledgerview_types::constants::FOO`
// (not re-exported to avoid name collisions).
