//! # ledgerview-filter
//!
//! **Criterion and filter compilation for LedgerView.**
//!
//! Entity queries describe what they want as typed field criteria; the ledger
//! only understands "these bytes at this offset". This crate bridges the two:
//!
//! - [`Criterion<T>`]: a typed predicate on one fixed-width field
//! - [`FieldFilter`]: an untyped predicate for ad-hoc byte matches
//! - [`compile`]: merges the discriminator and populated criteria into the
//!   minimal ordered list of [`ByteFilter`]s

pub mod compiler;
pub mod criterion;

pub use compiler::{ByteFilter, compile, ensure_disjoint};
pub use criterion::{ByteCriterion, Criterion, FieldFilter};
