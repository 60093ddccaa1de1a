//! System-wide constants for LedgerView.

/// Width of the type discriminator that prefixes every account.
pub const DISCRIMINATOR_LEN: usize = 8;

/// Namespace hashed together with the type name to derive a discriminator.
pub const DISCRIMINATOR_NAMESPACE: &str = "account";

/// Default number of keys per bulk account request.
///
/// Chosen to stay under the transport's per-request key limit of 100.
pub const DEFAULT_CHUNK_SIZE: usize = 99;

/// Upper bound accepted for a configured chunk size.
pub const MAX_CHUNK_SIZE: usize = 100;

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
