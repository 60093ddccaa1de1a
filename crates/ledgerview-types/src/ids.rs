//! Identifiers used throughout LedgerView.
//!
//! Account keys and program ids are raw 32-byte public keys; slots are the
//! ledger's monotonically increasing read watermark.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{LedgerviewError, Result};

// ---------------------------------------------------------------------------
// Pubkey
// ---------------------------------------------------------------------------

/// A 32-byte public key identifying an account or a program on the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Default, Serialize, Deserialize)]
pub struct Pubkey(pub [u8; 32]);

impl Pubkey {
    /// Byte width of a key in the account layout.
    pub const LEN: usize = 32;

    #[must_use]
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Parse a key from a 64-character hex string.
    pub fn from_hex(s: &str) -> Result<Self> {
        let raw = hex::decode(s).map_err(|e| LedgerviewError::Serialization(e.to_string()))?;
        let bytes: [u8; 32] = raw.try_into().map_err(|raw: Vec<u8>| {
            LedgerviewError::Serialization(format!("pubkey must be 32 bytes, got {}", raw.len()))
        })?;
        Ok(Self(bytes))
    }

    /// Short form for log lines: the first four bytes in hex.
    #[must_use]
    pub fn short(&self) -> String {
        hex::encode(&self.0[..4])
    }
}

impl fmt::Display for Pubkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl FromStr for Pubkey {
    type Err = LedgerviewError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

impl From<[u8; 32]> for Pubkey {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

/// Test helpers.
#[cfg(any(test, feature = "test-helpers"))]
impl Pubkey {
    /// Deterministic key whose every byte is `seed`.
    #[must_use]
    pub fn filled(seed: u8) -> Self {
        Self([seed; 32])
    }

    /// Deterministic key derived from a counter, distinct for distinct `n`.
    #[must_use]
    pub fn from_index(n: u64) -> Self {
        let mut bytes = [0u8; 32];
        bytes[..8].copy_from_slice(&n.to_le_bytes());
        bytes[31] = 0xAA;
        Self(bytes)
    }
}

// ---------------------------------------------------------------------------
// Slot
// ---------------------------------------------------------------------------

/// The ledger slot a read was served at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Default, Serialize, Deserialize)]
pub struct Slot(pub u64);

impl Slot {
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "slot:{}", self.0)
    }
}
