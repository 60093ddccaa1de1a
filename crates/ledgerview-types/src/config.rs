//! Configuration for the account query engine.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{LedgerviewError, Result, constants};

/// Tunables shared by every query built on the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Keys per bulk account request.
    pub chunk_size: usize,
    /// Deadline for a whole `fetch`/`fetch_keys` call. `None` waits indefinitely.
    pub timeout_ms: Option<u64>,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            chunk_size: constants::DEFAULT_CHUNK_SIZE,
            timeout_ms: None,
        }
    }
}

impl QueryConfig {
    /// Parse and validate a JSON config document. Missing fields take defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = Some(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX));
        self
    }

    /// The configured deadline, if any.
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 || self.chunk_size > constants::MAX_CHUNK_SIZE {
            return Err(LedgerviewError::Configuration(format!(
                "chunk_size must be in 1..={}, got {}",
                constants::MAX_CHUNK_SIZE,
                self.chunk_size
            )));
        }
        if self.timeout_ms == Some(0) {
            return Err(LedgerviewError::Configuration(
                "timeout_ms must be positive when set".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = QueryConfig::default();
        assert_eq!(cfg.chunk_size, 99);
        assert!(cfg.timeout().is_none());
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn json_missing_fields_take_defaults() {
        let cfg = QueryConfig::from_json_str(r#"{"timeout_ms": 2500}"#).unwrap();
        assert_eq!(cfg.chunk_size, 99);
        assert_eq!(cfg.timeout(), Some(Duration::from_millis(2500)));
    }

    #[test]
    fn zero_chunk_size_rejected() {
        let err = QueryConfig::from_json_str(r#"{"chunk_size": 0}"#).unwrap_err();
        assert!(matches!(err, LedgerviewError::Configuration(_)));
    }

    #[test]
    fn oversized_chunk_rejected() {
        let cfg = QueryConfig::default().with_chunk_size(101);
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn malformed_json_is_serialization_error() {
        let err = QueryConfig::from_json_str("{chunk_size:").unwrap_err();
        assert!(matches!(err, LedgerviewError::Serialization(_)));
    }
}
