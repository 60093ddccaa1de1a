//! Error types for LedgerView.
//!
//! All errors use the `LV_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Criterion / filter validation errors
//! - 2xx: Transport errors (key discovery, batch fetch, deadlines)
//! - 3xx: Account decode errors
//! - 4xx: Queue errors
//! - 9xx: General / internal errors
//!
//! Transport and validation errors fail a query. Decode errors are absorbed
//! per record by the query engine and only surface when decoding directly.

use thiserror::Error;

use crate::Pubkey;

/// Central error enum for all LedgerView operations.
#[derive(Debug, Error)]
pub enum LedgerviewError {
    // =================================================================
    // Validation Errors (1xx)
    // =================================================================
    /// A criterion declared a width that differs from its value's encoding.
    #[error("LV_ERR_100: Field width mismatch at offset {offset}: declared {declared}, value encodes to {expected}")]
    FieldWidthMismatch {
        offset: usize,
        declared: usize,
        expected: usize,
    },

    /// Two criteria (or a criterion and the discriminator) cover the same bytes.
    #[error("LV_ERR_101: Overlapping criteria: [{first_offset}, {first_end}) intersects range starting at {second_offset}")]
    OverlappingCriteria {
        first_offset: usize,
        first_end: usize,
        second_offset: usize,
    },

    /// A criterion with no bytes was supplied.
    #[error("LV_ERR_102: Empty criterion at offset {offset}")]
    EmptyCriterion { offset: usize },

    // =================================================================
    // Transport Errors (2xx)
    // =================================================================
    /// Key discovery against the ledger failed.
    #[error("LV_ERR_200: Key discovery failed: {reason}")]
    KeyDiscoveryFailed { reason: String },

    /// A bulk account fetch failed.
    #[error("LV_ERR_201: Batch fetch failed: {reason}")]
    BatchFetchFailed { reason: String },

    /// The transport returned a different number of accounts than requested.
    #[error("LV_ERR_202: Batch length mismatch: requested {requested}, returned {returned}")]
    BatchLengthMismatch { requested: usize, returned: usize },

    /// The whole call exceeded its deadline.
    #[error("LV_ERR_203: Query timed out after {ms}ms")]
    Timeout { ms: u64 },

    /// The caller cancelled the call before it completed.
    #[error("LV_ERR_204: Query cancelled")]
    Cancelled,

    // =================================================================
    // Decode Errors (3xx)
    // =================================================================
    /// The 8-byte prefix does not belong to the expected account type.
    #[error("LV_ERR_300: Discriminator mismatch for {type_name}")]
    DiscriminatorMismatch { type_name: String },

    /// The buffer ended before a field could be read.
    #[error("LV_ERR_301: Unexpected end of data at offset {offset}: needed {needed} bytes, {remaining} left")]
    UnexpectedEof {
        offset: usize,
        needed: usize,
        remaining: usize,
    },

    /// A boolean field held something other than 0 or 1.
    #[error("LV_ERR_302: Invalid bool byte {value:#04x} at offset {offset}")]
    InvalidBool { offset: usize, value: u8 },

    /// An enum or option tag is out of range.
    #[error("LV_ERR_303: Invalid {type_name} tag {tag}")]
    InvalidEnumTag { type_name: &'static str, tag: u8 },

    /// A string field is not valid UTF-8.
    #[error("LV_ERR_304: Invalid UTF-8 in string at offset {offset}")]
    InvalidUtf8 { offset: usize },

    /// A price field cannot be represented as a decimal (NaN, infinite, out of range).
    #[error("LV_ERR_305: Invalid price value: {value}")]
    InvalidPrice { value: f64 },

    /// A timestamp field is outside the representable range.
    #[error("LV_ERR_306: Invalid timestamp: {value}")]
    InvalidTimestamp { value: i64 },

    /// The codec was asked for a type it does not know.
    #[error("LV_ERR_307: Unknown account type: {0}")]
    UnknownAccountType(String),

    /// A length prefix claims more elements than the buffer could hold.
    #[error("LV_ERR_308: Length prefix {len} at offset {offset} exceeds remaining data")]
    LengthOverflow { offset: usize, len: usize },

    // =================================================================
    // Queue Errors (4xx)
    // =================================================================
    /// Logical read past the queue's current length.
    #[error("LV_ERR_400: Queue index {index} out of bounds (len {len})")]
    QueueIndexOutOfBounds { index: usize, len: usize },

    /// The queue header contradicts its backing array.
    #[error("LV_ERR_401: Invalid queue layout: {reason}")]
    InvalidQueueLayout { reason: String },

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Unrecoverable internal error.
    #[error("LV_ERR_900: Internal error: {0}")]
    Internal(String),

    /// Serialization / deserialization error.
    #[error("LV_ERR_901: Serialization error: {0}")]
    Serialization(String),

    /// Configuration error (invalid config file, missing fields, etc.).
    #[error("LV_ERR_902: Configuration error: {0}")]
    Configuration(String),
}

impl LedgerviewError {
    /// Whether this error belongs to the transport class (2xx).
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::KeyDiscoveryFailed { .. }
                | Self::BatchFetchFailed { .. }
                | Self::BatchLengthMismatch { .. }
                | Self::Timeout { .. }
                | Self::Cancelled
        )
    }

    /// Whether this error belongs to the decode class (3xx).
    #[must_use]
    pub fn is_decode(&self) -> bool {
        matches!(
            self,
            Self::DiscriminatorMismatch { .. }
                | Self::UnexpectedEof { .. }
                | Self::InvalidBool { .. }
                | Self::InvalidEnumTag { .. }
                | Self::InvalidUtf8 { .. }
                | Self::InvalidPrice { .. }
                | Self::InvalidTimestamp { .. }
                | Self::UnknownAccountType(_)
                | Self::LengthOverflow { .. }
                | Self::InvalidQueueLayout { .. }
        )
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, LedgerviewError>;

/// Failure reported by a ledger transport implementation.
///
/// The query engine maps it onto [`LedgerviewError::KeyDiscoveryFailed`] or
/// [`LedgerviewError::BatchFetchFailed`] depending on which call failed.
#[derive(Debug, Clone, Error)]
#[error("{reason}")]
pub struct TransportError {
    pub reason: String,
    /// The account whose lookup failed, when the transport knows it.
    pub key: Option<Pubkey>,
}

impl TransportError {
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            key: None,
        }
    }

    #[must_use]
    pub fn for_key(key: Pubkey, reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            key: Some(key),
        }
    }
}

impl From<serde_json::Error> for LedgerviewError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlapping_criteria_display() {
        let err = LedgerviewError::OverlappingCriteria {
            first_offset: 8,
            first_end: 40,
            second_offset: 32,
        };
        let msg = format!("{err}");
        assert!(msg.starts_with("LV_ERR_101"), "Got: {msg}");
        assert!(msg.contains("[8, 40)"));
    }

    #[test]
    fn transport_and_decode_classes_are_disjoint() {
        let transport = LedgerviewError::BatchFetchFailed { reason: "x".into() };
        let decode = LedgerviewError::InvalidBool { offset: 3, value: 7 };
        assert!(transport.is_transport() && !transport.is_decode());
        assert!(decode.is_decode() && !decode.is_transport());
        assert!(!LedgerviewError::Internal("x".into()).is_transport());
    }

    #[test]
    fn transport_error_keeps_key() {
        let err = TransportError::for_key(Pubkey([9; 32]), "rpc closed");
        assert_eq!(err.key, Some(Pubkey([9; 32])));
        assert_eq!(err.to_string(), "rpc closed");
    }

    #[test]
    fn all_errors_have_lv_err_prefix() {
        let errors: Vec<Box<dyn std::error::Error>> = vec![
            Box::new(LedgerviewError::Cancelled),
            Box::new(LedgerviewError::Timeout { ms: 10 }),
            Box::new(LedgerviewError::UnknownAccountType("Foo".into())),
            Box::new(LedgerviewError::QueueIndexOutOfBounds { index: 4, len: 2 }),
            Box::new(LedgerviewError::FieldWidthMismatch {
                offset: 8,
                declared: 4,
                expected: 32,
            }),
        ];
        for err in errors {
            let msg = format!("{err}");
            assert!(msg.starts_with("LV_ERR_"), "Error missing LV_ERR_ prefix: {msg}");
        }
    }
}
