//! Field criteria: single byte-range equality predicates over an account buffer.
//!
//! [`Criterion<T>`] is the typed form used by entity queries; its width comes
//! from the value type's fixed encoding. [`FieldFilter`] is the untyped form
//! for ad-hoc predicates. Both expose the [`ByteCriterion`] capability set the
//! compiler works with.

use ledgerview_types::{FixedWidth, LayoutWriter, LedgerviewError, Result, WriteLayout};

/// What the filter compiler needs from a predicate.
pub trait ByteCriterion: Send + Sync {
    /// Offset from byte 0 of the account, discriminator included.
    fn offset(&self) -> usize;

    /// Width of the predicate in bytes.
    fn size(&self) -> usize;

    /// Expected bytes, or `None` when the predicate is unset.
    fn serialized(&self) -> Option<Vec<u8>>;

    fn has_value(&self) -> bool {
        self.serialized().is_some()
    }

    /// First byte past the predicate.
    fn end(&self) -> usize {
        self.offset() + self.size()
    }
}

// ---------------------------------------------------------------------------
// Criterion<T>
// ---------------------------------------------------------------------------

/// A typed predicate on one fixed-width field.
///
/// Offset and size are fixed at construction; the value can be set, replaced
/// or cleared. An unset criterion contributes nothing to filtering.
#[derive(Debug, Clone, PartialEq)]
pub struct Criterion<T> {
    offset: usize,
    size: usize,
    value: Option<T>,
}

impl<T: FixedWidth + WriteLayout> Criterion<T> {
    /// Criterion on the field at `offset`, sized by the value type.
    #[must_use]
    pub fn new(offset: usize) -> Self {
        Self {
            offset,
            size: T::WIDTH,
            value: None,
        }
    }

    /// Criterion with an explicitly declared width, which must agree with
    /// the value type's encoding.
    pub fn with_size(offset: usize, size: usize) -> Result<Self> {
        if size != T::WIDTH {
            return Err(LedgerviewError::FieldWidthMismatch {
                offset,
                declared: size,
                expected: T::WIDTH,
            });
        }
        Ok(Self::new(offset))
    }

    pub fn set_value(&mut self, value: T) -> &mut Self {
        self.value = Some(value);
        self
    }

    #[must_use]
    pub fn with_value(mut self, value: T) -> Self {
        self.value = Some(value);
        self
    }

    pub fn clear(&mut self) {
        self.value = None;
    }

    #[must_use]
    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }
}

impl<T: FixedWidth + WriteLayout + Send + Sync> ByteCriterion for Criterion<T> {
    fn offset(&self) -> usize {
        self.offset
    }

    fn size(&self) -> usize {
        self.size
    }

    fn serialized(&self) -> Option<Vec<u8>> {
        let value = self.value.as_ref()?;
        let mut writer = LayoutWriter::new();
        writer.write(value);
        Some(writer.into_bytes())
    }

    fn has_value(&self) -> bool {
        self.value.is_some()
    }
}

// ---------------------------------------------------------------------------
// FieldFilter
// ---------------------------------------------------------------------------

/// An untyped predicate: the bytes expected at `offset`. Always set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldFilter {
    offset: usize,
    bytes: Vec<u8>,
}

impl FieldFilter {
    pub fn new(offset: usize, bytes: impl Into<Vec<u8>>) -> Result<Self> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(LedgerviewError::EmptyCriterion { offset });
        }
        Ok(Self { offset, bytes })
    }

    /// Predicate matching the encoding of `value` at `offset`.
    #[must_use]
    pub fn encoded<T: FixedWidth + WriteLayout>(offset: usize, value: &T) -> Self {
        let mut writer = LayoutWriter::new();
        writer.write(value);
        Self {
            offset,
            bytes: writer.into_bytes(),
        }
    }

    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl ByteCriterion for FieldFilter {
    fn offset(&self) -> usize {
        self.offset
    }

    fn size(&self) -> usize {
        self.bytes.len()
    }

    fn serialized(&self) -> Option<Vec<u8>> {
        Some(self.bytes.clone())
    }

    fn has_value(&self) -> bool {
        true
    }
}
