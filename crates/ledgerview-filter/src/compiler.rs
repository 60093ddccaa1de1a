//! Filter compiler.
//!
//! Turns a type discriminator plus a set of criteria into the fewest
//! contiguous byte-range filters the ledger can evaluate server side:
//!
//! 1. Start with the discriminator at offset 0
//! 2. Keep only criteria with a value
//! 3. Sort ascending by offset
//! 4. Concatenate runs where one range ends exactly where the next begins
//!
//! Overlapping ranges are a caller error and are rejected.

use ledgerview_types::{LedgerviewError, Result, constants};
use tracing::trace;

use crate::criterion::ByteCriterion;

/// A compiled server-side predicate: `bytes` must appear at `offset`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ByteFilter {
    offset: usize,
    bytes: Vec<u8>,
}

impl ByteFilter {
    #[must_use]
    pub fn new(offset: usize, bytes: Vec<u8>) -> Self {
        Self { offset, bytes }
    }

    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// First byte past the range.
    #[must_use]
    pub fn end(&self) -> usize {
        self.offset + self.bytes.len()
    }

    /// Whether `data` holds this filter's bytes at its offset.
    #[must_use]
    pub fn matches(&self, data: &[u8]) -> bool {
        data.get(self.offset..self.end()) == Some(self.bytes.as_slice())
    }
}

/// Fail if `[a_offset, a_end)` and `[b_offset, b_end)` share any byte.
pub fn ensure_disjoint(a: &dyn ByteCriterion, b: &dyn ByteCriterion) -> Result<()> {
    let (first, second) = if a.offset() <= b.offset() { (a, b) } else { (b, a) };
    if first.end() > second.offset() {
        return Err(LedgerviewError::OverlappingCriteria {
            first_offset: first.offset(),
            first_end: first.end(),
            second_offset: second.offset(),
        });
    }
    Ok(())
}

/// Compile the discriminator and populated criteria into merged filters.
///
/// The result is ascending by offset, pairwise non-overlapping, and never
/// contains two filters where one ends exactly at the other's start.
pub fn compile(
    discriminator: &[u8; constants::DISCRIMINATOR_LEN],
    criteria: &[&dyn ByteCriterion],
) -> Result<Vec<ByteFilter>> {
    let mut entries: Vec<(usize, Vec<u8>)> = Vec::with_capacity(criteria.len() + 1);
    entries.push((0, discriminator.to_vec()));

    for criterion in criteria {
        let Some(bytes) = criterion.serialized() else {
            continue;
        };
        if bytes.len() != criterion.size() {
            return Err(LedgerviewError::FieldWidthMismatch {
                offset: criterion.offset(),
                declared: criterion.size(),
                expected: bytes.len(),
            });
        }
        if bytes.is_empty() {
            return Err(LedgerviewError::EmptyCriterion {
                offset: criterion.offset(),
            });
        }
        entries.push((criterion.offset(), bytes));
    }

    // Stable: the discriminator stays first among entries at offset 0, so a
    // criterion at 0 is reported as overlapping it.
    entries.sort_by_key(|(offset, _)| *offset);

    let mut filters: Vec<ByteFilter> = Vec::with_capacity(entries.len());
    for (offset, bytes) in entries {
        match filters.last_mut() {
            Some(last) if last.end() == offset => last.bytes.extend_from_slice(&bytes),
            Some(last) if last.end() > offset => {
                return Err(LedgerviewError::OverlappingCriteria {
                    first_offset: last.offset,
                    first_end: last.end(),
                    second_offset: offset,
                });
            }
            _ => filters.push(ByteFilter::new(offset, bytes)),
        }
    }

    trace!(
        criteria = criteria.len(),
        filters = filters.len(),
        "compiled byte filters"
    );
    Ok(filters)
}
