//! Binary account layout: a bounds-checked reader, a writer, and the traits
//! that tie field types and account records to their wire encoding.
//!
//! Every account buffer starts with an 8-byte discriminator derived from the
//! record's type name, followed by little-endian fields. Variable-width
//! fields (`Option`, `String`, `Vec`, queues) carry a tag or `u32` prefix.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use sha2::{Digest, Sha256};

use crate::{LedgerviewError, Pubkey, Result, constants};

/// Derive the 8-byte discriminator for an account type name.
#[must_use]
pub fn account_discriminator(type_name: &str) -> [u8; constants::DISCRIMINATOR_LEN] {
    let mut hasher = Sha256::new();
    hasher.update(constants::DISCRIMINATOR_NAMESPACE.as_bytes());
    hasher.update(b":");
    hasher.update(type_name.as_bytes());
    let hash = hasher.finalize();
    let mut out = [0u8; constants::DISCRIMINATOR_LEN];
    out.copy_from_slice(&hash[..constants::DISCRIMINATOR_LEN]);
    out
}

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// A value that can be read from an account buffer.
pub trait ReadLayout: Sized {
    fn read(reader: &mut LayoutReader<'_>) -> Result<Self>;
}

/// A value that can be appended to an account buffer.
pub trait WriteLayout {
    fn write(&self, writer: &mut LayoutWriter);
}

/// A value whose encoding always has the same width.
///
/// Only fixed-width values can be used in server-side byte filters.
pub trait FixedWidth {
    const WIDTH: usize;
}

/// A discriminated account record stored by the ledger program.
pub trait AccountLayout: Sized + Send + Sync + 'static {
    /// Type name the discriminator is derived from.
    const TYPE_NAME: &'static str;

    #[must_use]
    fn discriminator() -> [u8; constants::DISCRIMINATOR_LEN] {
        account_discriminator(Self::TYPE_NAME)
    }

    /// Read the fields that follow the discriminator.
    fn read_fields(reader: &mut LayoutReader<'_>) -> Result<Self>;

    /// Decode a full account buffer, checking the discriminator first.
    ///
    /// Trailing bytes after the last field are ignored: accounts are often
    /// allocated with room to grow.
    fn decode(data: &[u8]) -> Result<Self> {
        let mut reader = LayoutReader::new(data);
        let discriminator: [u8; constants::DISCRIMINATOR_LEN] = reader.read_array()?;
        if discriminator != Self::discriminator() {
            return Err(LedgerviewError::DiscriminatorMismatch {
                type_name: Self::TYPE_NAME.to_string(),
            });
        }
        Self::read_fields(&mut reader)
    }
}

// ---------------------------------------------------------------------------
// Reader
// ---------------------------------------------------------------------------

/// Cursor over an account buffer. Every read is bounds-checked.
#[derive(Debug, Clone)]
pub struct LayoutReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> LayoutReader<'a> {
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Current offset from the start of the buffer.
    #[must_use]
    pub fn position(&self) -> usize {
        self.pos
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        if len > self.remaining() {
            return Err(LedgerviewError::UnexpectedEof {
                offset: self.pos,
                needed: len,
                remaining: self.remaining(),
            });
        }
        let out = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(out)
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    pub fn read<T: ReadLayout>(&mut self) -> Result<T> {
        T::read(self)
    }

    /// Read a `u32` length prefix for a sequence.
    ///
    /// Every element occupies at least one byte, so a prefix larger than the
    /// remaining data is rejected before anything is allocated.
    pub fn read_len(&mut self) -> Result<usize> {
        let offset = self.pos;
        let len = usize::try_from(self.read::<u32>()?)
            .map_err(|e| LedgerviewError::Internal(e.to_string()))?;
        if len > self.remaining() {
            return Err(LedgerviewError::LengthOverflow { offset, len });
        }
        Ok(len)
    }

    /// Read a single-byte enum tag.
    pub fn read_tag(&mut self) -> Result<u8> {
        self.read::<u8>()
    }

    /// Read an `f64` price as a decimal.
    pub fn read_price(&mut self) -> Result<Decimal> {
        let value = self.read::<f64>()?;
        Decimal::try_from(value).map_err(|_| LedgerviewError::InvalidPrice { value })
    }

    /// Read an `i64` unix timestamp (seconds).
    pub fn read_timestamp(&mut self) -> Result<DateTime<Utc>> {
        let value = self.read::<i64>()?;
        DateTime::from_timestamp(value, 0).ok_or(LedgerviewError::InvalidTimestamp { value })
    }

    pub fn read_optional_timestamp(&mut self) -> Result<Option<DateTime<Utc>>> {
        match self.read_tag()? {
            0 => Ok(None),
            1 => self.read_timestamp().map(Some),
            tag => Err(LedgerviewError::InvalidEnumTag {
                type_name: "Option",
                tag,
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Writer
// ---------------------------------------------------------------------------

/// Append-only builder for account buffers.
#[derive(Debug, Clone, Default)]
pub struct LayoutWriter {
    buf: Vec<u8>,
}

impl LayoutWriter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a buffer for account type `T` with its discriminator in place.
    #[must_use]
    pub fn for_account<T: AccountLayout>() -> Self {
        let mut writer = Self::new();
        writer.put_bytes(&T::discriminator());
        writer
    }

    pub fn put_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    pub fn write<T: WriteLayout + ?Sized>(&mut self, value: &T) {
        value.write(self);
    }

    /// Write a `u32` sequence length prefix.
    ///
    /// # Panics
    /// Panics if `len` does not fit in a `u32`.
    pub fn write_len(&mut self, len: usize) {
        let len = u32::try_from(len).expect("sequence length exceeds u32");
        self.write(&len);
    }

    pub fn write_price(&mut self, price: Decimal) {
        self.write(&price.to_f64().unwrap_or(f64::NAN));
    }

    pub fn write_timestamp(&mut self, ts: DateTime<Utc>) {
        self.write(&ts.timestamp());
    }

    pub fn write_optional_timestamp(&mut self, ts: Option<DateTime<Utc>>) {
        match ts {
            None => self.write(&0u8),
            Some(ts) => {
                self.write(&1u8);
                self.write_timestamp(ts);
            }
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

// ---------------------------------------------------------------------------
// Field encodings
// ---------------------------------------------------------------------------

macro_rules! le_primitive {
    ($($ty:ty),*) => {$(
        impl ReadLayout for $ty {
            fn read(reader: &mut LayoutReader<'_>) -> Result<Self> {
                Ok(<$ty>::from_le_bytes(reader.read_array()?))
            }
        }

        impl WriteLayout for $ty {
            fn write(&self, writer: &mut LayoutWriter) {
                writer.put_bytes(&self.to_le_bytes());
            }
        }

        impl FixedWidth for $ty {
            const WIDTH: usize = std::mem::size_of::<$ty>();
        }
    )*};
}

le_primitive!(u8, u16, u32, u64, i64, i128, f64);

impl ReadLayout for bool {
    fn read(reader: &mut LayoutReader<'_>) -> Result<Self> {
        let offset = reader.position();
        match reader.read::<u8>()? {
            0 => Ok(false),
            1 => Ok(true),
            value => Err(LedgerviewError::InvalidBool { offset, value }),
        }
    }
}

impl WriteLayout for bool {
    fn write(&self, writer: &mut LayoutWriter) {
        writer.put_bytes(&[u8::from(*self)]);
    }
}

impl FixedWidth for bool {
    const WIDTH: usize = 1;
}

impl ReadLayout for Pubkey {
    fn read(reader: &mut LayoutReader<'_>) -> Result<Self> {
        Ok(Self(reader.read_array()?))
    }
}

impl WriteLayout for Pubkey {
    fn write(&self, writer: &mut LayoutWriter) {
        writer.put_bytes(&self.0);
    }
}

impl FixedWidth for Pubkey {
    const WIDTH: usize = Pubkey::LEN;
}

impl<const N: usize> ReadLayout for [u8; N] {
    fn read(reader: &mut LayoutReader<'_>) -> Result<Self> {
        reader.read_array()
    }
}

impl<const N: usize> WriteLayout for [u8; N] {
    fn write(&self, writer: &mut LayoutWriter) {
        writer.put_bytes(self);
    }
}

impl<const N: usize> FixedWidth for [u8; N] {
    const WIDTH: usize = N;
}

impl<T: ReadLayout> ReadLayout for Option<T> {
    fn read(reader: &mut LayoutReader<'_>) -> Result<Self> {
        match reader.read_tag()? {
            0 => Ok(None),
            1 => T::read(reader).map(Some),
            tag => Err(LedgerviewError::InvalidEnumTag {
                type_name: "Option",
                tag,
            }),
        }
    }
}

impl<T: WriteLayout> WriteLayout for Option<T> {
    fn write(&self, writer: &mut LayoutWriter) {
        match self {
            None => writer.write(&0u8),
            Some(value) => {
                writer.write(&1u8);
                writer.write(value);
            }
        }
    }
}

impl ReadLayout for String {
    fn read(reader: &mut LayoutReader<'_>) -> Result<Self> {
        let len = reader.read_len()?;
        let offset = reader.position();
        let bytes = reader.read_bytes(len)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| LedgerviewError::InvalidUtf8 { offset })
    }
}

impl WriteLayout for str {
    fn write(&self, writer: &mut LayoutWriter) {
        writer.write_len(self.len());
        writer.put_bytes(self.as_bytes());
    }
}

impl WriteLayout for String {
    fn write(&self, writer: &mut LayoutWriter) {
        self.as_str().write(writer);
    }
}

impl<T: ReadLayout> ReadLayout for Vec<T> {
    fn read(reader: &mut LayoutReader<'_>) -> Result<Self> {
        let len = reader.read_len()?;
        let mut items = Vec::with_capacity(len);
        for _ in 0..len {
            items.push(T::read(reader)?);
        }
        Ok(items)
    }
}

impl<T: WriteLayout> WriteLayout for Vec<T> {
    fn write(&self, writer: &mut LayoutWriter) {
        writer.write_len(self.len());
        for item in self {
            writer.write(item);
        }
    }
}

/// Implements the single-byte tag encoding for a fieldless `#[repr(u8)]` enum
/// that provides `fn from_tag(u8) -> Option<Self>`.
macro_rules! tagged_enum_layout {
    ($ty:ty, $name:literal) => {
        impl $crate::layout::ReadLayout for $ty {
            fn read(reader: &mut $crate::layout::LayoutReader<'_>) -> $crate::Result<Self> {
                let tag = reader.read_tag()?;
                Self::from_tag(tag).ok_or($crate::LedgerviewError::InvalidEnumTag {
                    type_name: $name,
                    tag,
                })
            }
        }

        impl $crate::layout::WriteLayout for $ty {
            fn write(&self, writer: &mut $crate::layout::LayoutWriter) {
                writer.write(&(*self as u8));
            }
        }

        impl $crate::layout::FixedWidth for $ty {
            const WIDTH: usize = 1;
        }
    };
}

pub(crate) use tagged_enum_layout;
