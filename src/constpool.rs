//! Constant pool collaborator used by the annotation encoder.
//!
//! Annotation bytes never carry literal values inline: every name, descriptor, string and
//! numeric constant is referenced through a `u16` index into the class file's constant
//! pool. The encoder only depends on the [`crate::constpool::ConstantPool`] trait; the
//! class writer that owns the real pool implements it. [`crate::constpool::ConstantPoolBuilder`]
//! is a self-contained, deduplicating implementation for callers that do not have one.
//!
//! # Index Management
//!
//! Indices follow the class-file conventions:
//! - Index 0 is never handed out
//! - `CONSTANT_Long` and `CONSTANT_Double` entries occupy two consecutive slots
//! - The highest usable index is 65534, since `constant_pool_count` is one more than it
//!
//! `CONSTANT_Utf8` entries are written in the class file's modified UTF-8: `U+0000` takes
//! two bytes and supplementary characters are written as a pair of encoded surrogates.
//!
//! # Usage Examples
//!
//! ```rust
//! use typeanno::{Constant, ConstantPool, ConstantPoolBuilder};
//!
//! let mut pool = ConstantPoolBuilder::new();
//! let name = pool.utf8("value")?;
//! assert_eq!(name, 1);
//! assert_eq!(pool.utf8("value")?, name);
//!
//! let wide = pool.long(42)?;
//! assert_eq!(wide, 2);
//! assert_eq!(pool.integer(7)?, 4);
//!
//! assert_eq!(pool.constant(&Constant::Double(0.5))?, (b'D', 5));
//! # Ok::<(), typeanno::Error>(())
//! ```

use std::collections::HashMap;

use crate::{annotation::ELEMENT_TAG, io::ByteVector, Error, Result};

/// Constant pool entry tags as defined by the class-file format.
#[allow(non_snake_case, missing_docs)]
pub mod CONSTANT_TAG {
    pub const UTF8: u8 = 1;
    pub const INTEGER: u8 = 3;
    pub const FLOAT: u8 = 4;
    pub const LONG: u8 = 5;
    pub const DOUBLE: u8 = 6;
}

/// A literal that can be interned through [`ConstantPool::constant`].
#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    /// `CONSTANT_Integer`
    Integer(i32),
    /// `CONSTANT_Float`
    Float(f32),
    /// `CONSTANT_Long`
    Long(i64),
    /// `CONSTANT_Double`
    Double(f64),
    /// `CONSTANT_Utf8`
    Utf8(String),
}

/// The interning interface the annotation writer consumes.
///
/// Every method returns a stable index: interning the same value twice during one
/// encoding session must yield the same index.
pub trait ConstantPool {
    /// Interns a UTF-8 string.
    ///
    /// # Errors
    /// Returns an error if the pool cannot hold the entry.
    fn utf8(&mut self, value: &str) -> Result<u16>;

    /// Interns a 32-bit integer.
    ///
    /// # Errors
    /// Returns an error if the pool cannot hold the entry.
    fn integer(&mut self, value: i32) -> Result<u16>;

    /// Interns a 32-bit float.
    ///
    /// # Errors
    /// Returns an error if the pool cannot hold the entry.
    fn float(&mut self, value: f32) -> Result<u16>;

    /// Interns a 64-bit integer.
    ///
    /// # Errors
    /// Returns an error if the pool cannot hold the entry.
    fn long(&mut self, value: i64) -> Result<u16>;

    /// Interns a 64-bit float.
    ///
    /// # Errors
    /// Returns an error if the pool cannot hold the entry.
    fn double(&mut self, value: f64) -> Result<u16>;

    /// Interns any [`Constant`], returning the element value tag that describes it
    /// together with its index.
    ///
    /// The tag is one of `I`, `F`, `J`, `D` or `s`.
    ///
    /// # Errors
    /// Returns an error if the pool cannot hold the entry.
    fn constant(&mut self, value: &Constant) -> Result<(u8, u16)> {
        Ok(match value {
            Constant::Integer(v) => (ELEMENT_TAG::INT, self.integer(*v)?),
            Constant::Float(v) => (ELEMENT_TAG::FLOAT, self.float(*v)?),
            Constant::Long(v) => (ELEMENT_TAG::LONG, self.long(*v)?),
            Constant::Double(v) => (ELEMENT_TAG::DOUBLE, self.double(*v)?),
            Constant::Utf8(v) => (ELEMENT_TAG::STRING, self.utf8(v)?),
        })
    }
}

/// One entry of a [`ConstantPoolBuilder`].
#[derive(Debug, Clone, PartialEq)]
pub enum PoolEntry {
    /// `CONSTANT_Utf8`
    Utf8(String),
    /// `CONSTANT_Integer`
    Integer(i32),
    /// `CONSTANT_Float`
    Float(f32),
    /// `CONSTANT_Long`, occupying two slots
    Long(i64),
    /// `CONSTANT_Double`, occupying two slots
    Double(f64),
}

impl PoolEntry {
    /// Number of pool slots this entry occupies.
    #[must_use]
    pub fn slots(&self) -> usize {
        match self {
            PoolEntry::Long(_) | PoolEntry::Double(_) => 2,
            _ => 1,
        }
    }

    /// The class-file tag of this entry.
    #[must_use]
    pub fn tag(&self) -> u8 {
        match self {
            PoolEntry::Utf8(_) => CONSTANT_TAG::UTF8,
            PoolEntry::Integer(_) => CONSTANT_TAG::INTEGER,
            PoolEntry::Float(_) => CONSTANT_TAG::FLOAT,
            PoolEntry::Long(_) => CONSTANT_TAG::LONG,
            PoolEntry::Double(_) => CONSTANT_TAG::DOUBLE,
        }
    }
}

/// Highest index a pool entry may occupy.
const MAX_INDEX: usize = u16::MAX as usize - 1;

/// Length of `value` in the class file's modified UTF-8.
#[must_use]
pub fn modified_utf8_len(value: &str) -> usize {
    value
        .encode_utf16()
        .map(|unit| match unit {
            0x0001..=0x007F => 1,
            0x0000 | 0x0080..=0x07FF => 2,
            _ => 3,
        })
        .sum()
}

/// Appends `value` in modified UTF-8, without a length prefix.
#[allow(clippy::cast_possible_truncation)]
pub fn put_modified_utf8(out: &mut ByteVector, value: &str) {
    for unit in value.encode_utf16() {
        match unit {
            0x0001..=0x007F => {
                out.put_u8(unit as u8);
            }
            0x0000 | 0x0080..=0x07FF => {
                out.put_u8(0xC0 | (unit >> 6) as u8)
                    .put_u8(0x80 | (unit & 0x3F) as u8);
            }
            _ => {
                out.put_u8(0xE0 | (unit >> 12) as u8)
                    .put_u8(0x80 | ((unit >> 6) & 0x3F) as u8)
                    .put_u8(0x80 | (unit & 0x3F) as u8);
            }
        }
    }
}

/// Floats are keyed by bit pattern so that `NaN` and `-0.0` intern like any other value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum PoolKey {
    Utf8(String),
    Integer(i32),
    Float(u32),
    Long(i64),
    Double(u64),
}

/// A deduplicating, in-memory constant pool.
///
/// Entries are numbered from 1 in insertion order; long and double entries advance the
/// next index by two.
#[derive(Debug, Clone)]
pub struct ConstantPoolBuilder {
    entries: Vec<(u16, PoolEntry)>,
    lookup: HashMap<PoolKey, u16>,
    next_index: usize,
}

impl ConstantPoolBuilder {
    /// Creates a new, empty pool. The first entry receives index 1.
    #[must_use]
    pub fn new() -> Self {
        ConstantPoolBuilder {
            entries: Vec::new(),
            lookup: HashMap::new(),
            next_index: 1,
        }
    }

    /// Number of distinct entries (not slots).
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing has been interned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The `constant_pool_count` value: one more than the highest used slot.
    #[must_use]
    pub fn count(&self) -> usize {
        self.next_index
    }

    /// Looks up the entry stored at `index`.
    ///
    /// Returns `None` for index 0, for the unusable second slot of a long or double, and
    /// for indices that have not been assigned.
    #[must_use]
    pub fn get(&self, index: u16) -> Option<&PoolEntry> {
        self.entries
            .binary_search_by_key(&index, |(at, _)| *at)
            .ok()
            .map(|position| &self.entries[position].1)
    }

    /// Iterates over `(index, entry)` pairs in index order.
    pub fn iter(&self) -> impl Iterator<Item = (u16, &PoolEntry)> {
        self.entries.iter().map(|(index, entry)| (*index, entry))
    }

    /// Writes `constant_pool_count` followed by every entry.
    ///
    /// # Errors
    /// Returns [`crate::Error::ConstantPoolOverflow`] if the slot count does not fit a `u16`.
    pub fn put(&self, out: &mut ByteVector) -> Result<()> {
        let count = u16::try_from(self.next_index)
            .map_err(|_| Error::ConstantPoolOverflow(self.next_index))?;
        out.put_u16(count);

        for (_, entry) in &self.entries {
            out.put_u8(entry.tag());
            match entry {
                PoolEntry::Utf8(value) => {
                    // Length was validated when the entry was interned
                    #[allow(clippy::cast_possible_truncation)]
                    out.put_u16(modified_utf8_len(value) as u16);
                    put_modified_utf8(out, value);
                }
                PoolEntry::Integer(value) => {
                    out.put_be(*value);
                }
                PoolEntry::Float(value) => {
                    out.put_be(*value);
                }
                PoolEntry::Long(value) => {
                    out.put_be(*value);
                }
                PoolEntry::Double(value) => {
                    out.put_be(*value);
                }
            }
        }

        Ok(())
    }

    fn intern(&mut self, key: PoolKey, entry: PoolEntry) -> Result<u16> {
        if let Some(index) = self.lookup.get(&key) {
            return Ok(*index);
        }

        let index = self.next_index;
        let last_slot = index + entry.slots() - 1;
        if last_slot > MAX_INDEX {
            return Err(Error::ConstantPoolOverflow(last_slot));
        }

        #[allow(clippy::cast_possible_truncation)]
        let index = index as u16;
        self.next_index = last_slot + 1;
        self.entries.push((index, entry));
        self.lookup.insert(key, index);
        Ok(index)
    }
}

impl Default for ConstantPoolBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ConstantPool for ConstantPoolBuilder {
    fn utf8(&mut self, value: &str) -> Result<u16> {
        let encoded = modified_utf8_len(value);
        if encoded > usize::from(u16::MAX) {
            return Err(Error::Utf8TooLong(encoded));
        }
        self.intern(
            PoolKey::Utf8(value.to_string()),
            PoolEntry::Utf8(value.to_string()),
        )
    }

    fn integer(&mut self, value: i32) -> Result<u16> {
        self.intern(PoolKey::Integer(value), PoolEntry::Integer(value))
    }

    fn float(&mut self, value: f32) -> Result<u16> {
        self.intern(PoolKey::Float(value.to_bits()), PoolEntry::Float(value))
    }

    fn long(&mut self, value: i64) -> Result<u16> {
        self.intern(PoolKey::Long(value), PoolEntry::Long(value))
    }

    fn double(&mut self, value: f64) -> Result<u16> {
        self.intern(PoolKey::Double(value.to_bits()), PoolEntry::Double(value))
    }
}
