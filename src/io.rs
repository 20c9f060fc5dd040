//! Big-endian byte buffer and bounds-checked reading/writing utilities.
//!
//! Class files store every multi-byte quantity in big-endian order. This module provides
//! the primitives the annotation encoder is built on: the [`crate::io::BinIO`] trait for
//! converting primitive values to and from their big-endian representation, safe
//! offset-tracking read and write helpers, and [`crate::io::ByteVector`], the growable
//! buffer every writer accumulates its bytes in.
//!
//! # Key Components
//!
//! - [`crate::io::BinIO`] - Endian conversion for `u8`..`u64`, `i8`..`i64`, `f32`, `f64`
//! - [`crate::io::read_be`] / [`crate::io::read_be_at`] - Bounds-checked reads
//! - [`crate::io::write_be`] / [`crate::io::write_be_at`] - Bounds-checked writes
//! - [`crate::io::ByteVector`] - Append-only buffer with in-place `u16` patching
//!
//! # Usage Examples
//!
//! ```rust
//! use typeanno::io::{read_be_at, ByteVector};
//!
//! let mut out = ByteVector::new();
//! out.put_u16(0);
//! out.put_tagged(b's', 7);
//! out.patch_u16(0, 1);
//! assert_eq!(out.as_slice(), &[0x00, 0x01, b's', 0x00, 0x07]);
//!
//! let mut offset = 0;
//! let count: u16 = read_be_at(out.as_slice(), &mut offset)?;
//! assert_eq!(count, 1);
//! assert_eq!(offset, 2);
//! # Ok::<(), typeanno::Error>(())
//! ```
//!
//! # Error Handling
//!
//! The free read and write functions return [`crate::Error::OutOfBounds`] when the buffer
//! is too short. [`crate::io::ByteVector::patch_u16`] is only ever called on slots the
//! encoder reserved itself, so an out-of-range patch is a contract violation and panics.

use crate::Result;

/// Trait for type-specific big-endian conversions.
///
/// Each implementation defines a `Bytes` associated type that represents the fixed-size
/// byte array for that type (e.g., `[u8; 4]` for `u32`).
pub trait BinIO: Sized + Copy {
    /// Associated type representing the byte array type for this numeric type.
    type Bytes: Sized + AsRef<[u8]> + for<'a> TryFrom<&'a [u8]>;

    /// Read T from a byte buffer in big-endian
    fn from_be_bytes(bytes: Self::Bytes) -> Self;

    /// Write T to a byte buffer in big-endian
    fn to_be_bytes(self) -> Self::Bytes;
}

macro_rules! impl_bin_io {
    ($($ty:ty => $len:expr),* $(,)?) => {
        $(
            impl BinIO for $ty {
                type Bytes = [u8; $len];

                fn from_be_bytes(bytes: Self::Bytes) -> Self {
                    <$ty>::from_be_bytes(bytes)
                }

                fn to_be_bytes(self) -> Self::Bytes {
                    <$ty>::to_be_bytes(self)
                }
            }
        )*
    };
}

impl_bin_io! {
    u8 => 1,
    i8 => 1,
    u16 => 2,
    i16 => 2,
    u32 => 4,
    i32 => 4,
    u64 => 8,
    i64 => 8,
    f32 => 4,
    f64 => 8,
}

/// Safely reads a value of type `T` in big-endian byte order from the start of a buffer.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if there are insufficient bytes.
pub fn read_be<T: BinIO>(data: &[u8]) -> Result<T> {
    let mut offset = 0_usize;
    read_be_at(data, &mut offset)
}

/// Safely reads a value of type `T` in big-endian byte order at `offset`, advancing it.
///
/// # Arguments
///
/// * `data` - The byte buffer to read from
/// * `offset` - Mutable reference to the offset position (will be advanced after reading)
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if there are insufficient bytes; `offset` is left
/// untouched in that case.
pub fn read_be_at<T: BinIO>(data: &[u8], offset: &mut usize) -> Result<T> {
    let type_len = std::mem::size_of::<T>();
    if (type_len + *offset) > data.len() {
        return Err(out_of_bounds_error!());
    }

    let Ok(read) = data[*offset..*offset + type_len].try_into() else {
        return Err(out_of_bounds_error!());
    };

    *offset += type_len;

    Ok(T::from_be_bytes(read))
}

/// Safely writes a value of type `T` in big-endian byte order to the start of a buffer.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if there are insufficient bytes.
pub fn write_be<T: BinIO>(data: &mut [u8], value: T) -> Result<()> {
    let mut offset = 0_usize;
    write_be_at(data, &mut offset, value)
}

/// Safely writes a value of type `T` in big-endian byte order at `offset`, advancing it.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if there are insufficient bytes.
pub fn write_be_at<T: BinIO>(data: &mut [u8], offset: &mut usize, value: T) -> Result<()> {
    let type_len = std::mem::size_of::<T>();
    if (type_len + *offset) > data.len() {
        return Err(out_of_bounds_error!());
    }

    let bytes = value.to_be_bytes();
    data[*offset..*offset + type_len].copy_from_slice(bytes.as_ref());
    *offset += type_len;

    Ok(())
}

/// A growable big-endian byte buffer.
///
/// Values are only ever appended, with one exception: [`ByteVector::patch_u16`] overwrites
/// a two-byte slot that was reserved earlier, which is how counts that are unknown at the
/// time their slot is written get filled in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ByteVector {
    data: Vec<u8>,
}

impl ByteVector {
    /// Creates an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        ByteVector { data: Vec::new() }
    }

    /// Creates an empty buffer able to hold `capacity` bytes without reallocating.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        ByteVector {
            data: Vec::with_capacity(capacity),
        }
    }

    /// Number of bytes written so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if nothing has been written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The bytes written so far.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Consumes the buffer, returning the underlying bytes.
    #[must_use]
    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }

    /// Appends any [`BinIO`] value in big-endian order.
    pub fn put_be<T: BinIO>(&mut self, value: T) -> &mut Self {
        self.data.extend_from_slice(value.to_be_bytes().as_ref());
        self
    }

    /// Appends a single byte.
    pub fn put_u8(&mut self, value: u8) -> &mut Self {
        self.data.push(value);
        self
    }

    /// Appends a big-endian `u16`.
    pub fn put_u16(&mut self, value: u16) -> &mut Self {
        self.put_be(value)
    }

    /// Appends a big-endian `u32`.
    pub fn put_u32(&mut self, value: u32) -> &mut Self {
        self.put_be(value)
    }

    /// Appends a one-byte tag followed by a big-endian `u16`.
    pub fn put_tagged(&mut self, tag: u8, value: u16) -> &mut Self {
        self.put_u8(tag).put_u16(value)
    }

    /// Appends raw bytes.
    pub fn put_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.data.extend_from_slice(bytes);
        self
    }

    /// Drops everything written after the first `len` bytes.
    ///
    /// Has no effect if `len` is not smaller than the current length.
    pub fn truncate(&mut self, len: usize) {
        self.data.truncate(len);
    }

    /// Overwrites the two bytes at `at` with `value` in big-endian order.
    ///
    /// # Panics
    /// Panics if `at + 2` exceeds the buffer length; slots are reserved by the encoder
    /// before they are patched.
    pub fn patch_u16(&mut self, at: usize, value: u16) {
        self.data[at..at + 2].copy_from_slice(&value.to_be_bytes());
    }
}

impl AsRef<[u8]> for ByteVector {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

impl From<ByteVector> for Vec<u8> {
    fn from(value: ByteVector) -> Self {
        value.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_be_values() {
        let data = [0x12, 0x34, 0x56, 0x78, 0x9A, 0xBC, 0xDE, 0xF0];

        assert_eq!(read_be::<u8>(&data).unwrap(), 0x12);
        assert_eq!(read_be::<u16>(&data).unwrap(), 0x1234);
        assert_eq!(read_be::<u32>(&data).unwrap(), 0x1234_5678);
        assert_eq!(read_be::<u64>(&data).unwrap(), 0x1234_5678_9ABC_DEF0);
        assert_eq!(read_be::<i8>(&[0xFF]).unwrap(), -1);
        assert_eq!(read_be::<i16>(&[0xFF, 0xFE]).unwrap(), -2);
    }

    #[test]
    fn read_be_at_advances() {
        let data = [0x00, 0x01, 0x00, 0x00, 0x00, 0x02];
        let mut offset = 0;

        assert_eq!(read_be_at::<u16>(&data, &mut offset).unwrap(), 1);
        assert_eq!(offset, 2);
        assert_eq!(read_be_at::<u32>(&data, &mut offset).unwrap(), 2);
        assert_eq!(offset, 6);
    }

    #[test]
    fn read_be_out_of_bounds() {
        let data = [0x01, 0x02];
        let mut offset = 1;

        assert!(matches!(
            read_be_at::<u16>(&data, &mut offset),
            Err(crate::Error::OutOfBounds)
        ));
        assert_eq!(offset, 1);
        assert!(matches!(read_be::<u32>(&data), Err(crate::Error::OutOfBounds)));
    }

    #[test]
    fn write_be_values() {
        let mut data = [0u8; 6];
        let mut offset = 0;

        write_be_at(&mut data, &mut offset, 0x0102_u16).unwrap();
        write_be_at(&mut data, &mut offset, 0x0304_0506_u32).unwrap();
        assert_eq!(offset, 6);
        assert_eq!(data, [0x01, 0x02, 0x03, 0x04, 0x05, 0x06]);

        assert!(matches!(
            write_be_at(&mut data, &mut offset, 1u8),
            Err(crate::Error::OutOfBounds)
        ));

        write_be(&mut data, 1.0f32).unwrap();
        assert_eq!(&data[..4], &[0x3F, 0x80, 0x00, 0x00]);
    }

    #[test]
    fn byte_vector_puts() {
        let mut out = ByteVector::new();
        out.put_u8(0xCA)
            .put_u16(0xFEBA)
            .put_u32(0xBE00_0001)
            .put_tagged(b'[', 3)
            .put_bytes(&[9, 8]);

        assert_eq!(
            out.as_slice(),
            &[0xCA, 0xFE, 0xBA, 0xBE, 0x00, 0x00, 0x01, b'[', 0x00, 0x03, 9, 8]
        );
        assert_eq!(out.len(), 12);
        assert!(!out.is_empty());
    }

    #[test]
    fn byte_vector_put_be_floats() {
        let mut out = ByteVector::new();
        out.put_be(-2.5f64).put_be(-1i32);

        assert_eq!(
            out.into_vec(),
            vec![0xC0, 0x04, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xFF, 0xFF, 0xFF, 0xFF]
        );
    }

    #[test]
    fn byte_vector_patch() {
        let mut out = ByteVector::with_capacity(8);
        out.put_u16(0).put_u16(0);
        out.patch_u16(2, 0x0A0B);
        out.patch_u16(2, 0x0A0B);

        assert_eq!(out.as_slice(), &[0x00, 0x00, 0x0A, 0x0B]);

        out.truncate(1);
        assert_eq!(out.as_slice(), &[0x00]);
        out.truncate(5);
        assert_eq!(out.len(), 1);
    }

    #[test]
    #[should_panic]
    fn byte_vector_patch_past_end() {
        let mut out = ByteVector::new();
        out.put_u8(0);
        out.patch_u16(0, 1);
    }
}
