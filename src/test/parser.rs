//! Cursor-based big-endian reader used to check encoder output.

use crate::{
    io::{read_be_at, BinIO},
    Result,
};

/// A bounds-checked cursor over a byte slice.
///
/// Every read validates that enough data is left and fails with
/// [`crate::Error::OutOfBounds`] instead of panicking, so truncated encoder output shows up
/// as a test failure with a proper error.
pub struct Parser<'a> {
    /// The binary data being parsed
    data: &'a [u8],
    /// Current position within the data buffer
    position: usize,
}

impl<'a> Parser<'a> {
    /// Create a new [`Parser`] from a byte slice.
    pub fn new(data: &'a [u8]) -> Self {
        Parser { data, position: 0 }
    }

    /// Returns the length of the underlying data buffer.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the parser has no data.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns `true` if there is unread data left.
    pub fn has_more_data(&self) -> bool {
        self.position < self.data.len()
    }

    /// Current position of the cursor.
    pub fn pos(&self) -> usize {
        self.position
    }

    /// Read a value of type `T` in big-endian byte order and advance past it.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if not enough bytes are left.
    pub fn read_be<T: BinIO>(&mut self) -> Result<T> {
        read_be_at::<T>(self.data, &mut self.position)
    }

    /// Fails unless every byte was consumed.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if unread data is left.
    pub fn expect_end(&self) -> Result<()> {
        if self.has_more_data() {
            return Err(malformed_error!(
                "{} trailing bytes at offset {}",
                self.data.len() - self.position,
                self.position
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn reads_sequentially() {
        let data = [0x01, 0x02, 0x03, 0x04, 0x05];
        let mut parser = Parser::new(&data);

        assert_eq!(parser.len(), 5);
        assert!(!parser.is_empty());
        assert_eq!(parser.read_be::<u8>().unwrap(), 0x01);
        assert_eq!(parser.read_be::<u16>().unwrap(), 0x0203);
        assert_eq!(parser.pos(), 3);
        assert!(matches!(parser.read_be::<u32>(), Err(Error::OutOfBounds)));
        assert!(matches!(parser.expect_end(), Err(Error::Malformed { .. })));

        assert_eq!(parser.read_be::<u16>().unwrap(), 0x0405);
        assert!(!parser.has_more_data());
        assert!(parser.expect_end().is_ok());
        assert!(parser.read_be::<u8>().is_err());
    }
}
