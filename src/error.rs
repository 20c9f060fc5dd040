use thiserror::Error;

#[allow(unused_macros)]
macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

macro_rules! out_of_bounds_error {
    () => {
        crate::Error::OutOfBounds
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Encoding an annotation is a precondition-driven transformation: misuse of the writer API
/// (too many values for a `u16` count, an over-long type path, nesting past the configured
/// limit) is a programming error and panics through the crate's contract checks instead of
/// surfacing here. What remains are failures of the constant pool collaborator and of the
/// bounds-checked reading helpers.
///
/// # Error Categories
///
/// ## Constant Pool Errors
/// - [`Error::ConstantPoolOverflow`] - The pool ran out of `u16` indices
/// - [`Error::Utf8TooLong`] - A UTF-8 constant does not fit its `u16` length field
///
/// ## Reading Errors
/// - [`Error::OutOfBounds`] - Attempted to read beyond the end of a buffer
/// - [`Error::Malformed`] - Bytes do not form a valid annotation structure
///
/// # Examples
///
/// ```rust
/// use typeanno::{ConstantPool, ConstantPoolBuilder, Error};
///
/// let mut pool = ConstantPoolBuilder::new();
/// let huge = "x".repeat(70_000);
/// match pool.utf8(&huge) {
///     Err(Error::Utf8TooLong(len)) => assert_eq!(len, 70_000),
///     other => panic!("unexpected result: {other:?}"),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The constant pool cannot hand out another index.
    ///
    /// Class-file constant pool indices are unsigned 16-bit values, and long and double
    /// entries occupy two slots each. The payload is the index the new entry would have
    /// needed.
    #[error("Constant pool overflow - index {0} exceeds the highest usable index 65534")]
    ConstantPoolOverflow(usize),

    /// A UTF-8 constant is longer than the 65535 bytes its length field can describe.
    #[error("UTF-8 constant is too long - {0} bytes")]
    Utf8TooLong(usize),

    /// An out of bound access was attempted while reading a buffer.
    ///
    /// This error occurs when trying to read data beyond the end of the buffer. It's a
    /// safety check to prevent buffer overruns during decoding.
    #[error("Out of Bound read would have occurred!")]
    OutOfBounds,

    /// The data is damaged and could not be decoded.
    ///
    /// The error includes the source location where the malformation was detected for
    /// debugging purposes.
    ///
    /// # Fields
    ///
    /// * `message` - Detailed description of what was malformed
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },
}
