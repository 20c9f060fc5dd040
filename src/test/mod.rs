//! Test support shared by the unit tests.
//!
//! - [`parser`] - a bounds-checked big-endian cursor over encoded bytes
//! - [`decoder`] - reads encoded annotations, type annotation headers and lists back into
//!   values, resolving constant pool indices through a
//!   [`crate::constpool::ConstantPoolBuilder`]

pub mod parser;

pub use parser::Parser;
