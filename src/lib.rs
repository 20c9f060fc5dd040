// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![allow(dead_code)]
#![deny(unsafe_code)]

//! # typeanno
//!
//! A binary encoder for the annotation and type annotation attributes of JVM class files.
//! Built in pure Rust, `typeanno` turns a stream of visitor calls describing annotation
//! values, target metadata and type paths into the exact bytes a class-file reader expects,
//! including the counts and lengths that are only known once nested content is complete.
//!
//! ## Features
//!
//! - **Typed value model** - Every supported element value kind is a variant of
//!   [`ElementValue`], primitive arrays included
//! - **Count backpatching** - Nested annotations and arrays reserve their count slot and
//!   patch it when they end
//! - **Typed target headers** - Each type annotation target kind only carries the fields
//!   that are valid for it
//! - **List linearization** - Annotations are collected per program element and written in
//!   construction order, with their size and count prefixes
//! - **Pluggable constant pool** - Anything implementing [`ConstantPool`] can intern names
//!   and literals; [`ConstantPoolBuilder`] is a ready-made deduplicating pool
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! typeanno = "0.1"
//! ```
//!
//! ### Using the Prelude
//!
//! ```rust
//! use typeanno::prelude::*;
//!
//! let mut pool = ConstantPoolBuilder::new();
//! let mut writer = AnnotationWriter::annotation(&mut pool, "Ljava/lang/Deprecated;")?;
//! writer.visit("since", "9")?;
//! writer.visit("forRemoval", true)?;
//! writer.visit_end();
//!
//! assert_eq!(writer.size(), 2);
//! # Ok::<(), typeanno::Error>(())
//! ```
//!
//! ### Type Annotations
//!
//! ```rust
//! use typeanno::prelude::*;
//!
//! let mut pool = ConstantPoolBuilder::new();
//! let mut list = AnnotationList::new();
//!
//! // @NonNull on the element type of a `String[]` field
//! let target = TypeAnnotationTarget::new(TargetInfo::Empty(EmptyTarget::Field))
//!     .with_path(TypePath::new().then(TypePathEntry::array_element()));
//! let mut writer = AnnotationWriter::type_annotation(&mut pool, &target, "LNonNull;")?;
//! writer.visit_end();
//! list.prepend(writer.into_record());
//!
//! let mut attribute = ByteVector::new();
//! list.put(&mut attribute);
//! assert_eq!(attribute.len(), 4 + 2 + 8);
//! # Ok::<(), typeanno::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`prelude`] - Convenient re-exports of commonly used types and traits
//! - [`annotation`] - Value model, target headers, writer and list linearization
//! - [`constpool`] - The constant pool collaborator interface and an in-memory pool
//! - [`io`] - Big-endian byte buffer and bounds-checked read/write helpers
//! - [`config`] - Contract enforcement options
//! - [`Error`] and [`Result`] - Error handling
//!
//! ## Error Handling
//!
//! Only the constant pool can fail during encoding; those failures are returned as
//! [`Error`]. Misusing the writer, for example writing more values than a `u16` count can
//! describe, is a caller bug and panics according to [`EncoderConfig`].
//!
//! ```rust
//! use typeanno::{AnnotationWriter, ConstantPoolBuilder, Error};
//!
//! let mut pool = ConstantPoolBuilder::new();
//! let mut writer = AnnotationWriter::annotation(&mut pool, "LA;")?;
//! match writer.visit("value", "x".repeat(70_000)) {
//!     Err(Error::Utf8TooLong(len)) => println!("string of {len} bytes rejected"),
//!     other => println!("unexpected: {other:?}"),
//! }
//! # Ok::<(), typeanno::Error>(())
//! ```
//!
//! ## Development and Testing
//!
//! ```bash
//! cargo test
//! cargo bench
//!
//! # Fuzz the writer with arbitrary call sequences
//! cargo +nightly fuzz run encode --release
//! ```
#[macro_use]
pub(crate) mod macros;

#[macro_use]
pub(crate) mod error;

/// Shared functionality which is used in unit tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust
/// use typeanno::prelude::*;
///
/// let mut pool = ConstantPoolBuilder::new();
/// let mut writer = AnnotationWriter::new(&mut pool, false);
/// writer.visit("", ElementValue::enumeration("Ljava/lang/annotation/RetentionPolicy;", "RUNTIME"))?;
/// assert_eq!(writer.bytes()[0], ELEMENT_TAG::ENUM);
/// # Ok::<(), typeanno::Error>(())
/// ```
pub mod prelude;

/// Annotation values, type annotation targets, the annotation writer and list output
pub mod annotation;

/// Encoder configuration
pub mod config;

/// Constant pool collaborator
pub mod constpool;

/// Big-endian byte buffer and helpers
pub mod io;

/// `typeanno` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// `typeanno` Error type
///
/// The error type for all fallible operations in this crate.
pub use error::Error;

pub use annotation::{
    put_lists, AnnotationList, AnnotationRecord, AnnotationWriter, ElementValue,
    PrimitiveArray, RecordId, TargetInfo, TargetType, TypeAnnotationTarget, TypePath,
    TypePathEntry,
};
pub use config::EncoderConfig;
pub use constpool::{Constant, ConstantPool, ConstantPoolBuilder, PoolEntry};
pub use io::ByteVector;
