//! Annotation and type annotation encoding.
//!
//! This module implements the `element_value`, `annotation` and `type_annotation`
//! structures of the class-file format, and the list forms the
//! `Runtime[In]Visible[Parameter|Type]Annotations` attributes are made of.
//!
//! # Architecture
//!
//! - **Value model** ([`crate::annotation::types`]) - The closed set of element values
//! - **Target header** ([`crate::annotation::target`]) - Typed extended-target information
//!   and type paths for type annotations
//! - **Writer** ([`crate::annotation::writer`]) - Visitor-driven encoder with count
//!   backpatching for nested annotations and arrays
//! - **Lists** ([`crate::annotation::list`]) - Collection and linearization of finished
//!   annotations
//!
//! # Usage Examples
//!
//! ```rust
//! use typeanno::prelude::*;
//!
//! let mut pool = ConstantPoolBuilder::new();
//! let mut list = AnnotationList::new();
//!
//! for desc in ["LFirst;", "LSecond;"] {
//!     let mut writer = AnnotationWriter::annotation(&mut pool, desc)?;
//!     writer.visit("since", "1.0")?;
//!     writer.visit_end();
//!     list.prepend(writer.into_record());
//! }
//!
//! let mut out = ByteVector::new();
//! list.put(&mut out);
//! assert_eq!(&out.as_slice()[4..6], &[0x00, 0x02]);
//! # Ok::<(), typeanno::Error>(())
//! ```

pub mod list;
pub mod target;
pub mod types;
pub mod writer;

pub use list::{put_lists, AnnotationList, AnnotationRecord, RecordId};
pub use target::{
    EmptyTarget, GenericOwner, LocalVarRange, OffsetTarget, TargetInfo, TargetType,
    TypeAnnotationTarget, TypeArgumentTarget, TypePath, TypePathEntry, TypePathKind,
};
pub use types::{ElementValue, PrimitiveArray, ELEMENT_TAG};
pub use writer::AnnotationWriter;
