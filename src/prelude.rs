//! # typeanno Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and traits
//! from the typeanno library. Import this module to get quick access to everything needed
//! to encode annotations and type annotations.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all typeanno operations
pub use crate::Error;

/// The result type used throughout typeanno
pub use crate::Result;

/// Contract enforcement options
pub use crate::EncoderConfig;

// ================================================================================================
// Constant Pool
// ================================================================================================

/// Constant pool collaborator interface and the in-memory implementation
pub use crate::constpool::{Constant, ConstantPool, ConstantPoolBuilder, PoolEntry};

/// Growable big-endian output buffer
pub use crate::io::ByteVector;

// ================================================================================================
// Annotation Encoding
// ================================================================================================

/// Element values
pub use crate::annotation::{ElementValue, PrimitiveArray, ELEMENT_TAG};

/// The visitor-driven encoder
pub use crate::annotation::AnnotationWriter;

/// Annotation lists and their output
pub use crate::annotation::{put_lists, AnnotationList, AnnotationRecord, RecordId};

// ================================================================================================
// Type Annotation Targets
// ================================================================================================

/// Extended-target header types
pub use crate::annotation::{
    EmptyTarget, GenericOwner, LocalVarRange, OffsetTarget, TargetInfo, TargetType,
    TypeAnnotationTarget, TypeArgumentTarget, TypePath, TypePathEntry, TypePathKind,
};
