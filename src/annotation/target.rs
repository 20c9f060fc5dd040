//! Extended-target header of a type annotation.
//!
//! A type annotation is a regular annotation preceded by a header describing *which* use of
//! a type it applies to: a `target_type` byte, target-specific information (code offsets,
//! parameter and bound indices, local variable ranges) and a type path that walks into
//! array elements, nested types, wildcard bounds and type arguments.
//!
//! Each target kind is its own [`crate::annotation::target::TargetInfo`] variant carrying
//! exactly the fields valid for it, so a header can not be assembled with fields that do
//! not belong to its target type, and the type path length is always derived from the
//! entries actually supplied.
//!
//! # Layout
//!
//! ```text
//! target_type:u8  target_info  location_length:u8  (path_kind:u8, argument:u8)*
//! ```
//!
//! | Target info            | Fields                                                    |
//! |------------------------|-----------------------------------------------------------|
//! | type parameter         | `param_index:u8`                                          |
//! | supertype              | `type_index:u8`                                           |
//! | type parameter bound   | `param_index:u8, bound_index:u8`                          |
//! | empty                  | -                                                         |
//! | formal parameter       | `param_index:u8`                                          |
//! | throws / catch         | `exception_index:u8`                                      |
//! | local variable         | `num_entries:u16, (start_pc:u16, length:u16, index:u16)*` |
//! | offset                 | `offset:u16`                                              |
//! | type argument          | `offset:u16, argument_index:u8`                           |
//!
//! # Index widths
//!
//! The `target_type` codes are the final class-file values, but the supertype, throws and
//! catch indices are deliberately written as one byte like every other index field. The
//! class-file format stores those three as `u2`, so a header holding them is not read
//! back correctly by a class-file parser. Callers that need the class-file layout for
//! `ClassExtends`, `Throws` or `ExceptionParameter` must write that header themselves.

use strum::{EnumCount, EnumIter, IntoEnumIterator};

use crate::{config::EncoderConfig, io::ByteVector};

/// Values of the `target_type` byte.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, EnumIter, EnumCount)]
#[repr(u8)]
pub enum TargetType {
    /// Type parameter declaration of a generic class or interface
    ClassTypeParameter = 0x00,
    /// Type parameter declaration of a generic method or constructor
    MethodTypeParameter = 0x01,
    /// Type in the `extends` or `implements` clause of a class declaration
    ClassExtends = 0x10,
    /// Bound of a type parameter of a generic class or interface
    ClassTypeParameterBound = 0x11,
    /// Bound of a type parameter of a generic method or constructor
    MethodTypeParameterBound = 0x12,
    /// Type in a field declaration
    Field = 0x13,
    /// Return type of a method, or type of a newly constructed object
    MethodReturn = 0x14,
    /// Receiver type of a method or constructor
    MethodReceiver = 0x15,
    /// Type in a formal parameter declaration
    MethodFormalParameter = 0x16,
    /// Type in the `throws` clause of a method or constructor
    Throws = 0x17,
    /// Type in a local variable declaration
    LocalVariable = 0x40,
    /// Type in a resource variable declaration
    ResourceVariable = 0x41,
    /// Type in an exception parameter declaration
    ExceptionParameter = 0x42,
    /// Type in an `instanceof` expression
    InstanceOf = 0x43,
    /// Type in a `new` expression
    New = 0x44,
    /// Type in a method reference expression using `::new`
    ConstructorReference = 0x45,
    /// Type in a method reference expression using `::Identifier`
    MethodReference = 0x46,
    /// Type in a cast expression
    Cast = 0x47,
    /// Type argument of a generic constructor in a `new` expression or explicit constructor
    /// invocation
    ConstructorInvocationTypeArgument = 0x48,
    /// Type argument of a generic method in a method invocation
    MethodInvocationTypeArgument = 0x49,
    /// Type argument of a generic constructor in a `::new` method reference
    ConstructorReferenceTypeArgument = 0x4A,
    /// Type argument of a generic method in a `::Identifier` method reference
    MethodReferenceTypeArgument = 0x4B,
}

impl TargetType {
    /// Looks up the target type for a raw `target_type` byte.
    #[must_use]
    pub fn from_u8(value: u8) -> Option<TargetType> {
        TargetType::iter().find(|target| *target as u8 == value)
    }

    /// Number of defined target types.
    #[must_use]
    pub fn count() -> usize {
        TargetType::COUNT
    }
}

/// The declaration that owns a type parameter.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum GenericOwner {
    /// A generic class or interface
    Class,
    /// A generic method or constructor
    Method,
}

/// Targets that carry no target information.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum EmptyTarget {
    /// Field type
    Field,
    /// Method return type or constructed object type
    Return,
    /// Method receiver type
    Receiver,
}

/// Expression targets identified by a bytecode offset alone.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum OffsetTarget {
    /// `instanceof`
    InstanceOf,
    /// `new`
    New,
    /// `::new` method reference
    ConstructorReference,
    /// `::Identifier` method reference
    MethodReference,
}

/// Expression targets identified by a bytecode offset and a type argument index.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum TypeArgumentTarget {
    /// Cast; the index selects the type in an intersection cast
    Cast,
    /// Explicit constructor invocation or `new`
    ConstructorInvocation,
    /// Generic method invocation
    MethodInvocation,
    /// `::new` method reference
    ConstructorReference,
    /// `::Identifier` method reference
    MethodReference,
}

/// One live range of a local variable.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub struct LocalVarRange {
    /// First bytecode offset where the variable has a value
    pub start_pc: u16,
    /// Length of the range in bytes
    pub length: u16,
    /// Local variable slot
    pub index: u16,
}

impl LocalVarRange {
    /// Creates a new range.
    #[must_use]
    pub fn new(start_pc: u16, length: u16, index: u16) -> Self {
        LocalVarRange {
            start_pc,
            length,
            index,
        }
    }
}

/// Target-specific header information.
#[derive(Clone, PartialEq, Eq, Debug, Hash)]
pub enum TargetInfo {
    /// Type parameter declaration
    TypeParameter {
        /// Class or method
        owner: GenericOwner,
        /// Index of the type parameter
        param_index: u8,
    },
    /// `extends` / `implements` clause
    Supertype {
        /// Index into the interfaces list; the superclass is indicated by the caller's
        /// convention for this index
        type_index: u8,
    },
    /// Bound of a type parameter
    TypeParameterBound {
        /// Class or method
        owner: GenericOwner,
        /// Index of the type parameter
        param_index: u8,
        /// Index of the bound
        bound_index: u8,
    },
    /// Field, return or receiver type
    Empty(EmptyTarget),
    /// Formal parameter type
    FormalParameter {
        /// Index of the parameter
        param_index: u8,
    },
    /// `throws` clause
    Throws {
        /// Index into the exceptions list
        exception_index: u8,
    },
    /// Local or resource variable
    LocalVariable {
        /// `true` for a try-with-resources variable
        resource: bool,
        /// Live ranges of the variable
        ranges: Vec<LocalVarRange>,
    },
    /// Exception parameter of a `catch` clause
    Catch {
        /// Index into the exception table
        exception_index: u8,
    },
    /// `instanceof`, `new` and method reference expressions
    Offset {
        /// Which expression
        kind: OffsetTarget,
        /// Bytecode offset of the instruction
        offset: u16,
    },
    /// Casts and explicit type arguments
    TypeArgument {
        /// Which expression
        kind: TypeArgumentTarget,
        /// Bytecode offset of the instruction
        offset: u16,
        /// Index of the type argument
        argument_index: u8,
    },
}

impl TargetInfo {
    /// The `target_type` byte this information is written under.
    #[must_use]
    pub fn target_type(&self) -> TargetType {
        match self {
            TargetInfo::TypeParameter { owner, .. } => match owner {
                GenericOwner::Class => TargetType::ClassTypeParameter,
                GenericOwner::Method => TargetType::MethodTypeParameter,
            },
            TargetInfo::Supertype { .. } => TargetType::ClassExtends,
            TargetInfo::TypeParameterBound { owner, .. } => match owner {
                GenericOwner::Class => TargetType::ClassTypeParameterBound,
                GenericOwner::Method => TargetType::MethodTypeParameterBound,
            },
            TargetInfo::Empty(EmptyTarget::Field) => TargetType::Field,
            TargetInfo::Empty(EmptyTarget::Return) => TargetType::MethodReturn,
            TargetInfo::Empty(EmptyTarget::Receiver) => TargetType::MethodReceiver,
            TargetInfo::FormalParameter { .. } => TargetType::MethodFormalParameter,
            TargetInfo::Throws { .. } => TargetType::Throws,
            TargetInfo::LocalVariable { resource, .. } => {
                if *resource {
                    TargetType::ResourceVariable
                } else {
                    TargetType::LocalVariable
                }
            }
            TargetInfo::Catch { .. } => TargetType::ExceptionParameter,
            TargetInfo::Offset { kind, .. } => match kind {
                OffsetTarget::InstanceOf => TargetType::InstanceOf,
                OffsetTarget::New => TargetType::New,
                OffsetTarget::ConstructorReference => TargetType::ConstructorReference,
                OffsetTarget::MethodReference => TargetType::MethodReference,
            },
            TargetInfo::TypeArgument { kind, .. } => match kind {
                TypeArgumentTarget::Cast => TargetType::Cast,
                TypeArgumentTarget::ConstructorInvocation => {
                    TargetType::ConstructorInvocationTypeArgument
                }
                TypeArgumentTarget::MethodInvocation => TargetType::MethodInvocationTypeArgument,
                TypeArgumentTarget::ConstructorReference => {
                    TargetType::ConstructorReferenceTypeArgument
                }
                TypeArgumentTarget::MethodReference => TargetType::MethodReferenceTypeArgument,
            },
        }
    }
}

/// Kind of one type path step.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, EnumIter)]
#[repr(u8)]
pub enum TypePathKind {
    /// Deeper in an array type
    ArrayElement = 0,
    /// Deeper in a nested type
    InnerType = 1,
    /// On the bound of a wildcard type argument
    WildcardBound = 2,
    /// On a type argument of a parameterized type
    TypeArgument = 3,
}

impl TypePathKind {
    /// Looks up the kind for a raw `type_path_kind` byte.
    #[must_use]
    pub fn from_u8(value: u8) -> Option<TypePathKind> {
        TypePathKind::iter().find(|kind| *kind as u8 == value)
    }
}

/// One step of a [`TypePath`].
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub struct TypePathEntry {
    /// What the step walks into
    pub kind: TypePathKind,
    /// Type argument index for [`TypePathKind::TypeArgument`], 0 otherwise
    pub argument: u8,
}

impl TypePathEntry {
    /// Step into an array element type.
    #[must_use]
    pub fn array_element() -> Self {
        TypePathEntry {
            kind: TypePathKind::ArrayElement,
            argument: 0,
        }
    }

    /// Step into a nested type.
    #[must_use]
    pub fn inner_type() -> Self {
        TypePathEntry {
            kind: TypePathKind::InnerType,
            argument: 0,
        }
    }

    /// Step onto a wildcard bound.
    #[must_use]
    pub fn wildcard_bound() -> Self {
        TypePathEntry {
            kind: TypePathKind::WildcardBound,
            argument: 0,
        }
    }

    /// Step into type argument `index`.
    #[must_use]
    pub fn type_argument(index: u8) -> Self {
        TypePathEntry {
            kind: TypePathKind::TypeArgument,
            argument: index,
        }
    }
}

/// Path from the annotated declaration's type to the type that is actually annotated.
#[derive(Clone, PartialEq, Eq, Debug, Hash, Default)]
pub struct TypePath {
    entries: Vec<TypePathEntry>,
}

impl TypePath {
    /// The empty path: the annotation applies to the outermost type.
    #[must_use]
    pub fn new() -> Self {
        TypePath {
            entries: Vec::new(),
        }
    }

    /// Appends a step.
    #[must_use]
    pub fn then(mut self, entry: TypePathEntry) -> Self {
        self.entries.push(entry);
        self
    }

    /// Appends a step in place.
    pub fn push(&mut self, entry: TypePathEntry) {
        self.entries.push(entry);
    }

    /// Number of steps (`location_length`).
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` for the empty path.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The steps in order.
    #[must_use]
    pub fn entries(&self) -> &[TypePathEntry] {
        &self.entries
    }
}

impl FromIterator<TypePathEntry> for TypePath {
    fn from_iter<I: IntoIterator<Item = TypePathEntry>>(iter: I) -> Self {
        TypePath {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Complete extended-target header of a type annotation.
#[derive(Clone, PartialEq, Eq, Debug, Hash)]
pub struct TypeAnnotationTarget {
    /// Target kind and its fields
    pub info: TargetInfo,
    /// Location within the target's type
    pub path: TypePath,
}

impl TypeAnnotationTarget {
    /// A header with an empty type path.
    #[must_use]
    pub fn new(info: TargetInfo) -> Self {
        TypeAnnotationTarget {
            info,
            path: TypePath::new(),
        }
    }

    /// Replaces the type path.
    #[must_use]
    pub fn with_path(mut self, path: TypePath) -> Self {
        self.path = path;
        self
    }

    /// Number of bytes [`TypeAnnotationTarget::encode`] writes.
    #[must_use]
    pub fn encoded_len(&self) -> usize {
        let info = match &self.info {
            TargetInfo::Empty(_) => 0,
            TargetInfo::TypeParameter { .. }
            | TargetInfo::Supertype { .. }
            | TargetInfo::FormalParameter { .. }
            | TargetInfo::Throws { .. }
            | TargetInfo::Catch { .. } => 1,
            TargetInfo::TypeParameterBound { .. } | TargetInfo::Offset { .. } => 2,
            TargetInfo::TypeArgument { .. } => 3,
            TargetInfo::LocalVariable { ranges, .. } => 2 + 6 * ranges.len(),
        };
        1 + info + 1 + 2 * self.path.len()
    }

    /// Writes target type, target info and type path, in that order.
    ///
    /// # Panics
    /// Panics (subject to `config.enforce_contracts`) if the type path has more than 255
    /// entries or a local variable has more than 65535 ranges.
    pub fn encode(&self, out: &mut ByteVector, config: EncoderConfig) {
        let mut header = HeaderWriter { out };
        header.put_target_type(self.info.target_type());

        match &self.info {
            TargetInfo::TypeParameter { param_index, .. }
            | TargetInfo::FormalParameter { param_index } => header.put_param_index(*param_index),
            TargetInfo::Supertype { type_index } => header.put_type_index(*type_index),
            TargetInfo::TypeParameterBound {
                param_index,
                bound_index,
                ..
            } => {
                header.put_param_index(*param_index);
                header.put_bound_index(*bound_index);
            }
            TargetInfo::Empty(_) => {}
            TargetInfo::Throws { exception_index } | TargetInfo::Catch { exception_index } => {
                header.put_exception_index(*exception_index);
            }
            TargetInfo::LocalVariable { ranges, .. } => {
                contract!(
                    config,
                    ranges.len() <= usize::from(u16::MAX),
                    "local variable target has {} ranges, at most {} fit",
                    ranges.len(),
                    u16::MAX
                );
                #[allow(clippy::cast_possible_truncation)]
                header.put_num_entries(ranges.len() as u16);
                for range in ranges {
                    header.put_start_pc(range.start_pc);
                    header.put_length(range.length);
                    header.put_index(range.index);
                }
            }
            TargetInfo::Offset { offset, .. } => header.put_offset(*offset),
            TargetInfo::TypeArgument {
                offset,
                argument_index,
                ..
            } => {
                header.put_offset(*offset);
                header.put_param_index(*argument_index);
            }
        }

        contract!(
            config,
            self.path.len() <= usize::from(u8::MAX),
            "type path has {} entries, at most {} fit",
            self.path.len(),
            u8::MAX
        );
        #[allow(clippy::cast_possible_truncation)]
        header.put_location_length(self.path.len() as u8);
        for entry in self.path.entries() {
            header.put_location(*entry);
        }
    }
}

/// Fixed-width header field writes. None of these reserve or patch anything.
struct HeaderWriter<'a> {
    out: &'a mut ByteVector,
}

impl HeaderWriter<'_> {
    fn put_target_type(&mut self, target_type: TargetType) {
        self.out.put_u8(target_type as u8);
    }

    // casts, object creation, instanceof, method references
    fn put_offset(&mut self, offset: u16) {
        self.out.put_u16(offset);
    }

    // generic type arguments and arrays
    fn put_location_length(&mut self, location_length: u8) {
        self.out.put_u8(location_length);
    }

    fn put_location(&mut self, location: TypePathEntry) {
        self.out.put_u8(location.kind as u8).put_u8(location.argument);
    }

    // local variables
    fn put_num_entries(&mut self, num_entries: u16) {
        self.out.put_u16(num_entries);
    }

    fn put_start_pc(&mut self, start_pc: u16) {
        self.out.put_u16(start_pc);
    }

    fn put_length(&mut self, length: u16) {
        self.out.put_u16(length);
    }

    fn put_index(&mut self, index: u16) {
        self.out.put_u16(index);
    }

    // type parameters, their bounds and formal parameters
    fn put_param_index(&mut self, param_index: u8) {
        self.out.put_u8(param_index);
    }

    fn put_bound_index(&mut self, bound_index: u8) {
        self.out.put_u8(bound_index);
    }

    // extends / implements
    fn put_type_index(&mut self, type_index: u8) {
        self.out.put_u8(type_index);
    }

    // throws and catch
    fn put_exception_index(&mut self, exception_index: u8) {
        self.out.put_u8(exception_index);
    }
}
