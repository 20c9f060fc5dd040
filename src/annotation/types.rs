//! Annotation value types.
//!
//! This module contains the closed set of values an annotation element can carry, and the
//! one-byte tags the class-file format uses to tell them apart. Every value is encoded as
//! `tag:u8` followed by one or more constant pool indices; arrays prefix their elements with
//! a `u16` element count.

use crate::constpool::Constant;

/// Element value tags as defined for `element_value` structures in the class-file format.
#[allow(non_snake_case, missing_docs)]
pub mod ELEMENT_TAG {
    pub const BYTE: u8 = b'B';
    pub const CHAR: u8 = b'C';
    pub const DOUBLE: u8 = b'D';
    pub const FLOAT: u8 = b'F';
    pub const INT: u8 = b'I';
    pub const LONG: u8 = b'J';
    pub const SHORT: u8 = b'S';
    pub const BOOLEAN: u8 = b'Z';
    pub const STRING: u8 = b's';
    pub const ENUM: u8 = b'e';
    pub const CLASS: u8 = b'c';
    pub const ANNOTATION: u8 = b'@';
    pub const ARRAY: u8 = b'[';
}

/// A single annotation element value.
///
/// Nested annotations and arrays of non-primitive values are not values of their own:
/// they are written through [`crate::AnnotationWriter::visit_annotation`] and
/// [`crate::AnnotationWriter::visit_array`], which return a writer for the nested content.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementValue {
    /// `byte`, stored as a `CONSTANT_Integer`
    Byte(i8),
    /// `boolean`, stored as a `CONSTANT_Integer` holding 0 or 1
    Boolean(bool),
    /// `char` (a UTF-16 code unit), stored as a `CONSTANT_Integer`
    Char(u16),
    /// `short`, stored as a `CONSTANT_Integer`
    Short(i16),
    /// `int`
    Int(i32),
    /// `long`
    Long(i64),
    /// `float`
    Float(f32),
    /// `double`
    Double(f64),
    /// `String`, stored as a `CONSTANT_Utf8`
    String(String),
    /// Class literal, given as a field descriptor such as `Ljava/lang/String;`
    Class(String),
    /// Enum constant
    Enum {
        /// Descriptor of the enum type
        type_desc: String,
        /// Simple name of the constant
        const_name: String,
    },
    /// Homogeneous array of primitive values
    Array(PrimitiveArray),
}

/// A homogeneous array of primitive values.
#[derive(Debug, Clone, PartialEq)]
pub enum PrimitiveArray {
    /// `byte[]`
    Byte(Vec<i8>),
    /// `boolean[]`
    Boolean(Vec<bool>),
    /// `char[]`
    Char(Vec<u16>),
    /// `short[]`
    Short(Vec<i16>),
    /// `int[]`
    Int(Vec<i32>),
    /// `long[]`
    Long(Vec<i64>),
    /// `float[]`
    Float(Vec<f32>),
    /// `double[]`
    Double(Vec<f64>),
}

impl PrimitiveArray {
    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            PrimitiveArray::Byte(v) => v.len(),
            PrimitiveArray::Boolean(v) => v.len(),
            PrimitiveArray::Char(v) => v.len(),
            PrimitiveArray::Short(v) => v.len(),
            PrimitiveArray::Int(v) => v.len(),
            PrimitiveArray::Long(v) => v.len(),
            PrimitiveArray::Float(v) => v.len(),
            PrimitiveArray::Double(v) => v.len(),
        }
    }

    /// Returns `true` if the array has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The tag every element of this array is written with.
    #[must_use]
    pub fn element_tag(&self) -> u8 {
        match self {
            PrimitiveArray::Byte(_) => ELEMENT_TAG::BYTE,
            PrimitiveArray::Boolean(_) => ELEMENT_TAG::BOOLEAN,
            PrimitiveArray::Char(_) => ELEMENT_TAG::CHAR,
            PrimitiveArray::Short(_) => ELEMENT_TAG::SHORT,
            PrimitiveArray::Int(_) => ELEMENT_TAG::INT,
            PrimitiveArray::Long(_) => ELEMENT_TAG::LONG,
            PrimitiveArray::Float(_) => ELEMENT_TAG::FLOAT,
            PrimitiveArray::Double(_) => ELEMENT_TAG::DOUBLE,
        }
    }

    /// The pool constants of the elements, in order.
    pub fn constants(&self) -> Box<dyn Iterator<Item = Constant> + '_> {
        match self {
            PrimitiveArray::Byte(v) => Box::new(v.iter().map(|e| Constant::Integer(i32::from(*e)))),
            PrimitiveArray::Boolean(v) => {
                Box::new(v.iter().map(|e| Constant::Integer(i32::from(*e))))
            }
            PrimitiveArray::Char(v) => Box::new(v.iter().map(|e| Constant::Integer(i32::from(*e)))),
            PrimitiveArray::Short(v) => {
                Box::new(v.iter().map(|e| Constant::Integer(i32::from(*e))))
            }
            PrimitiveArray::Int(v) => Box::new(v.iter().map(|e| Constant::Integer(*e))),
            PrimitiveArray::Long(v) => Box::new(v.iter().map(|e| Constant::Long(*e))),
            PrimitiveArray::Float(v) => Box::new(v.iter().map(|e| Constant::Float(*e))),
            PrimitiveArray::Double(v) => Box::new(v.iter().map(|e| Constant::Double(*e))),
        }
    }
}

impl ElementValue {
    /// Creates an enum constant value.
    pub fn enumeration(type_desc: impl Into<String>, const_name: impl Into<String>) -> Self {
        ElementValue::Enum {
            type_desc: type_desc.into(),
            const_name: const_name.into(),
        }
    }

    /// Creates a class literal value from a field descriptor.
    pub fn class(descriptor: impl Into<String>) -> Self {
        ElementValue::Class(descriptor.into())
    }

    /// The tag this value is written with.
    #[must_use]
    pub fn tag(&self) -> u8 {
        match self {
            ElementValue::Byte(_) => ELEMENT_TAG::BYTE,
            ElementValue::Boolean(_) => ELEMENT_TAG::BOOLEAN,
            ElementValue::Char(_) => ELEMENT_TAG::CHAR,
            ElementValue::Short(_) => ELEMENT_TAG::SHORT,
            ElementValue::Int(_) => ELEMENT_TAG::INT,
            ElementValue::Long(_) => ELEMENT_TAG::LONG,
            ElementValue::Float(_) => ELEMENT_TAG::FLOAT,
            ElementValue::Double(_) => ELEMENT_TAG::DOUBLE,
            ElementValue::String(_) => ELEMENT_TAG::STRING,
            ElementValue::Class(_) => ELEMENT_TAG::CLASS,
            ElementValue::Enum { .. } => ELEMENT_TAG::ENUM,
            ElementValue::Array(_) => ELEMENT_TAG::ARRAY,
        }
    }
}

macro_rules! impl_element_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for ElementValue {
                fn from(value: $ty) -> Self {
                    ElementValue::$variant(value)
                }
            }

            impl From<Vec<$ty>> for ElementValue {
                fn from(value: Vec<$ty>) -> Self {
                    ElementValue::Array(PrimitiveArray::$variant(value))
                }
            }

            impl From<&[$ty]> for ElementValue {
                fn from(value: &[$ty]) -> Self {
                    ElementValue::Array(PrimitiveArray::$variant(value.to_vec()))
                }
            }
        )*
    };
}

impl_element_from! {
    i8 => Byte,
    bool => Boolean,
    u16 => Char,
    i16 => Short,
    i32 => Int,
    i64 => Long,
    f32 => Float,
    f64 => Double,
}

impl From<&str> for ElementValue {
    fn from(value: &str) -> Self {
        ElementValue::String(value.to_string())
    }
}

impl From<String> for ElementValue {
    fn from(value: String) -> Self {
        ElementValue::String(value)
    }
}

impl From<PrimitiveArray> for ElementValue {
    fn from(value: PrimitiveArray) -> Self {
        ElementValue::Array(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversions_pick_variant() {
        assert_eq!(ElementValue::from(1i8), ElementValue::Byte(1));
        assert_eq!(ElementValue::from(true), ElementValue::Boolean(true));
        assert_eq!(ElementValue::from(0x41u16), ElementValue::Char(0x41));
        assert_eq!(ElementValue::from(-3i16), ElementValue::Short(-3));
        assert_eq!(ElementValue::from("x"), ElementValue::String("x".to_string()));
        assert_eq!(
            ElementValue::from(vec![1i16, 2, 3]),
            ElementValue::Array(PrimitiveArray::Short(vec![1, 2, 3]))
        );
        assert_eq!(
            ElementValue::from(&[1.5f64][..]),
            ElementValue::Array(PrimitiveArray::Double(vec![1.5]))
        );
    }

    #[test]
    fn tags() {
        assert_eq!(ElementValue::Long(0).tag(), b'J');
        assert_eq!(ElementValue::class("I").tag(), b'c');
        assert_eq!(ElementValue::enumeration("LE;", "A").tag(), b'e');
        assert_eq!(ElementValue::from(vec![true]).tag(), b'[');
        assert_eq!(PrimitiveArray::Boolean(vec![]).element_tag(), b'Z');
        assert_eq!(PrimitiveArray::Char(vec![]).element_tag(), b'C');
    }

    #[test]
    fn array_constants_widen() {
        let bools = PrimitiveArray::Boolean(vec![true, false]);
        assert_eq!(
            bools.constants().collect::<Vec<_>>(),
            vec![Constant::Integer(1), Constant::Integer(0)]
        );

        let chars = PrimitiveArray::Char(vec![0xFFFF]);
        assert_eq!(
            chars.constants().collect::<Vec<_>>(),
            vec![Constant::Integer(65535)]
        );

        let longs = PrimitiveArray::Long(vec![i64::MAX]);
        assert_eq!(longs.len(), 1);
        assert_eq!(
            longs.constants().collect::<Vec<_>>(),
            vec![Constant::Long(i64::MAX)]
        );
        assert!(PrimitiveArray::Int(vec![]).is_empty());
    }
}
