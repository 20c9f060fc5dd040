//! Visitor-driven annotation encoder.
//!
//! [`crate::annotation::writer::AnnotationWriter`] turns a sequence of visitor calls into the
//! `annotation` / `type_annotation` byte layout of the class-file format. Values are written
//! in call order; the value count, which is only known once every value has been visited,
//! goes into a two-byte slot that was reserved up front and is patched when the writer ends.
//!
//! # Ownership
//!
//! Every writer owns its bytes. A nested annotation or array writer additionally holds an
//! exclusive borrow of its parent's buffer, in which the parent reserved the nested value's
//! count slot. Ending the child patches that slot and appends the child's bytes to the
//! parent. Because the borrow lasts as long as the child lives, the parent can not receive
//! further values before its child is done, so the output always matches the call order.
//!
//! # Lifecycle
//!
//! 1. Create a top-level writer with [`crate::annotation::writer::AnnotationWriter::annotation`],
//!    [`crate::annotation::writer::AnnotationWriter::type_annotation`],
//!    [`crate::annotation::writer::AnnotationWriter::begin`] or
//!    [`crate::annotation::writer::AnnotationWriter::new`]
//! 2. Visit values; nested annotations and arrays return child writers
//! 3. Call [`crate::annotation::writer::AnnotationWriter::visit_end`] on every writer. It can be
//!    called any number of times; a child that is dropped without it flushes itself
//! 4. Collect the top-level bytes with [`crate::annotation::writer::AnnotationWriter::bytes`]
//!    or turn the writer into a list record with
//!    [`crate::annotation::writer::AnnotationWriter::into_record`]
//!
//! # Examples
//!
//! ```rust
//! use typeanno::{AnnotationWriter, ConstantPoolBuilder};
//!
//! let mut pool = ConstantPoolBuilder::new();
//! let mut writer = AnnotationWriter::annotation(&mut pool, "LFoo;")?;
//! writer.visit("name", "bar")?;
//! {
//!     let mut values = writer.visit_array("values")?;
//!     values.visit("", "a")?;
//!     values.visit("", "b")?;
//!     values.visit_end();
//! }
//! writer.visit_end();
//!
//! assert_eq!(writer.size(), 2);
//! assert_eq!(&writer.bytes()[..4], &[0x00, 0x01, 0x00, 0x02]);
//! # Ok::<(), typeanno::Error>(())
//! ```
//!
//! # Errors and contracts
//!
//! Interning through the constant pool is the only fallible step. When it fails, the value
//! that was being written is rolled back and the error is returned; the writer stays usable.
//! Call-sequence mistakes such as more than 65535 values are caller bugs and panic through
//! the configured contract checks.

use crate::{
    annotation::{
        list::AnnotationRecord,
        target::TypeAnnotationTarget,
        types::{ElementValue, ELEMENT_TAG},
    },
    config::EncoderConfig,
    constpool::{Constant, ConstantPool},
    io::ByteVector,
    Result,
};

/// Where the value count of a writer ends up.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum CountSlot {
    /// Two reserved bytes at this offset in the parent's buffer
    Parent(usize),
    /// Two reserved bytes at this offset in the writer's own buffer
    Own(usize),
    /// Nowhere; the caller reads [`AnnotationWriter::size`]
    External,
}

/// Encoder for one annotation, or for one nested annotation or array value.
///
/// See the [module documentation](crate::annotation::writer) for the overall protocol.
pub struct AnnotationWriter<'w, P: ConstantPool + ?Sized> {
    /// Interning collaborator shared by the whole writer tree
    pool: &'w mut P,
    /// Contract checking options, inherited by children
    config: EncoderConfig,
    /// Whether every value is preceded by its element name
    named: bool,
    /// Number of values written so far
    size: usize,
    /// Bytes written by this writer
    bytes: ByteVector,
    /// Where `size` is patched
    slot: CountSlot,
    /// Buffer of the enclosing writer, for nested writers
    parent: Option<&'w mut ByteVector>,
    /// Number of enclosing writers
    depth: usize,
    /// Prefix of `bytes` already appended to `parent`
    flushed: usize,
    /// `visit_end` was called and nothing was written since
    ended: bool,
}

impl<'w, P: ConstantPool + ?Sized> AnnotationWriter<'w, P> {
    /// Creates a headerless top-level writer.
    ///
    /// Nothing is reserved: the value count is not written anywhere and has to be reported
    /// by the caller through [`AnnotationWriter::size`], for example as the count of an
    /// enclosing structure.
    ///
    /// # Arguments
    /// * `pool` - The constant pool to intern names and values in
    /// * `named` - Whether each value is preceded by an element name index
    pub fn new(pool: &'w mut P, named: bool) -> Self {
        Self::with_slot(pool, named, ByteVector::new(), CountSlot::External)
    }

    /// Creates a top-level writer and writes `type_index:u16` and the count slot.
    ///
    /// # Arguments
    /// * `pool` - The constant pool to intern names and values in
    /// * `desc` - Field descriptor of the annotation type, e.g. `Ljava/lang/Deprecated;`
    /// * `named` - Whether each value is preceded by an element name index
    ///
    /// # Errors
    /// Returns an error if `desc` can not be interned.
    pub fn begin(pool: &'w mut P, desc: &str, named: bool) -> Result<Self> {
        Self::with_header(pool, ByteVector::new(), desc, named)
    }

    /// Creates a writer for a regular annotation with named element values.
    ///
    /// # Errors
    /// Returns an error if `desc` can not be interned.
    pub fn annotation(pool: &'w mut P, desc: &str) -> Result<Self> {
        Self::begin(pool, desc, true)
    }

    /// Creates a writer for a type annotation.
    ///
    /// Writes the extended-target header first, followed by `type_index:u16` and the count
    /// slot. Element values are named. The header is checked against
    /// [`EncoderConfig::default`]; [`AnnotationWriter::with_config`] only affects what is
    /// written afterwards.
    ///
    /// # Arguments
    /// * `pool` - The constant pool to intern names and values in
    /// * `target` - Target kind, target information and type path
    /// * `desc` - Field descriptor of the annotation type
    ///
    /// # Errors
    /// Returns an error if `desc` can not be interned.
    ///
    /// # Panics
    /// Panics if the type path has more than 255 entries.
    pub fn type_annotation(
        pool: &'w mut P,
        target: &TypeAnnotationTarget,
        desc: &str,
    ) -> Result<Self> {
        let mut bytes = ByteVector::with_capacity(target.encoded_len() + 4);
        target.encode(&mut bytes, EncoderConfig::default());
        Self::with_header(pool, bytes, desc, true)
    }

    /// Replaces the configuration of this writer and of every child created from now on.
    #[must_use]
    pub fn with_config(mut self, config: EncoderConfig) -> Self {
        self.config = config;
        self
    }

    fn with_header(pool: &'w mut P, mut bytes: ByteVector, desc: &str, named: bool) -> Result<Self> {
        let type_index = pool.utf8(desc)?;
        bytes.put_u16(type_index).put_u16(0);
        let slot = CountSlot::Own(bytes.len() - 2);
        Ok(Self::with_slot(pool, named, bytes, slot))
    }

    fn with_slot(pool: &'w mut P, named: bool, bytes: ByteVector, slot: CountSlot) -> Self {
        AnnotationWriter {
            pool,
            config: EncoderConfig::default(),
            named,
            size: 0,
            bytes,
            slot,
            parent: None,
            depth: 0,
            flushed: 0,
            ended: false,
        }
    }

    /// Number of values visited so far.
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Whether values carry element names.
    #[must_use]
    pub fn is_named(&self) -> bool {
        self.named
    }

    /// The bytes written by this writer.
    ///
    /// For a nested writer these are its own bytes, which are also copied to the parent
    /// when the writer ends.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        self.bytes.as_slice()
    }

    /// Writes a value.
    ///
    /// # Arguments
    /// * `name` - Element name; ignored by unnamed writers such as array writers
    /// * `value` - The value, or anything convertible into an [`ElementValue`]
    ///
    /// # Errors
    /// Returns an error if the name or a constant can not be interned. Nothing is written
    /// in that case.
    ///
    /// # Panics
    /// Panics if this would be value number 65536, or if an array value has more than
    /// 65535 elements.
    pub fn visit(&mut self, name: &str, value: impl Into<ElementValue>) -> Result<()> {
        let value = value.into();
        self.start_value();

        let mark = self.bytes.len();
        let result = self.put_name(name).and_then(|()| self.put_value(&value));
        self.finish_value(mark, result)
    }

    /// Writes an enum constant value.
    ///
    /// # Arguments
    /// * `name` - Element name; ignored by unnamed writers
    /// * `desc` - Field descriptor of the enum type
    /// * `value` - Name of the enum constant
    ///
    /// # Errors
    /// Returns an error if a string can not be interned. Nothing is written in that case.
    pub fn visit_enum(&mut self, name: &str, desc: &str, value: &str) -> Result<()> {
        self.start_value();

        let mark = self.bytes.len();
        let result = self
            .put_name(name)
            .and_then(|()| self.put_enum(desc, value));
        self.finish_value(mark, result)
    }

    /// Writes a nested annotation value and returns the writer for its element values.
    ///
    /// The child's count is patched into this writer when the child ends or is dropped.
    /// This writer can not be used until then.
    ///
    /// # Errors
    /// Returns an error if the name or `desc` can not be interned. Nothing is written in
    /// that case.
    ///
    /// # Panics
    /// Panics if the nesting limit of the configuration is exceeded.
    pub fn visit_annotation(&mut self, name: &str, desc: &str) -> Result<AnnotationWriter<'_, P>> {
        self.start_value();
        self.check_depth();

        let mark = self.bytes.len();
        let result = self.put_name(name).and_then(|()| {
            let type_index = self.pool.utf8(desc)?;
            self.bytes.put_tagged(ELEMENT_TAG::ANNOTATION, type_index).put_u16(0);
            Ok(())
        });
        self.finish_value(mark, result)?;

        let slot = self.bytes.len() - 2;
        Ok(self.child(true, slot))
    }

    /// Writes an array value and returns the (unnamed) writer for its elements.
    ///
    /// Use this for arrays of strings, classes, enums or annotations. Arrays of primitives
    /// can also be written in one call with [`AnnotationWriter::visit`].
    ///
    /// # Errors
    /// Returns an error if the name can not be interned. Nothing is written in that case.
    ///
    /// # Panics
    /// Panics if the nesting limit of the configuration is exceeded.
    pub fn visit_array(&mut self, name: &str) -> Result<AnnotationWriter<'_, P>> {
        self.start_value();
        self.check_depth();

        let mark = self.bytes.len();
        let result = self.put_name(name).map(|()| {
            self.bytes.put_tagged(ELEMENT_TAG::ARRAY, 0);
        });
        self.finish_value(mark, result)?;

        let slot = self.bytes.len() - 2;
        Ok(self.child(false, slot))
    }

    /// Ends the writer: patches the value count into its slot and, for nested writers,
    /// appends the bytes written since the last call to the parent.
    ///
    /// Calling this again is harmless; it re-patches the current count and only appends
    /// bytes that were written in between.
    pub fn visit_end(&mut self) {
        #[allow(clippy::cast_possible_truncation)]
        let count = self.size as u16;

        match self.slot {
            CountSlot::Own(at) => self.bytes.patch_u16(at, count),
            CountSlot::Parent(at) => {
                if let Some(parent) = self.parent.as_deref_mut() {
                    parent.patch_u16(at, count);
                    parent.put_bytes(&self.bytes.as_slice()[self.flushed..]);
                    self.flushed = self.bytes.len();
                }
            }
            CountSlot::External => {}
        }

        self.ended = true;
    }

    /// Turns an ended or unfinished top-level writer into a record for an
    /// [`crate::annotation::list::AnnotationList`].
    ///
    /// A record that was not ended is finalized when its list is written.
    ///
    /// # Panics
    /// Panics if called on a nested writer.
    #[must_use]
    pub fn into_record(mut self) -> AnnotationRecord {
        contract!(
            self.config,
            self.parent.is_none(),
            "nested writers are flushed into their parent and can not become records"
        );

        let slot = match self.slot {
            CountSlot::Own(at) => Some(at),
            CountSlot::Parent(_) | CountSlot::External => None,
        };
        let bytes = std::mem::take(&mut self.bytes);
        AnnotationRecord::new(bytes, self.size, slot, self.ended)
    }

    fn child(&mut self, named: bool, slot: usize) -> AnnotationWriter<'_, P> {
        AnnotationWriter {
            pool: &mut *self.pool,
            config: self.config,
            named,
            size: 0,
            bytes: ByteVector::new(),
            slot: CountSlot::Parent(slot),
            parent: Some(&mut self.bytes),
            depth: self.depth + 1,
            flushed: 0,
            ended: false,
        }
    }

    fn start_value(&self) {
        contract!(
            self.config,
            self.size < usize::from(u16::MAX),
            "annotation already holds {} values",
            self.size
        );
    }

    fn check_depth(&self) {
        contract!(
            self.config,
            self.depth < self.config.max_nesting_depth,
            "nesting deeper than {} levels",
            self.config.max_nesting_depth
        );
    }

    fn finish_value(&mut self, mark: usize, result: Result<()>) -> Result<()> {
        match result {
            Ok(()) => {
                self.size += 1;
                self.ended = false;
                Ok(())
            }
            Err(error) => {
                self.bytes.truncate(mark);
                Err(error)
            }
        }
    }

    fn put_name(&mut self, name: &str) -> Result<()> {
        if self.named {
            let name_index = self.pool.utf8(name)?;
            self.bytes.put_u16(name_index);
        }
        Ok(())
    }

    fn put_enum(&mut self, desc: &str, value: &str) -> Result<()> {
        let type_index = self.pool.utf8(desc)?;
        let const_index = self.pool.utf8(value)?;
        self.bytes
            .put_tagged(ELEMENT_TAG::ENUM, type_index)
            .put_u16(const_index);
        Ok(())
    }

    fn put_value(&mut self, value: &ElementValue) -> Result<()> {
        match value {
            ElementValue::Byte(v) => self.put_integer(ELEMENT_TAG::BYTE, i32::from(*v)),
            ElementValue::Boolean(v) => self.put_integer(ELEMENT_TAG::BOOLEAN, i32::from(*v)),
            ElementValue::Char(v) => self.put_integer(ELEMENT_TAG::CHAR, i32::from(*v)),
            ElementValue::Short(v) => self.put_integer(ELEMENT_TAG::SHORT, i32::from(*v)),
            ElementValue::Int(v) => self.put_constant(&Constant::Integer(*v)),
            ElementValue::Long(v) => self.put_constant(&Constant::Long(*v)),
            ElementValue::Float(v) => self.put_constant(&Constant::Float(*v)),
            ElementValue::Double(v) => self.put_constant(&Constant::Double(*v)),
            ElementValue::String(v) => {
                let index = self.pool.utf8(v)?;
                self.bytes.put_tagged(ELEMENT_TAG::STRING, index);
                Ok(())
            }
            ElementValue::Class(descriptor) => {
                let index = self.pool.utf8(descriptor)?;
                self.bytes.put_tagged(ELEMENT_TAG::CLASS, index);
                Ok(())
            }
            ElementValue::Enum {
                type_desc,
                const_name,
            } => self.put_enum(type_desc, const_name),
            ElementValue::Array(array) => {
                contract!(
                    self.config,
                    array.len() <= usize::from(u16::MAX),
                    "array value has {} elements, at most {} fit",
                    array.len(),
                    u16::MAX
                );

                let tag = array.element_tag();
                #[allow(clippy::cast_possible_truncation)]
                self.bytes.put_tagged(ELEMENT_TAG::ARRAY, array.len() as u16);
                for constant in array.constants() {
                    let (_, index) = self.pool.constant(&constant)?;
                    self.bytes.put_tagged(tag, index);
                }
                Ok(())
            }
        }
    }

    fn put_integer(&mut self, tag: u8, value: i32) -> Result<()> {
        let index = self.pool.integer(value)?;
        self.bytes.put_tagged(tag, index);
        Ok(())
    }

    fn put_constant(&mut self, constant: &Constant) -> Result<()> {
        let (tag, index) = self.pool.constant(constant)?;
        self.bytes.put_tagged(tag, index);
        Ok(())
    }
}

impl<P: ConstantPool + ?Sized> Drop for AnnotationWriter<'_, P> {
    fn drop(&mut self) {
        if self.parent.is_some() && !self.ended {
            log::debug!(
                "nested writer dropped without visit_end, flushing {} values into parent",
                self.size
            );
            self.visit_end();
        }
    }
}
