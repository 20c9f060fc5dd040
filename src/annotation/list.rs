//! Linearization of annotation lists.
//!
//! Annotations attached to the same program element are collected in an
//! [`crate::annotation::list::AnnotationList`]. Records are added with
//! [`crate::annotation::list::AnnotationList::prepend`], so the forward `next` links run from
//! the newest record to the oldest, while the class-file attribute lists them oldest first.
//! The list keeps its records in an arena in construction order next to those links, and
//! writing it walks the arena front to back.
//!
//! # Layout
//!
//! ```text
//! single list:     total_size:u32  count:u16  annotation*
//! array of lists:  total_size:u32  lists:u8   (count:u16  annotation*)*
//! ```
//!
//! The single-list `total_size` counts its own four bytes, the two count bytes and every
//! annotation. The array form counts the list byte, two bytes per list and every
//! annotation.
//!
//! Every record is finalized before anything is measured, so a writer whose `visit_end`
//! was forgotten still contributes its correct count.

use crate::{config::EncoderConfig, io::ByteVector};

/// Position of a record in its [`AnnotationList`].
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Hash)]
pub struct RecordId(usize);

impl RecordId {
    /// Construction order of the record, starting at 0.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// The finished bytes of one top-level annotation, waiting to be linearized.
///
/// Created by [`crate::annotation::writer::AnnotationWriter::into_record`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationRecord {
    bytes: ByteVector,
    size: usize,
    slot: Option<usize>,
    finalized: bool,
}

impl AnnotationRecord {
    pub(crate) fn new(bytes: ByteVector, size: usize, slot: Option<usize>, finalized: bool) -> Self {
        AnnotationRecord {
            bytes,
            size,
            slot,
            finalized,
        }
    }

    /// Patches the value count into the record's count slot.
    ///
    /// Idempotent. Records without a slot only change their finalized state.
    pub fn finalize(&mut self) {
        if let Some(at) = self.slot {
            #[allow(clippy::cast_possible_truncation)]
            self.bytes.patch_u16(at, self.size as u16);
        }
        self.finalized = true;
    }

    /// Whether [`AnnotationRecord::finalize`] (or `visit_end` on the writer) has run.
    #[must_use]
    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Number of values of the annotation.
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Encoded length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns `true` if the record has no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// The encoded annotation.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        self.bytes.as_slice()
    }
}

/// Annotations of one program element, in an arena with prepend links.
#[derive(Debug, Clone, Default)]
pub struct AnnotationList {
    records: Vec<AnnotationRecord>,
    next: Vec<Option<RecordId>>,
    head: Option<RecordId>,
    config: EncoderConfig,
}

impl AnnotationList {
    /// Creates an empty list.
    #[must_use]
    pub fn new() -> Self {
        AnnotationList::default()
    }

    /// Replaces the configuration used for the count and size checks on output.
    #[must_use]
    pub fn with_config(mut self, config: EncoderConfig) -> Self {
        self.config = config;
        self
    }

    /// Adds a record in front of the current head and returns its id.
    pub fn prepend(&mut self, record: AnnotationRecord) -> RecordId {
        let id = RecordId(self.records.len());
        self.records.push(record);
        self.next.push(self.head);
        self.head = Some(id);
        id
    }

    /// The most recently added record.
    #[must_use]
    pub fn head(&self) -> Option<RecordId> {
        self.head
    }

    /// The record that was the head when `id` was added.
    #[must_use]
    pub fn next(&self, id: RecordId) -> Option<RecordId> {
        self.next.get(id.0).copied().flatten()
    }

    /// Looks up a record.
    #[must_use]
    pub fn get(&self, id: RecordId) -> Option<&AnnotationRecord> {
        self.records.get(id.0)
    }

    /// Walks the `next` links from the head, newest record first.
    pub fn linked(&self) -> impl Iterator<Item = RecordId> + '_ {
        std::iter::successors(self.head, move |id| self.next(*id))
    }

    /// Records in construction order, which is the order they are written in.
    pub fn iter(&self) -> impl Iterator<Item = &AnnotationRecord> {
        self.records.iter()
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if no record was added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Sum of the encoded lengths of all records.
    #[must_use]
    pub fn content_len(&self) -> usize {
        self.records.iter().map(AnnotationRecord::len).sum()
    }

    /// Finalizes every record that was not finalized by its writer.
    pub fn finalize_all(&mut self) {
        for (index, record) in self.records.iter_mut().enumerate() {
            if !record.is_finalized() {
                log::debug!("finalizing annotation record {index} that was never ended");
                record.finalize();
            }
        }
    }

    /// Writes `total_size:u32`, `count:u16` and every record in construction order.
    ///
    /// # Panics
    /// Panics if the list has more than 65535 records or `total_size` exceeds `u32::MAX`.
    pub fn put(&mut self, out: &mut ByteVector) {
        self.finalize_all();

        let total = 4 + 2 + self.content_len();
        contract!(
            self.config,
            u32::try_from(total).is_ok(),
            "annotation list of {} bytes does not fit a u32 length",
            total
        );

        log::trace!(
            "writing annotation list: {} records, {} bytes",
            self.len(),
            total
        );

        #[allow(clippy::cast_possible_truncation)]
        out.put_u32(total as u32);
        self.put_records(out);
    }

    fn put_records(&self, out: &mut ByteVector) {
        contract!(
            self.config,
            self.len() <= usize::from(u16::MAX),
            "annotation list has {} records, at most {} fit",
            self.len(),
            u16::MAX
        );

        #[allow(clippy::cast_possible_truncation)]
        out.put_u16(self.len() as u16);
        for record in &self.records {
            out.put_bytes(record.bytes());
        }
    }
}

/// Writes an array of lists, such as the per-parameter lists of a parameter annotations
/// attribute.
///
/// Absent lists are written with a count of zero. Each list checks its own records with
/// its own configuration; the array-level checks use the configuration of the first
/// present list, or [`EncoderConfig::default`] when every list is absent.
///
/// # Panics
/// Panics if there are more than 255 lists, a list has more than 65535 records or the
/// total size exceeds `u32::MAX`.
pub fn put_lists(lists: &mut [Option<AnnotationList>], out: &mut ByteVector) {
    let config = shared_config(lists);
    contract!(
        config,
        lists.len() <= usize::from(u8::MAX),
        "{} annotation lists, at most {} fit",
        lists.len(),
        u8::MAX
    );

    let mut total = 1 + 2 * lists.len();
    for list in lists.iter_mut().flatten() {
        list.finalize_all();
        total += list.content_len();
    }
    contract!(
        config,
        u32::try_from(total).is_ok(),
        "annotation lists of {} bytes do not fit a u32 length",
        total
    );

    log::trace!(
        "writing {} annotation lists, {} bytes",
        lists.len(),
        total
    );

    #[allow(clippy::cast_possible_truncation)]
    out.put_u32(total as u32).put_u8(lists.len() as u8);
    for list in lists.iter() {
        match list {
            Some(list) => list.put_records(out),
            None => {
                out.put_u16(0);
            }
        }
    }
}

fn shared_config(lists: &[Option<AnnotationList>]) -> EncoderConfig {
    lists
        .iter()
        .flatten()
        .next()
        .map_or_else(EncoderConfig::default, |list| list.config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        annotation::writer::AnnotationWriter,
        constpool::{ConstantPool, ConstantPoolBuilder},
    };

    fn record(pool: &mut ConstantPoolBuilder, desc: &str, values: usize, end: bool) -> AnnotationRecord {
        let mut writer = AnnotationWriter::annotation(pool, desc).unwrap();
        for value in 0..values {
            writer.visit("v", i32::try_from(value).unwrap()).unwrap();
        }
        if end {
            writer.visit_end();
        }
        writer.into_record()
    }

    #[test]
    fn links_and_construction_order() {
        let mut pool = ConstantPoolBuilder::new();
        let mut list = AnnotationList::new();
        let a = list.prepend(record(&mut pool, "LA;", 0, true));
        let b = list.prepend(record(&mut pool, "LB;", 0, true));
        let c = list.prepend(record(&mut pool, "LC;", 0, true));

        assert_eq!(list.head(), Some(c));
        assert_eq!(list.next(c), Some(b));
        assert_eq!(list.next(b), Some(a));
        assert_eq!(list.next(a), None);
        assert_eq!(list.linked().collect::<Vec<_>>(), vec![c, b, a]);
        assert_eq!(a.index(), 0);

        let mut out = ByteVector::new();
        list.put(&mut out);

        let type_a = pool.utf8("LA;").unwrap().to_be_bytes();
        let type_b = pool.utf8("LB;").unwrap().to_be_bytes();
        let type_c = pool.utf8("LC;").unwrap().to_be_bytes();
        assert_eq!(
            out.as_slice(),
            &[
                0x00, 0x00, 0x00, 0x12, // 4 + 2 + 3 * 4
                0x00, 0x03,
                type_a[0], type_a[1], 0x00, 0x00,
                type_b[0], type_b[1], 0x00, 0x00,
                type_c[0], type_c[1], 0x00, 0x00,
            ]
        );
    }

    #[test]
    fn unfinished_records_are_finalized() {
        let mut pool = ConstantPoolBuilder::new();
        let mut list = AnnotationList::new();
        let id = list.prepend(record(&mut pool, "LA;", 2, false));
        assert!(!list.get(id).unwrap().is_finalized());

        let mut out = ByteVector::new();
        list.put(&mut out);

        assert!(list.get(id).unwrap().is_finalized());
        assert_eq!(&out.as_slice()[8..10], &[0x00, 0x02]);
        assert_eq!(out.len(), 4 + 2 + list.content_len());
    }

    #[test]
    fn empty_list() {
        let mut list = AnnotationList::new();
        assert!(list.is_empty());
        assert_eq!(list.linked().count(), 0);

        let mut out = ByteVector::new();
        list.put(&mut out);
        assert_eq!(out.as_slice(), &[0x00, 0x00, 0x00, 0x06, 0x00, 0x00]);
    }

    #[test]
    fn array_of_lists() {
        let mut pool = ConstantPoolBuilder::new();
        let mut first = AnnotationList::new();
        first.prepend(record(&mut pool, "LA;", 1, false));
        let mut third = AnnotationList::new();
        third.prepend(record(&mut pool, "LB;", 0, true));
        third.prepend(record(&mut pool, "LC;", 0, true));
        let content = first.content_len() + third.content_len();

        let mut lists = vec![Some(first), None, Some(third)];
        let mut out = ByteVector::new();
        put_lists(&mut lists, &mut out);

        let total = 1 + 2 * 3 + content;
        assert_eq!(out.len(), 4 + total);
        assert_eq!(&out.as_slice()[..4], &u32::try_from(total).unwrap().to_be_bytes());
        assert_eq!(out.as_slice()[4], 3);
        // first list: one record with its count patched
        assert_eq!(&out.as_slice()[5..7], &[0x00, 0x01]);
        assert_eq!(&out.as_slice()[9..11], &[0x00, 0x01]);
        // absent list, then the third list's count
        let second = 7 + lists[0].as_ref().unwrap().content_len();
        assert_eq!(&out.as_slice()[second..second + 2], &[0x00, 0x00]);
        assert_eq!(&out.as_slice()[second + 2..second + 4], &[0x00, 0x02]);
    }

    #[test]
    fn lists_share_the_first_present_config() {
        assert_eq!(shared_config(&[None, None]), EncoderConfig::default());

        let strict = AnnotationList::new().with_config(EncoderConfig::strict());
        let unchecked = AnnotationList::new().with_config(EncoderConfig::unchecked());
        let lists = vec![None, Some(unchecked), Some(strict)];
        assert_eq!(shared_config(&lists), EncoderConfig::unchecked());
    }

    #[test]
    #[should_panic(expected = "256 annotation lists")]
    fn too_many_lists() {
        let mut lists: Vec<Option<AnnotationList>> = vec![None; 256];
        put_lists(&mut lists, &mut ByteVector::new());
    }
}
