//! End-to-end encoding scenarios through the public API.

use std::collections::HashMap;

use typeanno::prelude::*;

/// Hands out fixed, easily recognizable indices so expected byte sequences can be written
/// down literally. Strings start at 0x0100, numbers at 0x0200.
#[derive(Default)]
struct StubPool {
    strings: HashMap<String, u16>,
    numbers: HashMap<u64, u16>,
    fail_on: Option<String>,
}

impl StubPool {
    fn number(&mut self, bits: u64) -> u16 {
        let next = 0x0200 + self.numbers.len() as u16;
        *self.numbers.entry(bits).or_insert(next)
    }
}

impl ConstantPool for StubPool {
    fn utf8(&mut self, value: &str) -> Result<u16> {
        if self.fail_on.as_deref() == Some(value) {
            return Err(Error::ConstantPoolOverflow(65536));
        }
        let next = 0x0100 + self.strings.len() as u16;
        Ok(*self.strings.entry(value.to_string()).or_insert(next))
    }

    fn integer(&mut self, value: i32) -> Result<u16> {
        Ok(self.number(value as u32 as u64))
    }

    fn float(&mut self, value: f32) -> Result<u16> {
        Ok(self.number(u64::from(value.to_bits()) | 1 << 32))
    }

    fn long(&mut self, value: i64) -> Result<u16> {
        Ok(self.number(value as u64 ^ 2 << 40))
    }

    fn double(&mut self, value: f64) -> Result<u16> {
        Ok(self.number(value.to_bits() ^ 3 << 48))
    }
}

#[test]
fn unnamed_string_annotation() {
    let mut pool = StubPool::default();
    let mut writer = AnnotationWriter::begin(&mut pool, "Foo", false).unwrap();
    writer.visit("unused", "bar").unwrap();
    writer.visit_end();

    // type_index("Foo"), count 1, 's', utf8_index("bar")
    assert_eq!(writer.bytes(), &[0x01, 0x00, 0x00, 0x01, b's', 0x01, 0x01]);
}

#[test]
fn named_short_array() {
    let mut pool = StubPool::default();
    let mut writer = AnnotationWriter::annotation(&mut pool, "LFoo;").unwrap();
    writer.visit("value", vec![1i16, 2, 3]).unwrap();
    writer.visit_end();

    assert_eq!(
        writer.bytes(),
        &[
            0x01, 0x00, // type_index
            0x00, 0x01, // count
            0x01, 0x01, // name "value"
            b'[', 0x00, 0x03, // three elements
            b'S', 0x02, 0x00, //
            b'S', 0x02, 0x01, //
            b'S', 0x02, 0x02,
        ]
    );
}

#[test]
fn list_keeps_construction_order() {
    let mut pool = ConstantPoolBuilder::new();
    let mut list = AnnotationList::new();

    let mut first = AnnotationWriter::annotation(&mut pool, "LFirst;").unwrap();
    first.visit("a", 1i32).unwrap();
    first.visit_end();
    let first = first.into_record();
    let first_bytes = first.bytes().to_vec();
    list.prepend(first);

    let mut second = AnnotationWriter::annotation(&mut pool, "LSecond;").unwrap();
    second.visit("b", "x").unwrap();
    second.visit("c", 2i64).unwrap();
    second.visit_end();
    let second = second.into_record();
    let second_bytes = second.bytes().to_vec();
    let head = list.prepend(second);

    assert_eq!(list.head(), Some(head));
    assert_eq!(list.linked().count(), 2);

    let mut out = ByteVector::new();
    list.put(&mut out);

    let total = 2 + 4 + second_bytes.len() + first_bytes.len();
    assert_eq!(out.len(), total);
    assert_eq!(&out.as_slice()[..4], &(total as u32).to_be_bytes());
    assert_eq!(&out.as_slice()[4..6], &[0x00, 0x02]);
    assert_eq!(&out.as_slice()[6..6 + first_bytes.len()], first_bytes.as_slice());
    assert_eq!(&out.as_slice()[6 + first_bytes.len()..], second_bytes.as_slice());
}

#[test]
fn deeply_nested_counts() {
    let mut pool = StubPool::default();
    let mut writer = AnnotationWriter::new(&mut pool, false);
    {
        let mut outer = writer.visit_array("").unwrap();
        for _ in 0..2 {
            let mut inner = outer.visit_annotation("", "LInner;").unwrap();
            {
                let mut names = inner.visit_array("names").unwrap();
                names.visit("", "n").unwrap();
                names.visit("", "m").unwrap();
                names.visit("", "o").unwrap();
                names.visit_end();
            }
            inner.visit_end();
        }
        outer.visit_end();
    }
    writer.visit_end();
    assert_eq!(writer.size(), 1);

    let inner = [
        b'@', 0x01, 0x00, 0x00, 0x01, // LInner;, one value
        0x01, 0x01, b'[', 0x00, 0x03, // names: three elements
        b's', 0x01, 0x02, b's', 0x01, 0x03, b's', 0x01, 0x04,
    ];
    let mut expected = vec![b'[', 0x00, 0x02];
    expected.extend_from_slice(&inner);
    expected.extend_from_slice(&inner);
    assert_eq!(writer.bytes(), expected.as_slice());
}

#[test]
fn visit_end_twice_is_stable() {
    let mut pool = StubPool::default();
    let mut writer = AnnotationWriter::annotation(&mut pool, "LA;").unwrap();
    writer.visit_enum("policy", "LPolicy;", "KEEP").unwrap();
    writer.visit_end();
    let once = writer.bytes().to_vec();
    writer.visit_end();

    assert_eq!(writer.bytes(), once.as_slice());
    assert_eq!(
        once,
        vec![0x01, 0x00, 0x00, 0x01, 0x01, 0x01, b'e', 0x01, 0x02, 0x01, 0x03]
    );
}

#[test]
fn pool_errors_propagate() {
    let mut pool = StubPool {
        fail_on: Some("broken".to_string()),
        ..StubPool::default()
    };

    assert!(AnnotationWriter::annotation(&mut pool, "broken").is_err());

    let mut writer = AnnotationWriter::annotation(&mut pool, "LOk;").unwrap();
    writer.visit("fine", 1i32).unwrap();
    assert!(matches!(
        writer.visit("broken", 2i32),
        Err(Error::ConstantPoolOverflow(_))
    ));
    assert!(writer.visit_annotation("x", "broken").is_err());
    writer.visit_end();

    assert_eq!(writer.size(), 1);
    assert_eq!(writer.bytes().len(), 4 + 2 + 3);
}

#[test]
fn writer_over_trait_object_pool() {
    let mut builder = ConstantPoolBuilder::new();
    let pool: &mut dyn ConstantPool = &mut builder;

    let target = TypeAnnotationTarget::new(TargetInfo::Offset {
        kind: OffsetTarget::InstanceOf,
        offset: 0x0010,
    });
    let mut writer = AnnotationWriter::type_annotation(pool, &target, "LChecked;").unwrap();
    writer.visit("strict", true).unwrap();
    writer.visit_end();

    assert_eq!(
        writer.bytes(),
        &[
            0x43, 0x00, 0x10, 0x00, // instanceof at 0x10, empty path
            0x00, 0x01, 0x00, 0x01, // type_index, count
            0x00, 0x02, b'Z', 0x00, 0x03,
        ]
    );
}

#[test]
fn parameter_annotation_lists() {
    let mut pool = ConstantPoolBuilder::new();

    let mut first = AnnotationList::new();
    let writer = AnnotationWriter::annotation(&mut pool, "LNotNull;").unwrap();
    first.prepend(writer.into_record());
    let first_len = first.content_len();

    let mut lists = vec![Some(first), None];
    let mut out = ByteVector::new();
    put_lists(&mut lists, &mut out);

    let total = 1 + 2 * 2 + first_len;
    assert_eq!(&out.as_slice()[..4], &(total as u32).to_be_bytes());
    assert_eq!(out.as_slice()[4], 2);
    assert_eq!(&out.as_slice()[5..7], &[0x00, 0x01]);
    assert_eq!(&out.as_slice()[7 + first_len..], &[0x00, 0x00]);
}

#[test]
fn constant_pool_serializes_alongside() {
    let mut pool = ConstantPoolBuilder::new();
    let mut writer = AnnotationWriter::annotation(&mut pool, "LA;").unwrap();
    writer.visit("d", 1.0f64).unwrap();
    writer.visit_end();
    drop(writer);

    let mut out = ByteVector::new();
    pool.put(&mut out).unwrap();

    // "LA;", "d", double(1.0) taking two slots
    assert_eq!(pool.count(), 5);
    assert_eq!(&out.as_slice()[..2], &[0x00, 0x05]);
    assert_eq!(out.len(), 2 + 6 + 4 + 9);
}
