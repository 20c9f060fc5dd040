#![no_main]

use libfuzzer_sys::fuzz_target;
use typeanno::prelude::*;

const MAX_DEPTH: usize = 8;

fn take(data: &mut &[u8]) -> Option<u8> {
    let (first, rest) = data.split_first()?;
    *data = rest;
    Some(*first)
}

fn name(byte: u8) -> String {
    format!("n{}", byte % 16)
}

/// Interprets the input as a sequence of writer calls, one opcode byte each.
fn drive<P: ConstantPool + ?Sized>(
    writer: &mut AnnotationWriter<'_, P>,
    data: &mut &[u8],
    depth: usize,
) {
    while let Some(op) = take(data) {
        let arg = take(data).unwrap_or(0);
        let result = match op % 12 {
            0 => writer.visit(&name(arg), arg as i8),
            1 => writer.visit(&name(arg), arg % 2 == 0),
            2 => writer.visit(&name(arg), u16::from(arg)),
            3 => writer.visit(&name(arg), i32::from(arg) << 20),
            4 => writer.visit(&name(arg), i64::from(arg) << 40),
            5 => writer.visit(&name(arg), f64::from(arg) / 3.0),
            6 => writer.visit(&name(arg), name(arg.rotate_left(3))),
            7 => writer.visit_enum(&name(arg), "LFuzz;", &name(arg >> 4)),
            8 => writer.visit(&name(arg), vec![i16::from(arg); usize::from(arg % 8)]),
            9 if depth < MAX_DEPTH => match writer.visit_annotation(&name(arg), "LNested;") {
                Ok(mut child) => {
                    drive(&mut child, data, depth + 1);
                    child.visit_end();
                    Ok(())
                }
                Err(error) => Err(error),
            },
            10 if depth < MAX_DEPTH => match writer.visit_array(&name(arg)) {
                Ok(mut child) => {
                    drive(&mut child, data, depth + 1);
                    Ok(())
                }
                Err(error) => Err(error),
            },
            _ => return,
        };
        if result.is_err() {
            return;
        }
    }
}

fuzz_target!(|data: &[u8]| {
    let mut input = data;
    let mut pool = ConstantPoolBuilder::new();
    let mut list = AnnotationList::new();

    for _ in 0..2 {
        let Ok(mut writer) = AnnotationWriter::annotation(&mut pool, "LRoot;") else {
            return;
        };
        drive(&mut writer, &mut input, 0);
        let size = writer.size();
        writer.visit_end();
        assert_eq!(
            u16::from_be_bytes([writer.bytes()[2], writer.bytes()[3]]) as usize,
            size
        );
        list.prepend(writer.into_record());
    }

    let mut out = ByteVector::new();
    list.put(&mut out);
    assert_eq!(out.len(), 6 + list.content_len());
});
