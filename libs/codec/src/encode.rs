//! # Layout Encoding
//!
//! Serializes a [`Record`] into the exact byte sequence a [`Layout`] describes.
//! Fixed-value integers and constant byte fields are written from the layout
//! and never read from the record, so callers may leave them out.
//!
//! Encoding is all-or-nothing: on error no bytes are appended to the output.

use layout_types::{
    ArrayItem, ArrayLength, BytesItem, IntegerItem, Layout, LayoutItem, LengthPrefix, LengthUnit,
    Record, Value,
};

use crate::error::{CodecError, CodecResult};
use crate::integer::uint_wire;
use crate::path::FieldPath;

/// Destination for encoded bytes
trait Sink {
    fn put(&mut self, bytes: &[u8]);

    /// Bytes written so far; the offset of the next `put`
    fn position(&self) -> usize;
}

impl Sink for Vec<u8> {
    fn put(&mut self, bytes: &[u8]) {
        self.extend_from_slice(bytes);
    }

    fn position(&self) -> usize {
        self.len()
    }
}

/// Counts bytes without storing them
#[derive(Default)]
struct Tally(usize);

impl Sink for Tally {
    fn put(&mut self, bytes: &[u8]) {
        self.0 += bytes.len();
    }

    fn position(&self) -> usize {
        self.0
    }
}

/// Encode `record` under `layout` into a fresh buffer
pub fn encode(layout: &Layout, record: &Record) -> CodecResult<Vec<u8>> {
    let mut out = Vec::new();
    encode_into(layout, record, &mut out)?;
    Ok(out)
}

/// Append the encoding of `record` to `out`, returning the number of bytes
/// written; `out` is left untouched on error
pub fn encode_into(layout: &Layout, record: &Record, out: &mut Vec<u8>) -> CodecResult<usize> {
    let start = out.len();
    match encode_layout(layout, record, &FieldPath::ROOT, out) {
        Ok(()) => Ok(out.len() - start),
        Err(err) => {
            out.truncate(start);
            Err(err)
        }
    }
}

/// Size in bytes `encode` would produce, with the same validation
pub fn encoded_size(layout: &Layout, record: &Record) -> CodecResult<usize> {
    let mut tally = Tally::default();
    encode_layout(layout, record, &FieldPath::ROOT, &mut tally)?;
    Ok(tally.0)
}

fn encode_layout<S: Sink>(
    layout: &Layout,
    record: &Record,
    path: &FieldPath<'_>,
    out: &mut S,
) -> CodecResult<()> {
    for field in layout.fields() {
        let path = path.field(&field.name);
        encode_item(&field.item, record.get(&field.name), &path, out)?;
    }
    Ok(())
}

fn encode_item<S: Sink>(
    item: &LayoutItem,
    value: Option<&Value>,
    path: &FieldPath<'_>,
    out: &mut S,
) -> CodecResult<()> {
    match item {
        LayoutItem::Integer(int) => {
            let value = match &int.fixed {
                Some(fixed) => fixed,
                None => require(value, path)?,
            };
            encode_integer(int, value, path, out)
        }
        LayoutItem::Bytes(BytesItem::Constant { bytes }) => {
            out.put(bytes);
            Ok(())
        }
        LayoutItem::Bytes(bytes) => {
            let data = match require(value, path)? {
                Value::Bytes(data) => data,
                other => return Err(CodecError::type_mismatch(path, "bytes", other.kind())),
            };
            encode_bytes(bytes, data, path, out)
        }
        LayoutItem::Array(array) => {
            let elements = match require(value, path)? {
                Value::Array(elements) => elements,
                other => return Err(CodecError::type_mismatch(path, "array", other.kind())),
            };
            encode_array(array, elements, path, out)
        }
        LayoutItem::Object(layout) => match require(value, path)? {
            Value::Object(record) => encode_layout(layout, record, path, out),
            other => Err(CodecError::type_mismatch(path, "object", other.kind())),
        },
    }
}

fn require<'v>(value: Option<&'v Value>, path: &FieldPath<'_>) -> CodecResult<&'v Value> {
    value.ok_or_else(|| CodecError::missing_field(path))
}

fn encode_integer<S: Sink>(
    int: &IntegerItem,
    value: &Value,
    path: &FieldPath<'_>,
    out: &mut S,
) -> CodecResult<()> {
    let Some(bits) = int.bits(value) else {
        return Err(if int.accepts_kind(value) {
            CodecError::range_error(path, value, int.size, int.signed)
        } else {
            let expected = if int.signed { "int" } else { "uint" };
            CodecError::type_mismatch(path, expected, value.kind())
        });
    };
    out.put(&uint_wire(bits, usize::from(int.size), int.endianness));
    Ok(())
}

fn encode_prefix<S: Sink>(
    prefix: &LengthPrefix,
    length: usize,
    path: &FieldPath<'_>,
    out: &mut S,
) -> CodecResult<()> {
    let fits = u64::try_from(length).map_or(false, |len| len <= prefix.max_length());
    if !fits {
        return Err(CodecError::LengthOverflow {
            field: path.into(),
            length,
            prefix_size: prefix.size,
        });
    }
    out.put(&uint_wire(length as u128, usize::from(prefix.size), prefix.endianness));
    Ok(())
}

fn encode_bytes<S: Sink>(
    item: &BytesItem,
    data: &[u8],
    path: &FieldPath<'_>,
    out: &mut S,
) -> CodecResult<()> {
    match item {
        BytesItem::Fixed { size } => {
            if data.len() != *size {
                return Err(CodecError::size_mismatch(path, *size, data.len()));
            }
        }
        BytesItem::Prefixed { prefix } => encode_prefix(prefix, data.len(), path, out)?,
        BytesItem::Remainder => {}
        BytesItem::Constant { bytes } => {
            out.put(bytes);
            return Ok(());
        }
    }
    out.put(data);
    Ok(())
}

fn encode_array<S: Sink>(
    array: &ArrayItem,
    elements: &[Value],
    path: &FieldPath<'_>,
    out: &mut S,
) -> CodecResult<()> {
    match array.length {
        ArrayLength::Fixed(count) => {
            if elements.len() != count {
                return Err(CodecError::size_mismatch(path, count, elements.len()));
            }
            encode_elements(&array.element, elements, false, path, out)
        }
        ArrayLength::Prefixed {
            prefix,
            unit: LengthUnit::Elements,
        } => {
            encode_prefix(&prefix, elements.len(), path, out)?;
            encode_elements(&array.element, elements, false, path, out)
        }
        ArrayLength::Prefixed {
            prefix,
            unit: LengthUnit::Bytes,
        } => {
            // dry run at the real element offsets so errors point into the output
            let start = out.position() + usize::from(prefix.size);
            let mut tally = Tally(start);
            encode_elements(&array.element, elements, true, path, &mut tally)?;
            encode_prefix(&prefix, tally.0 - start, path, out)?;
            encode_elements(&array.element, elements, true, path, out)
        }
        ArrayLength::Remainder => encode_elements(&array.element, elements, true, path, out),
    }
}

/// `needs_progress` marks arrays whose length comes from the bytes alone:
/// an element that writes nothing could not be counted back on decode.
fn encode_elements<S: Sink>(
    element: &Layout,
    elements: &[Value],
    needs_progress: bool,
    path: &FieldPath<'_>,
    out: &mut S,
) -> CodecResult<()> {
    for (index, value) in elements.iter().enumerate() {
        let path = path.index(index);
        let record = match value {
            Value::Object(record) => record,
            other => return Err(CodecError::type_mismatch(&path, "object", other.kind())),
        };
        let start = out.position();
        encode_layout(element, record, &path, out)?;
        if needs_progress && out.position() == start {
            return Err(CodecError::StalledArray {
                field: path.into(),
                offset: start,
            });
        }
    }
    Ok(())
}
