//! # Layout Decoding
//!
//! Reads a byte buffer back into a [`Record`] shaped like the [`Layout`].
//! Every read is bounds-checked against the current window: the whole buffer
//! at the top level, or the byte span claimed by a byte-length-prefixed
//! array. Fixed-value integers and constant byte fields must match exactly
//! and are reported in the decoded record.
//!
//! Decoding never allocates more than the buffer can back: length prefixes
//! are checked against the remaining window, and element counts against
//! [`DecodeConfig::max_array_elements`], before any allocation.

use layout_types::{
    ArrayItem, ArrayLength, BytesItem, IntegerItem, Layout, LayoutItem, LengthPrefix, LengthUnit,
    Record, Value,
};

use crate::config::DecodeConfig;
use crate::error::{CodecError, CodecResult};
use crate::integer;
use crate::path::FieldPath;

/// Decode `encoded` under `layout`, ignoring trailing bytes
pub fn decode(layout: &Layout, encoded: &[u8]) -> CodecResult<Record> {
    decode_with(layout, encoded, &DecodeConfig::default())
}

/// Decode a leading record and report how many bytes it occupied
pub fn decode_prefix(layout: &Layout, encoded: &[u8]) -> CodecResult<(Record, usize)> {
    decode_prefix_with(layout, encoded, &DecodeConfig::default())
}

/// Decode with explicit policy; fails with [`CodecError::TrailingBytes`]
/// under `consume_all` when bytes are left over
pub fn decode_with(layout: &Layout, encoded: &[u8], config: &DecodeConfig) -> CodecResult<Record> {
    let (record, consumed) = decode_prefix_with(layout, encoded, config)?;
    if config.consume_all && consumed != encoded.len() {
        return Err(CodecError::TrailingBytes {
            consumed,
            total: encoded.len(),
        });
    }
    Ok(record)
}

pub fn decode_prefix_with(
    layout: &Layout,
    encoded: &[u8],
    config: &DecodeConfig,
) -> CodecResult<(Record, usize)> {
    let mut reader = Reader {
        buf: encoded,
        pos: 0,
        end: encoded.len(),
        config,
    };
    let record = reader.layout(layout, &FieldPath::ROOT)?;
    Ok((record, reader.pos))
}

/// Cursor over a window `pos..end` of the input
struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
    end: usize,
    config: &'a DecodeConfig,
}

impl<'a> Reader<'a> {
    fn remaining(&self) -> usize {
        self.end - self.pos
    }

    fn take(&mut self, need: usize, path: &FieldPath<'_>) -> CodecResult<&'a [u8]> {
        let available = self.remaining();
        if need > available {
            return Err(CodecError::out_of_bounds(path, self.pos, need, available));
        }
        let start = self.pos;
        self.pos += need;
        Ok(&self.buf[start..self.pos])
    }

    fn rest(&mut self) -> &'a [u8] {
        let start = self.pos;
        self.pos = self.end;
        &self.buf[start..self.end]
    }

    fn layout(&mut self, layout: &Layout, path: &FieldPath<'_>) -> CodecResult<Record> {
        let mut record = Record::with_capacity(layout.len());
        for field in layout.fields() {
            let path = path.field(&field.name);
            let value = self.item(&field.item, &path)?;
            record.insert(field.name.clone(), value);
        }
        Ok(record)
    }

    fn item(&mut self, item: &LayoutItem, path: &FieldPath<'_>) -> CodecResult<Value> {
        match item {
            LayoutItem::Integer(int) => self.integer(int, path),
            LayoutItem::Bytes(bytes) => self.bytes(bytes, path),
            LayoutItem::Array(array) => self.array(array, path),
            LayoutItem::Object(layout) => self.layout(layout, path).map(Value::Object),
        }
    }

    fn integer(&mut self, int: &IntegerItem, path: &FieldPath<'_>) -> CodecResult<Value> {
        let offset = self.pos;
        let raw = self.take(usize::from(int.size), path)?;
        if let Some(fixed) = &int.fixed {
            let expected = integer::serialize(int, fixed).ok_or_else(|| {
                let kind = if int.signed { "int" } else { "uint" };
                CodecError::type_mismatch(path, kind, fixed.kind())
            })?;
            if raw != expected.as_slice() {
                return Err(CodecError::constant_mismatch(path, offset, &expected, raw));
            }
        }
        Ok(integer::deserialize(int, raw))
    }

    fn prefix(&mut self, prefix: &LengthPrefix, path: &FieldPath<'_>) -> CodecResult<u64> {
        let raw = self.take(usize::from(prefix.size), path)?;
        // prefixes are at most 8 bytes wide
        Ok(integer::read_uint(raw, prefix.endianness) as u64)
    }

    /// Read a byte-length prefix and check the window can back it
    fn byte_length(&mut self, prefix: &LengthPrefix, path: &FieldPath<'_>) -> CodecResult<usize> {
        let claimed = self.prefix(prefix, path)?;
        let available = self.remaining();
        match usize::try_from(claimed) {
            Ok(length) if length <= available => Ok(length),
            _ => Err(CodecError::out_of_bounds(
                path,
                self.pos,
                usize::try_from(claimed).unwrap_or(usize::MAX),
                available,
            )),
        }
    }

    fn bytes(&mut self, item: &BytesItem, path: &FieldPath<'_>) -> CodecResult<Value> {
        let data = match item {
            BytesItem::Fixed { size } => self.take(*size, path)?,
            BytesItem::Constant { bytes } => {
                let offset = self.pos;
                let raw = self.take(bytes.len(), path)?;
                if raw != bytes.as_slice() {
                    return Err(CodecError::constant_mismatch(path, offset, bytes, raw));
                }
                raw
            }
            BytesItem::Prefixed { prefix } => {
                let length = self.byte_length(prefix, path)?;
                self.take(length, path)?
            }
            BytesItem::Remainder => self.rest(),
        };
        Ok(Value::Bytes(data.to_vec()))
    }

    fn array(&mut self, array: &ArrayItem, path: &FieldPath<'_>) -> CodecResult<Value> {
        let elements = match array.length {
            ArrayLength::Fixed(count) => self.elements(&array.element, count, path)?,
            ArrayLength::Prefixed {
                prefix,
                unit: LengthUnit::Elements,
            } => {
                let claimed = self.prefix(&prefix, path)?;
                let limit = self.config.max_array_elements;
                let count = match usize::try_from(claimed) {
                    Ok(count) if count <= limit => count,
                    _ => {
                        return Err(CodecError::LengthLimitExceeded {
                            field: path.into(),
                            claimed,
                            limit,
                        })
                    }
                };
                self.elements(&array.element, count, path)?
            }
            ArrayLength::Prefixed {
                prefix,
                unit: LengthUnit::Bytes,
            } => {
                let length = self.byte_length(&prefix, path)?;
                let end = self.pos + length;
                let mut window = Reader {
                    buf: self.buf,
                    pos: self.pos,
                    end,
                    config: self.config,
                };
                let elements = window.until_end(&array.element, path)?;
                self.pos = end;
                elements
            }
            ArrayLength::Remainder => self.until_end(&array.element, path)?,
        };
        Ok(Value::Array(elements))
    }

    fn elements(
        &mut self,
        element: &Layout,
        count: usize,
        path: &FieldPath<'_>,
    ) -> CodecResult<Vec<Value>> {
        // capacity bounded by the window, not by the claimed count
        let mut elements = Vec::with_capacity(count.min(self.remaining()));
        for index in 0..count {
            let path = path.index(index);
            elements.push(Value::Object(self.layout(element, &path)?));
        }
        Ok(elements)
    }

    fn until_end(&mut self, element: &Layout, path: &FieldPath<'_>) -> CodecResult<Vec<Value>> {
        let mut elements = Vec::new();
        while self.pos < self.end {
            let start = self.pos;
            let path = path.index(elements.len());
            let record = self.layout(element, &path)?;
            if self.pos == start {
                return Err(CodecError::StalledArray {
                    field: path.into(),
                    offset: start,
                });
            }
            elements.push(Value::Object(record));
        }
        Ok(elements)
    }
}
