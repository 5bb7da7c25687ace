//! Fixed-width integer serialization
//!
//! Integers of 1..=16 bytes, big or little endian, unsigned or two's
//! complement signed. The raw wire helpers truncate to `size` bytes; range
//! checks go through [`IntegerItem::bits`].

use layout_types::{Endianness, IntegerItem, Value};
use std::ops::Deref;

const WIDTH: usize = 16;

/// Wire form of an integer, held on the stack
#[derive(Debug, Clone, Copy)]
pub struct WireInt {
    buf: [u8; WIDTH],
    start: usize,
    end: usize,
}

impl Deref for WireInt {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.buf[self.start..self.end]
    }
}

/// The low `size` bytes of `value` in wire order
pub fn uint_wire(value: u128, size: usize, endianness: Endianness) -> WireInt {
    debug_assert!((1..=WIDTH).contains(&size));
    match endianness {
        Endianness::Big => WireInt {
            buf: value.to_be_bytes(),
            start: WIDTH - size,
            end: WIDTH,
        },
        Endianness::Little => WireInt {
            buf: value.to_le_bytes(),
            start: 0,
            end: size,
        },
    }
}

/// `value` as a `size`-byte two's complement integer in wire order
pub fn int_wire(value: i128, size: usize, endianness: Endianness) -> WireInt {
    uint_wire(value as u128, size, endianness)
}

/// Read an unsigned integer spanning all of `bytes`
pub fn read_uint(bytes: &[u8], endianness: Endianness) -> u128 {
    debug_assert!((1..=WIDTH).contains(&bytes.len()));
    let mut buf = [0u8; WIDTH];
    match endianness {
        Endianness::Big => {
            buf[WIDTH - bytes.len()..].copy_from_slice(bytes);
            u128::from_be_bytes(buf)
        }
        Endianness::Little => {
            buf[..bytes.len()].copy_from_slice(bytes);
            u128::from_le_bytes(buf)
        }
    }
}

/// Read a two's complement integer spanning all of `bytes`, sign-extending
pub fn read_int(bytes: &[u8], endianness: Endianness) -> i128 {
    let raw = read_uint(bytes, endianness);
    let unused = (WIDTH - bytes.len()) as u32 * 8;
    if unused == 0 {
        raw as i128
    } else {
        ((raw << unused) as i128) >> unused
    }
}

/// Serialized form of an integer value under `item`, if the value is of the
/// right kind and fits
pub fn serialize(item: &IntegerItem, value: &Value) -> Option<Vec<u8>> {
    let bits = item.bits(value)?;
    Some(uint_wire(bits, usize::from(item.size), item.endianness).to_vec())
}

/// Serialized constant of a fixed-value integer item
pub fn fixed_bytes(item: &IntegerItem) -> Option<Vec<u8>> {
    item.fixed.as_ref().and_then(|fixed| serialize(item, fixed))
}

/// Decode `bytes` as the value `item` describes
pub fn deserialize(item: &IntegerItem, bytes: &[u8]) -> Value {
    if item.signed {
        Value::Int(read_int(bytes, item.endianness))
    } else {
        Value::Uint(read_uint(bytes, item.endianness))
    }
}
