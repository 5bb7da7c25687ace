//! Layout item definitions
//!
//! Each [`LayoutItem`] describes how one named field is laid out on the wire.
//! Items carry no behavior beyond small range predicates; encoding, decoding
//! and size analysis live in the codec crate.

use serde::{Deserialize, Serialize};

use super::Layout;
use crate::value::Value;

/// Widest supported integer item, in bytes
pub const MAX_INTEGER_SIZE: u8 = 16;

/// Widest supported length prefix, in bytes
pub const MAX_PREFIX_SIZE: u8 = 8;

/// Byte order of an integer item or length prefix
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Endianness {
    #[default]
    Big,
    Little,
}

/// One field's wire representation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutItem {
    Integer(IntegerItem),
    Bytes(BytesItem),
    Array(ArrayItem),
    Object(Layout),
}

/// Fixed-width integer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegerItem {
    /// Width in bytes (1..=16)
    pub size: u8,
    #[serde(default)]
    pub signed: bool,
    #[serde(default)]
    pub endianness: Endianness,
    /// Constant the field must hold; never taken from caller data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed: Option<Value>,
}

impl IntegerItem {
    pub fn unsigned(size: u8) -> Self {
        Self {
            size,
            signed: false,
            endianness: Endianness::Big,
            fixed: None,
        }
    }

    pub fn signed(size: u8) -> Self {
        Self {
            signed: true,
            ..Self::unsigned(size)
        }
    }

    pub fn with_endianness(mut self, endianness: Endianness) -> Self {
        self.endianness = endianness;
        self
    }

    pub fn with_fixed(mut self, value: impl Into<Value>) -> Self {
        self.fixed = Some(value.into());
        self
    }

    /// Whether an unsigned value fits `size` bytes
    pub fn fits_unsigned(&self, value: u128) -> bool {
        let bits = u32::from(self.size) * 8;
        bits >= 128 || value >> bits == 0
    }

    /// Whether a signed value fits `size` bytes in two's complement
    pub fn fits_signed(&self, value: i128) -> bool {
        let bits = u32::from(self.size) * 8;
        if bits >= 128 {
            return true;
        }
        let min = -(1i128 << (bits - 1));
        let max = (1i128 << (bits - 1)) - 1;
        (min..=max).contains(&value)
    }

    /// Whether `value` is an integer of this item's signedness, in range or not
    pub fn accepts_kind(&self, value: &Value) -> bool {
        matches!(
            (self.signed, value),
            (false, Value::Uint(_)) | (true, Value::Int(_))
        )
    }

    /// Two's complement bits of `value` when it is an integer of this item's
    /// signedness that fits its width
    pub fn bits(&self, value: &Value) -> Option<u128> {
        match (self.signed, value) {
            (false, Value::Uint(v)) if self.fits_unsigned(*v) => Some(*v),
            (true, Value::Int(v)) if self.fits_signed(*v) => Some(*v as u128),
            _ => None,
        }
    }

    /// Whether `value` is an integer of this item's signedness that fits its width
    pub fn fits(&self, value: &Value) -> bool {
        self.bits(value).is_some()
    }
}

/// Unsigned length prefix preceding variable-size data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LengthPrefix {
    /// Width in bytes (1..=8)
    pub size: u8,
    #[serde(default)]
    pub endianness: Endianness,
}

impl LengthPrefix {
    pub fn new(size: u8) -> Self {
        Self {
            size,
            endianness: Endianness::Big,
        }
    }

    /// Largest length this prefix can express
    pub fn max_length(&self) -> u64 {
        let bits = u32::from(self.size) * 8;
        if bits >= 64 {
            u64::MAX
        } else {
            (1u64 << bits) - 1
        }
    }
}

/// Raw byte field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BytesItem {
    /// Exactly `size` caller-provided bytes
    Fixed { size: usize },
    /// A literal byte sequence; never taken from caller data
    Constant { bytes: Vec<u8> },
    /// Length prefix followed by that many bytes
    Prefixed { prefix: LengthPrefix },
    /// Everything up to the end of the buffer
    Remainder,
}

/// What an array length prefix counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthUnit {
    #[default]
    Elements,
    Bytes,
}

/// How many elements an array holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArrayLength {
    /// Statically known element count, no prefix
    Fixed(usize),
    /// Prefix holding the element count or the encoded byte length
    Prefixed {
        prefix: LengthPrefix,
        #[serde(default)]
        unit: LengthUnit,
    },
    /// Elements until the buffer is exhausted
    Remainder,
}

/// Sequence of elements sharing one layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArrayItem {
    pub element: Layout,
    pub length: ArrayLength,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsigned_ranges() {
        let u8_item = IntegerItem::unsigned(1);
        assert!(u8_item.fits_unsigned(255));
        assert!(!u8_item.fits_unsigned(256));
        assert!(!u8_item.fits_unsigned(300));

        let u128_item = IntegerItem::unsigned(16);
        assert!(u128_item.fits_unsigned(u128::MAX));
    }

    #[test]
    fn test_signed_ranges() {
        let i8_item = IntegerItem::signed(1);
        assert!(i8_item.fits_signed(-128));
        assert!(i8_item.fits_signed(127));
        assert!(!i8_item.fits_signed(128));
        assert!(!i8_item.fits_signed(-129));

        let i128_item = IntegerItem::signed(16);
        assert!(i128_item.fits_signed(i128::MIN));
        assert!(i128_item.fits_signed(i128::MAX));
    }

    #[test]
    fn test_fits_requires_matching_kind() {
        assert!(!IntegerItem::unsigned(4).fits(&Value::Int(1)));
        assert!(!IntegerItem::signed(4).fits(&Value::Uint(1)));
        assert!(!IntegerItem::unsigned(4).fits(&Value::Bytes(vec![1])));
        assert!(IntegerItem::signed(4).fits(&Value::Int(-1)));
    }

    #[test]
    fn test_bits_separates_kind_from_range() {
        let i8_item = IntegerItem::signed(1);
        assert_eq!(i8_item.bits(&Value::Int(-1)), Some(u128::MAX));
        assert_eq!(i8_item.bits(&Value::Int(200)), None);
        assert!(i8_item.accepts_kind(&Value::Int(200)));
        assert!(!i8_item.accepts_kind(&Value::Uint(1)));
        assert_eq!(IntegerItem::unsigned(2).bits(&Value::Uint(0xbeef)), Some(0xbeef));
    }

    #[test]
    fn test_prefix_max_length() {
        assert_eq!(LengthPrefix::new(1).max_length(), 255);
        assert_eq!(LengthPrefix::new(2).max_length(), 65_535);
        assert_eq!(LengthPrefix::new(8).max_length(), u64::MAX);
    }
}
