//! Fluent layout construction
//!
//! Collects fields in call order and validates everything once in
//! [`LayoutBuilder::build`].

use super::item::{
    ArrayItem, ArrayLength, BytesItem, Endianness, IntegerItem, LayoutItem, LengthPrefix,
};
use super::{Field, Layout};
use crate::errors::LayoutResult;
use crate::value::Value;

#[derive(Debug, Clone, Default)]
pub struct LayoutBuilder {
    fields: Vec<Field>,
}

impl LayoutBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an arbitrary item
    pub fn field(mut self, name: impl Into<String>, item: LayoutItem) -> Self {
        self.fields.push(Field::new(name, item));
        self
    }

    /// Big-endian unsigned integer of `size` bytes
    pub fn uint(self, name: impl Into<String>, size: u8) -> Self {
        self.field(name, LayoutItem::Integer(IntegerItem::unsigned(size)))
    }

    /// Big-endian signed integer of `size` bytes
    pub fn int(self, name: impl Into<String>, size: u8) -> Self {
        self.field(name, LayoutItem::Integer(IntegerItem::signed(size)))
    }

    /// Little-endian unsigned integer of `size` bytes
    pub fn uint_le(self, name: impl Into<String>, size: u8) -> Self {
        self.field(
            name,
            LayoutItem::Integer(IntegerItem::unsigned(size).with_endianness(Endianness::Little)),
        )
    }

    /// Unsigned integer pinned to a constant
    pub fn const_uint(self, name: impl Into<String>, size: u8, value: impl Into<u128>) -> Self {
        self.field(
            name,
            LayoutItem::Integer(IntegerItem::unsigned(size).with_fixed(Value::Uint(value.into()))),
        )
    }

    /// Signed integer pinned to a constant
    pub fn const_int(self, name: impl Into<String>, size: u8, value: impl Into<i128>) -> Self {
        self.field(
            name,
            LayoutItem::Integer(IntegerItem::signed(size).with_fixed(Value::Int(value.into()))),
        )
    }

    /// Exactly `size` raw bytes
    pub fn bytes(self, name: impl Into<String>, size: usize) -> Self {
        self.field(name, LayoutItem::Bytes(BytesItem::Fixed { size }))
    }

    /// Literal byte sequence
    pub fn const_bytes(self, name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.field(
            name,
            LayoutItem::Bytes(BytesItem::Constant {
                bytes: bytes.into(),
            }),
        )
    }

    /// Bytes preceded by a big-endian length prefix of `prefix_size` bytes
    pub fn prefixed_bytes(self, name: impl Into<String>, prefix_size: u8) -> Self {
        self.field(
            name,
            LayoutItem::Bytes(BytesItem::Prefixed {
                prefix: LengthPrefix::new(prefix_size),
            }),
        )
    }

    /// All remaining bytes of the buffer
    pub fn rest_bytes(self, name: impl Into<String>) -> Self {
        self.field(name, LayoutItem::Bytes(BytesItem::Remainder))
    }

    pub fn array(self, name: impl Into<String>, element: Layout, length: ArrayLength) -> Self {
        self.field(name, LayoutItem::Array(ArrayItem { element, length }))
    }

    pub fn object(self, name: impl Into<String>, layout: Layout) -> Self {
        self.field(name, LayoutItem::Object(layout))
    }

    pub fn build(self) -> LayoutResult<Layout> {
        Layout::new(self.fields)
    }
}
