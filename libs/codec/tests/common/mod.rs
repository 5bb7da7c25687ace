//! Common Test Utilities for layout properties
//!
//! Recursive layout generators and a deterministic record filler shared by
//! the discrimination and round-trip suites.

#![allow(dead_code)]

use layout_types::{
    ArrayItem, ArrayLength, BytesItem, Endianness, Field, IntegerItem, Layout, LayoutItem,
    LengthPrefix, LengthUnit, Record, Value,
};
use proptest::prelude::*;

/// Deterministic pseudo-data source for record generation; reads past the
/// end yield zeros
pub struct Entropy {
    bytes: Vec<u8>,
    pos: usize,
}

impl Entropy {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self::starting_at(bytes, 0)
    }

    pub fn starting_at(bytes: Vec<u8>, pos: usize) -> Self {
        Self { bytes, pos }
    }

    fn next(&mut self) -> u8 {
        let byte = self.bytes.get(self.pos).copied().unwrap_or(0);
        self.pos += 1;
        byte
    }

    fn take(&mut self, n: usize) -> Vec<u8> {
        (0..n).map(|_| self.next()).collect()
    }
}

/// A record valid for `layout`, fixed integers and constants included so
/// that it equals its own decoding
pub fn fill(layout: &Layout, entropy: &mut Entropy) -> Record {
    let mut record = Record::with_capacity(layout.len());
    for field in layout.fields() {
        record.insert(field.name.clone(), fill_item(&field.item, entropy));
    }
    record
}

fn fill_item(item: &LayoutItem, entropy: &mut Entropy) -> Value {
    match item {
        LayoutItem::Integer(IntegerItem {
            fixed: Some(value), ..
        }) => value.clone(),
        LayoutItem::Integer(int) => {
            let size = usize::from(int.size);
            let raw = entropy
                .take(size)
                .iter()
                .fold(0u128, |acc, b| (acc << 8) | u128::from(*b));
            if int.signed {
                let unused = 128 - 8 * size as u32;
                Value::Int(((raw << unused) as i128) >> unused)
            } else {
                Value::Uint(raw)
            }
        }
        LayoutItem::Bytes(BytesItem::Constant { bytes }) => Value::Bytes(bytes.clone()),
        LayoutItem::Bytes(BytesItem::Fixed { size }) => Value::Bytes(entropy.take(*size)),
        LayoutItem::Bytes(BytesItem::Prefixed { .. }) => {
            let len = usize::from(entropy.next() % 5);
            Value::Bytes(entropy.take(len))
        }
        LayoutItem::Bytes(BytesItem::Remainder) => {
            let len = usize::from(entropy.next() % 6);
            Value::Bytes(entropy.take(len))
        }
        LayoutItem::Array(array) => {
            let count = match array.length {
                ArrayLength::Fixed(count) => count,
                _ => usize::from(entropy.next() % 3),
            };
            Value::Array(
                (0..count)
                    .map(|_| Value::Object(fill(&array.element, entropy)))
                    .collect(),
            )
        }
        LayoutItem::Object(layout) => Value::Object(fill(layout, entropy)),
    }
}

fn endianness() -> impl Strategy<Value = Endianness> {
    prop_oneof![Just(Endianness::Big), Just(Endianness::Little)]
}

fn integer_item() -> impl Strategy<Value = LayoutItem> {
    (
        1u8..=16,
        any::<bool>(),
        endianness(),
        prop::option::of(any::<i8>()),
    )
        .prop_map(|(size, signed, endianness, fixed)| {
            let int = if signed {
                IntegerItem::signed(size)
            } else {
                IntegerItem::unsigned(size)
            }
            .with_endianness(endianness);
            let int = match fixed {
                Some(v) if signed => int.with_fixed(i64::from(v)),
                Some(v) => int.with_fixed(v as u8),
                None => int,
            };
            LayoutItem::Integer(int)
        })
}

/// Items that always occupy at least one byte and never read to the end
fn leaf_item() -> impl Strategy<Value = LayoutItem> {
    prop_oneof![
        3 => integer_item(),
        1 => (1usize..5).prop_map(|size| LayoutItem::Bytes(BytesItem::Fixed { size })),
        1 => prop::collection::vec(any::<u8>(), 1..3)
            .prop_map(|bytes| LayoutItem::Bytes(BytesItem::Constant { bytes })),
        1 => (1u8..=2, endianness()).prop_map(|(size, endianness)| {
            LayoutItem::Bytes(BytesItem::Prefixed {
                prefix: LengthPrefix { size, endianness },
            })
        }),
    ]
}

fn bounded_length() -> impl Strategy<Value = ArrayLength> {
    prop_oneof![
        (1usize..3).prop_map(ArrayLength::Fixed),
        (1u8..=2).prop_map(|size| ArrayLength::Prefixed {
            prefix: LengthPrefix::new(size),
            unit: LengthUnit::Elements,
        }),
        endianness().prop_map(|endianness| ArrayLength::Prefixed {
            prefix: LengthPrefix {
                size: 2,
                endianness
            },
            unit: LengthUnit::Bytes,
        }),
    ]
}

fn named(items: Vec<LayoutItem>) -> Vec<Field> {
    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| Field::new(format!("f{i}"), item))
        .collect()
}

fn nested_layout(item: impl Strategy<Value = LayoutItem>) -> impl Strategy<Value = Layout> {
    prop::collection::vec(item, 1..4).prop_map(|items| Layout::new(named(items)).unwrap())
}

/// Any bounded item: leaves, objects and arrays nested a few levels deep
pub fn item_strategy() -> BoxedStrategy<LayoutItem> {
    leaf_item()
        .prop_recursive(3, 24, 3, |inner| {
            prop_oneof![
                nested_layout(inner.clone()).prop_map(LayoutItem::Object),
                (nested_layout(inner), bounded_length()).prop_map(|(element, length)| {
                    LayoutItem::Array(ArrayItem { element, length })
                }),
            ]
        })
        .boxed()
}

fn open_tail() -> impl Strategy<Value = Option<LayoutItem>> {
    prop_oneof![
        2 => Just(None),
        1 => Just(Some(LayoutItem::Bytes(BytesItem::Remainder))),
        1 => nested_layout(leaf_item()).prop_map(|element| {
            Some(LayoutItem::Array(ArrayItem {
                element,
                length: ArrayLength::Remainder,
            }))
        }),
    ]
}

/// A top-level layout, optionally ending in a field that reads to the end
pub fn layout_strategy() -> impl Strategy<Value = Layout> {
    (prop::collection::vec(item_strategy(), 1..5), open_tail()).prop_map(|(items, tail)| {
        let mut fields = named(items);
        if let Some(item) = tail {
            fields.push(Field::new("rest", item));
        }
        Layout::new(fields).unwrap()
    })
}
