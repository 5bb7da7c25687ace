//! # Size Bounds & Fixed-Byte Analysis
//!
//! Walks a [`Layout`] once and derives the two facts layout discrimination
//! runs on:
//!
//! - [`Bounds`]: the smallest and largest possible encoded size;
//! - [`FixedBytes`]: every `(offset, bytes)` pair whose value is known before
//!   seeing any data, i.e. fixed integers and constant byte fields.
//!
//! Offsets are only tracked while every preceding item has a fixed size. The
//! first variable-size item makes the running offset unknown, and no facts
//! are recorded for the rest of the layout. Facts are therefore always sound
//! but not necessarily complete: a constant sitting behind a variable-size
//! field is never reported, even when its position could be reconstructed.

use layout_types::{ArrayLength, BytesItem, Layout, LayoutItem};
use serde::Serialize;
use std::fmt;
use std::ops::Add;

use crate::integer;

/// Minimum and (optional) maximum encoded size in bytes
///
/// `upper == None` means the size has no static ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Bounds {
    pub lower: usize,
    pub upper: Option<usize>,
}

impl Bounds {
    pub const ZERO: Bounds = Bounds::fixed(0);

    pub const fn fixed(size: usize) -> Self {
        Self {
            lower: size,
            upper: Some(size),
        }
    }

    pub const fn at_least(lower: usize) -> Self {
        Self { lower, upper: None }
    }

    /// Exact size if lower and upper bound coincide
    pub fn fixed_size(&self) -> Option<usize> {
        match self.upper {
            Some(upper) if upper == self.lower => Some(upper),
            _ => None,
        }
    }

    pub fn is_fixed(&self) -> bool {
        self.fixed_size().is_some()
    }

    /// Whether a buffer of `size` bytes is within these bounds
    pub fn contains(&self, size: usize) -> bool {
        size >= self.lower && self.upper.map_or(true, |upper| size <= upper)
    }

    /// Whether an encoding may extend past byte position `pos`
    pub fn reaches(&self, pos: usize) -> bool {
        self.upper.map_or(true, |upper| upper > pos)
    }

    /// Bounds of `count` consecutive items with these bounds
    pub fn repeat(self, count: usize) -> Self {
        Self {
            lower: self.lower.saturating_mul(count),
            upper: self.upper.and_then(|upper| upper.checked_mul(count)),
        }
    }
}

impl Add for Bounds {
    type Output = Bounds;

    fn add(self, rhs: Bounds) -> Bounds {
        Bounds {
            lower: self.lower.saturating_add(rhs.lower),
            upper: self
                .upper
                .zip(rhs.upper)
                .and_then(|(lhs, rhs)| lhs.checked_add(rhs)),
        }
    }
}

impl fmt::Display for Bounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.upper {
            Some(upper) if upper == self.lower => write!(f, "{upper}"),
            Some(upper) => write!(f, "[{}, {}]", self.lower, upper),
            None => write!(f, "[{}, ∞)", self.lower),
        }
    }
}

/// Statically known bytes at statically known offsets, in layout order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FixedBytes(Vec<(usize, Vec<u8>)>);

impl FixedBytes {
    pub fn iter(&self) -> impl Iterator<Item = (usize, &[u8])> {
        self.0.iter().map(|(offset, bytes)| (*offset, bytes.as_slice()))
    }

    /// Individual `(position, byte)` pairs
    pub fn bytes(&self) -> impl Iterator<Item = (usize, u8)> + '_ {
        self.0.iter().flat_map(|(offset, bytes)| {
            bytes
                .iter()
                .enumerate()
                .map(move |(i, byte)| (offset + i, *byte))
        })
    }

    /// One past the last known byte position
    pub fn end(&self) -> usize {
        self.0
            .iter()
            .map(|(offset, bytes)| offset + bytes.len())
            .max()
            .unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn push(&mut self, offset: usize, bytes: Vec<u8>) {
        self.0.push((offset, bytes));
    }
}

/// Everything the analyzer derives from one layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayoutMeta {
    pub bounds: Bounds,
    pub fixed_bytes: FixedBytes,
}

/// Compute size bounds and fixed-byte facts for `layout`
pub fn analyze(layout: &Layout) -> LayoutMeta {
    let mut fixed_bytes = FixedBytes::default();
    let bounds = layout_meta(layout, Some(0), &mut fixed_bytes);
    LayoutMeta {
        bounds,
        fixed_bytes,
    }
}

/// Size bounds of `layout` alone
pub fn layout_bounds(layout: &Layout) -> Bounds {
    layout_meta(layout, None, &mut FixedBytes::default())
}

fn layout_meta(layout: &Layout, start: Option<usize>, facts: &mut FixedBytes) -> Bounds {
    let mut bounds = Bounds::ZERO;
    for field in layout.fields() {
        let offset = start.zip(bounds.fixed_size()).map(|(start, size)| start + size);
        bounds = bounds + item_meta(&field.item, offset, facts);
    }
    bounds
}

fn known(bytes: Vec<u8>, offset: Option<usize>, facts: &mut FixedBytes) -> Bounds {
    let size = bytes.len();
    if let Some(offset) = offset {
        facts.push(offset, bytes);
    }
    Bounds::fixed(size)
}

fn item_meta(item: &LayoutItem, offset: Option<usize>, facts: &mut FixedBytes) -> Bounds {
    match item {
        LayoutItem::Integer(int) => match integer::fixed_bytes(int) {
            Some(bytes) => known(bytes, offset, facts),
            None => Bounds::fixed(usize::from(int.size)),
        },
        LayoutItem::Bytes(BytesItem::Fixed { size }) => Bounds::fixed(*size),
        LayoutItem::Bytes(BytesItem::Constant { bytes }) => known(bytes.clone(), offset, facts),
        LayoutItem::Bytes(BytesItem::Prefixed { prefix }) => {
            Bounds::at_least(usize::from(prefix.size))
        }
        LayoutItem::Bytes(BytesItem::Remainder) => Bounds::at_least(0),
        LayoutItem::Array(array) => match array.length {
            // facts inside array elements are never recorded
            ArrayLength::Fixed(count) => layout_bounds(&array.element).repeat(count),
            ArrayLength::Prefixed { prefix, .. } => Bounds::at_least(usize::from(prefix.size)),
            ArrayLength::Remainder => Bounds::at_least(0),
        },
        LayoutItem::Object(layout) => layout_meta(layout, offset, facts),
    }
}
