//! # Layout Schema Model
//!
//! A [`Layout`] is an ordered list of named [`LayoutItem`]s. The order is the
//! wire order and is never changed implicitly: two layouts with the same
//! fields in a different order describe different byte sequences.
//!
//! Layouts are immutable once built. Construct them through
//! [`Layout::builder`] or [`Layout::new`], both of which validate the
//! definition; layouts that arrive through serde must be checked with
//! [`Layout::validate`] before use.
//!
//! ```rust
//! use layout_types::Layout;
//!
//! let transfer = Layout::builder()
//!     .const_uint("tag", 1, 1u8)
//!     .uint("amount", 4)
//!     .build()
//!     .unwrap();
//! assert_eq!(transfer.len(), 2);
//! ```

pub mod builder;
pub mod item;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::errors::{LayoutError, LayoutResult};
use crate::value::Value;

pub use builder::LayoutBuilder;
pub use item::{
    ArrayItem, ArrayLength, BytesItem, Endianness, IntegerItem, LayoutItem, LengthPrefix,
    LengthUnit, MAX_INTEGER_SIZE, MAX_PREFIX_SIZE,
};

/// A named layout item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub item: LayoutItem,
}

impl Field {
    pub fn new(name: impl Into<String>, item: LayoutItem) -> Self {
        Self {
            name: name.into(),
            item,
        }
    }
}

/// Ordered sequence of named layout items
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Layout {
    fields: Vec<Field>,
}

impl Layout {
    /// Build a layout from fields, validating the definition
    pub fn new(fields: Vec<Field>) -> LayoutResult<Self> {
        let layout = Self { fields };
        layout.validate()?;
        Ok(layout)
    }

    pub fn builder() -> LayoutBuilder {
        LayoutBuilder::new()
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Check the whole definition, recursing into arrays and objects
    pub fn validate(&self) -> LayoutResult<()> {
        let mut seen = HashSet::with_capacity(self.fields.len());
        for field in &self.fields {
            if !seen.insert(field.name.as_str()) {
                return Err(LayoutError::DuplicateField {
                    field: field.name.clone(),
                });
            }
            validate_item(&field.name, &field.item)?;
        }
        Ok(())
    }
}

fn validate_item(name: &str, item: &LayoutItem) -> LayoutResult<()> {
    match item {
        LayoutItem::Integer(int) => validate_integer(name, int),
        LayoutItem::Bytes(BytesItem::Constant { bytes }) if bytes.is_empty() => {
            Err(LayoutError::EmptyConstant {
                field: name.to_string(),
            })
        }
        LayoutItem::Bytes(BytesItem::Prefixed { prefix }) => validate_prefix(name, prefix),
        LayoutItem::Bytes(_) => Ok(()),
        LayoutItem::Array(array) => {
            if let ArrayLength::Prefixed { prefix, .. } = &array.length {
                validate_prefix(name, prefix)?;
            }
            array.element.validate().map_err(|e| e.nested(name))
        }
        LayoutItem::Object(layout) => layout.validate().map_err(|e| e.nested(name)),
    }
}

fn validate_integer(name: &str, int: &IntegerItem) -> LayoutResult<()> {
    if int.size == 0 || int.size > MAX_INTEGER_SIZE {
        return Err(LayoutError::InvalidIntegerSize {
            field: name.to_string(),
            size: int.size,
            max: MAX_INTEGER_SIZE,
        });
    }

    let Some(fixed) = &int.fixed else {
        return Ok(());
    };

    if !int.accepts_kind(fixed) {
        return Err(LayoutError::FixedValueKind {
            field: name.to_string(),
            expected: if int.signed { "an int" } else { "a uint" },
        });
    }
    if !int.fits(fixed) {
        return Err(LayoutError::FixedValueOutOfRange {
            field: name.to_string(),
            value: fixed.to_string(),
            size: int.size,
            signed: int.signed,
        });
    }
    Ok(())
}

fn validate_prefix(name: &str, prefix: &LengthPrefix) -> LayoutResult<()> {
    if prefix.size == 0 || prefix.size > MAX_PREFIX_SIZE {
        return Err(LayoutError::InvalidPrefixSize {
            field: name.to_string(),
            size: prefix.size,
            max: MAX_PREFIX_SIZE,
        });
    }
    Ok(())
}
