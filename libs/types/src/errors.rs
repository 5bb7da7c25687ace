//! Error types for layout definitions
//!
//! A malformed layout is a programming error on the side of whoever defines
//! it, so these errors surface once, when the layout is built or validated,
//! and never during encode/decode.

use thiserror::Error;

/// Errors raised while validating a layout definition
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LayoutError {
    /// Integer width outside the supported range
    #[error("Field '{field}': integer size {size} is not supported (expected 1..={max})")]
    InvalidIntegerSize { field: String, size: u8, max: u8 },

    /// Length prefix width outside the supported range
    #[error("Field '{field}': length prefix size {size} is not supported (expected 1..={max})")]
    InvalidPrefixSize { field: String, size: u8, max: u8 },

    /// Fixed integer value does not fit the declared width
    #[error("Field '{field}': fixed value {value} does not fit in {size} byte(s) (signed: {signed})")]
    FixedValueOutOfRange {
        field: String,
        value: String,
        size: u8,
        signed: bool,
    },

    /// Fixed integer value is not an integer of the declared signedness
    #[error("Field '{field}': fixed value must be {expected}")]
    FixedValueKind { field: String, expected: &'static str },

    /// Two fields of the same layout share a name
    #[error("Duplicate field name '{field}'")]
    DuplicateField { field: String },

    /// Constant byte fields must contain at least one byte
    #[error("Field '{field}': constant byte sequence is empty")]
    EmptyConstant { field: String },
}

impl LayoutError {
    /// Prefix the offending field with its parent path (`outer.inner`)
    pub fn nested(self, parent: &str) -> Self {
        let join = |field: String| format!("{parent}.{field}");
        match self {
            Self::InvalidIntegerSize { field, size, max } => Self::InvalidIntegerSize {
                field: join(field),
                size,
                max,
            },
            Self::InvalidPrefixSize { field, size, max } => Self::InvalidPrefixSize {
                field: join(field),
                size,
                max,
            },
            Self::FixedValueOutOfRange {
                field,
                value,
                size,
                signed,
            } => Self::FixedValueOutOfRange {
                field: join(field),
                value,
                size,
                signed,
            },
            Self::FixedValueKind { field, expected } => Self::FixedValueKind {
                field: join(field),
                expected,
            },
            Self::DuplicateField { field } => Self::DuplicateField { field: join(field) },
            Self::EmptyConstant { field } => Self::EmptyConstant { field: join(field) },
        }
    }
}

/// Result type for layout construction
pub type LayoutResult<T> = std::result::Result<T, LayoutError>;
