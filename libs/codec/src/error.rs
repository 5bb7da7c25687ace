//! Codec-level errors for layout encoding, decoding and discrimination
//!
//! Every failure carries enough context to locate it: the dotted field path
//! (`payload.outputs[2].amount`), the byte offset where the codec was
//! positioned, and what was expected versus found. Errors are raised
//! synchronously at the point of failure and are never retried here.

use layout_types::LayoutError;
use thiserror::Error;

/// Errors produced by the bounds analyzer, discriminator and codec engine
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CodecError {
    /// Discriminator requested over zero layouts
    #[error("Cannot discriminate an empty set of layouts")]
    EmptyCandidateSet,

    /// More candidate layouts than the candidate bitset can track
    #[error("Too many candidate layouts: {count} exceeds the maximum of {max}")]
    TooManyCandidates { count: usize, max: usize },

    /// Layouts are not fully separable and ambiguity was not allowed
    #[error("Cannot uniquely distinguish the given layouts: candidates {candidates:?} share every size and byte constraint")]
    AmbiguousLayouts { candidates: Vec<usize> },

    /// Integer does not fit the declared width
    #[error("Value {value} out of range for field '{field}' ({size} byte(s), signed: {signed})")]
    RangeError {
        field: String,
        value: String,
        size: u8,
        signed: bool,
    },

    /// Fixed-size field given or read with the wrong length
    #[error("Size mismatch for field '{field}': expected {expected}, got {got}")]
    SizeMismatch {
        field: String,
        expected: usize,
        got: usize,
    },

    /// Fixed-value field does not hold its constant
    #[error("Constant mismatch for field '{field}' at offset {offset}: expected 0x{}, found 0x{}", hex::encode(.expected), hex::encode(.actual))]
    ConstantMismatch {
        field: String,
        offset: usize,
        expected: Vec<u8>,
        actual: Vec<u8>,
    },

    /// Fewer bytes remain than the field requires
    #[error("Out of bounds reading field '{field}' at offset {offset}: need {need} bytes, {available} available")]
    OutOfBounds {
        field: String,
        offset: usize,
        need: usize,
        available: usize,
    },

    /// The outermost layout left bytes unread and strict consumption was requested
    #[error("Trailing bytes: layout consumed {consumed} of {total} bytes")]
    TrailingBytes { consumed: usize, total: usize },

    /// Caller record lacks a field the layout requires
    #[error("Missing value for field '{field}'")]
    MissingField { field: String },

    /// Caller value has the wrong shape for the field
    #[error("Type mismatch for field '{field}': expected {expected}, got {got}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
        got: &'static str,
    },

    /// Length cannot be expressed in the field's length prefix
    #[error("Length {length} of field '{field}' does not fit a {prefix_size}-byte length prefix")]
    LengthOverflow {
        field: String,
        length: usize,
        prefix_size: u8,
    },

    /// Length prefix claims more elements than the configured ceiling
    #[error("Length prefix of field '{field}' claims {claimed} elements, limit is {limit}")]
    LengthLimitExceeded {
        field: String,
        claimed: u64,
        limit: usize,
    },

    /// Array element occupies no bytes in an array whose length comes from
    /// the bytes alone (remainder or byte-length prefix), on encode or decode
    #[error("Array field '{field}' stalled at offset {offset}: element occupies no bytes")]
    StalledArray { field: String, offset: usize },

    /// Layout definition failed validation
    #[error("Invalid layout: {0}")]
    InvalidLayout(#[from] LayoutError),
}

impl CodecError {
    pub fn out_of_bounds(
        field: impl Into<String>,
        offset: usize,
        need: usize,
        available: usize,
    ) -> Self {
        Self::OutOfBounds {
            field: field.into(),
            offset,
            need,
            available,
        }
    }

    pub fn size_mismatch(field: impl Into<String>, expected: usize, got: usize) -> Self {
        Self::SizeMismatch {
            field: field.into(),
            expected,
            got,
        }
    }

    pub fn constant_mismatch(
        field: impl Into<String>,
        offset: usize,
        expected: &[u8],
        actual: &[u8],
    ) -> Self {
        Self::ConstantMismatch {
            field: field.into(),
            offset,
            expected: expected.to_vec(),
            actual: actual.to_vec(),
        }
    }

    pub fn range_error(
        field: impl Into<String>,
        value: impl ToString,
        size: u8,
        signed: bool,
    ) -> Self {
        Self::RangeError {
            field: field.into(),
            value: value.to_string(),
            size,
            signed,
        }
    }

    pub fn type_mismatch(field: impl Into<String>, expected: &'static str, got: &'static str) -> Self {
        Self::TypeMismatch {
            field: field.into(),
            expected,
            got,
        }
    }

    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    /// Whether the error means "not enough input" rather than "wrong input"
    ///
    /// Useful for stream readers that may retry once more bytes arrive.
    pub fn is_truncation(&self) -> bool {
        matches!(self, Self::OutOfBounds { .. })
    }
}

/// Result type for codec operations
pub type CodecResult<T> = std::result::Result<T, CodecError>;
