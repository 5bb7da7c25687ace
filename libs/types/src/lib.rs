//! # Layout Types
//!
//! Pure data definitions shared by every producer and consumer of binary
//! layouts.
//!
//! ## Design Philosophy
//!
//! - **Declarative**: a [`Layout`] says what the bytes look like, never how to
//!   read them. Encoding, decoding, size analysis and layout discrimination
//!   live in `layout-codec`.
//! - **Ordered**: field order is wire order; nothing is reordered or merged.
//! - **Validated once**: malformed definitions are rejected when a layout is
//!   built, so the codec never has to handle them at runtime.
//! - **Serializable**: layouts and values derive serde so protocol modules can
//!   ship definitions as data.
//!
//! ## Architecture Role
//!
//! ```text
//! protocol modules → [layout-types] → layout-codec
//!        ↑                 ↓               ↓
//!   Layout defs      Layout / Value    encode / decode
//!   per message      Record model      discriminate
//! ```

pub mod errors;
pub mod layout;
pub mod value;

pub use errors::{LayoutError, LayoutResult};
pub use layout::{
    ArrayItem, ArrayLength, BytesItem, Endianness, Field, IntegerItem, Layout, LayoutBuilder,
    LayoutItem, LengthPrefix, LengthUnit, MAX_INTEGER_SIZE, MAX_PREFIX_SIZE,
};
pub use value::{Record, Value};
