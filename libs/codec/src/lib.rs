//! # Layout Codec - Discrimination & Serialization Rules
//!
//! ## Purpose
//!
//! This crate is the "rules" layer over the pure layout definitions in
//! `layout-types`:
//! - Size bounds and fixed-byte analysis of a layout
//! - **Discriminator synthesis**: tell an unlabeled buffer's layout apart
//!   from a fixed set of candidates using only its length and a few bytes
//! - Encoding records into exact byte sequences
//! - Decoding byte sequences back into records
//!
//! ## Architecture Role
//!
//! ```text
//! libs/types  →  [layout codec]  →  tooling / callers
//!     ↑               ↓
//! Pure Data      Analysis, Discrimination,
//! Layout,        Encode / Decode
//! Record
//! ```
//!
//! ## What This Crate Does NOT Contain
//! - Concrete message definitions for any particular wire protocol
//! - Transport, signing or RPC concerns
//! - Global layout registries: every operation takes its layouts and
//!   configuration explicitly
//!
//! ## Example
//!
//! ```rust
//! use layout_codec::{decode, encode, Discriminator};
//! use layout_types::{Layout, Record};
//!
//! let short = Layout::builder().const_uint("tag", 1, 1u8).uint("amount", 4).build()?;
//! let long = Layout::builder().const_uint("tag", 1, 2u8).bytes("key", 32).build()?;
//! let candidates = [short, long];
//!
//! let bytes = encode(&candidates[0], &Record::new().with("amount", 7u32))?;
//! let discriminator = Discriminator::new(&candidates)?;
//! let index = discriminator.discriminate(&bytes).ok_or("unknown layout")?;
//!
//! let record = decode(&candidates[index], &bytes)?;
//! assert_eq!(record.get("amount").and_then(|v| v.as_uint()), Some(7));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod bounds;
pub mod candidates;
pub mod config;
pub mod decode;
pub mod discriminator;
pub mod encode;
pub mod error;
pub mod integer;
mod path;

pub use bounds::{analyze, layout_bounds, Bounds, FixedBytes, LayoutMeta};
pub use candidates::Candidates;
pub use config::{CodecConfig, DecodeConfig, DiscriminatorConfig};
pub use decode::{decode, decode_prefix, decode_prefix_with, decode_with};
pub use discriminator::{layout_discriminator, Discriminator};
pub use encode::{encode, encode_into, encoded_size};
pub use error::{CodecError, CodecResult};
