//! # Codec Configuration Module
//!
//! Caller-tunable decoding and discrimination policy. Nothing here is global:
//! a configuration value is handed explicitly to the operation that needs it.

use serde::{Deserialize, Serialize};

/// Complete codec configuration, as loaded by tooling
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Decoding policy
    pub decode: DecodeConfig,

    /// Discriminator synthesis policy
    pub discriminator: DiscriminatorConfig,
}

/// Decoding policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeConfig {
    /// Reject buffers the outermost layout does not consume entirely
    pub consume_all: bool,

    /// Largest element count a length prefix may claim
    pub max_array_elements: usize,
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self {
            consume_all: false,
            max_array_elements: 1 << 20, // ~1M elements
        }
    }
}

/// Discriminator synthesis policy
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscriminatorConfig {
    /// Accept candidate arrays that cannot be fully separated
    pub allow_ambiguous: bool,
}

impl CodecConfig {
    /// Load configuration from environment variables with fallback to defaults
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("LAYOUT_CODEC_CONSUME_ALL") {
            if let Ok(flag) = val.parse() {
                config.decode.consume_all = flag;
            }
        }

        if let Ok(val) = std::env::var("LAYOUT_CODEC_MAX_ARRAY_ELEMENTS") {
            if let Ok(limit) = val.parse() {
                config.decode.max_array_elements = limit;
            }
        }

        if let Ok(val) = std::env::var("LAYOUT_CODEC_ALLOW_AMBIGUOUS") {
            if let Ok(flag) = val.parse() {
                config.discriminator.allow_ambiguous = flag;
            }
        }

        config
    }

    /// Exact-size buffers and fully separable layouts only
    pub fn strict() -> Self {
        Self {
            decode: DecodeConfig {
                consume_all: true,
                max_array_elements: 1 << 16,
            },
            discriminator: DiscriminatorConfig {
                allow_ambiguous: false,
            },
        }
    }

    /// Trailing bytes and ambiguous layout sets tolerated
    pub fn lenient() -> Self {
        Self {
            decode: DecodeConfig {
                consume_all: false,
                max_array_elements: 1 << 24,
            },
            discriminator: DiscriminatorConfig {
                allow_ambiguous: true,
            },
        }
    }
}
