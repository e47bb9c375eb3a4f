//! Codec configuration types
//!
//! This module defines the few knobs the codec exposes: what to do with
//! multiplexed signals, which bytes terminate a string field, and which unit
//! keywords select a signal's type class.

use crate::types::{CodecError, Result};
use serde::{Deserialize, Serialize};

/// Configuration for building signal and message codecs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodecConfig {
    /// Handling of multiplexed signals (default: reject)
    #[serde(default)]
    pub multiplex_policy: MultiplexPolicy,

    /// Bytes that end a string field on unpack (default: 0x00 and 0xFF)
    #[serde(default = "default_string_terminators")]
    pub string_terminators: Vec<u8>,

    /// Unit keywords used for type classification
    #[serde(default)]
    pub units: UnitKeywords,
}

fn default_string_terminators() -> Vec<u8> {
    vec![0x00, 0xFF]
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            multiplex_policy: MultiplexPolicy::default(),
            string_terminators: default_string_terminators(),
            units: UnitKeywords::default(),
        }
    }
}

/// What a message codec does when it meets a multiplexed signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MultiplexPolicy {
    /// Fail with `CodecError::MultiplexedSignal`
    #[default]
    Reject,
    /// Leave the signal out and record a warning
    Skip,
}

/// Unit text that marks a signal as string, enum or boolean
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitKeywords {
    #[serde(default = "default_string_units")]
    pub string_units: Vec<String>,
    #[serde(default = "default_enum_units")]
    pub enum_units: Vec<String>,
    #[serde(default = "default_bool_units")]
    pub bool_units: Vec<String>,
}

fn default_string_units() -> Vec<String> {
    vec!["string".to_string(), "str".to_string()]
}

fn default_enum_units() -> Vec<String> {
    vec!["enum".to_string()]
}

fn default_bool_units() -> Vec<String> {
    vec!["bool".to_string()]
}

impl Default for UnitKeywords {
    fn default() -> Self {
        Self {
            string_units: default_string_units(),
            enum_units: default_enum_units(),
            bool_units: default_bool_units(),
        }
    }
}

impl CodecConfig {
    /// Create a configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from TOML text; missing keys take their defaults
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| CodecError::Config(e.to_string()))
    }

    /// Builder method: set the multiplex policy
    pub fn with_multiplex_policy(mut self, policy: MultiplexPolicy) -> Self {
        self.multiplex_policy = policy;
        self
    }

    /// Builder method: replace the string terminator bytes
    pub fn with_string_terminators(mut self, terminators: Vec<u8>) -> Self {
        self.string_terminators = terminators;
        self
    }

    /// Builder method: replace the unit keywords
    pub fn with_units(mut self, units: UnitKeywords) -> Self {
        self.units = units;
        self
    }

    /// Check if a byte ends a string field
    pub fn is_string_terminator(&self, byte: u8) -> bool {
        self.string_terminators.contains(&byte)
    }
}
