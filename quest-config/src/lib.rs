//! Quest Config - Pure configuration data structures
//!
//! This crate contains only data structures, no logic or global state.
//! It serves as the shared configuration vocabulary across all Quest crates.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while reading a configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The JSON document could not be decoded
    #[error("invalid config: {0}")]
    Json(#[from] serde_json::Error),

    /// An unknown validation level name
    #[error("unknown validation level `{0}` (expected off, warn or strict)")]
    UnknownLevel(String),
}

/// How strictly dispatch operations are checked at run time
///
/// - `Off`: no checks are performed
/// - `Warn`: violations are logged and execution continues
/// - `Strict`: violations abort the current operation
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationLevel {
    #[default]
    Off,
    Warn,
    Strict,
}

impl ValidationLevel {
    /// Get the string name of the level
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationLevel::Off => "off",
            ValidationLevel::Warn => "warn",
            ValidationLevel::Strict => "strict",
        }
    }

    /// Encode for atomic storage
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Decode from atomic storage, unknown values map to `Off`
    pub fn from_u8(raw: u8) -> Self {
        match raw {
            1 => ValidationLevel::Warn,
            2 => ValidationLevel::Strict,
            _ => ValidationLevel::Off,
        }
    }

    /// Whether any checks run at this level
    pub fn is_enabled(&self) -> bool {
        *self != ValidationLevel::Off
    }
}

impl fmt::Display for ValidationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValidationLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "off" | "0" => Ok(ValidationLevel::Off),
            "warn" | "1" => Ok(ValidationLevel::Warn),
            "strict" | "2" => Ok(ValidationLevel::Strict),
            other => Err(ConfigError::UnknownLevel(other.to_string())),
        }
    }
}

/// Configuration for execution limits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitConfig {
    /// Maximum number of nested closure invocations
    pub max_call_depth: usize,
    /// Maximum depth of an ancestor walk (parent and stepparent hops)
    pub max_chain_depth: usize,
}

impl Default for LimitConfig {
    fn default() -> Self {
        Self {
            max_call_depth: 256,
            max_chain_depth: 256,
        }
    }
}

/// Runtime configuration shared by every dispatch operation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Validation interceptor strictness
    pub validation: ValidationLevel,
    /// Execution limits
    pub limits: LimitConfig,
}

impl RuntimeConfig {
    /// Read a configuration from a JSON document
    ///
    /// Missing fields fall back to their defaults.
    pub fn from_json(source: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(source)?)
    }
}

/// Runtime component enum for component-specific log targets
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Component {
    Store,
    Dispatch,
    Closure,
    Escape,
    Validation,
}

impl Component {
    /// All components, in declaration order
    pub const ALL: [Component; 5] = [
        Component::Store,
        Component::Dispatch,
        Component::Closure,
        Component::Escape,
        Component::Validation,
    ];

    /// Get the string name of the component
    pub fn as_str(&self) -> &'static str {
        match self {
            Component::Store => "store",
            Component::Dispatch => "dispatch",
            Component::Closure => "closure",
            Component::Escape => "escape",
            Component::Validation => "validation",
        }
    }

    /// Get the log target name for this component
    pub fn target(&self) -> String {
        format!("quest::{}", self.as_str())
    }
}
