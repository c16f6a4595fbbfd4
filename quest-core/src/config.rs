//! Global configuration
//!
//! Provides a thread-safe global configuration singleton holding the runtime
//! limits, the validation level and the log levels.
//!
//! # Example
//! ```
//! use quest_core::config::{Config, init, config};
//! use quest_core::{RuntimeConfig, ValidationLevel};
//!
//! let cfg = Config {
//!     runtime: RuntimeConfig {
//!         validation: ValidationLevel::Warn,
//!         ..Default::default()
//!     },
//!     ..Default::default()
//! };
//!
//! init(cfg);
//! assert_eq!(config().runtime.validation, ValidationLevel::Warn);
//! ```

use std::sync::atomic::{AtomicU8, Ordering};

use once_cell::sync::{Lazy, OnceCell};
use quest_config::{Component, LimitConfig, RuntimeConfig, ValidationLevel};
use tracing::Level;

static GLOBAL_CONFIG: OnceCell<Config> = OnceCell::new();

/// Answered by [`config`] until [`init`] runs
static DEFAULT_CONFIG: Lazy<Config> = Lazy::new(Config::default);

/// The validation level is read by every dispatch operation and may be changed
/// at run time, so it lives outside the frozen config.
static VALIDATION_LEVEL: AtomicU8 = AtomicU8::new(0);

/// Initialize the global configuration (call once, before any operation)
///
/// # Panics
/// Panics if the configuration was already initialized
pub fn init(config: Config) {
    let level = config.runtime.validation;
    GLOBAL_CONFIG
        .set(config)
        .expect("Config already initialized");
    set_validation_level(level);
}

/// Get the global configuration
///
/// Falls back to the defaults when [`init`] was never called, without
/// claiming the global slot, so a later `init` still succeeds.
pub fn config() -> &'static Config {
    GLOBAL_CONFIG.get().unwrap_or_else(|| &*DEFAULT_CONFIG)
}

/// Check whether the configuration was initialized
pub fn is_initialized() -> bool {
    GLOBAL_CONFIG.get().is_some()
}

/// Shortcut for the execution limits
pub fn limits() -> &'static LimitConfig {
    &config().runtime.limits
}

/// Current validation level
pub fn validation_level() -> ValidationLevel {
    ValidationLevel::from_u8(VALIDATION_LEVEL.load(Ordering::Relaxed))
}

/// Change the validation level for the whole process
pub fn set_validation_level(level: ValidationLevel) {
    VALIDATION_LEVEL.store(level.as_u8(), Ordering::Relaxed);
}

/// Global configuration structure
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Runtime behaviour (validation, limits)
    pub runtime: RuntimeConfig,
    /// Log configuration
    pub log: LogConfig,
}

/// Log configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Global default log level
    pub global: Level,
    /// Attribute store level (None means use global)
    pub store: Option<Level>,
    /// Dispatch level
    pub dispatch: Option<Level>,
    /// Closure level
    pub closure: Option<Level>,
    /// Escape level
    pub escape: Option<Level>,
    /// Validation level; warnings raised in `warn` mode go here
    pub validation: Option<Level>,
}

impl LogConfig {
    /// Get the effective log level of a component
    ///
    /// Returns the component-specific level if set, otherwise the global one
    pub fn level_for(&self, component: Component) -> Level {
        let specific = match component {
            Component::Store => self.store,
            Component::Dispatch => self.dispatch,
            Component::Closure => self.closure,
            Component::Escape => self.escape,
            Component::Validation => self.validation,
        };
        specific.unwrap_or(self.global)
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            global: Level::INFO,
            store: None,
            dispatch: None,
            closure: None,
            escape: None,
            validation: Some(Level::WARN),
        }
    }
}
