//! Quest - a prototype object runtime
//!
//! Objects carry an attribute table, a parent and an ordered list of
//! stepparents. Everything else is built from attribute operations:
//! lookup walks the ancestors, calls bind closures to their receiver, and
//! `try`/`return` unwind through nested frames without host exceptions.
//!
//! # Architecture
//!
//! ```text
//! quest-config/  - Pure configuration data (validation level, limits)
//! quest-core/    - Runtime (store, dispatch, closures, escapes, kernel)
//! src/           - Facade: initialization and logging
//! ```
//!
//! # Quick Start
//!
//! ```
//! use quest::{kernel, Closure, Flow, Object};
//!
//! let root = kernel::pristine().unwrap();
//! let greeter = root.call_attr("birth", &[]).unwrap().settle().unwrap();
//! greeter
//!     .set("greet", Object::closure(Closure::new(|_| Ok(Flow::Value(Object::text("hi"))))))
//!     .unwrap();
//!
//! let child = greeter.call_attr("birth", &[]).unwrap().settle().unwrap();
//! let said = child.call_attr("greet", &[]).unwrap().settle().unwrap();
//! assert_eq!(said.as_text(), Some("hi"));
//! ```

pub mod logger;

// Re-export the runtime
pub use quest_core::{
    kernel, return_levels, return_to, try_with, value, Attributes, Closure, Coerced, Coercion,
    Data, Escape, Flow, Id, Invocation, Key, Marker, Object, ObjectBuilder, Result,
    RuntimeError, Symbol, Target,
};
pub use quest_core::config::{self, config, Config, LogConfig};
pub use quest_config::{Component, ConfigError, LimitConfig, RuntimeConfig, ValidationLevel};
pub use logger::{init_logger, LogFormat};

/// Initialize the configuration (call before use)
///
/// Only sets up the configuration; logging is initialized separately.
///
/// # Example
/// ```
/// use quest::{init, Config};
///
/// init(Config::default());
/// ```
pub fn init(config: Config) {
    quest_core::config::init(config);
}

/// Initialize the configuration and the logging system
///
/// # Example
/// ```ignore
/// use quest::{init_with_logger, Config, LogFormat};
///
/// init_with_logger(Config::default(), LogFormat::Pretty);
/// ```
pub fn init_with_logger(config: Config, format: LogFormat) {
    quest_core::config::init(config);
    logger::init_with_format(format);
}

/// Build a configuration from a JSON runtime section, keeping default log levels
///
/// # Example
/// ```
/// use quest::{load_config, ValidationLevel};
///
/// let cfg = load_config(r#"{"validation": "strict", "limits": {"max_call_depth": 64}}"#).unwrap();
/// assert_eq!(cfg.runtime.validation, ValidationLevel::Strict);
/// assert_eq!(cfg.runtime.limits.max_call_depth, 64);
/// assert_eq!(cfg.runtime.limits.max_chain_depth, 256);
/// ```
pub fn load_config(json: &str) -> std::result::Result<Config, ConfigError> {
    Ok(Config {
        runtime: RuntimeConfig::from_json(json)?,
        ..Default::default()
    })
}
