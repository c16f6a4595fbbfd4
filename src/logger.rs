//! Logging initialization
//!
//! Per-component log control built on `tracing` and `tracing-subscriber`.
//!
//! # Example
//! ```ignore
//! use quest::{init, init_logger, Config};
//!
//! init(Config::default());
//! init_logger();
//! ```

use std::io;
use std::path::Path;
use std::sync::Arc;

use tracing::Subscriber;
use tracing_subscriber::{
    filter::Targets, fmt, fmt::writer::BoxMakeWriter, layer::SubscriberExt,
    registry::LookupSpan, util::SubscriberInitExt, Layer,
};

use quest_core::config::{self, LogConfig};
use quest_core::Component;

/// Log output format
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Colored multi-line output (development)
    #[default]
    Pretty,
    /// Single-line output
    Compact,
    /// JSON lines (tool integration)
    Json,
}

impl LogFormat {
    /// Whether events show their `quest::<component>` target
    pub fn shows_target(self) -> bool {
        !matches!(self, LogFormat::Compact)
    }

    /// Formatting layer writing to `writer`; `ansi` enables colors
    pub fn layer<S>(self, writer: BoxMakeWriter, ansi: bool) -> Box<dyn Layer<S> + Send + Sync>
    where
        S: Subscriber + for<'a> LookupSpan<'a>,
    {
        let base = fmt::layer()
            .with_writer(writer)
            .with_ansi(ansi)
            .with_target(self.shows_target());
        match self {
            LogFormat::Pretty => base.pretty().boxed(),
            LogFormat::Compact => base.compact().without_time().boxed(),
            LogFormat::Json => base.json().boxed(),
        }
    }
}

/// Initialize logging with the default format
///
/// Reads the log levels from the global configuration, so call it after
/// `config::init()` when custom levels are wanted.
pub fn init_logger() {
    init_with_format(LogFormat::default());
}

/// Initialize logging with the given format, console only
pub fn init_with_format(format: LogFormat) {
    let targets = targets(&config::config().log);
    let stdout_layer = format
        .layer(BoxMakeWriter::new(io::stdout), true)
        .with_filter(targets);
    tracing_subscriber::registry().with(stdout_layer).init();
}

/// Initialize logging to the console and to `file`, both in `format`
///
/// # Errors
/// Fails when the log file can't be opened
pub fn init_with_file<P: AsRef<Path>>(format: LogFormat, file: P) -> io::Result<()> {
    let targets = targets(&config::config().log);
    let file_handle = Arc::new(
        std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(file)?,
    );

    let stdout_layer = format
        .layer(BoxMakeWriter::new(io::stdout), true)
        .with_filter(targets.clone());
    let file_layer = format
        .layer(BoxMakeWriter::new(file_handle), false)
        .with_filter(targets);

    tracing_subscriber::registry()
        .with(stdout_layer)
        .with(file_layer)
        .init();
    Ok(())
}

/// Target filter with one entry per runtime component
pub fn targets(cfg: &LogConfig) -> Targets {
    Component::ALL
        .iter()
        .fold(Targets::new().with_default(cfg.global), |targets, component| {
            targets.with_target(component.target(), cfg.level_for(*component))
        })
}

/// Simple console logging for tests
pub fn init_test_logger() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// Whether DEBUG events of `component` pass the installed subscriber
#[inline]
pub fn is_enabled(component: Component) -> bool {
    match component {
        Component::Store => tracing::enabled!(target: "quest::store", tracing::Level::DEBUG),
        Component::Dispatch => tracing::enabled!(target: "quest::dispatch", tracing::Level::DEBUG),
        Component::Closure => tracing::enabled!(target: "quest::closure", tracing::Level::DEBUG),
        Component::Escape => tracing::enabled!(target: "quest::escape", tracing::Level::DEBUG),
        Component::Validation => tracing::enabled!(target: "quest::validation", tracing::Level::DEBUG),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tracing::level_filters::LevelFilter;
    use tracing::Level;

    /// In-memory log sink
    #[derive(Clone, Default)]
    struct Buffer(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Buffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn render(format: LogFormat) -> String {
        let buffer = Buffer::default();
        let sink = buffer.clone();
        let subscriber = tracing_subscriber::registry()
            .with(format.layer(BoxMakeWriter::new(move || sink.clone()), false));
        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!(target: "quest::dispatch", key = "greet", "slow call");
        });
        let bytes = buffer.0.lock().unwrap().clone();
        String::from_utf8_lossy(&bytes).into_owned()
    }

    #[test]
    fn test_log_format_default() {
        assert_eq!(LogFormat::default(), LogFormat::Pretty);
    }

    #[test]
    fn test_format_settings() {
        assert!(LogFormat::Pretty.shows_target());
        assert!(LogFormat::Json.shows_target());
        assert!(!LogFormat::Compact.shows_target());
    }

    #[test]
    fn test_json_layer_writes_target() {
        let out = render(LogFormat::Json);
        assert!(out.contains("\"target\":\"quest::dispatch\""), "out: {out}");
        assert!(out.contains("slow call"));
    }

    #[test]
    fn test_compact_layer_omits_target() {
        let out = render(LogFormat::Compact);
        assert!(out.contains("slow call"), "out: {out}");
        assert!(!out.contains("quest::dispatch"));
    }

    #[test]
    fn test_targets_follow_component_levels() {
        let cfg = LogConfig {
            global: Level::WARN,
            store: Some(Level::TRACE),
            ..Default::default()
        };
        let targets = targets(&cfg);

        assert!(targets.would_enable("quest::store", &Level::TRACE));
        assert!(!targets.would_enable("quest::dispatch", &Level::DEBUG));
        assert!(targets.would_enable("quest::validation", &Level::WARN));
        assert_eq!(targets.default_level(), Some(LevelFilter::WARN));
    }

    #[test]
    fn test_is_enabled_under_scoped_subscriber() {
        let cfg = LogConfig {
            global: Level::WARN,
            store: Some(Level::DEBUG),
            ..Default::default()
        };
        let subscriber = tracing_subscriber::registry()
            .with(targets(&cfg))
            .with(fmt::layer().with_writer(io::sink));

        tracing::subscriber::with_default(subscriber, || {
            assert!(is_enabled(Component::Store));
            assert!(!is_enabled(Component::Dispatch));
        });
    }
}
