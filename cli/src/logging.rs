//! Logging configuration with file-based output and size-based rotation.
//!
//! Writes logs to `~/.config/stormclock/stormclock.log` (or platform
//! equivalent) with 10 MB size-based rotation. The terminal belongs to the
//! REPL, so only warnings reach stderr. Set `DEBUG_LOGGING=1` to enable
//! debug output for stormclock crates.

use rolling_file::{BasicRollingFileAppender, RollingConditionBasic};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

const DEBUG_DIRECTIVE: &str = "info,stormclock_core=debug,stormclock_cli=debug";

fn filter_directive(debug_logging: bool) -> &'static str {
    if debug_logging { DEBUG_DIRECTIVE } else { "info" }
}

/// Initialize logging.
///
/// Returns a `WorkerGuard` that must be held for the application lifetime
/// so buffered lines are flushed on shutdown. Returns `None` when the log
/// file cannot be opened, in which case logging goes to stderr only.
pub fn init() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let debug_logging = std::env::var("DEBUG_LOGGING").is_ok();

    let log_dir = match dirs::config_dir() {
        Some(config) => config.join("stormclock"),
        None => {
            init_stderr_only(debug_logging);
            return None;
        }
    };

    if let Err(e) = std::fs::create_dir_all(&log_dir) {
        // Subscriber not installed yet
        eprintln!("Failed to create log directory {:?}: {}, using stderr only", log_dir, e);
        init_stderr_only(debug_logging);
        return None;
    }

    let log_path = log_dir.join("stormclock.log");
    let file_appender = match BasicRollingFileAppender::new(
        &log_path,
        RollingConditionBasic::new().max_size(10 * 1024 * 1024),
        1, // stormclock.log and stormclock.log.1
    ) {
        Ok(appender) => appender,
        Err(e) => {
            eprintln!("Failed to create log file at {:?}: {}", log_path, e);
            init_stderr_only(debug_logging);
            return None;
        }
    };

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_span_events(FmtSpan::NONE)
        .with_filter(EnvFilter::new(filter_directive(debug_logging)));

    tracing_subscriber::registry()
        .with(file_layer)
        .with(stderr_layer(debug_logging))
        .init();

    tracing::info!(log_file = ?log_path, debug_logging, "Stormclock logging initialized");

    Some(guard)
}

fn stderr_layer<S>(debug_logging: bool) -> impl Layer<S>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    let directive = if debug_logging { DEBUG_DIRECTIVE } else { "warn" };
    fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_span_events(FmtSpan::NONE)
        .with_filter(EnvFilter::new(directive))
}

/// Fallback when the log file cannot be opened
fn init_stderr_only(debug_logging: bool) {
    tracing_subscriber::registry()
        .with(stderr_layer(debug_logging))
        .init();
}
