//! Tracing subscriber initialisation.
//!
//! The library crates only *emit* events; installing a subscriber is left to
//! the embedding application through [`init_logging`].
//!
//! `RUST_LOG` overrides the level passed in if it is set.

use std::io::IsTerminal as _;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Verbosity for the default filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    /// Errors only
    Error,
    /// Rejections and panics
    #[default]
    Warn,
    /// Pool lifecycle
    Info,
    /// Every job and counter call
    Debug,
    /// Everything
    Trace,
}

impl LogLevel {
    fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

/// Install a stderr fmt subscriber filtered to the Clotho crates.
///
/// Returns `false` if a global subscriber was already set, which is harmless
/// when several tests initialise logging in one process.
pub fn init_logging(level: LogLevel) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(level)));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_thread_names(true)
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .is_ok()
}

fn default_directives(level: LogLevel) -> String {
    let level = level.as_str();
    format!("clotho={level},clotho_core={level},clotho_executor={level}")
}
