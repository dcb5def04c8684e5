use clap::ValueEnum;
use tracing_subscriber::EnvFilter;

/// Target prefix shared by every doorhub crate (`doorhub`, `doorhub_radio`,
/// `doorhub_uplink`, ...).
const HUB_TARGET: &str = "doorhub";

/// Floor for everything else, such as the MQTT client's own events.
const DEPENDENCY_LEVEL: &str = "warn";

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

fn hub_directives(level: LogLevel) -> String {
    format!("{DEPENDENCY_LEVEL},{HUB_TARGET}={}", level.as_str())
}

/// An explicit level applies to the hub's own targets only. Without one,
/// `RUST_LOG` is honoured, falling back to `info` for the hub.
pub fn build_filter(level: Option<LogLevel>) -> EnvFilter {
    match level {
        Some(level) => EnvFilter::new(hub_directives(level)),
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(hub_directives(LogLevel::Info))),
    }
}

/// Diagnostics go to stderr; stdout carries the display and command output.
pub fn init_logging(format: LogFormat, level: Option<LogLevel>) {
    let builder = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(build_filter(level))
        .with_ansi(false)
        .with_target(true);

    match format {
        LogFormat::Text => {
            let _ = builder.try_init();
        }
        LogFormat::Json => {
            let _ = builder.json().try_init();
        }
    }
}
