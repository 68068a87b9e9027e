use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Success,
    Warn,
    Error,
}

/// Install the global subscriber. `RUST_LOG` wins over `verbose`.
pub fn init(verbose: bool) {
    let fallback = if verbose { "jtester=debug,info" } else { "info" };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)),
        )
        .with_target(false)
        .try_init();
}

pub fn log(level: LogLevel, msg: impl Into<String>) {
    let text = msg.into();
    match level {
        LogLevel::Info => tracing::info!("{}", text),
        LogLevel::Success => tracing::info!(outcome = "success", "{}", text),
        LogLevel::Warn => tracing::warn!("{}", text),
        LogLevel::Error => tracing::error!("{}", text),
    }
}
