//! Utilities for logging.

use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Installs a stderr subscriber. `RUST_LOG` takes precedence over
/// `default_level`. Calling this more than once is harmless.
pub fn init(default_level: &str) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}
