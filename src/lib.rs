pub mod commands;
pub mod error;
pub mod models;
pub mod services;
pub mod settings;
pub mod store;
pub mod utils;

use std::sync::Once;

use tracing_subscriber::EnvFilter;

static TRACING_INIT: Once = Once::new();

/// `RUST_LOG` wins over `level` when set. Logs go to stderr.
pub fn init_tracing(level: &str) {
    TRACING_INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("pocketpal={level}")));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    });
}
