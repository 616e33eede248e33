//! Log setup for the binary
//!
//! Events go to stderr so stdout carries nothing but command output. The level comes from
//! the verbosity (`-v` count or `logging.verbosity`) unless `SYNOPTIC_LOG` holds a filter.

use tracing::metadata::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Registry};

/// Environment variable holding an `EnvFilter` directive.
pub const LOG_ENV_VAR: &str = "SYNOPTIC_LOG";

pub fn init(verbosity: u8) {
    let filter = EnvFilter::builder()
        .with_default_directive(level_from_verbosity(verbosity).into())
        .with_env_var(LOG_ENV_VAR)
        .from_env_lossy();

    let layer = fmt::layer().with_writer(std::io::stderr).with_target(false);

    // Keep an already installed subscriber.
    let _ = Registry::default().with(filter).with(layer).try_init();
}

fn level_from_verbosity(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        _ => LevelFilter::DEBUG,
    }
}
