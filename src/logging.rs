//! Logging setup
//!
//! Diagnostics go through `tracing`. The binary installs a stderr subscriber
//! so warnings never mix with the report printed on stdout.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

use crate::error::Result;

/// Environment variable overriding the log filter (`ELIXIR_LOG=debug`)
pub const LOG_ENV: &str = "ELIXIR_LOG";

/// Level implied by the `-q` and `-v` flags
pub fn level_for(quiet: bool, verbose: u8) -> &'static str {
    if quiet {
        return "error";
    }
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Build the filter, `ELIXIR_LOG` taking priority over the flags
fn build_env_filter(quiet: bool, verbose: u8) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(level_for(quiet, verbose)))
}

/// Initialize the logging system
pub fn init_logging(quiet: bool, verbose: u8) -> Result<()> {
    Registry::default()
        .with(build_env_filter(quiet, verbose))
        .with(
            fmt::layer()
                .with_target(verbose > 1)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .try_init()
        .map_err(|e| crate::error!(Config, "failed to initialize logging: {}", e))
}
