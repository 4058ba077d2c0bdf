//! Logging setup.
//!
//! `RUST_LOG` wins when set. Otherwise the level is `info`, raised to `debug`
//! for the kubernoisy crates with `--verbose` so failed API calls and cycle
//! summaries become visible.

use tracing_subscriber::{fmt, EnvFilter};

const VERBOSE_FILTER: &str = "info,kubernoisy=debug,kubernoisy_core=debug";
const DEFAULT_FILTER: &str = "info";

/// Installs the global fmt subscriber.
pub fn init_logging(verbose: bool) {
    fmt()
        .with_env_filter(env_filter(verbose))
        .with_target(false)
        .init();
}

fn env_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(verbose)))
}

fn default_directives(verbose: bool) -> &'static str {
    if verbose {
        VERBOSE_FILTER
    } else {
        DEFAULT_FILTER
    }
}
