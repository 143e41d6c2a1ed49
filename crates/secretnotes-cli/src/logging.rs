//! Diagnostic logging setup.
//!
//! Logs go to stderr so stdout stays clean for note text, file bytes and
//! JSON. `-v` flags take precedence over `SN_LOG`; without either only
//! warnings are shown.

use tracing_subscriber::EnvFilter;

use crate::constants::env_vars;

/// Filter directive for the given verbosity flags.
fn level_for(verbose: u8, quiet: bool) -> Option<&'static str> {
    if quiet {
        return Some("error");
    }
    match verbose {
        0 => None,
        1 => Some("info"),
        2 => Some("debug"),
        _ => Some("trace"),
    }
}

pub fn init(verbose: u8, quiet: bool) {
    let filter = match level_for(verbose, quiet) {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_env(env_vars::LOG).unwrap_or_else(|_| EnvFilter::new("warn")),
    };

    // A subscriber may already be installed when running under a test harness.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
