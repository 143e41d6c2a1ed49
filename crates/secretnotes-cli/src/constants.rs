//! Constants used throughout the CLI.

/// Exit codes for the CLI.
///
/// These follow common Unix conventions:
/// - 0: Success
/// - 1: General error (used by anyhow for unhandled errors)
/// - 2: Misuse of shell command (reserved by shells)
/// - 3+: Application-specific errors
pub mod exit_codes {
    /// General failure.
    pub const GENERAL: i32 = 1;

    /// Resource not found (store, attachment).
    pub const NOT_FOUND: i32 = 3;

    /// Invalid user input or arguments.
    pub const INVALID_INPUT: i32 = 4;

    /// Wrong passphrase or no such note.
    pub const AUTH_FAILED: i32 = 5;

    /// Integrity check failed.
    pub const INTEGRITY_FAILED: i32 = 6;
}

/// Environment variables read by the CLI.
pub mod env_vars {
    pub const PASSPHRASE: &str = "SN_PASSPHRASE";
    pub const STORE: &str = "SN_STORE";
    pub const CONFIG: &str = "SN_CONFIG";
    pub const LOG: &str = "SN_LOG";
}

/// Message shown for both a wrong passphrase and a missing note.
pub const ACCESS_DENIED_MESSAGE: &str = "Wrong passphrase or no such note.";

/// Directory name under the XDG config and data homes.
pub const APP_DIR: &str = "secretnotes";
