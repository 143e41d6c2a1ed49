//! CLI error types for structured error handling.
//!
//! This module provides typed errors that map to specific exit codes,
//! enabling consistent error handling across the CLI.

use std::fmt;

use secretnotes_core::NotesError;

use crate::constants::{exit_codes, ACCESS_DENIED_MESSAGE};

/// CLI-specific errors with associated exit codes.
#[derive(Debug)]
pub enum CliError {
    /// Resource not found (store, attachment)
    NotFound { message: String, hint: String },

    /// Wrong passphrase or no such note
    AuthFailed {
        message: String,
        hint: Option<String>,
    },

    /// Invalid user input
    InvalidInput(String),

    /// Store integrity check failed
    IntegrityFailed(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::NotFound { message, hint } => {
                write!(f, "{}\n{}", message, hint)
            }
            CliError::AuthFailed { message, hint } => {
                if let Some(h) = hint {
                    write!(f, "{}\n{}", message, h)
                } else {
                    write!(f, "{}", message)
                }
            }
            CliError::InvalidInput(message) => write!(f, "{}", message),
            CliError::IntegrityFailed(message) => write!(f, "Integrity check failed: {}", message),
        }
    }
}

impl std::error::Error for CliError {}

impl CliError {
    /// Create a NotFound error with message and hint.
    pub fn not_found(message: impl Into<String>, hint: impl Into<String>) -> Self {
        CliError::NotFound {
            message: message.into(),
            hint: hint.into(),
        }
    }

    /// The uniform wrong-passphrase-or-missing error.
    pub fn access_denied() -> Self {
        CliError::AuthFailed {
            message: ACCESS_DENIED_MESSAGE.to_string(),
            hint: None,
        }
    }

    /// Create an InvalidInput error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        CliError::InvalidInput(message.into())
    }

    /// Get the exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::NotFound { .. } => exit_codes::NOT_FOUND,
            CliError::AuthFailed { .. } => exit_codes::AUTH_FAILED,
            CliError::InvalidInput(_) => exit_codes::INVALID_INPUT,
            CliError::IntegrityFailed(_) => exit_codes::INTEGRITY_FAILED,
        }
    }
}

/// Map a core error to its user-facing form.
///
/// Returns `None` for errors that keep their own message and exit with the
/// general failure code.
pub fn from_core(err: &NotesError) -> Option<CliError> {
    if err.is_access_denied() {
        return Some(CliError::access_denied());
    }
    match err {
        NotesError::AttachmentNotFound => Some(CliError::not_found(
            "No file is attached to this note.",
            "Hint: Attach one with `sn file put <PATH>`.",
        )),
        NotesError::PassphraseTooShort { .. }
        | NotesError::InvalidInput(_)
        | NotesError::Validation(_)
        | NotesError::MalformedEnvelope(_) => Some(CliError::invalid_input(err.to_string())),
        _ => None,
    }
}

/// Resolve the exit code and display message for any error a command returned.
pub fn classify(err: &anyhow::Error) -> (i32, String) {
    if let Some(cli_err) = err.downcast_ref::<CliError>() {
        return (cli_err.exit_code(), cli_err.to_string());
    }
    if let Some(core_err) = err.downcast_ref::<NotesError>() {
        if let Some(cli_err) = from_core(core_err) {
            return (cli_err.exit_code(), cli_err.to_string());
        }
    }
    (exit_codes::GENERAL, format!("{:#}", err))
}
