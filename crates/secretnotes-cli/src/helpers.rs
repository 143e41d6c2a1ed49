//! Input helpers for the CLI.

use std::io::{self, IsTerminal, Read};
use std::path::Path;

use dialoguer::Password;
use zeroize::Zeroizing;

use secretnotes_core::service::DEFAULT_CONTENT_TYPE;

use crate::constants::env_vars;
use crate::errors::CliError;

/// Read the passphrase from `SN_PASSPHRASE`, or prompt for it.
///
/// The environment value is used verbatim; surrounding whitespace is part of
/// the passphrase.
pub fn prompt_passphrase(interactive: bool) -> anyhow::Result<Zeroizing<String>> {
    if let Ok(value) = std::env::var(env_vars::PASSPHRASE) {
        if !value.is_empty() {
            return Ok(Zeroizing::new(value));
        }
    }
    if !interactive {
        return Err(CliError::invalid_input(format!(
            "No passphrase provided and no TTY available. Set {}.",
            env_vars::PASSPHRASE
        ))
        .into());
    }
    Password::new()
        .with_prompt("Passphrase")
        .interact()
        .map(Zeroizing::new)
        .map_err(|e| anyhow::anyhow!("Failed to read passphrase: {}", e))
}

/// Whether prompts can be shown.
pub fn stdin_is_interactive(no_input: bool) -> bool {
    !no_input && io::stdin().is_terminal() && io::stderr().is_terminal()
}

/// Read all of stdin as bytes.
pub fn read_stdin_bytes() -> anyhow::Result<Vec<u8>> {
    let mut buffer = Vec::new();
    io::stdin()
        .read_to_end(&mut buffer)
        .map_err(|e| anyhow::anyhow!("Failed to read stdin: {}", e))?;
    Ok(buffer)
}

/// Read a note message from stdin, dropping one trailing newline.
pub fn read_stdin_message() -> anyhow::Result<String> {
    let bytes = read_stdin_bytes()?;
    let mut text = String::from_utf8(bytes)
        .map_err(|_| CliError::invalid_input("Message on stdin is not valid UTF-8"))?;
    trim_one_newline(&mut text);
    Ok(text)
}

fn trim_one_newline(text: &mut String) {
    if text.ends_with('\n') {
        text.pop();
        if text.ends_with('\r') {
            text.pop();
        }
    }
}

/// Guess a content type from a file extension.
pub fn guess_content_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("txt") | Some("md") => "text/plain",
        Some("json") => "application/json",
        Some("pdf") => "application/pdf",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("zip") => "application/zip",
        Some("csv") => "text/csv",
        Some("html") | Some("htm") => "text/html",
        _ => DEFAULT_CONTENT_TYPE,
    }
}
