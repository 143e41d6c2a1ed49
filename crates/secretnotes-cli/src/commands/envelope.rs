//! Raw envelope import and export.
//!
//! Envelopes travel as standard base64 so they can be compared against
//! other implementations of the same format.

use std::io::Write;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use secretnotes_core::crypto::{open, seal};

use crate::app::AppContext;
use crate::cli::EnvelopeCommand;
use crate::config::EnvelopeChoice;
use crate::errors::CliError;
use crate::helpers::read_stdin_bytes;

use super::print_json;

pub fn handle_envelope(ctx: &AppContext, cmd: &EnvelopeCommand) -> anyhow::Result<()> {
    match cmd {
        EnvelopeCommand::Encrypt { format } => handle_encrypt(ctx, *format),
        EnvelopeCommand::Decrypt { format } => handle_decrypt(ctx, *format),
    }
}

fn handle_encrypt(ctx: &AppContext, format: EnvelopeChoice) -> anyhow::Result<()> {
    let write = ctx.config().write_format_for(format)?;
    let passphrase = ctx.passphrase()?;
    let plaintext = read_stdin_bytes()?;

    let sealed = seal(&plaintext, passphrase.expose(), &write)?;
    let encoded = STANDARD.encode(&sealed.envelope);

    if ctx.ui().mode.is_json() {
        return print_json(&serde_json::json!({
            "format": format.as_str(),
            "envelope": encoded,
        }));
    }
    println!("{}", encoded);
    Ok(())
}

fn handle_decrypt(ctx: &AppContext, format: EnvelopeChoice) -> anyhow::Result<()> {
    let passphrase = ctx.passphrase()?;
    let input = read_stdin_bytes()?;
    let text = std::str::from_utf8(&input)
        .map_err(|_| CliError::invalid_input("Envelope on stdin is not base64 text"))?;
    let envelope = STANDARD
        .decode(text.trim())
        .map_err(|e| CliError::invalid_input(format!("Invalid base64 envelope: {}", e)))?;

    let plaintext = open(&envelope, passphrase.expose(), format.envelope_format())?;

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(&plaintext)?;
    stdout.flush()?;
    Ok(())
}
