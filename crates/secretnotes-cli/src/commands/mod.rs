//! Command handlers.

mod envelope;
mod files;
mod init;
mod maintenance;
mod misc;
mod notes;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::app::AppContext;
use crate::cli::{Cli, Commands};

pub fn run(cli: &Cli) -> anyhow::Result<()> {
    // Completions need neither config nor store.
    if let Commands::Completions(args) = &cli.command {
        return misc::handle_completions(args.shell);
    }

    let ctx = AppContext::load(cli)?;
    match &cli.command {
        Commands::Init(args) => init::handle_init(&ctx, args),
        Commands::Note(cmd) => notes::handle_note(&ctx, cmd),
        Commands::File(cmd) => files::handle_file(&ctx, cmd),
        Commands::Token => misc::handle_token(&ctx),
        Commands::Envelope(cmd) => envelope::handle_envelope(&ctx, cmd),
        Commands::Check => maintenance::handle_check(&ctx),
        Commands::Completions(_) => Ok(()),
    }
}

pub(crate) fn print_json(value: &serde_json::Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub(crate) fn timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Secs, true)
}
