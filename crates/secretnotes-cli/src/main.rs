//! SecretNotes CLI - passphrase-gated encrypted notes and files
//!
//! This is the command-line interface for SecretNotes. It maps the core
//! library's note service onto subcommands and turns errors into exit codes.

use clap::Parser;

mod app;
mod cli;
mod commands;
mod config;
mod constants;
mod errors;
mod helpers;
mod logging;
mod ui;

use cli::Cli;

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.quiet);

    if let Err(err) = commands::run(&cli) {
        tracing::debug!(error = ?err, "command failed");
        let (code, message) = errors::classify(&err);
        ui::print_error(&ui::UiContext::for_stderr(), &message);
        std::process::exit(code);
    }
}
