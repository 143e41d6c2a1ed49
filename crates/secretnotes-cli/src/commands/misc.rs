use clap::CommandFactory;
use clap_complete::generate;

use secretnotes_core::derive_lookup_token;

use crate::app::AppContext;
use crate::cli::Cli;

use super::print_json;

pub fn handle_completions(shell: clap_complete::Shell) -> anyhow::Result<()> {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "sn", &mut std::io::stdout());
    Ok(())
}

/// Print the lookup token for the passphrase. Touches no store.
pub fn handle_token(ctx: &AppContext) -> anyhow::Result<()> {
    let passphrase = ctx.passphrase()?;
    let token = derive_lookup_token(passphrase.expose());

    if ctx.ui().mode.is_json() {
        return print_json(&serde_json::json!({ "lookup_token": token.to_hex() }));
    }
    println!("{}", token.to_hex());
    Ok(())
}
