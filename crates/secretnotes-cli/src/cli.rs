use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use clap_complete::Shell;

use secretnotes_core::VERSION;

use crate::config::EnvelopeChoice;
use crate::constants::env_vars;

/// SecretNotes - passphrase-gated encrypted notes and files
#[derive(Parser)]
#[command(name = "sn")]
#[command(author, version = VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the note store
    #[arg(long, global = true, env = env_vars::STORE, value_name = "PATH")]
    pub store: Option<PathBuf>,

    /// Path to the config file
    #[arg(long, global = true, env = env_vars::CONFIG, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Disable interactive prompts
    #[arg(long, global = true)]
    pub no_input: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Arguments for the `init` command
#[derive(Args)]
pub struct InitArgs {
    /// Require passphrases of at least 32 characters
    #[arg(long)]
    pub strict: bool,

    /// Envelope format for new writes
    #[arg(long, value_enum, default_value_t = EnvelopeChoice::Legacy)]
    pub format: EnvelopeChoice,

    /// Overwrite an existing config file
    #[arg(long)]
    pub force: bool,
}

#[derive(Subcommand)]
pub enum NoteCommand {
    /// Show the note, creating an empty one if none exists
    Show,

    /// Create or replace the note's message
    Set {
        /// Message text (reads stdin when omitted)
        #[arg(long, short)]
        message: Option<String>,
    },

    /// Delete the note and its attachment
    Delete {
        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum FileCommand {
    /// Encrypt and attach a file, replacing any previous one
    Put {
        /// File to attach
        #[arg(value_name = "PATH")]
        path: PathBuf,

        /// Content type to record (guessed from the extension by default)
        #[arg(long, value_name = "TYPE")]
        content_type: Option<String>,

        /// File name to record (defaults to the name of PATH)
        #[arg(long, value_name = "NAME")]
        name: Option<String>,
    },

    /// Decrypt the attached file
    Get {
        /// Write to this path instead of stdout
        #[arg(long, short, value_name = "PATH")]
        output: Option<PathBuf>,
    },

    /// Delete the attached file
    Delete,
}

#[derive(Subcommand)]
pub enum EnvelopeCommand {
    /// Encrypt stdin and print the envelope as base64
    Encrypt {
        /// Envelope format to produce
        #[arg(long, value_enum, default_value_t = EnvelopeChoice::Legacy)]
        format: EnvelopeChoice,
    },

    /// Decrypt a base64 envelope from stdin and write the plaintext to stdout
    Decrypt {
        /// Envelope format of the input
        #[arg(long, value_enum, default_value_t = EnvelopeChoice::Legacy)]
        format: EnvelopeChoice,
    },
}

/// Arguments for the `completions` command
#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_name = "SHELL")]
    pub shell: Shell,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a default config and create the store
    Init(InitArgs),

    /// Read, write or delete the note
    #[command(subcommand)]
    Note(NoteCommand),

    /// Attach, fetch or delete the note's file
    #[command(subcommand)]
    File(FileCommand),

    /// Print the lookup token for a passphrase
    Token,

    /// Encrypt or decrypt raw envelopes
    #[command(subcommand)]
    Envelope(EnvelopeCommand),

    /// Check store integrity
    Check,

    /// Generate shell completions
    Completions(CompletionsArgs),
}
