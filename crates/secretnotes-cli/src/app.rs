//! Application context for the `sn` CLI.
//!
//! Bundles the parsed arguments with the loaded configuration and resolves
//! the store path, passphrase and service from them.

use std::path::{Path, PathBuf};

use tracing::debug;

use secretnotes_core::{NoteService, Passphrase, SqliteStore};

use crate::cli::Cli;
use crate::config::{default_config_path, default_store_path, read_config, SnConfig};
use crate::errors::CliError;
use crate::helpers::{prompt_passphrase, stdin_is_interactive};
use crate::ui::UiContext;

pub struct AppContext<'a> {
    cli: &'a Cli,
    config_path: PathBuf,
    config: SnConfig,
    ui: UiContext,
}

impl<'a> AppContext<'a> {
    /// Load the config file if present, defaults otherwise.
    pub fn load(cli: &'a Cli) -> anyhow::Result<Self> {
        let config_path = match &cli.config {
            Some(path) => path.clone(),
            None => default_config_path()?,
        };
        let config = if config_path.exists() {
            debug!(path = %config_path.display(), "loading config");
            read_config(&config_path)?
        } else {
            SnConfig::default()
        };
        Ok(Self {
            cli,
            config_path,
            config,
            ui: UiContext::from_env(cli.json),
        })
    }

    pub fn cli(&self) -> &Cli {
        self.cli
    }

    pub fn config(&self) -> &SnConfig {
        &self.config
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn ui(&self) -> &UiContext {
        &self.ui
    }

    pub fn quiet(&self) -> bool {
        self.cli.quiet
    }

    /// Store path: `--store`/`SN_STORE`, then the config file, then the XDG default.
    pub fn store_path(&self) -> anyhow::Result<PathBuf> {
        if let Some(path) = &self.cli.store {
            return Ok(path.clone());
        }
        if let Some(path) = &self.config.store.path {
            return Ok(PathBuf::from(path));
        }
        default_store_path()
    }

    /// Obtain the passphrase and check it against the configured policy.
    pub fn passphrase(&self) -> anyhow::Result<Passphrase> {
        let raw = prompt_passphrase(stdin_is_interactive(self.cli.no_input))?;
        let passphrase = Passphrase::new(raw.as_bytes().to_vec());
        self.config.policy().validate(&passphrase)?;
        Ok(passphrase)
    }

    /// Open the existing store and wrap it in a service.
    pub fn open_service(&self) -> anyhow::Result<NoteService<SqliteStore>> {
        let store = self.open_store()?;
        Ok(NoteService::new(store, self.config.service_options()?))
    }

    pub fn open_store(&self) -> anyhow::Result<SqliteStore> {
        let path = self.store_path()?;
        if !path.exists() {
            return Err(CliError::not_found(
                format!("No note store at {}", path.display()),
                "Hint: Run `sn init` to create one.",
            )
            .into());
        }
        Ok(SqliteStore::open(&path)?)
    }
}
