use tracing::info;

use secretnotes_core::SqliteStore;

use crate::app::AppContext;
use crate::cli::InitArgs;
use crate::config::{write_config, SnConfig};
use crate::errors::CliError;
use crate::ui::{hint, print, receipt};

use super::print_json;

pub fn handle_init(ctx: &AppContext, args: &InitArgs) -> anyhow::Result<()> {
    let config_path = ctx.config_path();
    if config_path.exists() && !args.force {
        return Err(CliError::invalid_input(format!(
            "Config already exists at {}. Pass --force to overwrite it.",
            config_path.display()
        ))
        .into());
    }

    let store_path = ctx.store_path()?;
    let config = SnConfig::new(&store_path, args.strict, args.format);
    // Fail on bad KDF settings before anything is written.
    config.service_options()?;
    write_config(config_path, &config)?;

    let store = SqliteStore::open(&store_path)?;
    let schema_version = store.schema_version()?;
    info!(
        config = %config_path.display(),
        store = %store_path.display(),
        "Initialized"
    );

    let min_length = config.security.min_passphrase_length;
    let format = args.format.as_str();

    if ctx.ui().mode.is_json() {
        return print_json(&serde_json::json!({
            "config": config_path.display().to_string(),
            "store": store_path.display().to_string(),
            "schema_version": schema_version,
            "min_passphrase_length": min_length,
            "envelope_format": format,
        }));
    }
    if ctx.quiet() {
        return Ok(());
    }

    let config_display = config_path.display().to_string();
    let store_display = store_path.display().to_string();
    let min_display = min_length.to_string();
    print(
        ctx.ui(),
        &receipt(
            ctx.ui(),
            "Initialized",
            &[
                ("Config", config_display.as_str()),
                ("Store", store_display.as_str()),
                ("Min passphrase length", min_display.as_str()),
                ("Envelope format", format),
            ],
        ),
    );
    print(ctx.ui(), &hint(ctx.ui(), "sn note set --message \"...\""));
    Ok(())
}
