use std::io::Write;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use secretnotes_core::fs::write_atomic;
use secretnotes_core::NewFile;

use crate::app::AppContext;
use crate::cli::FileCommand;
use crate::errors::CliError;
use crate::helpers::guess_content_type;
use crate::ui::{print, receipt};

use super::{print_json, timestamp};

pub fn handle_file(ctx: &AppContext, cmd: &FileCommand) -> anyhow::Result<()> {
    match cmd {
        FileCommand::Put {
            path,
            content_type,
            name,
        } => handle_put(ctx, path, content_type.as_deref(), name.as_deref()),
        FileCommand::Get { output } => handle_get(ctx, output.as_ref()),
        FileCommand::Delete => handle_delete(ctx),
    }
}

fn handle_put(
    ctx: &AppContext,
    path: &Path,
    content_type: Option<&str>,
    name: Option<&str>,
) -> anyhow::Result<()> {
    let bytes = std::fs::read(path).map_err(|e| {
        CliError::not_found(
            format!("Cannot read {}: {}", path.display(), e),
            "Hint: Check the file path.",
        )
    })?;
    let file_name = match name {
        Some(name) => name.to_string(),
        None => path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| CliError::invalid_input("Cannot derive a file name; pass --name"))?,
    };
    let content_type = content_type.unwrap_or_else(|| guess_content_type(path));

    let passphrase = ctx.passphrase()?;
    let service = ctx.open_service()?;
    let attached = service.attach_file(&passphrase, NewFile::new(file_name, content_type, bytes))?;

    let ui = ctx.ui();
    if ui.mode.is_json() {
        return print_json(&serde_json::to_value(&attached)?);
    }
    if ctx.quiet() {
        return Ok(());
    }

    let size = attached.size.to_string();
    let created = timestamp(&attached.created_at);
    print(
        ui,
        &receipt(
            ui,
            "File attached",
            &[
                ("Name", attached.file_name.as_str()),
                ("Content type", attached.content_type.as_str()),
                ("Size", size.as_str()),
                ("Hash", attached.file_hash.as_str()),
                ("Created", created.as_str()),
            ],
        ),
    );
    Ok(())
}

fn handle_get(ctx: &AppContext, output: Option<&PathBuf>) -> anyhow::Result<()> {
    let passphrase = ctx.passphrase()?;
    let service = ctx.open_service()?;
    let file = service.fetch_file(&passphrase)?;
    let ui = ctx.ui();

    let Some(output) = output else {
        if ui.mode.is_json() {
            return print_json(&serde_json::json!({
                "file_name": file.file_name,
                "content_type": file.content_type,
                "size": file.bytes.len(),
                "content_base64": STANDARD.encode(&file.bytes),
            }));
        }
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(&file.bytes)?;
        stdout.flush()?;
        return Ok(());
    };

    write_atomic(output, &file.bytes)
        .map_err(|e| anyhow::anyhow!("Failed to write {}: {}", output.display(), e))?;

    if ui.mode.is_json() {
        return print_json(&serde_json::json!({
            "file_name": file.file_name,
            "content_type": file.content_type,
            "size": file.bytes.len(),
            "output": output.display().to_string(),
        }));
    }
    if ctx.quiet() {
        return Ok(());
    }

    let size = file.bytes.len().to_string();
    let written = output.display().to_string();
    print(
        ui,
        &receipt(
            ui,
            "File written",
            &[
                ("Name", file.file_name.as_str()),
                ("Content type", file.content_type.as_str()),
                ("Size", size.as_str()),
                ("Output", written.as_str()),
            ],
        ),
    );
    Ok(())
}

fn handle_delete(ctx: &AppContext) -> anyhow::Result<()> {
    let passphrase = ctx.passphrase()?;
    let service = ctx.open_service()?;
    service.delete_file(&passphrase)?;

    let ui = ctx.ui();
    if ui.mode.is_json() {
        return print_json(&serde_json::json!({ "deleted": true }));
    }
    if !ctx.quiet() {
        print(ui, &receipt(ui, "File deleted", &[]));
    }
    Ok(())
}
