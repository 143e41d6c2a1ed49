use dialoguer::{Confirm, Input};

use secretnotes_core::Note;

use crate::app::AppContext;
use crate::cli::NoteCommand;
use crate::errors::CliError;
use crate::helpers::{read_stdin_message, stdin_is_interactive};
use crate::ui::{header, kv, print, receipt};

use super::{print_json, timestamp};

pub fn handle_note(ctx: &AppContext, cmd: &NoteCommand) -> anyhow::Result<()> {
    match cmd {
        NoteCommand::Show => handle_show(ctx),
        NoteCommand::Set { message } => handle_set(ctx, message.as_deref()),
        NoteCommand::Delete { yes } => handle_delete(ctx, *yes),
    }
}

fn handle_show(ctx: &AppContext) -> anyhow::Result<()> {
    let passphrase = ctx.passphrase()?;
    let service = ctx.open_service()?;
    let (note, created) = service.get_or_create_note(&passphrase)?;

    let ui = ctx.ui();
    if ui.mode.is_json() {
        return print_json(&serde_json::json!({ "note": note, "created": created }));
    }

    // Plain and quiet output is the bare message, for piping.
    if ctx.quiet() || !ui.mode.is_pretty() {
        println!("{}", note.message);
        return Ok(());
    }

    print(ui, &header(ui, "note", created.then_some("new")));
    print_metadata(ctx, &note);
    println!();
    println!("{}", note.message);
    Ok(())
}

fn print_metadata(ctx: &AppContext, note: &Note) {
    let ui = ctx.ui();
    print(ui, &kv(ui, "Created", &timestamp(&note.created_at)));
    print(ui, &kv(ui, "Updated", &timestamp(&note.updated_at)));
    print(
        ui,
        &kv(ui, "Attachment", if note.has_attachment { "yes" } else { "no" }),
    );
}

fn handle_set(ctx: &AppContext, message: Option<&str>) -> anyhow::Result<()> {
    let passphrase = ctx.passphrase()?;
    let service = ctx.open_service()?;

    let message = match message {
        Some(text) => text.to_string(),
        None if stdin_is_interactive(ctx.cli().no_input) => Input::<String>::new()
            .with_prompt("Message")
            .allow_empty(true)
            .interact_text()
            .map_err(|e| anyhow::anyhow!("Failed to read message: {}", e))?,
        None => read_stdin_message()?,
    };

    let (note, created) = service.upsert_note(&passphrase, &message)?;

    let ui = ctx.ui();
    if ui.mode.is_json() {
        return print_json(&serde_json::json!({
            "id": note.id,
            "created": created,
            "has_attachment": note.has_attachment,
            "updated_at": timestamp(&note.updated_at),
        }));
    }
    if ctx.quiet() {
        return Ok(());
    }

    let title = if created { "Note created" } else { "Note updated" };
    let updated = timestamp(&note.updated_at);
    print(ui, &receipt(ui, title, &[("Updated", updated.as_str())]));
    Ok(())
}

fn handle_delete(ctx: &AppContext, yes: bool) -> anyhow::Result<()> {
    let passphrase = ctx.passphrase()?;
    let service = ctx.open_service()?;

    if !yes {
        if !stdin_is_interactive(ctx.cli().no_input) {
            return Err(CliError::invalid_input(
                "Refusing to delete without confirmation. Pass --yes.",
            )
            .into());
        }
        let confirmed = Confirm::new()
            .with_prompt("Delete this note and its attachment?")
            .default(false)
            .interact()
            .map_err(|e| anyhow::anyhow!("Failed to read confirmation: {}", e))?;
        if !confirmed {
            if !ctx.quiet() {
                eprintln!("Cancelled.");
            }
            return Ok(());
        }
    }

    service.delete_note(&passphrase)?;

    let ui = ctx.ui();
    if ui.mode.is_json() {
        return print_json(&serde_json::json!({ "deleted": true }));
    }
    if !ctx.quiet() {
        print(ui, &receipt(ui, "Note deleted", &[]));
    }
    Ok(())
}
