use secretnotes_core::{NoteStore, NotesError};

use crate::app::AppContext;
use crate::errors::CliError;
use crate::ui::{badge, header, print, table, Badge, Column};

use super::print_json;

pub fn handle_check(ctx: &AppContext) -> anyhow::Result<()> {
    let store = ctx.open_store()?;
    let schema_version = store.schema_version()?;

    let stats = match store.check_integrity() {
        Ok(stats) => stats,
        Err(NotesError::Storage(message)) => return Err(CliError::IntegrityFailed(message).into()),
        Err(err) => return Err(err.into()),
    };

    let ui = ctx.ui();
    if ui.mode.is_json() {
        return print_json(&serde_json::json!({
            "status": "ok",
            "schema_version": schema_version,
            "notes": stats.notes,
            "attachments": stats.attachments,
        }));
    }
    if ctx.quiet() {
        return Ok(());
    }

    if ui.mode.is_pretty() {
        let path = ctx.store_path()?.display().to_string();
        print(ui, &header(ui, "check", Some(&path)));
        let rows = vec![
            vec!["Schema version".to_string(), schema_version.to_string()],
            vec!["Notes".to_string(), stats.notes.to_string()],
            vec!["Attachments".to_string(), stats.attachments.to_string()],
        ];
        print(ui, &table(ui, &[Column::new("Check"), Column::new("Result")], &rows));
        print(ui, &badge(ui, Badge::Ok, "Integrity check: OK"));
    } else {
        println!("Integrity check: OK");
        println!("notes={}", stats.notes);
        println!("attachments={}", stats.attachments);
    }
    Ok(())
}
