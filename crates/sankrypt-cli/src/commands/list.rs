use serde::Serialize;

use sankrypt_core::{ArtifactMeta, ArtifactStore, FsStore};

use crate::app::AppContext;
use crate::cli::ListArgs;
use crate::ui::{badge, format_bytes, format_datetime, hint, table, Badge, Column, UiContext};

#[derive(Serialize)]
struct ListedFile<'a> {
    #[serde(flatten)]
    meta: &'a ArtifactMeta,
    encrypted: bool,
}

pub fn handle_list(ctx: &AppContext, args: &ListArgs) -> anyhow::Result<()> {
    let ui = ctx.ui(args.json);
    let store = ctx.open_store()?;
    list(&store, &ui, args)
}

pub(super) fn list(store: &FsStore, ui: &UiContext, args: &ListArgs) -> anyhow::Result<()> {
    let files = if args.all {
        store.list()?
    } else {
        store.encrypted_artifacts()?
    };

    if ui.mode.is_json() {
        let listed: Vec<ListedFile> = files
            .iter()
            .map(|meta| ListedFile {
                meta,
                encrypted: meta.is_encrypted(),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&listed)?);
        return Ok(());
    }

    if files.is_empty() {
        if !ui.quiet {
            let what = if args.all { "files" } else { "encrypted files" };
            println!("{}", badge(ui, Badge::Info, &format!("No {} in vault", what)));
            if !args.all {
                println!("{}", hint(ui, "Run: sankrypt list --all"));
            }
        }
        return Ok(());
    }

    let mut columns = vec![Column::new("Path"), Column::new("Size"), Column::new("Modified")];
    if args.all {
        columns.push(Column::new("State"));
    }
    let rows: Vec<Vec<String>> = files
        .iter()
        .map(|meta| {
            let mut row = vec![
                meta.path.display().to_string(),
                format_bytes(meta.size),
                format_datetime(ui, &meta.modified),
            ];
            if args.all {
                let state = if meta.is_encrypted() { "encrypted" } else { "plain" };
                row.push(state.to_string());
            }
            row
        })
        .collect();
    println!("{}", table(ui, &columns, &rows));
    Ok(())
}
