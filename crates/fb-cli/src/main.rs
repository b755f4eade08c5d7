//! `flowboard`: render, export and inspect stored diagrams from the shell.
//!
//! Every subcommand reads a stored record (the JSON an editor persists)
//! with the same lenient loader the editor uses, so a damaged record still
//! yields whatever could be recovered. Recovered problems are logged as
//! warnings; set `RUST_LOG=debug` for more.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chrono::Utc;
use clap::{Parser, Subcommand};
use fb_core::{Diagram, ElementId, Loaded, export_file_name, export_json, load_document};
use fb_render::{ExportError, RenderOptions, flatten_onto_white, render_diagram};
use thiserror::Error;

#[derive(Debug, Error)]
enum CliError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{path} is not a usable diagram: {reason}")]
    Unusable { path: PathBuf, reason: String },

    #[error(transparent)]
    Render(#[from] ExportError),

    #[error(transparent)]
    Core(#[from] fb_core::Error),
}

#[derive(Debug, Parser)]
#[command(name = "flowboard", version, about = "Render, export and inspect Flowboard diagrams")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Rasterize a stored diagram to PNG.
    Render {
        /// Stored diagram record.
        input: PathBuf,
        /// Output file. Defaults to `<title>-<date>.png`.
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Surface pixels per canvas unit.
        #[arg(long, default_value_t = 1.0)]
        scale: f32,
        /// Leave out the background grid.
        #[arg(long)]
        no_grid: bool,
        /// Keep the background transparent instead of flattening onto white.
        #[arg(long)]
        transparent: bool,
        /// Draw selection decorations for these element ids; the first is primary.
        #[arg(long = "select", value_name = "ID")]
        selected: Vec<u64>,
    },
    /// Write the diagram as a JSON export with metadata.
    Export {
        input: PathBuf,
        /// Output file. Defaults to `flowboard-<date>.json`.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print a summary of a stored diagram.
    Inspect { input: PathBuf },
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("flowboard: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> Result<(), CliError> {
    match command {
        Command::Render {
            input,
            output,
            scale,
            no_grid,
            transparent,
            selected,
        } => {
            let mut diagram = load(&input)?;
            let members: Vec<ElementId> = selected.into_iter().map(ElementId).collect();
            diagram.mark_selected(members.first().copied());
            let options = RenderOptions {
                show_grid: !no_grid,
                scale,
                ..RenderOptions::default()
            };
            let scene = render_diagram(&diagram, &members, &options)?;
            let pixmap = if transparent {
                scene
            } else {
                flatten_onto_white(&scene)?
            };
            let bytes = pixmap
                .encode_png()
                .map_err(|e| ExportError::Encode(e.to_string()))?;
            let output = output.unwrap_or_else(|| {
                export_file_name(&diagram.title, "flowboard", Utc::now(), "png").into()
            });
            write(&output, &bytes)?;
            log::info!("rendered {} ({}x{})", output.display(), pixmap.width(), pixmap.height());
        }
        Command::Export { input, output } => {
            let diagram = load(&input)?;
            let now = Utc::now();
            let json = export_json(&diagram, None, now)?;
            let output = output.unwrap_or_else(|| export_file_name("", "flowboard", now, "json").into());
            write(&output, json.as_bytes())?;
            log::info!("exported {}", output.display());
        }
        Command::Inspect { input } => {
            let loaded = read(&input)?;
            print!("{}", summary(&loaded));
        }
    }
    Ok(())
}

fn read(path: &Path) -> Result<Loaded, CliError> {
    let text = std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(load_document(&text))
}

/// Load a diagram, refusing records that could not be decoded at all.
fn load(path: &Path) -> Result<Diagram, CliError> {
    let loaded = read(path)?;
    if let Some(reason) = loaded.report.failure {
        return Err(CliError::Unusable {
            path: path.to_path_buf(),
            reason,
        });
    }
    for issue in &loaded.report.issues {
        log::warn!("{}: {issue}", path.display());
    }
    Ok(loaded.diagram)
}

fn write(path: &Path, bytes: &[u8]) -> Result<(), CliError> {
    std::fs::write(path, bytes).map_err(|source| CliError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn summary(loaded: &Loaded) -> String {
    let d = &loaded.diagram;
    let mut out = String::new();
    let title = if d.title.is_empty() { "(untitled)" } else { &d.title };
    let _ = writeln!(out, "title:    {title}");
    let _ = writeln!(out, "canvas:   {}x{}", d.canvas.width, d.canvas.height);
    let _ = writeln!(out, "zoom:     {}", d.zoom);
    let _ = writeln!(out, "next id:  {}", d.id_counter.last() + 1);
    if let Some(created) = loaded.created_at {
        let _ = writeln!(out, "created:  {}", created.to_rfc3339());
    }

    let mut kinds: BTreeMap<&str, usize> = BTreeMap::new();
    for element in &d.elements {
        *kinds.entry(element.kind().as_str()).or_default() += 1;
    }
    let _ = writeln!(out, "elements: {}", d.len());
    for (kind, count) in kinds {
        let _ = writeln!(out, "  {kind:<10} {count}");
    }

    if let Some(failure) = &loaded.report.failure {
        let _ = writeln!(out, "unreadable: {failure}");
    }
    for issue in &loaded.report.issues {
        let _ = writeln!(out, "issue:    {issue}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn render_flags_parse() {
        let cli = Cli::try_parse_from([
            "flowboard", "render", "board.json", "--no-grid", "--scale", "2", "--select", "3", "--select", "1",
        ])
        .unwrap();
        match cli.command {
            Command::Render {
                input,
                scale,
                no_grid,
                transparent,
                selected,
                output,
            } => {
                assert_eq!(input, PathBuf::from("board.json"));
                assert_eq!(scale, 2.0);
                assert!(no_grid);
                assert!(!transparent);
                assert_eq!(selected, vec![3, 1]);
                assert_eq!(output, None);
            }
            other => panic!("expected render, got {other:?}"),
        }
    }

    #[test]
    fn summary_counts_kinds_and_issues() {
        let loaded = load_document(
            r##"{"elements": [
                {"id": 1, "type": "card"},
                {"id": 2, "type": "card"},
                {"id": 3, "type": "arrow", "startX": 0, "startY": 0, "endX": 40, "endY": 0},
                {"id": 4, "type": "cloud"}
            ], "flowTitle": "Returns"}"##,
        );
        let text = summary(&loaded);
        assert!(text.contains("title:    Returns"), "{text}");
        assert!(text.contains("elements: 3"), "{text}");
        assert!(text.contains("  card       2"), "{text}");
        assert!(text.contains("  arrow      1"), "{text}");
        assert!(text.contains("issue:"), "{text}");
        assert!(text.contains("next id:  4"), "{text}");
    }

    #[test]
    fn unreadable_record_is_refused() {
        let path = std::env::temp_dir().join(format!("flowboard-cli-{}.json", std::process::id()));
        std::fs::write(&path, "not json").unwrap();
        let err = load(&path).unwrap_err();
        assert!(matches!(err, CliError::Unusable { .. }));
        std::fs::remove_file(&path).unwrap();
    }
}
