use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use move_tree_editor::app;
use move_tree_editor::config::EditorConfig;
use move_tree_editor::models::Editor;

/// Edit chess game records: a main line with nested variations
#[derive(Parser)]
#[command(name = "move-tree-editor")]
#[command(about = "Edit chess games with variations from the terminal")]
#[command(version)]
struct Args {
    /// PGN file to open
    #[arg(value_name = "PGN")]
    pgn: Option<PathBuf>,

    /// Editor configuration (TOML); defaults are used when it does not exist
    #[arg(short, long, value_name = "FILE", default_value = "move-tree-editor.toml")]
    config: PathBuf,

    /// Number of undo steps to keep
    #[arg(long)]
    undo_limit: Option<usize>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = EditorConfig::load_or_default(&args.config)
        .with_context(|| format!("loading config {}", args.config.display()))?;
    if let Some(limit) = args.undo_limit {
        config = config.with_undo_limit(limit);
    }

    init_logging(&config.log_filter);

    let mut editor = Editor::new(&config)?;
    if let Some(path) = &args.pgn {
        editor
            .open_pgn(path)
            .with_context(|| format!("opening {}", path.display()))?;
        info!(path = %path.display(), "opened game");
    }

    app::run(&mut editor, io::stdin().lock(), io::stdout())
}

/// Log to stderr so the command loop owns stdout. `RUST_LOG` wins over the
/// configured filter.
fn init_logging(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}
