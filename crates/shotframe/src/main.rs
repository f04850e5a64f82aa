use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;

use shotframe_core::history::{HistoryConfig, PersistenceLayer};
use shotframe_core::Document;

/// Inspects shotframe project files: prints the layer stack and
/// undo-history status of each given project.
#[derive(Parser, Debug)]
#[command(name = "shotframe", version, about)]
struct Cli {
    /// Project files to inspect.
    files: Vec<PathBuf>,

    /// Open the undo-history database too, reporting how many
    /// snapshots are stored per project.
    #[arg(long = "with-history")]
    with_history: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Starting shotframe");

    let config = HistoryConfig::default();
    let persistence = if cli.with_history {
        Some(PersistenceLayer::open(&config.data_dir)?)
    } else {
        None
    };

    for path in &cli.files {
        let doc = match &persistence {
            Some(pl) => Document::open_with_persistence(path, Arc::clone(pl), &config)?,
            None => Document::open(path)?,
        };

        println!("{} ({})", doc.title, path.display());
        let state = doc.current_state();
        if state.layers.is_empty() {
            println!("  (no layers)");
        }
        for (index, layer) in state.layers.iter().enumerate() {
            let lock = if index == 0 && state.root_locked {
                " [locked]"
            } else {
                ""
            };
            println!("  {index}: {:?} \"{}\"{lock}", layer.kind, layer.title);
        }

        if let Some(pl) = &persistence {
            let stored = pl.count_states(doc.doc_id())?;
            println!("  history: {stored} stored snapshot(s)");
        }
    }

    if cli.files.is_empty() {
        tracing::warn!("No project files given; nothing to do");
    }

    Ok(())
}
