//! # Asset Optimizer - Main Entry Point
//!
//! Questo è il punto di ingresso principale dell'applicazione.
//!
//! ## Responsabilità:
//! - Parsing degli argomenti della command line con `clap`
//! - Inizializzazione del sistema di logging con `tracing`
//! - Validazione degli input dell'utente
//! - Creazione della configurazione e avvio dell'optimizer
//!
//! ## Flusso di esecuzione:
//! 1. Parsa gli argomenti CLI (project directory, quality, include, etc.)
//! 2. Configura il logging (INFO o DEBUG a seconda del flag verbose)
//! 3. Valida che la project directory esista
//! 4. Crea un oggetto Config e avvia AssetOptimizer
//!
//! ## Esempio di utilizzo:
//! ```bash
//! asset-optimizer /path/to/project --quality 85 --include "images/**" --save
//! ```

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use asset_optimizer::{AssetOptimizer, Config};

#[derive(Parser)]
#[command(name = "asset-optimizer")]
#[command(about = "Compress project image assets in place with content-hash deduplication")]
struct Args {
    /// Project directory to scan for image assets
    #[arg(default_value = ".")]
    project_directory: PathBuf,

    /// Keep original files alongside compressed ones (with .orig suffix)
    #[arg(short, long)]
    save: bool,

    /// Compression quality (1-100)
    #[arg(short, long, default_value = "80")]
    quality: u8,

    /// Restrict processing to paths matching this glob
    #[arg(short, long)]
    include: Option<String>,

    /// Exclude paths matching this glob from processing
    #[arg(short, long)]
    exclude: Option<String>,

    /// Number of parallel workers
    #[arg(short, long, default_value = "4")]
    workers: usize,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(if args.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    // Validate arguments
    if !args.project_directory.exists() {
        return Err(anyhow::anyhow!(
            "Project directory does not exist: {}",
            args.project_directory.display()
        ));
    }
    if !args.project_directory.is_dir() {
        return Err(anyhow::anyhow!(
            "Project path is not a directory: {}",
            args.project_directory.display()
        ));
    }

    let config = Config {
        quality: args.quality,
        save_originals: args.save,
        include: args.include,
        exclude: args.exclude,
        workers: args.workers,
    };

    let mut optimizer = AssetOptimizer::new(&args.project_directory, config).await?;
    optimizer.run().await?;

    Ok(())
}
