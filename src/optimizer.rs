//! # Main Optimizer Orchestrator Module
//!
//! Questo è il modulo principale che orchestra tutto il processo di
//! ottimizzazione degli asset.
//!
//! ## Flusso di esecuzione:
//! 1. **Inizializzazione**: valida la config, carica `app.json` e il manifest
//! 2. **Discovery**: trova tutti gli asset immagine nel project tree
//! 3. **Hashing**: calcola il digest SHA-256 di ogni file scoperto
//! 4. **Garbage collection**: rimuove dal manifest gli hash senza file
//! 5. **Selezione**: scarta i file il cui hash è già nel manifest
//! 6. **Dependency check**: verifica i tool esterni (solo se c'è lavoro)
//! 7. **Worker pool**: comprime e swappa i file selezionati in parallelo
//! 8. **Merge**: applica gli esiti al manifest in single-thread
//! 9. **Persist**: salva il manifest (awaited) e stampa il riepilogo
//!
//! ## Gestione concorrenza:
//! - Semaforo per limitare i worker concorrenti (default: 4)
//! - Ogni worker restituisce un `FileOutcome`; il manifest viene mutato
//!   esclusivamente dopo che il pool è drenato, preservando l'invariante
//!   del singolo writer
//!
//! ## Directory temporanea:
//! - Una `TempDir` per run, con una sottodirectory per file; la rimozione
//!   su drop copre successo, errore e unwind
//!
//! ## Error handling:
//! - Il primo errore di un worker (compressione o move) abortisce il run;
//!   nessun retry per-file
//!
//! ## Esempio:
//! ```rust,ignore
//! let mut optimizer = AssetOptimizer::new(&project_root, config).await?;
//! let stats = optimizer.run().await?;
//! ```

use crate::{
    compressor::ImageCompressor,
    config::{Config, ProjectConfig},
    discovery::AssetDiscovery,
    hasher,
    manifest::ManifestStore,
    progress::{OptimizationStats, ProgressManager},
    swap::{self, SwapAction},
};
use anyhow::{Context, Result};
use futures::future::join_all;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, info};

/// Main asset optimizer orchestrator
pub struct AssetOptimizer {
    config: Config,
    project_root: PathBuf,
}

/// Per-file result produced by a worker, merged single-threaded after the
/// pool drains
struct FileOutcome {
    original_size: u64,
    original_hash: String,
    action: SwapAction,
}

impl AssetOptimizer {
    /// Create a new optimizer instance for a project directory
    pub async fn new(project_root: &Path, config: Config) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            config,
            project_root: project_root.to_path_buf(),
        })
    }

    /// Run the optimization process
    pub async fn run(&mut self) -> Result<OptimizationStats> {
        info!(
            "Optimizing image assets in: {}",
            self.project_root.display()
        );
        info!("🎯 Quality: {}", self.config.quality);
        if self.config.save_originals {
            info!("💾 Originals will be kept with a .orig suffix");
        }

        let project = ProjectConfig::load(&self.project_root).await?;
        let mut manifest = ManifestStore::load(&self.project_root).await?;

        let discovery = AssetDiscovery::new(&self.project_root, &project, &self.config)?;
        let assets = discovery.discover()?;
        info!(
            "Found {} image assets ({} selected for compression)",
            assets.all_files.len(),
            assets.selected_files.len()
        );

        // Hash every discovered file once: the digests drive both manifest
        // garbage collection and the skip decision.
        let mut hashes: HashMap<PathBuf, String> = HashMap::new();
        for path in &assets.all_files {
            let hash = hasher::hash_file(path)
                .await
                .with_context(|| format!("Failed to hash {}", path.display()))?;
            hashes.insert(path.clone(), hash);
        }

        let live: HashSet<String> = hashes.values().cloned().collect();
        let removed = manifest.retain_hashes(&live);
        if removed > 0 {
            debug!("Removed {} stale manifest entries", removed);
        }

        let mut stats = OptimizationStats::new();
        let mut work: Vec<(PathBuf, String)> = Vec::new();
        for path in &assets.selected_files {
            let hash = &hashes[path];
            if manifest.contains(hash) {
                debug!("Already optimized, skipping: {}", path.display());
                let size = tokio::fs::metadata(path).await?.len();
                stats.add_skipped(size);
            } else {
                work.push((path.clone(), hash.clone()));
            }
        }

        if work.is_empty() {
            manifest.save().await?;
            info!("{}", stats.format_summary());
            return Ok(stats);
        }

        ImageCompressor::check_dependencies().await?;

        // One scoped temp directory per run; workers write into per-file
        // subdirectories. Removal on drop covers every exit path.
        let temp_dir = tempfile::tempdir().context("Failed to create temporary directory")?;
        let temp_root = temp_dir.path().to_path_buf();

        let progress = ProgressManager::new(work.len() as u64);
        let semaphore = Arc::new(Semaphore::new(self.config.workers));
        let mut tasks = Vec::new();

        for (index, (path, original_hash)) in work.into_iter().enumerate() {
            let permit = semaphore.clone().acquire_owned().await?;
            let compressor = ImageCompressor::new(self.config.quality);
            let save_originals = self.config.save_originals;
            let out_dir = temp_root.join(index.to_string());
            let progress = progress.clone();

            let task = tokio::spawn(async move {
                let _permit = permit; // Keep permit alive

                let result = process_single_file(
                    &compressor,
                    &path,
                    &original_hash,
                    &out_dir,
                    save_originals,
                )
                .await;

                let name = path.file_name().unwrap_or_default().to_string_lossy();
                let message = match &result {
                    Ok(outcome) => match &outcome.action {
                        SwapAction::Swapped { bytes_saved, .. } => {
                            format!("✅ {}: {} saved", name, swap::format_size(*bytes_saved))
                        }
                        SwapAction::KeptOriginal { .. } => {
                            format!("⏩ {}: kept original", name)
                        }
                    },
                    Err(_) => format!("❌ {}: error", name),
                };
                progress.update(&message);

                result
            });

            tasks.push(task);
        }

        // Drain the pool, then apply every manifest mutation here — the
        // manifest has exactly one writer.
        let results = join_all(tasks).await;
        for result in results {
            let outcome = result??;
            match outcome.action {
                SwapAction::Swapped {
                    new_hash,
                    bytes_saved,
                } => {
                    manifest.insert(new_hash);
                    stats.add_optimized(
                        outcome.original_size,
                        outcome.original_size - bytes_saved,
                    );
                }
                SwapAction::KeptOriginal { .. } => {
                    manifest.insert(outcome.original_hash);
                    stats.add_skipped(outcome.original_size);
                }
            }
        }

        progress.finish(&stats.format_summary());

        manifest.save().await?;
        info!("{}", stats.format_summary());

        Ok(stats)
    }
}

/// Compress one file into its scratch directory and apply the swap
/// decision. Runs inside a worker task.
async fn process_single_file(
    compressor: &ImageCompressor,
    path: &Path,
    original_hash: &str,
    out_dir: &Path,
    save_originals: bool,
) -> Result<FileOutcome> {
    let original_size = tokio::fs::metadata(path).await?.len();
    debug!("Compressing: {} ({} bytes)", path.display(), original_size);

    let compressed = compressor
        .compress(path, out_dir)
        .await
        .with_context(|| format!("Compression failed for {}", path.display()))?;

    let action = swap::apply(path, &compressed, original_hash, save_originals).await?;

    Ok(FileOutcome {
        original_size,
        original_hash: original_hash.to_string(),
        action,
    })
}
