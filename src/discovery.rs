//! # Asset Discovery Module
//!
//! Questo modulo enumera i file immagine candidati all'ottimizzazione.
//!
//! ## Responsabilità:
//! - Scansione ricorsiva del project tree con `walkdir`
//! - Matching dei glob `assetBundlePatterns` dalla configurazione di progetto
//! - Intersezione con `--include` e sottrazione di `--exclude`
//! - Esclusione fissa di `node_modules`, `ios`, `android` e della directory
//!   di build web configurata
//! - Filtro finale sulle estensioni immagine (png/jpg/jpeg, case-insensitive)
//!
//! ## Output:
//! - `AssetFileSet::all_files`: tutti i file immagine scoperti (usati per la
//!   garbage collection del manifest)
//! - `AssetFileSet::selected_files`: il sottoinsieme da considerare per la
//!   compressione (più stretto quando include/exclude sono forniti)
//!
//! ## Matching dei pattern:
//! - I pattern sono compilati una volta con `glob::Pattern` e applicati al
//!   path relativo alla project root, quindi la concatenazione manuale di
//!   stringhe (e il vecchio bug del doppio slash) non esiste qui
//! - I sibling `.orig` prodotti da run precedenti con `--save` non vengono
//!   mai riscoperti come asset

use crate::config::{Config, ProjectConfig};
use crate::error::OptimizeError;
use anyhow::Result;
use glob::Pattern;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Directories never scanned for assets, regardless of configuration.
const ALWAYS_EXCLUDED_DIRS: &[&str] = &["node_modules", "ios", "android"];

/// The set of image files discovered by a scan
#[derive(Debug, Default)]
pub struct AssetFileSet {
    /// Every discovered image matching the bundle patterns
    pub all_files: Vec<PathBuf>,
    /// The subset selected by `--include`/`--exclude`
    pub selected_files: Vec<PathBuf>,
}

/// Resolves glob patterns against the project tree to find image assets
pub struct AssetDiscovery {
    project_root: PathBuf,
    bundle_patterns: Vec<Pattern>,
    include: Option<Pattern>,
    exclude: Option<Pattern>,
    web_output_dir: String,
}

impl AssetDiscovery {
    /// Compile the discovery patterns for a project.
    ///
    /// Bundle patterns come from the project configuration
    /// (`assetBundlePatterns`, default "everything"); include/exclude come
    /// from the CLI. A malformed pattern fails the run before any file is
    /// touched.
    pub fn new(project_root: &Path, project: &ProjectConfig, config: &Config) -> Result<Self> {
        let bundle_patterns = project
            .asset_bundle_patterns
            .iter()
            .map(|p| compile_pattern(p))
            .collect::<Result<Vec<_>>>()?;

        let include = config.include.as_deref().map(compile_pattern).transpose()?;
        let exclude = config.exclude.as_deref().map(compile_pattern).transpose()?;

        Ok(Self {
            project_root: project_root.to_path_buf(),
            bundle_patterns,
            include,
            exclude,
            web_output_dir: project.web.output.clone(),
        })
    }

    /// Walk the project tree and return discovered asset files.
    pub fn discover(&self) -> Result<AssetFileSet> {
        let mut set = AssetFileSet::default();

        let walker = WalkDir::new(&self.project_root)
            .into_iter()
            .filter_entry(|entry| !self.is_excluded_dir(entry.path(), entry.file_type().is_dir()));

        for entry in walker.filter_map(|e| e.ok()).filter(|e| e.file_type().is_file()) {
            let path = entry.path();
            if !is_image_asset(path) {
                continue;
            }

            // Match patterns against the project-relative path
            let relative = match path.strip_prefix(&self.project_root) {
                Ok(rel) => rel,
                Err(_) => continue,
            };

            if !self.bundle_patterns.iter().any(|p| p.matches_path(relative)) {
                continue;
            }

            set.all_files.push(path.to_path_buf());

            let included = self
                .include
                .as_ref()
                .map_or(true, |p| p.matches_path(relative));
            let excluded = self
                .exclude
                .as_ref()
                .map_or(false, |p| p.matches_path(relative));

            if included && !excluded {
                set.selected_files.push(path.to_path_buf());
            }
        }

        debug!(
            "Discovered {} image assets ({} selected)",
            set.all_files.len(),
            set.selected_files.len()
        );

        Ok(set)
    }

    fn is_excluded_dir(&self, path: &Path, is_dir: bool) -> bool {
        if !is_dir || path == self.project_root {
            return false;
        }

        match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => {
                ALWAYS_EXCLUDED_DIRS.contains(&name) || name == self.web_output_dir
            }
            None => false,
        }
    }
}

fn compile_pattern(pattern: &str) -> Result<Pattern> {
    Pattern::new(pattern).map_err(|source| {
        OptimizeError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        }
        .into()
    })
}

/// Whether a path names an optimizable image asset.
///
/// `.orig` siblings left behind by `--save` runs are never treated as
/// assets, so a later run cannot compress the preserved originals.
pub fn is_image_asset(path: &Path) -> bool {
    let name = match path.file_name().and_then(|n| n.to_str()) {
        Some(name) => name.to_lowercase(),
        None => return false,
    };

    let has_image_ext = name.ends_with(".png") || name.ends_with(".jpg") || name.ends_with(".jpeg");
    if !has_image_ext {
        return false;
    }

    let stem = name.rsplit_once('.').map(|(stem, _)| stem).unwrap_or(&name);
    !stem.ends_with(".orig")
}
