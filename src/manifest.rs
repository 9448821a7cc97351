//! # Manifest Store Module
//!
//! Questo modulo gestisce il bookkeeping durevole dei contenuti già ottimizzati.
//!
//! ## Responsabilità:
//! - Legge/scrive `.expo-shared/assets.json` nella root del progetto
//! - Crea directory e file vuoto alla prima lettura (una "read" può scrivere)
//! - Garbage collection degli hash che non corrispondono più a file su disco
//! - Persistenza bloccante a fine run (niente write fire-and-forget)
//!
//! ## Formato su disco:
//! - Oggetto JSON piatto: chiavi = digest SHA-256 hex (64 caratteri lowercase),
//!   valori = `true` (sentinella "questo contenuto è già in forma ottimizzata")
//! - Chiavi content-addressed, non path-addressed: due file con byte identici
//!   sono una singola unità di ottimizzazione
//! - Il file è pensato per essere committato in version control, quindi la
//!   serializzazione usa una BTreeMap per un ordinamento stabile delle chiavi
//!
//! ## Ciclo di vita:
//! 1. `load()` a inizio run (crea file vuoto se assente)
//! 2. Mutazioni in memoria durante il run (GC + insert)
//! 3. `save()` awaited una sola volta a fine run
//!
//! ## Ownership:
//! - Posseduto esclusivamente dal singolo processo di run; nessun writer
//!   concorrente contemplato
//!
//! ## Esempio struttura manifest:
//! ```json
//! {
//!   "1f9a0c...64 hex chars...": true,
//!   "8c02b1...64 hex chars...": true
//! }
//! ```

use anyhow::{Context, Result};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Directory under the project root holding shared optimizer state.
pub const MANIFEST_DIR: &str = ".expo-shared";

/// Manifest file name inside [`MANIFEST_DIR`].
pub const MANIFEST_FILE: &str = "assets.json";

/// Manages the persisted set of already-optimized content hashes
pub struct ManifestStore {
    manifest_path: PathBuf,
    entries: BTreeMap<String, bool>,
}

impl ManifestStore {
    /// Load the manifest for a project, creating `.expo-shared/assets.json`
    /// (and its parent directory) when absent.
    pub async fn load(project_root: &Path) -> Result<Self> {
        let manifest_dir = project_root.join(MANIFEST_DIR);
        fs::create_dir_all(&manifest_dir)
            .await
            .with_context(|| format!("Failed to create {}", manifest_dir.display()))?;

        let manifest_path = manifest_dir.join(MANIFEST_FILE);

        let entries = if manifest_path.exists() {
            let content = fs::read_to_string(&manifest_path)
                .await
                .with_context(|| format!("Failed to read {}", manifest_path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("Malformed manifest: {}", manifest_path.display()))?
        } else {
            let entries = BTreeMap::new();
            fs::write(&manifest_path, serde_json::to_string_pretty(&entries)?)
                .await
                .with_context(|| format!("Failed to create {}", manifest_path.display()))?;
            entries
        };

        Ok(Self {
            manifest_path,
            entries,
        })
    }

    /// Persist the manifest, overwriting the file on disk.
    ///
    /// Awaited at the end of a run; an error here is fatal so a lost write
    /// never reports success.
    pub async fn save(&self) -> Result<()> {
        let content = serde_json::to_string_pretty(&self.entries)?;
        fs::write(&self.manifest_path, content)
            .await
            .with_context(|| format!("Failed to write {}", self.manifest_path.display()))?;
        Ok(())
    }

    /// Whether this content hash is already recorded as optimized.
    pub fn contains(&self, hash: &str) -> bool {
        self.entries.contains_key(hash)
    }

    /// Record a content hash as optimized.
    pub fn insert(&mut self, hash: String) {
        self.entries.insert(hash, true);
    }

    /// Drop every entry whose hash is not in `live`. Returns the number of
    /// stale entries removed.
    pub fn retain_hashes(&mut self, live: &HashSet<String>) -> usize {
        let before = self.entries.len();
        self.entries.retain(|hash, _| live.contains(hash));
        before - self.entries.len()
    }

    /// Number of recorded hashes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the manifest has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn hash_of(n: u8) -> String {
        crate::hasher::hash_bytes(&[n])
    }

    #[tokio::test]
    async fn test_load_creates_dir_and_empty_file() {
        let temp_dir = TempDir::new().unwrap();

        let store = ManifestStore::load(temp_dir.path()).await.unwrap();

        assert!(store.is_empty());
        let manifest_path = temp_dir.path().join(MANIFEST_DIR).join(MANIFEST_FILE);
        assert!(manifest_path.exists());
        let content = tokio::fs::read_to_string(&manifest_path).await.unwrap();
        assert_eq!(content.trim(), "{}");
    }

    #[tokio::test]
    async fn test_save_and_reload_round_trip() {
        let temp_dir = TempDir::new().unwrap();

        let mut store = ManifestStore::load(temp_dir.path()).await.unwrap();
        store.insert(hash_of(1));
        store.insert(hash_of(2));
        store.save().await.unwrap();

        let reloaded = ManifestStore::load(temp_dir.path()).await.unwrap();
        assert_eq!(reloaded.len(), 2);
        assert!(reloaded.contains(&hash_of(1)));
        assert!(reloaded.contains(&hash_of(2)));
    }

    #[tokio::test]
    async fn test_on_disk_values_are_true() {
        let temp_dir = TempDir::new().unwrap();

        let mut store = ManifestStore::load(temp_dir.path()).await.unwrap();
        store.insert(hash_of(7));
        store.save().await.unwrap();

        let manifest_path = temp_dir.path().join(MANIFEST_DIR).join(MANIFEST_FILE);
        let content = tokio::fs::read_to_string(&manifest_path).await.unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed[&hash_of(7)], serde_json::Value::Bool(true));
    }

    #[tokio::test]
    async fn test_retain_hashes_drops_stale_entries() {
        let temp_dir = TempDir::new().unwrap();

        let mut store = ManifestStore::load(temp_dir.path()).await.unwrap();
        store.insert(hash_of(1));
        store.insert(hash_of(2));
        store.insert(hash_of(3));

        let live: HashSet<String> = [hash_of(2)].into_iter().collect();
        let removed = store.retain_hashes(&live);

        assert_eq!(removed, 2);
        assert_eq!(store.len(), 1);
        assert!(store.contains(&hash_of(2)));
        assert!(!store.contains(&hash_of(1)));
    }

    #[tokio::test]
    async fn test_malformed_manifest_is_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let manifest_dir = temp_dir.path().join(MANIFEST_DIR);
        tokio::fs::create_dir_all(&manifest_dir).await.unwrap();
        tokio::fs::write(manifest_dir.join(MANIFEST_FILE), "not json")
            .await
            .unwrap();

        assert!(ManifestStore::load(temp_dir.path()).await.is_err());
    }
}
