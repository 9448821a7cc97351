//! # Swap/Rollback Module
//!
//! Questo modulo decide, per ogni file, se accettare il risultato della
//! compressione e aggiorna il filesystem in modo consistente.
//!
//! ## Stati per file:
//! `pending -> compressed -> {accepted, rejected}`
//!
//! ## Regola di decisione:
//! - `compressed_size < original_size`: accept. L'originale viene spostato
//!   da parte come `<stem>.orig.<ext>`, poi il file compresso prende il suo
//!   posto. Il contenuto nuovo viene ri-hashato per aggiornare il manifest.
//!   - Con `--save` il file `.orig` resta su disco (a meno che i byte
//!     compressi siano identici all'originale: in quel caso la copia è
//!     ridondante e viene rimossa)
//!   - Senza `--save` il file `.orig` viene eliminato dopo lo swap
//! - `compressed_size >= original_size`: reject. L'output compresso viene
//!   scartato, l'originale resta intatto e il suo hash viene comunque
//!   marcato nel manifest per saltare il file nei run futuri. Il log
//!   distingue "same size" da "larger".
//!
//! ## Sicurezza dello swap:
//! - Sequenza rename-aside + move-into-place con rollback: se il move del
//!   file compresso fallisce, l'originale viene ripristinato dal `.orig`
//!   prima di propagare l'errore
//! - I move usano rename con fallback copy+remove per destinazioni su
//!   filesystem diversi (la directory temporanea può non essere sullo
//!   stesso device del progetto)

use crate::hasher;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Why a compression result was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeptReason {
    /// Compressed output had exactly the original size
    SameSize,
    /// Compressed output was larger than the original
    Larger,
}

/// Outcome of the per-file accept/reject decision
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwapAction {
    /// Compressed bytes now live at the original path
    Swapped { new_hash: String, bytes_saved: u64 },
    /// Original kept untouched; hash should still be recorded
    KeptOriginal { reason: KeptReason },
}

/// Derive the `.orig` sibling path: `logo.png` -> `logo.orig.png`.
pub fn orig_path(path: &Path) -> PathBuf {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => {
            let stem = path.file_stem().unwrap_or_default().to_string_lossy();
            path.with_file_name(format!("{}.orig.{}", stem, ext))
        }
        None => {
            let name = path.file_name().unwrap_or_default().to_string_lossy();
            path.with_file_name(format!("{}.orig", name))
        }
    }
}

/// Apply the swap decision for one file.
///
/// `original_hash` is the content hash of `original` before compression;
/// it is compared against the compressed content when `--save` is active
/// to drop a redundant `.orig` copy.
pub async fn apply(
    original: &Path,
    compressed: &Path,
    original_hash: &str,
    save_originals: bool,
) -> Result<SwapAction> {
    let original_size = fs::metadata(original).await?.len();
    let compressed_size = fs::metadata(compressed).await?.len();

    if compressed_size >= original_size {
        let _ = fs::remove_file(compressed).await;

        let reason = if compressed_size == original_size {
            info!(
                "⏩ {}: compressed output is the same size, keeping original",
                original.display()
            );
            KeptReason::SameSize
        } else {
            info!(
                "⏩ {}: compressed output is larger ({} > {}), keeping original",
                original.display(),
                format_size(compressed_size),
                format_size(original_size)
            );
            KeptReason::Larger
        };

        return Ok(SwapAction::KeptOriginal { reason });
    }

    let aside = orig_path(original);

    move_file(original, &aside)
        .await
        .with_context(|| format!("Failed to move {} aside", original.display()))?;

    if let Err(e) = move_file(compressed, original).await {
        // Restore the original before propagating
        let _ = move_file(&aside, original).await;
        return Err(e).with_context(|| {
            format!("Failed to move compressed file into {}", original.display())
        });
    }

    let new_hash = hasher::hash_file(original).await?;

    if save_originals {
        if new_hash == original_hash {
            info!(
                "{}: compressed and original content are identical, removing redundant .orig",
                original.display()
            );
            let _ = fs::remove_file(&aside).await;
        } else {
            debug!("Kept original at {}", aside.display());
        }
    } else {
        fs::remove_file(&aside)
            .await
            .with_context(|| format!("Failed to remove {}", aside.display()))?;
    }

    Ok(SwapAction::Swapped {
        new_hash,
        bytes_saved: original_size - compressed_size,
    })
}

/// Move a file, falling back to copy+remove when rename fails (e.g. the
/// source and destination live on different filesystems).
pub async fn move_file(from: &Path, to: &Path) -> Result<()> {
    match fs::rename(from, to).await {
        Ok(()) => Ok(()),
        Err(_) => {
            fs::copy(from, to).await?;
            fs::remove_file(from).await?;
            Ok(())
        }
    }
}

/// Get human-readable file size
pub fn format_size(size: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = size as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", size as u64, UNITS[unit_index])
    } else {
        format!("{:.2} {}", size, UNITS[unit_index])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_orig_path_derivation() {
        assert_eq!(
            orig_path(Path::new("/a/logo.png")),
            PathBuf::from("/a/logo.orig.png")
        );
        assert_eq!(
            orig_path(Path::new("photo.test.jpg")),
            PathBuf::from("photo.test.orig.jpg")
        );
        assert_eq!(orig_path(Path::new("/a/noext")), PathBuf::from("/a/noext.orig"));
    }

    #[tokio::test]
    async fn test_swap_accepts_smaller_output() {
        let temp_dir = TempDir::new().unwrap();
        let original = temp_dir.path().join("logo.png");
        let compressed = temp_dir.path().join("tmp").join("logo.png");
        fs::create_dir_all(compressed.parent().unwrap()).await.unwrap();
        fs::write(&original, vec![0u8; 100]).await.unwrap();
        fs::write(&compressed, vec![1u8; 10]).await.unwrap();
        let original_hash = hasher::hash_bytes(&vec![0u8; 100]);

        let action = apply(&original, &compressed, &original_hash, false)
            .await
            .unwrap();

        assert_eq!(
            action,
            SwapAction::Swapped {
                new_hash: hasher::hash_bytes(&vec![1u8; 10]),
                bytes_saved: 90,
            }
        );
        assert_eq!(fs::read(&original).await.unwrap(), vec![1u8; 10]);
        assert!(!orig_path(&original).exists());
        assert!(!compressed.exists());
    }

    #[tokio::test]
    async fn test_swap_with_save_keeps_orig_sibling() {
        let temp_dir = TempDir::new().unwrap();
        let original = temp_dir.path().join("logo.png");
        let compressed = temp_dir.path().join("tmp").join("logo.png");
        fs::create_dir_all(compressed.parent().unwrap()).await.unwrap();
        fs::write(&original, vec![0u8; 100]).await.unwrap();
        fs::write(&compressed, vec![1u8; 10]).await.unwrap();
        let original_hash = hasher::hash_bytes(&vec![0u8; 100]);

        let action = apply(&original, &compressed, &original_hash, true)
            .await
            .unwrap();

        assert!(matches!(action, SwapAction::Swapped { .. }));
        assert_eq!(fs::read(&original).await.unwrap(), vec![1u8; 10]);
        let aside = orig_path(&original);
        assert_eq!(fs::read(&aside).await.unwrap(), vec![0u8; 100]);
    }

    #[tokio::test]
    async fn test_same_size_output_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let original = temp_dir.path().join("logo.png");
        let compressed = temp_dir.path().join("tmp").join("logo.png");
        fs::create_dir_all(compressed.parent().unwrap()).await.unwrap();
        fs::write(&original, vec![0u8; 50]).await.unwrap();
        fs::write(&compressed, vec![1u8; 50]).await.unwrap();
        let original_hash = hasher::hash_bytes(&vec![0u8; 50]);

        let action = apply(&original, &compressed, &original_hash, false)
            .await
            .unwrap();

        assert_eq!(
            action,
            SwapAction::KeptOriginal {
                reason: KeptReason::SameSize
            }
        );
        // Original bytes untouched, compressed output discarded
        assert_eq!(fs::read(&original).await.unwrap(), vec![0u8; 50]);
        assert!(!compressed.exists());
        assert!(!orig_path(&original).exists());
    }

    #[tokio::test]
    async fn test_larger_output_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let original = temp_dir.path().join("logo.png");
        let compressed = temp_dir.path().join("tmp").join("logo.png");
        fs::create_dir_all(compressed.parent().unwrap()).await.unwrap();
        fs::write(&original, vec![0u8; 50]).await.unwrap();
        fs::write(&compressed, vec![1u8; 80]).await.unwrap();
        let original_hash = hasher::hash_bytes(&vec![0u8; 50]);

        let action = apply(&original, &compressed, &original_hash, false)
            .await
            .unwrap();

        assert_eq!(
            action,
            SwapAction::KeptOriginal {
                reason: KeptReason::Larger
            }
        );
        assert_eq!(fs::read(&original).await.unwrap(), vec![0u8; 50]);
    }

    #[tokio::test]
    async fn test_move_file_across_directories() {
        let temp_dir = TempDir::new().unwrap();
        let from = temp_dir.path().join("a").join("f.bin");
        let to = temp_dir.path().join("b").join("f.bin");
        fs::create_dir_all(from.parent().unwrap()).await.unwrap();
        fs::create_dir_all(to.parent().unwrap()).await.unwrap();
        fs::write(&from, b"payload").await.unwrap();

        move_file(&from, &to).await.unwrap();

        assert!(!from.exists());
        assert_eq!(fs::read(&to).await.unwrap(), b"payload");
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.00 KB");
        assert_eq!(format_size(1_258_291), "1.20 MB");
    }
}
