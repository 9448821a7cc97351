//! # Hash Engine Module
//!
//! Questo modulo calcola l'identità di contenuto dei file asset.
//!
//! ## Responsabilità:
//! - Calcola il digest SHA-256 dei byte di un file
//! - Restituisce il digest come stringa esadecimale lowercase (64 caratteri)
//!
//! ## Strategia:
//! - Lettura dell'intero file in memoria, poi hashing in un colpo solo.
//!   Accettabile per asset immagine di dimensioni tipiche; il contratto
//!   esterno non cambierebbe passando a un hashing streaming.
//! - Funzione pura dei byte del file: due file con contenuto identico
//!   producono lo stesso digest e vengono trattati come una singola
//!   unità di ottimizzazione nel manifest.

use anyhow::Result;
use sha2::{Digest, Sha256};
use std::path::Path;
use tokio::fs;

/// Compute the SHA-256 hex digest of a byte slice.
pub fn hash_bytes(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Compute the SHA-256 hex digest of a file's full contents.
pub async fn hash_file(path: &Path) -> Result<String> {
    let bytes = fs::read(path).await?;
    Ok(hash_bytes(&bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_hash_bytes_known_digest() {
        // SHA-256 of the empty input
        assert_eq!(
            hash_bytes(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_hash_bytes_is_lowercase_hex() {
        let digest = hash_bytes(b"logo bytes");
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[tokio::test]
    async fn test_hash_file_matches_hash_bytes() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("asset.png");
        tokio::fs::write(&path, b"not really a png").await.unwrap();

        let digest = hash_file(&path).await.unwrap();

        assert_eq!(digest, hash_bytes(b"not really a png"));
    }

    #[tokio::test]
    async fn test_identical_content_same_digest() {
        let temp_dir = TempDir::new().unwrap();
        let a = temp_dir.path().join("a.png");
        let b = temp_dir.path().join("b.png");
        tokio::fs::write(&a, b"same bytes").await.unwrap();
        tokio::fs::write(&b, b"same bytes").await.unwrap();

        assert_eq!(hash_file(&a).await.unwrap(), hash_file(&b).await.unwrap());
    }
}
