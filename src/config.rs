//! # Configuration Management Module
//!
//! Questo modulo gestisce tutta la configurazione dell'applicazione.
//!
//! ## Responsabilità:
//! - Definisce la struct `Config` con tutti i parametri di ottimizzazione
//! - Fornisce validazione robusta dei parametri di input
//! - Carica la configurazione di progetto (`app.json`) con default sensati
//!
//! ## Parametri di configurazione:
//! - `quality`: Qualità JPEG (1-100, default: 80)
//! - `save_originals`: Conserva gli originali come sibling `.orig` (default: false)
//! - `include`: Glob pattern per restringere i file processati (default: None)
//! - `exclude`: Glob pattern per escludere file dal processing (default: None)
//! - `workers`: Numero di worker paralleli (default: 4)
//!
//! ## Configurazione di progetto (`app.json`):
//! - `assetBundlePatterns`: Glob dei file considerati asset (default: `["**/*"]`)
//! - `web.output`: Directory di build web da escludere (default: `"web-build"`)
//!
//! ## Validazione:
//! - Controlla che quality sia 1-100
//! - Controlla che workers sia > 0
//!
//! ## Esempio:
//! ```rust,ignore
//! let config = Config {
//!     quality: 85,
//!     workers: 8,
//!     ..Default::default()
//! };
//! config.validate()?;
//! ```

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for an optimization run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// JPEG quality (1-100)
    pub quality: u8,
    /// Keep original files alongside compressed ones (with `.orig` suffix)
    pub save_originals: bool,
    /// Restrict processing to paths matching this glob
    pub include: Option<String>,
    /// Exclude paths matching this glob from processing
    pub exclude: Option<String>,
    /// Number of parallel workers
    pub workers: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            quality: 80,
            save_originals: false,
            include: None,
            exclude: None,
            workers: 4,
        }
    }
}

impl Config {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.quality == 0 || self.quality > 100 {
            return Err(anyhow::anyhow!("Quality must be between 1 and 100"));
        }

        if self.workers == 0 {
            return Err(anyhow::anyhow!("Number of workers must be greater than 0"));
        }

        Ok(())
    }
}

/// Project-level configuration read from `<project>/app.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectConfig {
    /// Glob patterns describing which files count as bundlable assets
    pub asset_bundle_patterns: Vec<String>,
    /// Web build settings
    pub web: WebConfig,
}

/// Web build section of the project configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    /// Name of the web build output directory, excluded from asset discovery
    pub output: String,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            asset_bundle_patterns: vec!["**/*".to_string()],
            web: WebConfig::default(),
        }
    }
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            output: "web-build".to_string(),
        }
    }
}

impl ProjectConfig {
    /// Load the project configuration from `<project_root>/app.json`.
    ///
    /// A missing file yields the defaults; unknown keys in the file are
    /// ignored so projects can carry unrelated configuration alongside.
    pub async fn load(project_root: &Path) -> Result<Self> {
        let path = project_root.join("app.json");
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(&path).await?;
        let config: ProjectConfig = serde_json::from_str(&content)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.quality = 0;
        assert!(config.validate().is_err());

        config.quality = 101;
        assert!(config.validate().is_err());

        config.quality = 80;
        config.workers = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.quality, 80);
        assert!(!config.save_originals);
        assert!(config.include.is_none());
        assert!(config.exclude.is_none());
        assert_eq!(config.workers, 4);
    }

    #[tokio::test]
    async fn test_project_config_missing_file() {
        let temp_dir = TempDir::new().unwrap();

        let config = ProjectConfig::load(temp_dir.path()).await.unwrap();

        assert_eq!(config.asset_bundle_patterns, vec!["**/*".to_string()]);
        assert_eq!(config.web.output, "web-build");
    }

    #[tokio::test]
    async fn test_project_config_load() {
        let temp_dir = TempDir::new().unwrap();
        let content = r#"{
            "name": "demo-project",
            "assetBundlePatterns": ["assets/**"],
            "web": { "output": "dist" }
        }"#;
        tokio::fs::write(temp_dir.path().join("app.json"), content)
            .await
            .unwrap();

        let config = ProjectConfig::load(temp_dir.path()).await.unwrap();

        assert_eq!(config.asset_bundle_patterns, vec!["assets/**".to_string()]);
        assert_eq!(config.web.output, "dist");
    }

    #[tokio::test]
    async fn test_project_config_partial_fields() {
        let temp_dir = TempDir::new().unwrap();
        tokio::fs::write(temp_dir.path().join("app.json"), r#"{"web": {}}"#)
            .await
            .unwrap();

        let config = ProjectConfig::load(temp_dir.path()).await.unwrap();

        assert_eq!(config.asset_bundle_patterns, vec!["**/*".to_string()]);
        assert_eq!(config.web.output, "web-build");
    }
}
