//! # Asset Optimizer Library
//!
//! Questo è il modulo principale della libreria che espone tutte le API pubbliche.
//!
//! ## Responsabilità:
//! - Definisce la struttura modulare dell'applicazione
//! - Espone i tipi e le funzioni principali tramite re-exports
//! - Fornisce un'interfaccia pulita per il main.rs e per altri consumatori
//!
//! ## Architettura dei moduli:
//! - `config`: Configurazione del run e della project (`app.json`)
//! - `error`: Tipi di errore custom per diverse operazioni
//! - `manifest`: Manifest `.expo-shared/assets.json` (hash già ottimizzati)
//! - `hasher`: Digest SHA-256 del contenuto dei file
//! - `discovery`: Discovery degli asset via glob include/exclude
//! - `compressor`: Compressione immagini tramite tool esterni
//! - `platform`: Risoluzione cross-platform dei comandi esterni
//! - `swap`: Decisione accept/reject e swap atomico con rollback
//! - `optimizer`: Orchestratore principale del processo
//! - `progress`: Progress tracking e statistiche
//!
//! ## Utilizzo:
//! ```rust,ignore
//! use asset_optimizer::{AssetOptimizer, Config};
//!
//! let config = Config::default();
//! let mut optimizer = AssetOptimizer::new(&project_root, config).await?;
//! let stats = optimizer.run().await?;
//! ```

pub mod compressor;
pub mod config;
pub mod discovery;
pub mod error;
pub mod hasher;
pub mod manifest;
pub mod optimizer;
pub mod platform;
pub mod progress;
pub mod swap;
pub mod utils;

pub use config::{Config, ProjectConfig};
pub use error::OptimizeError;
pub use manifest::ManifestStore;
pub use optimizer::AssetOptimizer;
