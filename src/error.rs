//! # Error Types Module
//!
//! Questo modulo definisce tutti i tipi di errore custom dell'applicazione.
//!
//! ## Responsabilità:
//! - Definisce `OptimizeError` enum per categorizzare tutti gli errori possibili
//! - Fornisce messaggi di errore descrittivi e strutturati
//! - Integra con `thiserror` per automatic error conversion
//! - Supporta error chaining per mantenere il contesto degli errori
//!
//! ## Categorie di errori:
//! - `Io`: Errori di I/O (file non trovati, permessi, etc.)
//! - `Json`: Errori di parsing/serializzazione del manifest JSON
//! - `Image`: Errori di rilevamento formato immagine
//! - `InvalidPattern`: Glob pattern malformato (include/exclude/bundle patterns)
//! - `Compression`: Errori dei tool esterni di compressione
//! - `MissingDependency`: Tool esterno mancante (jpegoptim, oxipng, etc.)
//! - `Validation`: Errori di validazione input
//!
//! ## Vantaggi:
//! - Errori tipizzati per handling specifico
//! - Automatic conversion da errori standard
//! - Integration con `anyhow` per error propagation
//!
//! ## Esempio:
//! ```rust,ignore
//! if !tool_exists {
//!     return Err(OptimizeError::MissingDependency("jpegoptim".to_string()));
//! }
//! ```

/// Custom error types for asset optimization
#[derive(thiserror::Error, Debug)]
pub enum OptimizeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Manifest JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Image format error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Invalid glob pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("Compression error: {0}")]
    Compression(String),

    #[error("Dependency missing: {0}")]
    MissingDependency(String),

    #[error("Validation error: {0}")]
    Validation(String),
}
