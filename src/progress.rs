//! # Progress Tracking and Statistics Module
//!
//! Questo modulo gestisce il progress tracking e le statistiche di run.
//!
//! ## Responsabilità:
//! - Progress bar visual con `indicatif` per feedback real-time
//! - Tracking statistiche di ottimizzazione (file processati, saved, skipped)
//! - Report finale human-readable
//!
//! ## Statistiche tracciate:
//! - **files_processed**: Totale file elaborati
//! - **files_optimized**: File effettivamente sostituiti con la versione compressa
//! - **files_skipped**: File saltati (già nel manifest o riduzione assente)
//! - **total_bytes_saved**: Byte totali risparmiati
//!
//! ## Report finale:
//! - Byte risparmiati in formato leggibile ("1.20 MB saved")
//! - Con zero byte risparmiati il report dice che gli asset sono già
//!   completamente compressi, invece di mostrare un conteggio di byte
//!
//! ## Esempio:
//! ```rust,ignore
//! let progress = ProgressManager::new(total_files);
//! let mut stats = OptimizationStats::new();
//!
//! stats.add_optimized(original_size, new_size);
//! progress.update("✅ photo.jpg");
//!
//! progress.finish(&stats.format_summary());
//! ```

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Manages progress reporting for an optimization run
#[derive(Clone)]
pub struct ProgressManager {
    bar: ProgressBar,
}

impl ProgressManager {
    /// Create a new progress manager
    pub fn new(total_files: u64) -> Self {
        let bar = ProgressBar::new(total_files);

        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
                .unwrap()
                .progress_chars("=>-"),
        );

        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// Update progress with a message
    pub fn update(&self, message: &str) {
        self.bar.inc(1);
        self.bar.set_message(message.to_string());
    }

    /// Finish with a final message
    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }
}

/// Statistics tracker for a single run
#[derive(Debug, Default)]
pub struct OptimizationStats {
    pub files_processed: usize,
    pub files_optimized: usize,
    pub files_skipped: usize,
    pub total_bytes_saved: u64,
    pub total_original_size: u64,
}

impl OptimizationStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a file whose compressed version replaced the original
    pub fn add_optimized(&mut self, original_size: u64, new_size: u64) {
        self.files_processed += 1;
        self.files_optimized += 1;
        self.total_original_size += original_size;
        self.total_bytes_saved += original_size.saturating_sub(new_size);
    }

    /// Record a file left untouched (already optimized or no size win)
    pub fn add_skipped(&mut self, original_size: u64) {
        self.files_processed += 1;
        self.files_skipped += 1;
        self.total_original_size += original_size;
    }

    pub fn overall_reduction_percent(&self) -> f64 {
        if self.total_original_size > 0 {
            (self.total_bytes_saved as f64 / self.total_original_size as f64) * 100.0
        } else {
            0.0
        }
    }

    /// One-line summary for the end of the run
    pub fn format_summary(&self) -> String {
        if self.total_bytes_saved == 0 {
            format!(
                "Processed: {} files | Assets are already fully compressed",
                self.files_processed
            )
        } else {
            format!(
                "Processed: {} files | Optimized: {} | Skipped: {} | {} saved ({:.2}%)",
                self.files_processed,
                self.files_optimized,
                self.files_skipped,
                crate::swap::format_size(self.total_bytes_saved),
                self.overall_reduction_percent()
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_accumulate() {
        let mut stats = OptimizationStats::new();
        stats.add_optimized(1000, 400);
        stats.add_skipped(500);

        assert_eq!(stats.files_processed, 2);
        assert_eq!(stats.files_optimized, 1);
        assert_eq!(stats.files_skipped, 1);
        assert_eq!(stats.total_bytes_saved, 600);
        assert_eq!(stats.total_original_size, 1500);
        assert!((stats.overall_reduction_percent() - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_summary_reports_bytes_saved() {
        let mut stats = OptimizationStats::new();
        stats.add_optimized(2048, 1024);

        let summary = stats.format_summary();
        assert!(summary.contains("1.00 KB saved"));
    }

    #[test]
    fn test_zero_savings_reports_fully_compressed() {
        let mut stats = OptimizationStats::new();
        stats.add_skipped(2048);

        let summary = stats.format_summary();
        assert!(summary.contains("fully compressed"));
        assert!(!summary.contains("saved"));
    }
}
