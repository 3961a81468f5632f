//! # Statistics Module
//!
//! Contatori per il riepilogo finale dell'esecuzione.
//!
//! ## Statistiche tracciate:
//! - **files_found**: file MKV trovati nella directory
//! - **files_remuxed**: file rimuxati e sostituiti (o che lo sarebbero in dry run)
//! - **files_unchanged**: file per cui non c'era niente da fare
//! - **files_skipped**: file saltati (nessuna traccia audio nelle lingue richieste)
//! - **errors**: errori di identify, remux o sostituzione

use serde::Serialize;

/// Statistics tracker for one run
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct StripStats {
    pub files_found: usize,
    pub files_remuxed: usize,
    pub files_unchanged: usize,
    pub files_skipped: usize,
    pub errors: usize,
}

impl StripStats {
    pub fn new(files_found: usize) -> Self {
        Self {
            files_found,
            ..Default::default()
        }
    }

    pub fn add_remuxed(&mut self) {
        self.files_remuxed += 1;
    }

    pub fn add_unchanged(&mut self) {
        self.files_unchanged += 1;
    }

    pub fn add_skipped(&mut self) {
        self.files_skipped += 1;
    }

    pub fn add_error(&mut self) {
        self.errors += 1;
    }

    pub fn files_processed(&self) -> usize {
        self.files_remuxed + self.files_unchanged + self.files_skipped + self.errors
    }

    pub fn format_summary(&self) -> String {
        format!(
            "Processed: {}/{} files | Remuxed: {} | Unchanged: {} | Skipped: {} | Errors: {}",
            self.files_processed(),
            self.files_found,
            self.files_remuxed,
            self.files_unchanged,
            self.files_skipped,
            self.errors
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary() {
        let mut stats = StripStats::new(5);
        stats.add_remuxed();
        stats.add_remuxed();
        stats.add_unchanged();
        stats.add_skipped();
        stats.add_error();

        assert_eq!(stats.files_processed(), 5);
        assert_eq!(
            stats.format_summary(),
            "Processed: 5/5 files | Remuxed: 2 | Unchanged: 1 | Skipped: 1 | Errors: 1"
        );
    }
}
