// ============================================================
// Layer 4 — CSV Corpus Loader
// ============================================================
// Loads the transliteration corpus from a delimited text file
// using the `csv` crate.
//
// File contract:
//   - exactly two columns: bengali_text, banglish_text
//   - no header row
//   - UTF-8 text
//
// Failure contract (all unrecoverable startup errors):
//   - missing or unreadable file
//   - a row with a field count other than two
//
// Row CONTENT is never validated — empty or malformed text is
// passed through unchanged and any failure it causes surfaces
// at the tokenization stage instead.

use anyhow::{bail, Context, Result};
use std::path::PathBuf;

use crate::domain::pair::TranslitPair;
use crate::domain::traits::PairSource;

/// Loads all (bengali, banglish) rows from one CSV file.
/// Implements the PairSource trait from Layer 3.
pub struct CsvLoader {
    /// Path to the CSV corpus
    path: PathBuf,
}

impl CsvLoader {
    /// Create a new CsvLoader pointed at a file
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl PairSource for CsvLoader {
    fn load_all(&self) -> Result<Vec<TranslitPair>> {
        // from_path fails immediately on a missing/unreadable file —
        // nothing downstream (tokenization, training) ever runs.
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_path(&self.path)
            .with_context(|| format!("Cannot open dataset '{}'", self.path.display()))?;

        let mut pairs = Vec::new();

        for (row, record) in reader.records().enumerate() {
            let record = record
                .with_context(|| format!("Malformed CSV row {} in '{}'", row + 1, self.path.display()))?;

            // The file declares two columns; anything else is fatal.
            if record.len() != 2 {
                bail!(
                    "Row {} of '{}' has {} fields, expected 2",
                    row + 1,
                    self.path.display(),
                    record.len()
                );
            }

            pairs.push(TranslitPair::new(&record[0], &record[1]));
        }

        tracing::info!("Loaded {} transliteration pairs", pairs.len());
        Ok(pairs)
    }
}
