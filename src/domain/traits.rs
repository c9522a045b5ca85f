// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// By programming against traits instead of concrete types the
// application layer can swap implementations without changing
// the code that uses them:
//   - CsvLoader implements PairSource
//   - a test can implement PairSource with an in-memory Vec
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use anyhow::Result;
use crate::domain::pair::TranslitPair;

/// Any component that can produce the ordered sequence of
/// transliteration pairs the pipeline trains on.
///
/// Implementations:
///   - CsvLoader → reads a two-column, headerless CSV file
pub trait PairSource {
    /// Load all pairs, preserving corpus order.
    /// Errors are unrecoverable startup errors — no retry.
    fn load_all(&self) -> Result<Vec<TranslitPair>>;
}
