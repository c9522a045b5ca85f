// ============================================================
// Layer 3 — TranslitPair Domain Type
// ============================================================
// Represents a single transliteration example in domain terms:
// one Bengali sentence and its informal Latin-script rendering
// ("Banglish"), exactly as they appeared in the corpus.
//
// The model learns the Banglish → Bengali direction, so the
// Banglish field is the SOURCE and the Bengali field is the
// TARGET. Neither field is validated or normalised here — rows
// flow through untouched and any malformed text is left for the
// tokenizer to deal with.

use serde::{Deserialize, Serialize};

/// One row of the training corpus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslitPair {
    /// Bengali-script text — the generation target
    pub bengali: String,

    /// Latin-script transliteration — the model input
    pub banglish: String,
}

impl TranslitPair {
    /// Create a new TranslitPair.
    /// Uses impl Into<String> so callers can pass &str or String.
    pub fn new(bengali: impl Into<String>, banglish: impl Into<String>) -> Self {
        Self {
            bengali:  bengali.into(),
            banglish: banglish.into(),
        }
    }

    /// The model input side of this pair
    pub fn source(&self) -> &str {
        &self.banglish
    }

    /// The generation target side of this pair
    pub fn target(&self) -> &str {
        &self.bengali
    }
}
