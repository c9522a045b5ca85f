// ============================================================
// Layer 4 — Tokenization Adapter
// ============================================================
// Converts (bengali, banglish) text pairs into the token-id
// sequences the model consumes.
//
// Contract:
//   - processes the corpus in mapping batches of a configurable
//     size (encode_batch), not row by row
//   - source sequences are truncated to max_seq_len
//   - target sequences are truncated to max_seq_len - 1, leaving
//     one slot for the BOS/EOS shift applied at batch time
//   - NO padding here — padding is dynamic, per batch, and lives
//     in the batcher
//   - pure: the input pairs are never modified
//
// Deterministic: encoding the same row twice with the same
// tokenizer produces identical id sequences.

use anyhow::Result;
use tokenizers::Tokenizer;

use crate::data::dataset::TranslitSample;
use crate::domain::pair::TranslitPair;

/// Maps text pairs to token-id pairs with truncation.
pub struct TokenizeAdapter<'t> {
    tokenizer:     &'t Tokenizer,
    max_seq_len:   usize,
    mapping_batch: usize,
}

impl<'t> TokenizeAdapter<'t> {
    /// Create a new adapter.
    /// `mapping_batch` is clamped to at least 1.
    pub fn new(tokenizer: &'t Tokenizer, max_seq_len: usize, mapping_batch: usize) -> Self {
        Self {
            tokenizer,
            max_seq_len,
            mapping_batch: mapping_batch.max(1),
        }
    }

    /// Tokenize the whole corpus, one mapping batch at a time.
    /// Returns one TranslitSample per input pair, in corpus order.
    pub fn encode_all(&self, pairs: &[TranslitPair]) -> Result<Vec<TranslitSample>> {
        let mut samples = Vec::with_capacity(pairs.len());

        for chunk in pairs.chunks(self.mapping_batch) {
            // Encode all sources of this chunk in one call, then all
            // targets — the tokenizers crate parallelises internally.
            let sources: Vec<&str> = chunk.iter().map(|p| p.source()).collect();
            let targets: Vec<&str> = chunk.iter().map(|p| p.target()).collect();

            let src_encodings = self
                .tokenizer
                .encode_batch(sources, false)
                .map_err(|e| anyhow::anyhow!("Source tokenization error: {e}"))?;
            let tgt_encodings = self
                .tokenizer
                .encode_batch(targets, false)
                .map_err(|e| anyhow::anyhow!("Target tokenization error: {e}"))?;

            for (src, tgt) in src_encodings.iter().zip(tgt_encodings.iter()) {
                let mut source_ids: Vec<u32> = src.get_ids().to_vec();
                let mut target_ids: Vec<u32> = tgt.get_ids().to_vec();

                // Truncation only — discard trailing tokens past the limit.
                source_ids.truncate(self.max_seq_len);
                // The batcher prepends [BOS] (decoder input) or appends
                // [EOS] (labels), so the raw target gets one slot less.
                target_ids.truncate(self.max_seq_len.saturating_sub(1));

                samples.push(TranslitSample { source_ids, target_ids });
            }
        }

        Ok(samples)
    }

    /// Tokenize a single source text, truncated to max_seq_len.
    pub fn encode_source(&self, text: &str) -> Result<Vec<u32>> {
        let enc = self
            .tokenizer
            .encode(text, false)
            .map_err(|e| anyhow::anyhow!("Tokenization error: {e}"))?;
        let mut ids = enc.get_ids().to_vec();
        ids.truncate(self.max_seq_len);
        Ok(ids)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::tokenizer_store::TokenizerStore;

    /// Build a small word-level tokenizer over a mixed-script corpus.
    fn test_tokenizer(dir: &tempfile::TempDir) -> Tokenizer {
        let corpus = vec![
            "ami valo achi".to_string(),
            "tumi kemon acho".to_string(),
            "আমি ভালো আছি".to_string(),
            "তুমি কেমন আছ".to_string(),
        ];
        TokenizerStore::new(dir.path().to_str().unwrap())
            .load_or_build(&corpus, 100)
            .unwrap()
    }

    fn pairs() -> Vec<TranslitPair> {
        vec![
            TranslitPair::new("আমি ভালো আছি", "ami valo achi"),
            TranslitPair::new("তুমি কেমন আছ", "tumi kemon acho"),
        ]
    }

    #[test]
    fn test_one_sample_per_pair() {
        let dir = tempfile::tempdir().unwrap();
        let tok = test_tokenizer(&dir);
        let adapter = TokenizeAdapter::new(&tok, 16, 1000);
        let samples = adapter.encode_all(&pairs()).unwrap();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].source_ids.len(), 3); // three words
        assert_eq!(samples[0].target_ids.len(), 3);
    }

    #[test]
    fn test_idempotence() {
        let dir = tempfile::tempdir().unwrap();
        let tok = test_tokenizer(&dir);
        let adapter = TokenizeAdapter::new(&tok, 16, 1000);
        let a = adapter.encode_all(&pairs()).unwrap();
        let b = adapter.encode_all(&pairs()).unwrap();
        assert_eq!(a[0].source_ids, b[0].source_ids);
        assert_eq!(a[1].target_ids, b[1].target_ids);
    }

    #[test]
    fn test_mapping_batch_size_does_not_change_output() {
        let dir = tempfile::tempdir().unwrap();
        let tok = test_tokenizer(&dir);
        let big   = TokenizeAdapter::new(&tok, 16, 1000).encode_all(&pairs()).unwrap();
        let small = TokenizeAdapter::new(&tok, 16, 1).encode_all(&pairs()).unwrap();
        assert_eq!(big[0].source_ids, small[0].source_ids);
        assert_eq!(big[1].source_ids, small[1].source_ids);
    }

    #[test]
    fn test_truncation_to_exactly_max_len() {
        let dir = tempfile::tempdir().unwrap();
        let tok = test_tokenizer(&dir);
        let adapter = TokenizeAdapter::new(&tok, 4, 1000);

        // 10 words — well past the 4 token limit
        let long = TranslitPair::new(
            "আমি আমি আমি আমি আমি আমি আমি আমি আমি আমি",
            "ami ami ami ami ami ami ami ami ami ami",
        );
        let samples = adapter.encode_all(&[long]).unwrap();
        assert_eq!(samples[0].source_ids.len(), 4);
        // target reserves one slot for the BOS/EOS shift
        assert_eq!(samples[0].target_ids.len(), 3);
    }

    #[test]
    fn test_round_trip_below_max_len() {
        let dir = tempfile::tempdir().unwrap();
        let tok = test_tokenizer(&dir);
        let adapter = TokenizeAdapter::new(&tok, 64, 1000);

        let ids = adapter.encode_source("ami valo achi").unwrap();
        let decoded = tok.decode(&ids, true).unwrap();
        assert_eq!(decoded, "ami valo achi");
    }
}
