// ============================================================
// Layer 6 — Tokenizer Store
// ============================================================
// Manages tokenizer building, saving, and loading.
//
// Two paths into a Tokenizer:
//   - a pretrained artifact directory already has tokenizer.json
//     → load it and copy it into the output directory, so the
//       artifact stays self-contained
//   - otherwise build a word-level vocabulary over BOTH corpus
//     columns (Bengali script and Latin script share one joint
//     vocabulary) and write the tokenizer JSON directly — this
//     bypasses the train_from_files ModelWrapper type mismatch
//     in tokenizers 0.15 entirely.
//
// Special tokens (fixed ids):
//   [PAD]=0  [UNK]=1  [BOS]=2  [EOS]=3
//
// No lowercasing and no normalizer: Bengali script must pass
// through byte-for-byte, and the original model this replaces
// was a cased multilingual checkpoint.

use anyhow::{Context, Result};
use std::path::PathBuf;
use tokenizers::Tokenizer;

pub const PAD_TOKEN: &str = "[PAD]";
pub const UNK_TOKEN: &str = "[UNK]";
pub const BOS_TOKEN: &str = "[BOS]";
pub const EOS_TOKEN: &str = "[EOS]";

/// Vocabulary facts the model and batcher need from the tokenizer.
#[derive(Debug, Clone, Copy)]
pub struct TokenizerMeta {
    pub vocab_size: usize,
    pub pad_id:     u32,
    pub bos_id:     u32,
    pub eos_id:     u32,
}

impl TokenizerMeta {
    /// Read the special-token ids off a loaded tokenizer.
    /// Fails if the tokenizer lacks any of the required specials.
    pub fn from_tokenizer(tokenizer: &Tokenizer) -> Result<Self> {
        let id_of = |tok: &str| {
            tokenizer
                .token_to_id(tok)
                .with_context(|| format!("Tokenizer has no '{tok}' token"))
        };
        Ok(Self {
            vocab_size: tokenizer.get_vocab_size(true),
            pad_id:     id_of(PAD_TOKEN)?,
            bos_id:     id_of(BOS_TOKEN)?,
            eos_id:     id_of(EOS_TOKEN)?,
        })
    }
}

pub struct TokenizerStore {
    dir: PathBuf,
}

impl TokenizerStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Load existing tokenizer.json from this directory, or build a
    /// new vocabulary from `texts` and save it here.
    pub fn load_or_build(&self, texts: &[String], vocab_size: usize) -> Result<Tokenizer> {
        let tok_path = self.dir.join("tokenizer.json");
        if tok_path.exists() {
            tracing::info!("Loading existing tokenizer from disk");
            self.load()
        } else {
            tracing::info!("Building new tokenizer (vocab cap {})", vocab_size);
            self.build_and_save(texts, vocab_size)
        }
    }

    /// Load a previously saved tokenizer from its JSON file.
    pub fn load(&self) -> Result<Tokenizer> {
        let path = self.dir.join("tokenizer.json");
        Tokenizer::from_file(&path)
            .map_err(|e| anyhow::anyhow!(
                "Cannot load tokenizer from '{}': {}", path.display(), e
            ))
    }

    /// Copy a tokenizer loaded from elsewhere into this directory,
    /// keeping the artifact self-contained.
    pub fn save_copy_of(&self, source: &TokenizerStore) -> Result<()> {
        std::fs::create_dir_all(&self.dir).ok();
        let from = source.dir.join("tokenizer.json");
        let to   = self.dir.join("tokenizer.json");
        std::fs::copy(&from, &to)
            .with_context(|| format!("Cannot copy tokenizer from '{}'", from.display()))?;
        Ok(())
    }

    /// Build a word-level vocabulary from the corpus and write a
    /// valid tokenizer JSON directly.
    fn build_and_save(&self, texts: &[String], vocab_size: usize) -> Result<Tokenizer> {
        std::fs::create_dir_all(&self.dir).ok();

        // ── Step 1: Count word frequencies over the whole corpus ─────────────
        use std::collections::HashMap;
        let mut freq: HashMap<String, usize> = HashMap::new();

        for text in texts {
            for word in text.split_whitespace() {
                *freq.entry(word.to_string()).or_insert(0) += 1;
            }
        }

        // Sort by frequency descending (ties broken alphabetically so
        // the id assignment is deterministic), cap at vocab_size - 4
        // to reserve slots for the special tokens.
        let mut words: Vec<(String, usize)> = freq.into_iter().collect();
        words.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        let max_words = vocab_size.saturating_sub(4);
        words.truncate(max_words);

        // ── Step 2: Build vocab JSON with fixed special-token ids ─────────────
        let mut vocab = serde_json::Map::new();
        vocab.insert(PAD_TOKEN.to_string(), serde_json::json!(0));
        vocab.insert(UNK_TOKEN.to_string(), serde_json::json!(1));
        vocab.insert(BOS_TOKEN.to_string(), serde_json::json!(2));
        vocab.insert(EOS_TOKEN.to_string(), serde_json::json!(3));

        let mut next_id = 4usize;
        for (word, _) in &words {
            if !vocab.contains_key(word.as_str()) {
                vocab.insert(word.clone(), serde_json::json!(next_id));
                next_id += 1;
            }
        }

        // ── Step 3: Write tokenizer JSON in HuggingFace format ────────────────
        // This format is what Tokenizer::from_file() expects.
        let tokenizer_json = serde_json::json!({
            "version": "1.0",
            "truncation": null,
            "padding": null,
            "added_tokens": [
                {"id": 0, "content": PAD_TOKEN, "single_word": false, "lstrip": false, "rstrip": false, "normalized": false, "special": true},
                {"id": 1, "content": UNK_TOKEN, "single_word": false, "lstrip": false, "rstrip": false, "normalized": false, "special": true},
                {"id": 2, "content": BOS_TOKEN, "single_word": false, "lstrip": false, "rstrip": false, "normalized": false, "special": true},
                {"id": 3, "content": EOS_TOKEN, "single_word": false, "lstrip": false, "rstrip": false, "normalized": false, "special": true}
            ],
            // WhitespaceSplit matches the split_whitespace() used when
            // counting the vocabulary — tokens are whole whitespace-
            // delimited words, punctuation included.
            "normalizer": null,
            "pre_tokenizer": {
                "type": "WhitespaceSplit"
            },
            "post_processor": null,
            "decoder": null,
            "model": {
                "type": "WordLevel",
                "vocab": vocab,
                "unk_token": UNK_TOKEN
            }
        });

        let tok_path = self.dir.join("tokenizer.json");
        std::fs::write(
            &tok_path,
            serde_json::to_string_pretty(&tokenizer_json)?
        ).with_context(|| "Cannot write tokenizer JSON")?;

        tracing::info!(
            "Tokenizer built with {} entries, saved to '{}'",
            next_id,
            tok_path.display()
        );

        // Load back as a proper Tokenizer instance
        Tokenizer::from_file(&tok_path)
            .map_err(|e| anyhow::anyhow!("Cannot reload tokenizer: {e}"))
    }
}
