// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates the full training pipeline in order:
//
//   Step 1: Load the CSV corpus        (Layer 4 - data)
//   Step 2: Load / build tokenizer     (Layer 6 - infra)
//   Step 3: Tokenize in batches        (Layer 4 - data)
//   Step 4: Split train/evaluation     (Layer 4 - data)
//   Step 5: Build Burn datasets        (Layer 4 - data)
//   Step 6: Save config                (Layer 6 - infra)
//   Step 7: Run training + persist     (Layer 5 - ml)
//
// The pipeline is a single synchronous pass: each stage completes
// fully before the next starts, and the first unrecoverable error
// ends the run.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::data::{
    dataset::TranslitDataset,
    loader::CsvLoader,
    splitter::split_train_eval,
    tokenize::TokenizeAdapter,
};
use crate::domain::traits::PairSource;
use crate::infra::{
    artifact::ArtifactStore,
    tokenizer_store::{TokenizerMeta, TokenizerStore},
};
use crate::ml::trainer::run_training;

// ─── Training Configuration ──────────────────────────────────────────────────
// All parameters for a training run, immutable once built.
// Serialisable so it can be saved into the artifact directory and
// reloaded by whoever rebuilds the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub dataset:        String,
    pub output_dir:     String,
    pub pretrained_dir: Option<String>,
    pub max_seq_len:    usize,
    pub batch_size:     usize,
    pub epochs:         usize,
    pub lr:             f64,
    pub weight_decay:   f32,
    pub eval_fraction:  f64,
    pub eval_every:     usize,
    pub tokenize_batch: usize,
    pub d_model:        usize,
    pub num_heads:      usize,
    pub num_layers:     usize,
    pub d_ff:           usize,
    pub dropout:        f64,
    pub vocab_size:     usize,
    pub seed:           u64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            dataset:        "data/dataset.csv".to_string(),
            output_dir:     "data/fine_tuned_model".to_string(),
            pretrained_dir: None,
            max_seq_len:    128,
            batch_size:     16,
            epochs:         3,
            lr:             2e-5,
            weight_decay:   0.01,
            eval_fraction:  0.1,
            eval_every:     1,
            tokenize_batch: 1000,
            d_model:        256,
            num_heads:      8,
            num_layers:     4,
            d_ff:           1024,
            dropout:        0.1,
            vocab_size:     30000,
            seed:           42,
        }
    }
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
// Owns the config and runs the full training pipeline.
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    /// Create a new TrainUseCase with the given configuration
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Execute the full training pipeline end to end
    pub fn execute(&self) -> Result<()> {
        let cfg = &self.config;

        // ── Step 1: Load the CSV corpus ──────────────────────────────────────
        // Fails before anything downstream runs if the file is missing
        // or a row has the wrong field count.
        tracing::info!("Loading corpus from '{}'", cfg.dataset);
        let loader = CsvLoader::new(&cfg.dataset);
        let pairs  = loader.load_all()?;

        // The output directory is created up front: an unwritable
        // target is fatal and should surface before hours of training.
        let output = ArtifactStore::create(&cfg.output_dir)?;
        let tok_store = TokenizerStore::new(cfg.output_dir.as_str());

        // ── Step 2: Load or build the tokenizer ──────────────────────────────
        // A pretrained artifact carries its own vocabulary; the copy
        // keeps the new artifact directory self-contained.
        let tokenizer = match &cfg.pretrained_dir {
            Some(dir) => {
                tracing::info!("Loading pretrained tokenizer from '{dir}'");
                let pretrained_tok = TokenizerStore::new(dir.as_str());
                let tokenizer = pretrained_tok.load()?;
                tok_store.save_copy_of(&pretrained_tok)?;
                tokenizer
            }
            None => {
                // Vocabulary over BOTH columns — source and target share it
                let corpus: Vec<String> = pairs
                    .iter()
                    .flat_map(|p| [p.source().to_string(), p.target().to_string()])
                    .collect();
                tok_store.load_or_build(&corpus, cfg.vocab_size)?
            }
        };
        let meta = TokenizerMeta::from_tokenizer(&tokenizer)?;

        // ── Step 3: Tokenize the corpus in mapping batches ───────────────────
        let adapter = TokenizeAdapter::new(&tokenizer, cfg.max_seq_len, cfg.tokenize_batch);
        let samples = adapter.encode_all(&pairs)?;
        tracing::info!("Tokenized {} samples", samples.len());

        // ── Step 4: Train / evaluation split ─────────────────────────────────
        // eval_fraction 0.0 → empty holdout → no per-epoch evaluation
        let (train_samples, eval_samples) = split_train_eval(samples, cfg.eval_fraction);
        tracing::info!(
            "Split: {} train, {} evaluation",
            train_samples.len(),
            eval_samples.len()
        );

        // ── Step 5: Build Burn datasets ──────────────────────────────────────
        let train_dataset = TranslitDataset::new(train_samples);
        let eval_dataset  = TranslitDataset::new(eval_samples);

        // ── Step 6: Save config into the artifact ────────────────────────────
        output.save_config(cfg)?;

        // ── Step 7: Run training; the model is persisted only after ──────────
        // every epoch completes
        let pretrained = cfg.pretrained_dir.as_ref().map(ArtifactStore::open);
        run_training(
            cfg,
            train_dataset,
            eval_dataset,
            meta,
            pretrained.as_ref(),
            &output,
        )?;

        Ok(())
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_dataset_fails_before_any_output() {
        let tmp = tempfile::tempdir().unwrap();
        let out = tmp.path().join("out");

        let cfg = TrainConfig {
            dataset:    "no/such/file.csv".to_string(),
            output_dir: out.to_str().unwrap().to_string(),
            ..TrainConfig::default()
        };

        let result = TrainUseCase::new(cfg).execute();
        assert!(result.is_err());
        // Loader failed first — nothing was tokenized, trained, or written
        assert!(!out.exists());
    }

    #[test]
    fn test_default_config_matches_original_run() {
        let cfg = TrainConfig::default();
        assert_eq!(cfg.lr, 2e-5);
        assert_eq!(cfg.batch_size, 16);
        assert_eq!(cfg.epochs, 3);
        assert_eq!(cfg.weight_decay, 0.01);
        assert_eq!(cfg.eval_every, 1);
    }
}
