// ============================================================
// Layer 6 — Artifact Store
// ============================================================
// Persists everything a downstream consumer needs to rebuild
// the trained model:
//
//   output_dir/
//     model.mpk.gz        ← weights (CompactRecorder)
//     train_config.json   ← full training configuration
//     tokenizer.json      ← written by the TokenizerStore
//
// Burn's CompactRecorder:
//   - Serialises model parameters to MessagePack format
//   - Compresses with gzip
//   - Type-safe: loading fails if the architecture doesn't match
//
// The same layout doubles as the "pretrained artifact" format:
// pointing --pretrained-dir at a directory saved by a previous
// run loads its weights as the starting point for fine-tuning.
//
// Failure contract: an output directory that cannot be created
// or written is fatal — no retry, no partial artifact.

use anyhow::{Context, Result};
use std::{fs, path::PathBuf};
use burn::{
    prelude::*,
    record::{HalfPrecisionSettings, NamedMpkGzFileRecorder, Recorder},
};

use crate::application::train_use_case::TrainConfig;
use crate::ml::model::TranslitModel;

/// Manages one artifact directory.
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    /// Open an artifact directory for writing, creating it if absent.
    /// Fails immediately if the directory cannot be created.
    pub fn create(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create output directory '{}'", dir.display()))?;
        Ok(Self { dir })
    }

    /// Open an existing artifact directory for reading (pretrained
    /// weights). Does not create anything.
    pub fn open(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &PathBuf {
        &self.dir
    }

    /// Save the trained model weights.
    ///
    /// Uses Burn's CompactRecorder which:
    ///   1. Calls model.into_record() to extract all parameters
    ///   2. Serialises to MessagePack, gzip-compressed
    ///   3. Writes to {dir}/model.mpk.gz
    pub fn save_model<B: Backend>(&self, model: &TranslitModel<B>) -> Result<()> {
        // Recorder adds the .mpk.gz extension itself
        let path = self.dir.join("model");

        NamedMpkGzFileRecorder::<HalfPrecisionSettings>::new()
            .record(model.clone().into_record(), path.clone())
            .with_context(|| format!("Failed to save model to '{}'", path.display()))?;

        tracing::info!("Saved model weights to '{}'", self.dir.display());
        Ok(())
    }

    /// Load saved weights into a freshly initialised model.
    ///
    /// The model parameter must have the matching architecture
    /// (vocab size, d_model, layers, ...) or loading fails.
    /// load_record() returns a new model with the loaded weights.
    pub fn load_model<B: Backend>(
        &self,
        model:  TranslitModel<B>,
        device: &B::Device,
    ) -> Result<TranslitModel<B>> {
        let path = self.dir.join("model");

        let record = NamedMpkGzFileRecorder::<HalfPrecisionSettings>::new()
            .load(path.clone(), device)
            .with_context(|| {
                format!("Cannot load model weights from '{}'", path.display())
            })?;

        Ok(model.load_record(record))
    }

    /// Save the training configuration to JSON.
    /// Whoever reloads the artifact needs it to rebuild the exact
    /// model architecture before loading the weights into it.
    pub fn save_config(&self, cfg: &TrainConfig) -> Result<()> {
        let path = self.dir.join("train_config.json");
        let json = serde_json::to_string_pretty(cfg)?;

        fs::write(&path, json)
            .with_context(|| format!("Cannot write config to '{}'", path.display()))?;

        tracing::debug!("Saved training config to '{}'", path.display());
        Ok(())
    }

    /// Load the training configuration from JSON.
    pub fn load_config(&self) -> Result<TrainConfig> {
        let path = self.dir.join("train_config.json");

        let json = fs::read_to_string(&path)
            .with_context(|| format!("Cannot read config from '{}'", path.display()))?;

        Ok(serde_json::from_str(&json)?)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::model::TranslitModelConfig;

    type TestBackend = burn::backend::NdArray;

    #[test]
    fn test_create_makes_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("nested/out");
        let store = ArtifactStore::create(&dir).unwrap();
        assert!(store.dir().exists());
    }

    #[test]
    fn test_unwritable_output_directory_is_fatal() {
        // A path through a regular file cannot be created as a directory
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("blocker");
        fs::write(&file, "x").unwrap();
        let result = ArtifactStore::create(file.join("out"));
        assert!(result.is_err());
    }

    #[test]
    fn test_model_save_load_round_trip() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ArtifactStore::create(tmp.path()).unwrap();

        let device = Default::default();
        let cfg = TranslitModelConfig::new(32, 16, 8, 2, 1, 16, 0.0, 0);
        let model: TranslitModel<TestBackend> = cfg.init(&device);

        store.save_model(&model).unwrap();
        assert!(tmp.path().join("model.mpk.gz").exists());

        let fresh: TranslitModel<TestBackend> = cfg.init(&device);
        let loaded = store.load_model(fresh, &device).unwrap();
        assert_eq!(loaded.max_seq_len, 16);
    }

    #[test]
    fn test_load_model_from_empty_dir_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ArtifactStore::open(tmp.path());

        let device = Default::default();
        let cfg = TranslitModelConfig::new(32, 16, 8, 2, 1, 16, 0.0, 0);
        let model: TranslitModel<TestBackend> = cfg.init(&device);

        assert!(store.load_model(model, &device).is_err());
    }
}
