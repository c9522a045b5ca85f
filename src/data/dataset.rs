use burn::data::dataset::Dataset;
use serde::{Deserialize, Serialize};

/// One tokenized training sample. Sequences are truncated but NOT
/// padded — padding happens per batch in the batcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslitSample {
    /// Banglish token ids (model input)
    pub source_ids: Vec<u32>,

    /// Bengali token ids (generation target, without BOS/EOS)
    pub target_ids: Vec<u32>,
}

pub struct TranslitDataset {
    samples: Vec<TranslitSample>,
}

impl TranslitDataset {
    pub fn new(samples: Vec<TranslitSample>) -> Self { Self { samples } }

    pub fn sample_count(&self) -> usize { self.samples.len() }
}

impl Dataset<TranslitSample> for TranslitDataset {
    fn get(&self, index: usize) -> Option<TranslitSample> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}
