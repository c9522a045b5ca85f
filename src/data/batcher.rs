// ============================================================
// Layer 4 — Transliteration Batcher
// ============================================================
// Implements Burn's Batcher trait to convert a Vec<TranslitSample>
// into GPU-ready tensors.
//
// Samples arrive truncated but UNPADDED, so this is where the
// dynamic padding happens:
//
//   source_ids    [batch, src_len]  padded with [PAD] to the
//                                   longest source in the batch
//   source_pad    [batch, src_len]  true where a position is padding
//   decoder_input [batch, tgt_len]  [BOS] + target, padded
//   labels        [batch, tgt_len]  target + [EOS], padded
//
// decoder_input/labels are the standard teacher-forcing shift:
// at step t the decoder sees target[..t] and must predict
// target[t], with [EOS] as the final prediction. [PAD] positions
// in the labels are excluded from the loss.
//
// Reference: Burn Book §4 (Batcher)
//            Vaswani et al. (2017) Attention Is All You Need

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::data::dataset::TranslitSample;

// ─── TranslitBatch ────────────────────────────────────────────────────────────
/// A batch of samples ready for the model forward pass.
/// All tensors have batch_size as their first dimension.
#[derive(Debug, Clone)]
pub struct TranslitBatch<B: Backend> {
    /// Source token ids — shape: [batch_size, src_len]
    pub source_ids: Tensor<B, 2, Int>,

    /// Source padding mask — shape: [batch_size, src_len]
    /// true = padding, false = real token
    pub source_pad_mask: Tensor<B, 2, Bool>,

    /// Decoder input ids ([BOS] + target) — shape: [batch_size, tgt_len]
    pub decoder_input: Tensor<B, 2, Int>,

    /// Label ids (target + [EOS]) — shape: [batch_size, tgt_len]
    pub labels: Tensor<B, 2, Int>,
}

// ─── TranslitBatcher ──────────────────────────────────────────────────────────
/// Holds the target device plus the special token ids needed to
/// build the shifted decoder sequences.
#[derive(Clone, Debug)]
pub struct TranslitBatcher<B: Backend> {
    /// The device to create tensors on
    pub device: B::Device,
    pad_id: u32,
    bos_id: u32,
    eos_id: u32,
}

impl<B: Backend> TranslitBatcher<B> {
    pub fn new(device: B::Device, pad_id: u32, bos_id: u32, eos_id: u32) -> Self {
        Self { device, pad_id, bos_id, eos_id }
    }
}

impl<B: Backend> Batcher<TranslitSample, TranslitBatch<B>> for TranslitBatcher<B> {
    /// Convert a Vec of TranslitSamples into a single TranslitBatch.
    ///
    /// Steps:
    ///   1. Find the longest source / target in the batch
    ///   2. Pad every source to src_len, build the pad mask from it
    ///   3. Build [BOS]+target and target+[EOS] rows, padded to tgt_len
    ///   4. Flatten row-major and reshape to [batch, len]
    fn batch(&self, items: Vec<TranslitSample>) -> TranslitBatch<B> {
        let batch_size = items.len();

        // Dynamic padding targets: longest sequence in THIS batch.
        // Empty sequences still get one slot so tensors are never 0-wide.
        let src_len = items.iter().map(|s| s.source_ids.len()).max().unwrap_or(1).max(1);
        let tgt_len = items.iter().map(|s| s.target_ids.len()).max().unwrap_or(0) + 1;

        let mut src_flat   = Vec::with_capacity(batch_size * src_len);
        let mut dec_flat   = Vec::with_capacity(batch_size * tgt_len);
        let mut label_flat = Vec::with_capacity(batch_size * tgt_len);

        for s in &items {
            // ── Source row, padded with [PAD] ─────────────────────────────────
            for i in 0..src_len {
                let id = s.source_ids.get(i).copied().unwrap_or(self.pad_id);
                src_flat.push(id as i32);
            }

            // ── Decoder input row: [BOS] t1 t2 ... [PAD] ──────────────────────
            dec_flat.push(self.bos_id as i32);
            for i in 0..tgt_len - 1 {
                let id = s.target_ids.get(i).copied().unwrap_or(self.pad_id);
                dec_flat.push(id as i32);
            }

            // ── Label row: t1 t2 ... [EOS] [PAD] ──────────────────────────────
            for i in 0..tgt_len {
                let id = if i < s.target_ids.len() {
                    s.target_ids[i]
                } else if i == s.target_ids.len() {
                    self.eos_id
                } else {
                    self.pad_id
                };
                label_flat.push(id as i32);
            }
        }

        let source_ids = Tensor::<B, 1, Int>::from_ints(
            src_flat.as_slice(), &self.device
        ).reshape([batch_size, src_len]);

        // Padding mask derived from the padded ids themselves
        let source_pad_mask = source_ids.clone().equal_elem(self.pad_id as i32);

        let decoder_input = Tensor::<B, 1, Int>::from_ints(
            dec_flat.as_slice(), &self.device
        ).reshape([batch_size, tgt_len]);

        let labels = Tensor::<B, 1, Int>::from_ints(
            label_flat.as_slice(), &self.device
        ).reshape([batch_size, tgt_len]);

        TranslitBatch {
            source_ids,
            source_pad_mask,
            decoder_input,
            labels,
        }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    type TestBackend = burn::backend::NdArray;

    const PAD: u32 = 0;
    const BOS: u32 = 2;
    const EOS: u32 = 3;

    fn sample(source: Vec<u32>, target: Vec<u32>) -> TranslitSample {
        TranslitSample { source_ids: source, target_ids: target }
    }

    fn batcher() -> TranslitBatcher<TestBackend> {
        TranslitBatcher::new(Default::default(), PAD, BOS, EOS)
    }

    #[test]
    fn test_pads_source_to_longest_in_batch() {
        let batch = batcher().batch(vec![
            sample(vec![5, 6, 7], vec![8]),
            sample(vec![5], vec![8, 9]),
        ]);

        assert_eq!(batch.source_ids.dims(), [2, 3]);
        let row1: Vec<i64> = batch.source_ids.clone()
            .slice([1..2, 0..3])
            .into_data()
            .to_vec()
            .unwrap();
        assert_eq!(row1, vec![5, PAD as i64, PAD as i64]);
    }

    #[test]
    fn test_pad_mask_marks_padding_only() {
        let batch = batcher().batch(vec![
            sample(vec![5, 6, 7], vec![8]),
            sample(vec![5], vec![8]),
        ]);

        let mask: Vec<bool> = batch.source_pad_mask.into_data().to_vec().unwrap();
        assert_eq!(mask, vec![false, false, false, false, true, true]);
    }

    #[test]
    fn test_decoder_shift_and_eos() {
        let batch = batcher().batch(vec![sample(vec![5], vec![8, 9])]);

        // tgt_len = 2 + 1 (EOS slot)
        assert_eq!(batch.decoder_input.dims(), [1, 3]);

        let dec: Vec<i64> = batch.decoder_input.into_data().to_vec().unwrap();
        assert_eq!(dec, vec![BOS as i64, 8, 9]);

        let labels: Vec<i64> = batch.labels.into_data().to_vec().unwrap();
        assert_eq!(labels, vec![8, 9, EOS as i64]);
    }

    #[test]
    fn test_short_target_padded_after_eos() {
        let batch = batcher().batch(vec![
            sample(vec![5], vec![8, 9]),
            sample(vec![5], vec![8]),
        ]);

        let labels: Vec<i64> = batch.labels.into_data().to_vec().unwrap();
        // Row 0: 8 9 EOS | Row 1: 8 EOS PAD
        assert_eq!(labels, vec![8, 9, EOS as i64, 8, EOS as i64, PAD as i64]);
    }
}
