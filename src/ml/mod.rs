// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// This layer contains ALL Burn framework specific code.
// No other layer imports from burn directly — only this one
// and the data layer's tensor batching.
//
// What's in this layer:
//
//   model.rs     — The encoder–decoder transformer
//                  • Shared token embeddings
//                  • Learned positional embeddings
//                  • Encoder blocks (self-attention + FFN)
//                  • Decoder blocks (causal self-attention,
//                    cross-attention over encoder memory, FFN)
//                  • Linear LM head projecting to the vocabulary
//                  • Token-level cross-entropy ignoring [PAD]
//
//   trainer.rs   — The training loop
//                  Forward pass, loss computation, backward
//                  pass, AdamW step with weight decay, and a
//                  per-epoch evaluation pass over the holdout
//
// Reference: Burn Book §3 (Building Blocks), §5 (Training)
//            Vaswani et al. (2017) Attention Is All You Need

/// Encoder–decoder transliteration model architecture
pub mod model;

/// Full training loop with per-epoch evaluation
pub mod trainer;
