// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Cross-cutting concerns that don't belong in any specific
// business layer:
//
//   artifact.rs        — Saving and loading the model artifact.
//                        Uses Burn's CompactRecorder to serialise
//                        model parameters, plus the TrainConfig
//                        as JSON so the exact architecture can be
//                        rebuilt for inference.
//
//   tokenizer_store.rs — Tokenizer persistence.
//                        Loads the tokenizer of a pretrained
//                        artifact, or builds a word-level
//                        vocabulary from the corpus. Ensures the
//                        same vocabulary is used for training and
//                        for whoever reloads the artifact.
//
//   metrics.rs         — Training metrics logging.
//                        Writes epoch-level metrics (loss, token
//                        accuracy) to a CSV file in the output
//                        directory.
//
// Reference: Burn Book §5 (Checkpointing)

/// Model artifact saving and loading
pub mod artifact;

/// Tokenizer building, saving, and loading
pub mod tokenizer_store;

/// Training metrics CSV logger
pub mod metrics;
