// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything from the raw CSV file to GPU-ready tensor batches.
//
// The pipeline flows in this order:
//
//   dataset.csv
//       │
//       ▼
//   CsvLoader          → reads (bengali, banglish) rows
//       │
//       ▼
//   TokenizeAdapter    → batched mapping to token-id sequences
//       │                (truncation only — no padding yet)
//       ▼
//   split_train_eval   → shuffled evaluation holdout
//       │
//       ▼
//   TranslitDataset    → implements Burn's Dataset trait
//       │
//       ▼
//   TranslitBatcher    → pads to longest-in-batch, builds the
//       │                teacher-forcing decoder input/labels
//       ▼
//   DataLoader         → feeds batches to the training loop
//
// Each module is responsible for exactly one step, so each step
// is independently testable and replaceable.
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

/// Reads the two-column CSV corpus
pub mod loader;

/// Converts text pairs to token-id sequences in mapping batches
pub mod tokenize;

/// Implements Burn's Dataset trait for tokenized samples
pub mod dataset;

/// Implements Burn's Batcher trait with dynamic padding
pub mod batcher;

/// Shuffles and splits data into train/evaluation sets
pub mod splitter;
