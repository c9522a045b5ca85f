// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the `train` subcommand and all its configurable flags.
//
// The defaults reproduce the constants of the original training
// script: lr 2e-5, batch size 16, 3 epochs, weight decay 0.01,
// evaluation once per epoch. Making them flags (instead of inline
// constants) keeps the pipeline testable with substitutable paths
// and small synthetic datasets.
//
// clap's derive macros automatically generate:
//   - help text (--help)
//   - error messages for missing args
//   - type conversion (string → usize, f64, etc.)

use clap::{Args, Subcommand};
use crate::application::train_use_case::TrainConfig;

/// The top-level subcommands available to the user
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train the transliteration model on a two-column CSV corpus
    Train(TrainArgs),
}

/// All arguments for the `train` command.
/// Each field becomes a --flag on the command line.
#[derive(Args, Debug)]
pub struct TrainArgs {
    /// CSV file with two unnamed columns: bengali_text,banglish_text
    #[arg(long, default_value = "data/dataset.csv")]
    pub dataset: String,

    /// Directory to save the fine-tuned model and tokenizer
    #[arg(long, default_value = "data/fine_tuned_model")]
    pub output_dir: String,

    /// Directory holding a previously saved model + tokenizer to
    /// start from (weights are loaded before training begins)
    #[arg(long)]
    pub pretrained_dir: Option<String>,

    /// Maximum number of tokens per sequence — longer sequences
    /// are truncated, never padded, at the tokenization stage
    #[arg(long, default_value_t = 128)]
    pub max_seq_len: usize,

    /// Number of samples processed together in one forward pass
    #[arg(long, default_value_t = 16)]
    pub batch_size: usize,

    /// Number of full passes through the training data
    #[arg(long, default_value_t = 3)]
    pub epochs: usize,

    /// Learning rate for the AdamW optimiser
    #[arg(long, default_value_t = 2e-5)]
    pub lr: f64,

    /// Decoupled weight decay applied by AdamW on every update
    #[arg(long, default_value_t = 0.01)]
    pub weight_decay: f32,

    /// Fraction of rows held out for per-epoch evaluation.
    /// 0.0 disables the evaluation pass entirely.
    #[arg(long, default_value_t = 0.1)]
    pub eval_fraction: f64,

    /// Evaluate every N epochs (1 = once per epoch)
    #[arg(long, default_value_t = 1)]
    pub eval_every: usize,

    /// Number of rows tokenized together in one mapping batch
    #[arg(long, default_value_t = 1000)]
    pub tokenize_batch: usize,

    /// Hidden dimension of the transformer (d_model in the paper)
    #[arg(long, default_value_t = 256)]
    pub d_model: usize,

    /// Number of attention heads — d_model must be divisible by this
    #[arg(long, default_value_t = 8)]
    pub num_heads: usize,

    /// Number of stacked encoder layers (and decoder layers)
    #[arg(long, default_value_t = 4)]
    pub num_layers: usize,

    /// Inner dimension of the feed-forward network
    #[arg(long, default_value_t = 1024)]
    pub d_ff: usize,

    /// Dropout probability during training
    #[arg(long, default_value_t = 0.1)]
    pub dropout: f64,

    /// Cap on the number of unique tokens in a freshly built vocabulary
    #[arg(long, default_value_t = 30000)]
    pub vocab_size: usize,

    /// Seed for the dataloader shuffle
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

/// Convert CLI TrainArgs into the application-layer TrainConfig.
/// This is the boundary between Layer 1 and Layer 2 —
/// the application layer never sees clap types.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            dataset:        a.dataset,
            output_dir:     a.output_dir,
            pretrained_dir: a.pretrained_dir,
            max_seq_len:    a.max_seq_len,
            batch_size:     a.batch_size,
            epochs:         a.epochs,
            lr:             a.lr,
            weight_decay:   a.weight_decay,
            eval_fraction:  a.eval_fraction,
            eval_every:     a.eval_every,
            tokenize_batch: a.tokenize_batch,
            d_model:        a.d_model,
            num_heads:      a.num_heads,
            num_layers:     a.num_layers,
            d_ff:           a.d_ff,
            dropout:        a.dropout,
            vocab_size:     a.vocab_size,
            seed:           a.seed,
        }
    }
}
