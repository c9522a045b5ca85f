// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Full train + evaluation loop using Burn's DataLoader and AdamW.
//
// State per run: idle → epoch_running → epoch_evaluating →
// (next epoch | done). Any batch that produces a non-finite loss
// aborts the run immediately — no partial-epoch retry and no
// partial artifact, because the model is only persisted by the
// caller after every epoch has completed.
//
// Backend notes:
//   - Training uses an Autodiff backend for gradients
//   - model.valid() returns the model on the inner backend, with
//     dropout disabled for deterministic evaluation
//   - the evaluation batcher must also use the inner backend
//
// Reference: Burn Book §5
//            Loshchilov & Hutter (2019) Decoupled Weight Decay

use anyhow::{bail, Result};
use burn::{
    data::dataloader::DataLoaderBuilder,
    module::AutodiffModule,
    optim::{AdamWConfig, GradientsParams, Optimizer},
    prelude::*,
    tensor::backend::AutodiffBackend,
};

use crate::application::train_use_case::TrainConfig;
use crate::data::{batcher::TranslitBatcher, dataset::TranslitDataset};
use crate::infra::artifact::ArtifactStore;
use crate::infra::metrics::{EpochMetrics, MetricsLogger};
use crate::infra::tokenizer_store::TokenizerMeta;
use crate::ml::model::{TranslitModel, TranslitModelConfig};

type MyBackend = burn::backend::Autodiff<burn::backend::Wgpu>;

/// Train on the default device and persist the final model into
/// `output`. The artifact is written only after all epochs finish.
pub fn run_training(
    cfg:           &TrainConfig,
    train_dataset: TranslitDataset,
    eval_dataset:  TranslitDataset,
    meta:          TokenizerMeta,
    pretrained:    Option<&ArtifactStore>,
    output:        &ArtifactStore,
) -> Result<()> {
    let device = burn::backend::wgpu::WgpuDevice::default();
    tracing::info!("Using WGPU device: {:?}", device);

    let model = train_loop::<MyBackend>(
        cfg, train_dataset, eval_dataset, meta, pretrained, output, device,
    )?;

    output.save_model(&model)?;
    tracing::info!("Training complete!");
    Ok(())
}

/// Derive the model architecture from the run configuration plus
/// the actual vocabulary facts of the tokenizer in use.
pub fn model_config(cfg: &TrainConfig, meta: TokenizerMeta) -> TranslitModelConfig {
    TranslitModelConfig::new(
        meta.vocab_size,
        cfg.max_seq_len,
        cfg.d_model,
        cfg.num_heads,
        cfg.num_layers,
        cfg.d_ff,
        cfg.dropout,
        meta.pad_id as usize,
    )
}

pub fn train_loop<B: AutodiffBackend>(
    cfg:           &TrainConfig,
    train_dataset: TranslitDataset,
    eval_dataset:  TranslitDataset,
    meta:          TokenizerMeta,
    pretrained:    Option<&ArtifactStore>,
    output:        &ArtifactStore,
    device:        B::Device,
) -> Result<TranslitModel<B>> {

    // ── Build model, starting from pretrained weights if given ────────────────
    let model_cfg = model_config(cfg, meta);
    let mut model: TranslitModel<B> = model_cfg.init(&device);
    if let Some(store) = pretrained {
        tracing::info!("Loading pretrained weights from '{}'", store.dir().display());
        model = store.load_model(model, &device)?;
    }
    tracing::info!(
        "Model ready: {} layers, d_model={}, vocab={}",
        cfg.num_layers, cfg.d_model, meta.vocab_size
    );

    // ── AdamW optimiser ───────────────────────────────────────────────────────
    // Weight decay is applied decoupled from the gradient (directly
    // on the update), matching the original run's weight_decay=0.01.
    let optim_cfg = AdamWConfig::new()
        .with_weight_decay(cfg.weight_decay)
        .with_epsilon(1e-8);
    let mut optim = optim_cfg.init();

    // ── Training data loader (AutodiffBackend) ────────────────────────────────
    let train_batcher = TranslitBatcher::<B>::new(
        device.clone(), meta.pad_id, meta.bos_id, meta.eos_id,
    );
    let train_loader = DataLoaderBuilder::new(train_batcher)
        .batch_size(cfg.batch_size)
        .shuffle(cfg.seed)
        .num_workers(1)
        .build(train_dataset);

    // ── Evaluation data loader (InnerBackend — no autodiff overhead) ──────────
    // An empty holdout means no evaluation dataset is configured.
    let eval_loader = if eval_dataset.sample_count() > 0 {
        let eval_batcher = TranslitBatcher::<B::InnerBackend>::new(
            device.clone(), meta.pad_id, meta.bos_id, meta.eos_id,
        );
        Some(
            DataLoaderBuilder::new(eval_batcher)
                .batch_size(cfg.batch_size)
                .num_workers(1)
                .build(eval_dataset),
        )
    } else {
        tracing::info!("No evaluation holdout configured — skipping per-epoch evaluation");
        None
    };

    let metrics_logger = MetricsLogger::new(output.dir())?;
    let eval_every = cfg.eval_every.max(1);

    // ── Epoch loop ────────────────────────────────────────────────────────────
    for epoch in 1..=cfg.epochs {

        // ── Training phase ────────────────────────────────────────────────────
        let mut train_loss_sum = 0.0f64;
        let mut train_batches  = 0usize;

        for batch in train_loader.iter() {
            let (loss, _) = model.forward_loss(
                batch.source_ids,
                batch.source_pad_mask,
                batch.decoder_input,
                batch.labels,
            );

            let loss_val: f64 = loss.clone().into_scalar().elem();
            if !loss_val.is_finite() {
                // Numeric instability is unrecoverable: abort before
                // anything gets persisted.
                bail!(
                    "Non-finite training loss ({loss_val}) in epoch {epoch} — aborting run"
                );
            }
            train_loss_sum += loss_val;
            train_batches  += 1;

            // Backward pass + AdamW update
            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optim.step(cfg.lr, model, grads);
        }

        let avg_train_loss = if train_batches > 0 {
            train_loss_sum / train_batches as f64
        } else { f64::NAN };

        // ── Evaluation phase ──────────────────────────────────────────────────
        let mut avg_eval_loss = f64::NAN;
        let mut token_acc     = f64::NAN;

        if let Some(loader) = eval_loader.as_ref().filter(|_| epoch % eval_every == 0) {
            // model.valid() → TranslitModel<B::InnerBackend>,
            // dropout disabled for deterministic evaluation
            let model_eval = model.valid();

            let mut eval_loss_sum  = 0.0f64;
            let mut eval_batches   = 0usize;
            let mut correct_tokens = 0i64;
            let mut total_tokens   = 0i64;

            for batch in loader.iter() {
                let (loss, logits) = model_eval.forward_loss(
                    batch.source_ids,
                    batch.source_pad_mask,
                    batch.decoder_input,
                    batch.labels.clone(),
                );

                eval_loss_sum += loss.into_scalar().elem::<f64>();
                eval_batches  += 1;

                // Token accuracy over non-PAD label positions
                let [batch_size, tgt_len, _vocab] = logits.dims();
                let preds = logits.argmax(2).reshape([batch_size, tgt_len]);
                let pad_mask = batch.labels.clone().not_equal_elem(meta.pad_id as i32);

                let correct = preds.equal(batch.labels).int() * pad_mask.clone().int();
                correct_tokens += correct.sum().into_scalar().elem::<i64>();
                total_tokens   += pad_mask.int().sum().into_scalar().elem::<i64>();
            }

            avg_eval_loss = if eval_batches > 0 { eval_loss_sum / eval_batches as f64 } else { f64::NAN };
            token_acc     = if total_tokens > 0 { correct_tokens as f64 / total_tokens as f64 } else { 0.0 };
        }

        println!(
            "Epoch {:>3}/{} | train_loss={:.4} | eval_loss={:.4} | token_acc={:.1}%",
            epoch, cfg.epochs, avg_train_loss, avg_eval_loss, token_acc * 100.0,
        );

        metrics_logger.log(&EpochMetrics::new(epoch, avg_train_loss, avg_eval_loss, token_acc))?;
    }

    Ok(model)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::splitter::split_train_eval;
    use crate::data::tokenize::TokenizeAdapter;
    use crate::domain::pair::TranslitPair;
    use crate::infra::tokenizer_store::TokenizerStore;

    type TestAutodiff = burn::backend::Autodiff<burn::backend::NdArray>;

    fn tiny_config(out_dir: &str) -> TrainConfig {
        TrainConfig {
            dataset:        "unused.csv".to_string(),
            output_dir:     out_dir.to_string(),
            pretrained_dir: None,
            max_seq_len:    16,
            batch_size:     2,
            epochs:         1,
            lr:             1e-3,
            weight_decay:   0.01,
            eval_fraction:  0.0,
            eval_every:     1,
            tokenize_batch: 1000,
            d_model:        8,
            num_heads:      2,
            num_layers:     1,
            d_ff:           16,
            dropout:        0.0,
            vocab_size:     100,
            seed:           42,
        }
    }

    fn corpus_pairs() -> Vec<TranslitPair> {
        vec![
            TranslitPair::new("আমি ভালো আছি", "ami valo achi"),
            TranslitPair::new("তুমি কেমন আছ", "tumi kemon acho"),
        ]
    }

    /// The whole pipeline on the ndarray backend: tokenize two rows,
    /// train one epoch of a tiny model, persist, reload.
    #[test]
    fn test_end_to_end_tiny_run() {
        let tmp = tempfile::tempdir().unwrap();
        let out = tmp.path().join("fine_tuned_model");
        let cfg = tiny_config(out.to_str().unwrap());

        let pairs  = corpus_pairs();
        let output = ArtifactStore::create(&out).unwrap();

        // Tokenizer built from both columns, saved into the artifact dir
        let corpus: Vec<String> = pairs
            .iter()
            .flat_map(|p| [p.source().to_string(), p.target().to_string()])
            .collect();
        let tok_store = TokenizerStore::new(&out);
        let tokenizer = tok_store.load_or_build(&corpus, cfg.vocab_size).unwrap();
        let meta = TokenizerMeta::from_tokenizer(&tokenizer).unwrap();

        // Preprocessing
        let adapter = TokenizeAdapter::new(&tokenizer, cfg.max_seq_len, cfg.tokenize_batch);
        let samples = adapter.encode_all(&pairs).unwrap();
        let preprocessing_ids = samples[0].source_ids.clone();

        let (train, eval) = split_train_eval(samples, cfg.eval_fraction);
        let train_dataset = TranslitDataset::new(train);
        let eval_dataset  = TranslitDataset::new(eval);

        // One epoch on the CPU backend
        let device = Default::default();
        let model = train_loop::<TestAutodiff>(
            &cfg, train_dataset, eval_dataset, meta, None, &output, device,
        ).unwrap();
        output.save_model(&model).unwrap();
        output.save_config(&cfg).unwrap();

        // The artifact directory is complete
        assert!(out.join("model.mpk.gz").exists());
        assert!(out.join("tokenizer.json").exists());
        assert!(out.join("train_config.json").exists());
        assert!(out.join("metrics.csv").exists());

        // The saved tokenizer reproduces the preprocessing token ids
        let reloaded_tok = TokenizerStore::new(&out).load().unwrap();
        let ids = reloaded_tok
            .encode("ami valo achi", false)
            .unwrap()
            .get_ids()
            .to_vec();
        assert_eq!(ids, preprocessing_ids);

        // The saved weights load back into a matching architecture
        let device = Default::default();
        let fresh: TranslitModel<burn::backend::NdArray> =
            model_config(&cfg, meta).init(&device);
        let loaded = output.load_model(fresh, &device).unwrap();
        assert_eq!(loaded.max_seq_len, cfg.max_seq_len);
    }

    /// With a holdout configured, the evaluation pass runs and the
    /// metrics CSV records a finite eval loss.
    #[test]
    fn test_eval_holdout_produces_metrics() {
        let tmp = tempfile::tempdir().unwrap();
        let out = tmp.path().join("out");
        let mut cfg = tiny_config(out.to_str().unwrap());
        cfg.eval_fraction = 0.5;
        cfg.batch_size    = 1;

        let pairs  = corpus_pairs();
        let output = ArtifactStore::create(&out).unwrap();

        let corpus: Vec<String> = pairs
            .iter()
            .flat_map(|p| [p.source().to_string(), p.target().to_string()])
            .collect();
        let tokenizer = TokenizerStore::new(&out)
            .load_or_build(&corpus, cfg.vocab_size)
            .unwrap();
        let meta = TokenizerMeta::from_tokenizer(&tokenizer).unwrap();

        let adapter = TokenizeAdapter::new(&tokenizer, cfg.max_seq_len, cfg.tokenize_batch);
        let samples = adapter.encode_all(&pairs).unwrap();
        let (train, eval) = split_train_eval(samples, cfg.eval_fraction);

        let device = Default::default();
        train_loop::<TestAutodiff>(
            &cfg,
            TranslitDataset::new(train),
            TranslitDataset::new(eval),
            meta,
            None,
            &output,
            device,
        ).unwrap();

        let csv = std::fs::read_to_string(out.join("metrics.csv")).unwrap();
        let row = csv.lines().nth(1).unwrap();
        let eval_loss: f64 = row.split(',').nth(2).unwrap().parse().unwrap();
        assert!(eval_loss.is_finite());
    }
}
