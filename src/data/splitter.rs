// ============================================================
// Layer 4 — Train/Evaluation Splitter
// ============================================================
// Randomly shuffles samples and holds out a fraction of them
// for the per-epoch evaluation pass:
//   - Training set:   used to update model weights
//   - Evaluation set: measures loss/accuracy on unseen rows
//
// An eval_fraction of 0.0 produces an empty holdout, which the
// trainer treats as "no evaluation dataset configured".
//
// Uses Fisher-Yates shuffle via rand::seq::SliceRandom.

use rand::seq::SliceRandom;

/// Randomly shuffle `samples` and split into (train, eval).
///
/// # Arguments
/// * `samples`       - All available samples (consumed)
/// * `eval_fraction` - Proportion held out for evaluation, e.g. 0.1
///
/// # Returns
/// A tuple (train_samples, eval_samples)
pub fn split_train_eval<T>(mut samples: Vec<T>, eval_fraction: f64) -> (Vec<T>, Vec<T>) {
    let mut rng = rand::thread_rng();

    // Fisher-Yates shuffle — every permutation is equally likely
    samples.shuffle(&mut rng);

    // e.g. 100 samples * 0.1 eval → first 90 are training
    let total    = samples.len();
    let split_at = ((total as f64) * (1.0 - eval_fraction)).round() as usize;

    // Clamp to valid range to avoid panics on tiny datasets
    let split_at = split_at.min(total);

    // split_off(n) removes elements [n..] from the Vec and returns them
    let eval = samples.split_off(split_at);

    tracing::debug!(
        "Dataset split: {} training, {} evaluation",
        samples.len(),
        eval.len(),
    );

    (samples, eval)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_correct_split_sizes() {
        let items: Vec<usize> = (0..100).collect();
        let (train, eval)     = split_train_eval(items, 0.2);
        assert_eq!(train.len(), 80);
        assert_eq!(eval.len(),  20);
    }

    #[test]
    fn test_all_items_preserved() {
        // No items should be lost in the split
        let items: Vec<usize> = (0..50).collect();
        let (train, eval)     = split_train_eval(items, 0.3);
        assert_eq!(train.len() + eval.len(), 50);
    }

    #[test]
    fn test_empty_dataset() {
        let items: Vec<usize> = Vec::new();
        let (train, eval)     = split_train_eval(items, 0.2);
        assert!(train.is_empty());
        assert!(eval.is_empty());
    }

    #[test]
    fn test_zero_fraction_disables_holdout() {
        // 0.0 means everything goes to training — no eval set
        let items: Vec<usize> = (0..10).collect();
        let (train, eval)     = split_train_eval(items, 0.0);
        assert_eq!(train.len(), 10);
        assert!(eval.is_empty());
    }
}
