// ============================================================
// Layer 4 — Train/Validation Splitter
// ============================================================
// Shuffles samples and holds out a fraction for validation:
//   - Training set:   used to update model weights
//   - Validation set: forward passes only, to track
//                     reconstruction error on unseen synopses
//
// The scraped table is ordered by genre (all action movies,
// then adventure, ...). Without shuffling, the held-out tail
// would be nothing but westerns.
//
// Split ratio: 95% training, 5% validation by default.
// The shuffle is seeded so a run can be reproduced exactly.
//
// Uses Fisher-Yates shuffle via rand::seq::SliceRandom.
//
// Reference: rand crate documentation

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

pub const DEFAULT_HELD_OUT_FRACTION: f64 = 0.05;

/// Shuffle `samples` with `seed` and split into (train, validation).
///
/// # Arguments
/// * `samples`           - All available samples (consumed by this function)
/// * `held_out_fraction` - Proportion for validation, e.g. 0.05 = 5%
/// * `seed`              - RNG seed for the shuffle
///
/// # Example
/// ```ignore
/// let (train, val) = split_train_val(all_samples, 0.05, 42);
/// ```
pub fn split_train_val<T>(
    mut samples:       Vec<T>,
    held_out_fraction: f64,
    seed:              u64,
) -> (Vec<T>, Vec<T>) {
    let mut rng = StdRng::seed_from_u64(seed);
    samples.shuffle(&mut rng);

    // e.g. 100 samples * 0.05 = 5 → last 5 are validation
    let total     = samples.len();
    let fraction  = held_out_fraction.clamp(0.0, 1.0);
    let held_out  = ((total as f64) * fraction).round() as usize;
    let split_at  = total - held_out.min(total);

    let val = samples.split_off(split_at);

    tracing::debug!(
        "Dataset split: {} training, {} validation ({}% / {}%)",
        samples.len(),
        val.len(),
        (samples.len() * 100) / total.max(1),
        (val.len()     * 100) / total.max(1),
    );

    (samples, val)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_correct_split_sizes() {
        let items: Vec<usize> = (0..100).collect();
        let (train, val)      = split_train_val(items, DEFAULT_HELD_OUT_FRACTION, 42);
        assert_eq!(train.len(), 95);
        assert_eq!(val.len(),   5);
    }

    #[test]
    fn test_all_items_preserved() {
        let items: Vec<usize> = (0..50).collect();
        let (train, val)      = split_train_val(items, 0.3, 7);
        let mut all: Vec<usize> = train.into_iter().chain(val).collect();
        all.sort();
        assert_eq!(all, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn test_same_seed_same_split() {
        let a = split_train_val((0..40).collect::<Vec<u32>>(), 0.25, 99);
        let b = split_train_val((0..40).collect::<Vec<u32>>(), 0.25, 99);
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_dataset() {
        let items: Vec<usize> = Vec::new();
        let (train, val)      = split_train_val(items, 0.05, 42);
        assert!(train.is_empty());
        assert!(val.is_empty());
    }

    #[test]
    fn test_zero_held_out() {
        let items: Vec<usize> = (0..10).collect();
        let (train, val)      = split_train_val(items, 0.0, 42);
        assert_eq!(train.len(), 10);
        assert!(val.is_empty());
    }
}
