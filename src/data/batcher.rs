// ============================================================
// Layer 4 — Reconstruction Batcher
// ============================================================
// Implements Burn's Batcher trait to turn a Vec<SynopsisSample>
// into one pair of [batch, max_seq_len] Int tensors.
//
// For an autoencoder the target IS the input:
//   input_ids = [s1_t1 .. s1_tL, s2_t1 .. sN_tL] → [N, L]
//   targets   = input_ids
//
// All samples are already exactly max_seq_len long (checked
// when the dataset is built), so no dynamic padding happens here.
//
// Batch count: the DataLoader keeps the trailing partial
// batch, so an epoch over N samples with batch size B has
// ceil(N / B) batches, see batches_per_epoch().
//
// Reference: Burn Book §4 (Batcher)

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::data::dataset::SynopsisSample;

pub const DEFAULT_BATCH_SIZE: usize = 8;

/// A batch of token sequences paired with their reconstruction targets.
#[derive(Debug, Clone)]
pub struct ReconstructionBatch<B: Backend> {
    /// [batch_size, max_seq_len]
    pub input_ids: Tensor<B, 2, Int>,

    /// [batch_size, max_seq_len], identical to input_ids
    pub targets: Tensor<B, 2, Int>,
}

impl<B: Backend> ReconstructionBatch<B> {
    /// (batch_size, seq_len)
    pub fn shape(&self) -> (usize, usize) {
        let [batch_size, seq_len] = self.input_ids.dims();
        (batch_size, seq_len)
    }
}

#[derive(Clone, Debug)]
pub struct SynopsisBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> SynopsisBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

impl<B: Backend> Batcher<B, SynopsisSample, ReconstructionBatch<B>> for SynopsisBatcher<B> {
    fn batch(&self, items: Vec<SynopsisSample>, _device: &B::Device) -> ReconstructionBatch<B> {
        let batch_size = items.len();
        let seq_len    = items.first().map(|s| s.token_ids.len()).unwrap_or(0);

        // Burn uses i32 for Int tensor data
        let flat: Vec<i32> = items
            .iter()
            .flat_map(|s| s.token_ids.iter().map(|&x| x as i32))
            .collect();

        let input_ids = Tensor::<B, 1, Int>::from_ints(flat.as_slice(), &self.device)
            .reshape([batch_size, seq_len]);

        ReconstructionBatch {
            targets: input_ids.clone(),
            input_ids,
        }
    }
}

/// Batches per epoch for `n` samples; the trailing partial batch counts.
pub fn batches_per_epoch(n: usize, batch_size: usize) -> usize {
    if batch_size == 0 {
        return 0;
    }
    n.div_ceil(batch_size)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use burn::data::dataloader::DataLoaderBuilder;

    use crate::data::dataset::SynopsisDataset;

    type TestBackend = NdArray;

    fn samples(n: usize, len: usize) -> Vec<SynopsisSample> {
        (0..n)
            .map(|i| SynopsisSample { doc_index: i, token_ids: vec![i as u32; len] })
            .collect()
    }

    #[test]
    fn test_batch_shapes_and_targets() {
        let batcher = SynopsisBatcher::<TestBackend>::new(Default::default());
        let batch   = batcher.batch(samples(3, 4), &batcher.device);
        assert_eq!(batch.shape(), (3, 4));

        let inputs: Vec<i64> = batch.input_ids.into_data().convert::<i64>().to_vec().unwrap();
        let targets: Vec<i64> = batch.targets.into_data().convert::<i64>().to_vec().unwrap();
        assert_eq!(inputs, targets);
        assert_eq!(&inputs[4..8], &[1, 1, 1, 1]);
    }

    #[test]
    fn test_batches_per_epoch_is_ceil() {
        assert_eq!(batches_per_epoch(16, 8), 2);
        assert_eq!(batches_per_epoch(17, 8), 3);
        assert_eq!(batches_per_epoch(1, 8), 1);
        assert_eq!(batches_per_epoch(0, 8), 0);
    }

    #[test]
    fn test_dataloader_keeps_partial_batch() {
        for n in [1usize, 7, 8, 9, 21] {
            let dataset = SynopsisDataset::new(samples(n, 5), 5).unwrap();
            let loader  = DataLoaderBuilder::new(SynopsisBatcher::<TestBackend>::new(Default::default()))
                .batch_size(DEFAULT_BATCH_SIZE)
                .shuffle(42)
                .build(dataset);

            let sizes: Vec<usize> = loader.iter().map(|b| b.shape().0).collect();
            assert_eq!(sizes.len(), batches_per_epoch(n, DEFAULT_BATCH_SIZE), "n = {n}");
            assert_eq!(sizes.iter().sum::<usize>(), n);
        }
    }
}
