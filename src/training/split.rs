//! Train / test row split

use crate::error::{PipelineError, Result};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Options for `train_test_split`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitOptions {
    /// Share of rows held out, in `(0, 1)`
    pub test_size: f64,
    pub shuffle: bool,
    pub random_state: Option<u64>,
}

impl Default for SplitOptions {
    fn default() -> Self {
        Self {
            test_size: 0.2,
            shuffle: true,
            random_state: None,
        }
    }
}

impl SplitOptions {
    pub fn with_test_size(mut self, test_size: f64) -> Self {
        self.test_size = test_size;
        self
    }

    pub fn with_shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = Some(seed);
        self
    }
}

/// Split `0..n_samples` into (train, test) row indices. The test side gets
/// `ceil(n_samples * test_size)` rows; without shuffling it is the tail.
pub fn train_test_split(n_samples: usize, options: &SplitOptions) -> Result<(Vec<usize>, Vec<usize>)> {
    if !(options.test_size > 0.0 && options.test_size < 1.0) {
        return Err(PipelineError::InvalidParameter {
            name: "test_size".to_string(),
            value: options.test_size.to_string(),
            reason: "must be in (0, 1)".to_string(),
        });
    }

    let n_test = (n_samples as f64 * options.test_size).ceil() as usize;
    if n_test == 0 || n_test >= n_samples {
        return Err(PipelineError::ValidationError(format!(
            "test_size {} on {} samples leaves an empty side",
            options.test_size, n_samples
        )));
    }

    let mut indices: Vec<usize> = (0..n_samples).collect();
    if options.shuffle {
        let mut rng = match options.random_state {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        indices.shuffle(&mut rng);
    }

    let test = indices.split_off(n_samples - n_test);
    Ok((indices, test))
}
