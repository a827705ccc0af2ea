//! Seeded train / validation / test partitioning.

use super::error::TrainingError;
use ndarray::{Array2, ArrayView2, Axis};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Row indices of the three partitions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Split {
    pub train: Vec<usize>,
    pub validation: Vec<usize>,
    pub test: Vec<usize>,
}

/// Shuffle `indices` with a fresh generator seeded by `seed` and cut off the
/// first `ceil(len * fraction)` of them.
fn holdout(
    mut indices: Vec<usize>,
    fraction: f64,
    seed: u64,
    what: &str,
) -> Result<(Vec<usize>, Vec<usize>), TrainingError> {
    if !(fraction > 0.0 && fraction < 1.0) {
        return Err(TrainingError::InvalidConfig(format!(
            "{} fraction must lie in (0, 1), got {}",
            what, fraction
        )));
    }
    let n_holdout = (indices.len() as f64 * fraction).ceil() as usize;
    if n_holdout == 0 || n_holdout >= indices.len() {
        return Err(TrainingError::InsufficientData(format!(
            "{} rows cannot be split into a non-empty {} partition and remainder",
            indices.len(),
            what
        )));
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    indices.shuffle(&mut rng);
    let rest = indices.split_off(n_holdout);
    Ok((rest, indices))
}

/// Split `n_rows` rows: first `test_fraction` of all rows into test, then
/// `validation_fraction` of the remainder into validation. The same seed
/// always yields the same partitions.
pub fn train_val_test_split(
    n_rows: usize,
    test_fraction: f64,
    validation_fraction: f64,
    seed: u64,
) -> Result<Split, TrainingError> {
    let (rest, test) = holdout((0..n_rows).collect(), test_fraction, seed, "test")?;
    let (train, validation) = holdout(rest, validation_fraction, seed, "validation")?;
    tracing::info!(
        train = train.len(),
        validation = validation.len(),
        test = test.len(),
        seed,
        "split dataset"
    );
    Ok(Split {
        train,
        validation,
        test,
    })
}

/// Shuffle `rows` with a generator seeded by `seed` and deal them into `k`
/// held-out folds. Fold sizes differ by at most one.
pub fn k_fold(rows: &[usize], k: usize, seed: u64) -> Result<Vec<Vec<usize>>, TrainingError> {
    if k < 2 {
        return Err(TrainingError::InvalidConfig(format!(
            "cross-validation needs at least 2 folds, got {}",
            k
        )));
    }
    if rows.len() < k {
        return Err(TrainingError::InsufficientData(format!(
            "{} rows cannot fill {} folds",
            rows.len(),
            k
        )));
    }

    let mut shuffled = rows.to_vec();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    shuffled.shuffle(&mut rng);

    let mut folds = vec![Vec::with_capacity(rows.len() / k + 1); k];
    for (i, row) in shuffled.into_iter().enumerate() {
        folds[i % k].push(row);
    }
    Ok(folds)
}

/// Gather rows of a matrix and its labels.
pub fn take_rows(
    features: ArrayView2<'_, f64>,
    target: &[f64],
    rows: &[usize],
) -> (Array2<f64>, Vec<f64>) {
    (
        features.select(Axis(0), rows),
        rows.iter().map(|&r| target[r]).collect(),
    )
}
