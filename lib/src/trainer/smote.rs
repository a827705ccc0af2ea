//! SMOTE oversampling of the minority class.
//!
//! Each synthetic row lies on the segment between a random minority row and
//! one of its `k` nearest minority neighbours (Euclidean distance). The
//! minority class is grown until both classes have the same size. Only the
//! training partition is ever resampled.

use super::error::TrainingError;
use ndarray::{Array2, ArrayView1, ArrayView2, Axis};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Synthetic minority oversampling.
#[derive(Clone, Debug)]
pub struct Smote {
    k_neighbors: usize,
    seed: u64,
}

impl Smote {
    pub fn new(k_neighbors: usize, seed: u64) -> Self {
        Self { k_neighbors, seed }
    }

    pub fn k_neighbors(&self) -> usize {
        self.k_neighbors
    }

    /// Return the original rows followed by the synthetic minority rows.
    pub fn resample(
        &self,
        features: ArrayView2<'_, f64>,
        target: &[f64],
    ) -> Result<(Array2<f64>, Vec<f64>), TrainingError> {
        if self.k_neighbors == 0 {
            return Err(TrainingError::InvalidConfig(
                "SMOTE needs at least one neighbour".to_string(),
            ));
        }
        if features.nrows() != target.len() {
            return Err(TrainingError::InvalidConfig(format!(
                "{} rows but {} labels",
                features.nrows(),
                target.len()
            )));
        }

        let positives: Vec<usize> = (0..target.len()).filter(|&i| target[i] >= 0.5).collect();
        let negatives: Vec<usize> = (0..target.len()).filter(|&i| target[i] < 0.5).collect();
        let (minority, n_majority, label) = if positives.len() <= negatives.len() {
            (positives, negatives.len(), 1.0)
        } else {
            (negatives, positives.len(), 0.0)
        };

        let n_synthetic = n_majority - minority.len();
        if n_synthetic == 0 {
            return Ok((features.to_owned(), target.to_vec()));
        }
        if minority.len() < 2 {
            return Err(TrainingError::InsufficientData(format!(
                "SMOTE needs at least 2 minority rows, found {}",
                minority.len()
            )));
        }

        let k = self.k_neighbors.min(minority.len() - 1);
        let neighbours: Vec<Vec<usize>> = minority
            .iter()
            .map(|&row| nearest(features, &minority, row, k))
            .collect();

        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let mut synthetic = Array2::zeros((n_synthetic, features.ncols()));
        for mut out in synthetic.rows_mut() {
            let pick = rng.gen_range(0..minority.len());
            let base = features.row(minority[pick]);
            let other = features.row(neighbours[pick][rng.gen_range(0..k)]);
            let gap: f64 = rng.gen();
            out.assign(&(&base + &((&other - &base) * gap)));
        }

        let resampled = ndarray::concatenate(Axis(0), &[features.view(), synthetic.view()])
            .map_err(|e| TrainingError::InvalidConfig(e.to_string()))?;
        let mut labels = target.to_vec();
        labels.extend(std::iter::repeat(label).take(n_synthetic));

        tracing::info!(
            minority = minority.len(),
            synthetic = n_synthetic,
            rows = resampled.nrows(),
            "SMOTE rebalanced training partition"
        );
        Ok((resampled, labels))
    }
}

fn squared_distance(a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// The `k` rows of `candidates` closest to `row`, excluding `row` itself.
fn nearest(features: ArrayView2<'_, f64>, candidates: &[usize], row: usize, k: usize) -> Vec<usize> {
    let origin = features.row(row);
    let mut by_distance: Vec<(f64, usize)> = candidates
        .iter()
        .filter(|&&c| c != row)
        .map(|&c| (squared_distance(origin, features.row(c)), c))
        .collect();
    by_distance.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
    by_distance.into_iter().take(k).map(|(_, c)| c).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn imbalanced() -> (Array2<f64>, Vec<f64>) {
        let x = array![
            [0.0, 0.0],
            [1.0, 0.0],
            [0.0, 1.0],
            [1.0, 1.0],
            [0.5, 0.5],
            [10.0, 10.0],
            [11.0, 10.0],
        ];
        let y = vec![0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0];
        (x, y)
    }

    #[test]
    fn test_smote_balances_classes() {
        let (x, y) = imbalanced();
        let (xs, ys) = Smote::new(5, 42).resample(x.view(), &y).unwrap();

        assert_eq!(xs.nrows(), 10);
        assert_eq!(ys.iter().filter(|&&v| v == 1.0).count(), 5);
        assert_eq!(xs.slice(ndarray::s![..7, ..]), x);
    }

    #[test]
    fn test_synthetic_rows_lie_between_minority_rows() {
        let (x, y) = imbalanced();
        let (xs, _) = Smote::new(5, 42).resample(x.view(), &y).unwrap();
        for row in xs.rows().into_iter().skip(7) {
            assert!((10.0..=11.0).contains(&row[0]));
            assert_eq!(row[1], 10.0);
        }
    }

    #[test]
    fn test_smote_is_seeded() {
        let (x, y) = imbalanced();
        let a = Smote::new(5, 1).resample(x.view(), &y).unwrap();
        let b = Smote::new(5, 1).resample(x.view(), &y).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_balanced_input_unchanged() {
        let x = array![[0.0], [1.0]];
        let y = vec![0.0, 1.0];
        let (xs, ys) = Smote::new(5, 42).resample(x.view(), &y).unwrap();
        assert_eq!(xs, x);
        assert_eq!(ys, y);
    }

    #[test]
    fn test_single_minority_row() {
        let x = array![[0.0], [1.0], [2.0]];
        let y = vec![0.0, 0.0, 1.0];
        assert!(matches!(
            Smote::new(5, 42).resample(x.view(), &y),
            Err(TrainingError::InsufficientData(_))
        ));
    }
}
