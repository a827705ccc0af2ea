//! Early stopping on a validation metric.

/// Tracks a validation metric across boosting rounds and signals when it has
/// not improved for `patience` consecutive rounds.
///
/// # Example
///
/// ```
/// use adoptml::trainer::EarlyStopping;
///
/// // Validation logloss: lower is better.
/// let mut monitor = EarlyStopping::new(2, false);
/// for loss in [0.69, 0.61, 0.63, 0.64, 0.65] {
///     if monitor.should_stop(loss) {
///         break;
///     }
/// }
/// assert_eq!(monitor.best_round(), 1);
/// ```
#[derive(Clone, Debug)]
pub struct EarlyStopping {
    patience: usize,
    higher_is_better: bool,
    best_value: Option<f64>,
    best_round: usize,
    rounds_seen: usize,
}

impl EarlyStopping {
    pub fn new(patience: usize, higher_is_better: bool) -> Self {
        Self {
            patience,
            higher_is_better,
            best_value: None,
            best_round: 0,
            rounds_seen: 0,
        }
    }

    /// Record the metric of the next round. Returns `true` once the last
    /// `patience` rounds brought no improvement over the best one.
    pub fn should_stop(&mut self, value: f64) -> bool {
        let improved = match self.best_value {
            None => true,
            Some(best) if self.higher_is_better => value > best,
            Some(best) => value < best,
        };
        if improved {
            self.best_value = Some(value);
            self.best_round = self.rounds_seen;
        }
        self.rounds_seen += 1;

        self.rounds_seen - self.best_round > self.patience
    }

    pub fn best_value(&self) -> Option<f64> {
        self.best_value
    }

    /// Zero-based round of the best value.
    pub fn best_round(&self) -> usize {
        self.best_round
    }

    pub fn rounds_seen(&self) -> usize {
        self.rounds_seen
    }
}
