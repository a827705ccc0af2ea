//! The encoding pipeline: fixed stage order, two modes.

use super::state::{EncodedMatrix, FeatureSchema, LearnedState};
use crate::dataset::Table;
use crate::preprocessing::encoding::{
    BinaryTargetEncoder, CountEncoder, LabelEncoder, OneHotEncoder, OrdinalEncoder,
};
use crate::preprocessing::error::PreprocessingError;
use crate::preprocessing::policy::{ColumnPolicy, EncodingKind};
use crate::preprocessing::traits::{Encoder, FittedEncoder};
use ndarray::Array2;

/// Everything produced by [`Pipeline::fit_transform`].
#[derive(Clone, Debug)]
pub struct FitOutput {
    /// Encoded feature matrix, columns in schema order.
    pub matrix: EncodedMatrix,
    /// Binarized target, one entry per row.
    pub target: Vec<f64>,
    pub state: LearnedState,
    pub schema: FeatureSchema,
}

/// Config-driven encoding pipeline.
///
/// Stages run in a fixed order: one-hot, label, ordinal, count, target.
/// [`fit_transform`](Pipeline::fit_transform) learns the state of every
/// stage; [`transform_for_inference`](Pipeline::transform_for_inference)
/// replays a learned state and never relearns anything.
///
/// # Example
/// ```ignore
/// use adoptml::preprocessing::{ColumnPolicy, Pipeline};
///
/// let pipeline = Pipeline::new(ColumnPolicy::pet_adoption())?;
/// let fit = pipeline.fit_transform(training_table)?;
///
/// let encoded = pipeline.transform_for_inference(record, &fit.state)?;
/// ```
#[derive(Clone, Debug)]
pub struct Pipeline {
    policy: ColumnPolicy,
}

impl Pipeline {
    /// Build a pipeline, validating the policy before any stage can run.
    pub fn new(policy: ColumnPolicy) -> Result<Self, PreprocessingError> {
        policy.validate()?;
        Ok(Self { policy })
    }

    pub fn policy(&self) -> &ColumnPolicy {
        &self.policy
    }

    /// Fit every stage on `table` and encode it.
    pub fn fit_transform(&self, table: Table) -> Result<FitOutput, PreprocessingError> {
        if table.n_rows() == 0 {
            return Err(PreprocessingError::EmptyData(
                "Cannot fit pipeline on empty data".to_string(),
            ));
        }
        self.policy.check_columns(&table, true)?;
        let passthrough = passthrough_columns(&self.policy, &table)?;
        let policy = &self.policy;
        let mut table = table;

        let mut one_hot = Vec::with_capacity(policy.one_hot_columns.len());
        for column in &policy.one_hot_columns {
            let (next, fitted) = fit_stage(OneHotEncoder::new(column), table, "one-hot")?;
            table = next;
            one_hot.push(fitted);
        }

        let mut label = Vec::with_capacity(policy.label_columns.len());
        for column in &policy.label_columns {
            let encoder = LabelEncoder::new(column).with_handle_unknown(policy.label_unknown);
            let (next, fitted) = fit_stage(encoder, table, "label")?;
            table = next;
            label.push(fitted);
        }

        let mut ordinal = Vec::with_capacity(policy.ordinal_columns.len());
        for (column, order) in &policy.ordinal_columns {
            let encoder = OrdinalEncoder::new(column, order.clone());
            let (next, fitted) = fit_stage(encoder, table, "ordinal")?;
            table = next;
            ordinal.push(fitted);
        }

        let count = match &policy.count_column {
            Some(column) => {
                let encoder =
                    CountEncoder::new(column).with_unseen_default(policy.count_unseen_default);
                let (next, fitted) = fit_stage(encoder, table, "count")?;
                table = next;
                Some(fitted)
            }
            None => None,
        };

        let encoder = BinaryTargetEncoder::new(&policy.target_column, policy.target_labels.clone());
        let (mut table, target_state) = fit_stage(encoder, table, "target")?;
        let (_, target_column) = table.take_column(&policy.target_column)?;
        let target = target_column
            .values()
            .iter()
            .map(|v| v.as_f64().unwrap_or_default())
            .collect();

        let matrix = to_matrix(&table)?;
        let schema = FeatureSchema::new(matrix.columns().to_vec())?;
        tracing::info!(
            rows = matrix.n_rows(),
            features = schema.len(),
            positive_rate = target_state.positive_rate(),
            "pipeline fitted"
        );

        Ok(FitOutput {
            matrix,
            target,
            state: LearnedState {
                one_hot,
                label,
                ordinal,
                count,
                target: target_state,
                passthrough,
            },
            schema,
        })
    }

    /// Replay a learned state on inference records.
    ///
    /// The target column is not expected; if present it is dropped. The
    /// output is not yet aligned to the schema: one-hot dummies reflect the
    /// categories observed in this batch.
    pub fn transform_for_inference(
        &self,
        table: Table,
        state: &LearnedState,
    ) -> Result<EncodedMatrix, PreprocessingError> {
        state.matches(&self.policy)?;
        let mut table = table;
        if table.contains(&self.policy.target_column) {
            tracing::debug!(column = %self.policy.target_column, "dropping target column at inference");
            table.take_column(&self.policy.target_column)?;
        }
        self.policy.check_columns(&table, false)?;
        drop_unknown_columns(&self.policy, state, &mut table)?;

        for fitted in &state.one_hot {
            table = replay_stage(fitted, table, "one-hot")?;
        }
        for fitted in &state.label {
            table = replay_stage(fitted, table, "label")?;
        }
        for fitted in &state.ordinal {
            table = replay_stage(fitted, table, "ordinal")?;
        }
        if let Some(fitted) = &state.count {
            table = replay_stage(fitted, table, "count")?;
        }

        to_matrix(&table)
    }
}

fn fit_stage<E: Encoder>(
    encoder: E,
    table: Table,
    stage: &'static str,
) -> Result<(Table, E::Fitted), PreprocessingError> {
    let (table, fitted) = encoder.fit_transform(table)?;
    tracing::debug!(stage, column = encoder.column(), width = table.n_cols(), "stage fitted");
    Ok((table, fitted))
}

fn replay_stage<F: FittedEncoder>(
    fitted: &F,
    table: Table,
    stage: &'static str,
) -> Result<Table, PreprocessingError> {
    let table = fitted.transform(table)?;
    tracing::debug!(stage, column = fitted.column(), width = table.n_cols(), "stage replayed");
    Ok(table)
}

/// Names of the unassigned columns, all of which must be numeric.
///
/// Runs before any encoder so a stray text column fails the fit up front.
fn passthrough_columns(policy: &ColumnPolicy, table: &Table) -> Result<Vec<String>, PreprocessingError> {
    let mut names = Vec::new();
    for column in table.columns() {
        if policy.kind_of(column.name()) != EncodingKind::Passthrough {
            continue;
        }
        if let Some(text) = column.values().iter().find(|v| v.as_f64().is_none()) {
            return Err(PreprocessingError::PolicyValidation(format!(
                "column `{}` has no encoding assigned and holds non-numeric value `{}`",
                column.name(),
                text
            )));
        }
        names.push(column.name().to_string());
    }
    Ok(names)
}

/// Remove unassigned columns that were not present at fit.
///
/// They can never reach the feature schema, so they are dropped here instead
/// of being encoded.
fn drop_unknown_columns(
    policy: &ColumnPolicy,
    state: &LearnedState,
    table: &mut Table,
) -> Result<(), PreprocessingError> {
    let unknown: Vec<String> = table
        .column_names()
        .into_iter()
        .filter(|name| {
            policy.kind_of(name) == EncodingKind::Passthrough
                && !state.passthrough.iter().any(|p| p == name)
        })
        .map(str::to_string)
        .collect();
    if unknown.is_empty() {
        return Ok(());
    }
    tracing::warn!(columns = ?unknown, "dropping input columns unknown to the fitted pipeline");
    for name in &unknown {
        table.take_column(name)?;
    }
    Ok(())
}

/// Collect the remaining columns into a matrix.
///
/// Everything left after the encoders ran is either encoded or passthrough,
/// so a text cell here means an unassigned categorical column.
fn to_matrix(table: &Table) -> Result<EncodedMatrix, PreprocessingError> {
    let mut values = Array2::zeros((table.n_rows(), table.n_cols()));
    for (j, column) in table.columns().iter().enumerate() {
        for (i, value) in column.values().iter().enumerate() {
            values[[i, j]] = value.as_f64().ok_or_else(|| {
                PreprocessingError::PolicyValidation(format!(
                    "column `{}` has no encoding assigned and holds non-numeric value `{}`",
                    column.name(),
                    value
                ))
            })?;
        }
    }
    let names = table.column_names().into_iter().map(str::to_string).collect();
    EncodedMatrix::new(names, values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Value;
    use crate::preprocessing::policy::UnknownLabel;
    use approx::assert_abs_diff_eq;

    fn shelter() -> Table {
        Table::from_rows(
            ["Type", "Age", "Color1", "Health", "Breed1", "Fee", "Adopted"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            vec![
                vec!["Dog".into(), Value::Int(2), "Brown".into(), "Healthy".into(), "Beagle".into(), Value::Int(100), "yes".into()],
                vec!["Cat".into(), Value::Int(5), "Black".into(), "Minor Injury".into(), "Tabby".into(), Value::Int(0), "no".into()],
                vec!["Dog".into(), Value::Int(1), "Brown".into(), "Healthy".into(), "Beagle".into(), Value::Int(50), "yes".into()],
                vec!["Cat".into(), Value::Int(8), "White".into(), "Serious Injury".into(), "Tabby".into(), Value::Int(20), "no".into()],
            ],
        )
        .unwrap()
    }

    fn policy() -> ColumnPolicy {
        ColumnPolicy::new("Adopted")
            .with_one_hot(["Type"])
            .with_label(["Color1"])
            .with_ordinal(
                "Health",
                vec!["Healthy".into(), "Minor Injury".into(), "Serious Injury".into()],
            )
            .with_count("Breed1")
    }

    fn without_target(table: &Table) -> Table {
        let mut table = table.clone();
        table.take_column("Adopted").unwrap();
        table
    }

    #[test]
    fn test_fit_transform_layout() {
        let fit = Pipeline::new(policy()).unwrap().fit_transform(shelter()).unwrap();

        assert_eq!(
            fit.schema.columns(),
            &["Type_Cat", "Type_Dog", "Age", "Color1", "Health", "Breed1", "Fee"]
        );
        assert_eq!(fit.target, vec![1.0, 0.0, 1.0, 0.0]);
        assert_eq!(fit.matrix.column("Type_Dog").unwrap().to_vec(), vec![1.0, 0.0, 1.0, 0.0]);
        assert_eq!(fit.matrix.column("Color1").unwrap().to_vec(), vec![1.0, 0.0, 1.0, 2.0]);
        assert_eq!(fit.matrix.column("Health").unwrap().to_vec(), vec![0.0, 1.0, 0.0, 2.0]);
        assert_eq!(fit.matrix.column("Breed1").unwrap().to_vec(), vec![2.0, 2.0, 2.0, 2.0]);
    }

    #[test]
    fn test_replay_reproduces_training_matrix() {
        let pipeline = Pipeline::new(policy()).unwrap();
        let fit = pipeline.fit_transform(shelter()).unwrap();

        let replayed = pipeline
            .transform_for_inference(without_target(&shelter()), &fit.state)
            .unwrap();

        assert_eq!(replayed.columns(), fit.matrix.columns());
        for (a, b) in replayed.values().iter().zip(fit.matrix.values().iter()) {
            assert_abs_diff_eq!(*a, *b);
        }
    }

    #[test]
    fn test_inference_drops_target_if_present() {
        let pipeline = Pipeline::new(policy()).unwrap();
        let fit = pipeline.fit_transform(shelter()).unwrap();
        let replayed = pipeline.transform_for_inference(shelter(), &fit.state).unwrap();
        assert!(!replayed.columns().iter().any(|c| c == "Adopted"));
    }

    #[test]
    fn test_unassigned_text_column_rejected() {
        let mut table = shelter();
        table
            .insert_columns(0, vec![crate::dataset::Column::new("Name", vec!["Rex".into(); 4])])
            .unwrap();
        let result = Pipeline::new(policy()).unwrap().fit_transform(table);
        assert!(matches!(result, Err(PreprocessingError::PolicyValidation(_))));
    }

    #[test]
    fn test_unassigned_text_rejected_before_encoding() {
        let mut table = shelter();
        table
            .insert_columns(0, vec![crate::dataset::Column::new("Name", vec!["Rex".into(); 4])])
            .unwrap();
        // The target stage would raise InvalidCategory if it ever ran.
        table.replace_values("Adopted", vec!["maybe".into(); 4]).unwrap();
        let result = Pipeline::new(policy()).unwrap().fit_transform(table);
        assert!(matches!(result, Err(PreprocessingError::PolicyValidation(_))));
    }

    #[test]
    fn test_fit_records_passthrough_columns() {
        let fit = Pipeline::new(policy()).unwrap().fit_transform(shelter()).unwrap();
        assert_eq!(fit.state.passthrough(), &["Age", "Fee"]);
    }

    #[test]
    fn test_inference_drops_columns_unknown_at_fit() {
        let pipeline = Pipeline::new(policy()).unwrap();
        let fit = pipeline.fit_transform(shelter()).unwrap();

        let mut record = without_target(&shelter());
        record
            .insert_columns(
                0,
                vec![
                    crate::dataset::Column::new("Name", vec!["Rex".into(); 4]),
                    crate::dataset::Column::numeric("Quantity", vec![1.0; 4]),
                ],
            )
            .unwrap();
        let encoded = pipeline.transform_for_inference(record, &fit.state).unwrap();
        assert_eq!(encoded.columns(), fit.matrix.columns());
    }

    #[test]
    fn test_policy_column_missing_from_data() {
        let result = Pipeline::new(policy().with_label(["Color2"]))
            .unwrap()
            .fit_transform(shelter());
        assert!(matches!(result, Err(PreprocessingError::PolicyValidation(_))));
    }

    #[test]
    fn test_invalid_policy_rejected_before_fit() {
        let bad = policy().with_label(["Type"]);
        assert!(matches!(
            Pipeline::new(bad),
            Err(PreprocessingError::PolicyValidation(_))
        ));
    }

    #[test]
    fn test_inference_unknown_label() {
        let pipeline = Pipeline::new(policy()).unwrap();
        let fit = pipeline.fit_transform(shelter()).unwrap();

        let mut record = without_target(&shelter());
        record
            .replace_values("Color1", vec!["Golden".into(); 4])
            .unwrap();
        let result = pipeline.transform_for_inference(record, &fit.state);
        assert!(matches!(
            result,
            Err(PreprocessingError::UnknownCategory { .. })
        ));
    }

    #[test]
    fn test_inference_reserved_label_code() {
        let pipeline = Pipeline::new(policy().with_label_unknown(UnknownLabel::Reserve)).unwrap();
        let fit = pipeline.fit_transform(shelter()).unwrap();

        let mut record = without_target(&shelter());
        record
            .replace_values("Color1", vec!["Golden".into(); 4])
            .unwrap();
        let encoded = pipeline.transform_for_inference(record, &fit.state).unwrap();
        assert_eq!(encoded.column("Color1").unwrap().to_vec(), vec![3.0; 4]);
    }

    #[test]
    fn test_state_from_other_policy_rejected() {
        let fit = Pipeline::new(policy()).unwrap().fit_transform(shelter()).unwrap();

        // Color1 moved from label to one-hot.
        let mut other = policy();
        other.label_columns.clear();
        other.one_hot_columns.push("Color1".to_string());
        let result = Pipeline::new(other)
            .unwrap()
            .transform_for_inference(without_target(&shelter()), &fit.state);
        assert!(matches!(result, Err(PreprocessingError::PolicyValidation(_))));
    }

    #[test]
    fn test_empty_table() {
        let empty = Table::from_rows(vec!["Adopted".into()], vec![]).unwrap();
        assert!(matches!(
            Pipeline::new(policy()).unwrap().fit_transform(empty),
            Err(PreprocessingError::EmptyData(_))
        ));
    }
}
