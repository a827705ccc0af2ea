//! Shelter Adoption Prediction
//!
//! Loads an artifact bundle written by `train_adoption` and classifies one
//! JSON record.
//!
//! Run with: cargo run --example predict_adoption -- adoption.bin '<json>'
//! Without a JSON argument, a sample dog listing is scored.

use adoptml::inference::{classify, Predictor, PredictorConfig};
use adoptml::model::GradientBoostedTrees;
use std::error::Error;
use tracing_subscriber::EnvFilter;

const SAMPLE: &str = r#"{
    "Type": "Dog", "Age": 2, "Breed1": "Golden Retriever", "Gender": "Male",
    "Color1": "Brown", "Color2": "White", "MaturitySize": "Large", "FurLength": "Long",
    "Vaccinated": "Yes", "Sterilized": "No", "Health": "Healthy", "Fee": 200, "PhotoAmt": 5
}"#;

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut args = std::env::args().skip(1);
    let artifact_path = args.next().unwrap_or_else(|| "adoption.bin".to_string());
    let record = args.next().unwrap_or_else(|| SAMPLE.to_string());

    let predictor =
        Predictor::<GradientBoostedTrees>::load(&artifact_path, PredictorConfig::default())?;

    let value: serde_json::Value = serde_json::from_str(&record)?;
    let Some(object) = value.as_object() else {
        return Err("record must be a JSON object".into());
    };
    let table = adoptml::Table::from_json_records(std::slice::from_ref(object))?;
    let proba = predictor.predict_proba(table)?;
    let prediction = classify(proba[0], predictor.config().threshold);

    println!("Probability of adoption: {:.3}", proba[0]);
    println!("Prediction: {}", predictor.label(prediction));
    Ok(())
}
