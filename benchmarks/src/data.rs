use adoptml::dataset::{Table, Value};
use adoptml::PreprocessingError;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const COLUMNS: [&str; 14] = [
    "Type",
    "Age",
    "Breed1",
    "Gender",
    "Color1",
    "Color2",
    "MaturitySize",
    "FurLength",
    "Vaccinated",
    "Sterilized",
    "Health",
    "Fee",
    "PhotoAmt",
    "Adopted",
];

const BREEDS: [&str; 8] = [
    "Golden Retriever",
    "Beagle",
    "Mixed Breed",
    "Labrador",
    "Tabby",
    "Persian",
    "Siamese",
    "Domestic Short Hair",
];

/// Seeded generator of shelter listings.
///
/// Every categorical value comes from a fixed vocabulary, so a pipeline fitted
/// on a large sample accepts any smaller sample from the same generator.
#[derive(Debug)]
pub struct ShelterGenerator {
    rng: ChaCha8Rng,
}

impl ShelterGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    fn pick(&mut self, options: &[&str]) -> Value {
        Value::from(options[self.rng.gen_range(0..options.len())])
    }

    /// One row in [`COLUMNS`] order, with the target included.
    pub fn row(&mut self) -> Vec<Value> {
        let age: i64 = self.rng.gen_range(1..=14);
        let fee: i64 = self.rng.gen_range(0..=300);
        let photos: i64 = self.rng.gen_range(0..=10);
        let score = photos as f64 / 10.0 - age as f64 / 20.0 - fee as f64 / 600.0 + 0.3;
        let adopted = score + self.rng.gen_range(-0.15..0.15) > 0.0;
        vec![
            self.pick(&["Dog", "Cat"]),
            Value::Int(age),
            self.pick(&BREEDS),
            self.pick(&["Male", "Female"]),
            self.pick(&["Black", "Brown", "White"]),
            self.pick(&["Black", "Brown", "White"]),
            self.pick(&["Small", "Medium", "Large"]),
            self.pick(&["Short", "Medium", "Long"]),
            self.pick(&["Yes", "No"]),
            self.pick(&["Yes", "No"]),
            self.pick(&["Healthy", "Minor Injury", "Serious Injury"]),
            Value::Int(fee),
            Value::Int(photos),
            Value::from(if adopted { "yes" } else { "no" }),
        ]
    }
}

/// A table of `n` listings including the `Adopted` column.
pub fn shelter_table(n: usize, seed: u64) -> Result<Table, PreprocessingError> {
    let mut generator = ShelterGenerator::new(seed);
    let rows = (0..n).map(|_| generator.row()).collect();
    let names = COLUMNS.iter().map(|c| c.to_string()).collect();
    Table::from_rows(names, rows)
}

/// `n` listings as JSON objects without the target, as an inference caller
/// would send them.
pub fn shelter_records(n: usize, seed: u64) -> Vec<serde_json::Map<String, serde_json::Value>> {
    let mut generator = ShelterGenerator::new(seed);
    (0..n)
        .map(|_| {
            COLUMNS
                .iter()
                .zip(generator.row())
                .filter(|(name, _)| **name != "Adopted")
                .map(|(name, value)| {
                    let json = match value {
                        Value::Int(i) => serde_json::Value::from(i),
                        Value::Float(f) => serde_json::Value::from(f),
                        Value::Text(s) => serde_json::Value::from(s),
                    };
                    (name.to_string(), json)
                })
                .collect()
        })
        .collect()
}
