//! Shelter Adoption Training
//!
//! Fits the encoding pipeline, trains the boosted-tree model and writes the
//! artifact bundle to disk.
//!
//! - With a CSV path, trains on that file (it must carry an `Adopted` column).
//! - Without one, trains on the small embedded sample below.
//!
//! Run with: cargo run --example train_adoption -- [pets.csv] [adoption.bin]
//! Set `RUST_LOG=adoptml=debug` to see every encoder stage.

use adoptml::dataset::{read_csv, CsvFileSource, DataSource, InMemorySource};
use adoptml::preprocessing::ColumnPolicy;
use adoptml::trainer::{Trainer, TrainingConfig};
use std::error::Error;
use tracing_subscriber::EnvFilter;

/// Shelter listings (subset). Young animals and well-photographed listings
/// with moderate fees tend to be adopted.
const SAMPLE: &str = "\
Type,Age,Breed1,Gender,Color1,Color2,MaturitySize,FurLength,Vaccinated,Sterilized,Health,Fee,PhotoAmt,Adopted
Dog,4,Golden Retriever,Male,Brown,White,Small,Short,Yes,No,Healthy,150,8,yes
Cat,3,Tabby,Male,Black,White,Small,Short,Yes,No,Healthy,50,7,yes
Dog,11,Mixed Breed,Female,White,White,Small,Short,Yes,No,Minor Injury,150,1,no
Cat,10,Tabby,Female,Brown,Brown,Small,Short,No,No,Serious Injury,0,7,yes
Dog,5,Labrador,Male,Black,Brown,Medium,Short,No,Yes,Healthy,150,3,no
Cat,4,Tabby,Male,White,Brown,Medium,Medium,No,Yes,Healthy,200,7,yes
Dog,9,Beagle,Female,Brown,Black,Medium,Medium,Yes,Yes,Minor Injury,250,8,no
Cat,8,Mixed Breed,Female,Black,Black,Medium,Medium,Yes,Yes,Serious Injury,100,2,no
Dog,4,Beagle,Male,White,Black,Large,Medium,Yes,No,Healthy,200,2,no
Cat,9,Persian,Male,Brown,White,Large,Medium,No,No,Healthy,100,0,no
Dog,11,Golden Retriever,Female,Black,White,Large,Long,No,No,Minor Injury,250,1,no
Cat,3,Tabby,Female,White,White,Large,Long,No,No,Serious Injury,250,0,no
Dog,5,Mixed Breed,Male,Brown,Brown,Small,Long,Yes,Yes,Healthy,250,0,no
Cat,5,Tabby,Male,Black,Brown,Small,Long,Yes,Yes,Healthy,100,6,yes
Dog,12,Labrador,Female,White,Brown,Small,Long,Yes,Yes,Minor Injury,250,6,no
Cat,7,Tabby,Female,Brown,Black,Small,Short,No,Yes,Serious Injury,200,7,yes
Dog,3,Beagle,Male,Black,Black,Medium,Short,No,No,Healthy,50,1,yes
Cat,1,Mixed Breed,Male,White,Black,Medium,Short,No,No,Healthy,0,7,yes
Dog,4,Beagle,Female,Brown,White,Medium,Short,Yes,No,Minor Injury,50,6,yes
Cat,11,Persian,Female,Black,White,Medium,Short,Yes,No,Serious Injury,250,4,no
Dog,7,Golden Retriever,Male,White,White,Large,Medium,Yes,Yes,Healthy,150,6,yes
Cat,10,Tabby,Male,Brown,Brown,Large,Medium,No,Yes,Healthy,50,8,yes
Dog,10,Mixed Breed,Female,Black,Brown,Large,Medium,No,Yes,Minor Injury,100,3,no
Cat,6,Tabby,Female,White,Brown,Large,Medium,No,Yes,Serious Injury,200,0,no
Dog,5,Labrador,Male,Brown,Black,Small,Medium,Yes,No,Healthy,150,2,no
Cat,12,Tabby,Male,Black,Black,Small,Long,Yes,No,Healthy,250,5,no
Dog,9,Beagle,Female,White,Black,Small,Long,Yes,No,Minor Injury,150,1,no
Cat,12,Mixed Breed,Female,Brown,White,Small,Long,No,No,Serious Injury,200,3,no
Dog,11,Beagle,Male,Black,White,Medium,Long,No,Yes,Healthy,250,4,no
Cat,5,Persian,Male,White,White,Medium,Long,No,Yes,Healthy,0,1,no
Dog,8,Golden Retriever,Female,Brown,Brown,Medium,Short,Yes,Yes,Minor Injury,250,7,no
Cat,2,Tabby,Female,Black,Brown,Medium,Short,Yes,Yes,Serious Injury,50,1,yes
Dog,7,Mixed Breed,Male,White,Brown,Large,Short,Yes,No,Healthy,0,0,no
Cat,5,Tabby,Male,Brown,Black,Large,Short,No,No,Healthy,100,6,yes
Dog,2,Labrador,Female,Black,Black,Large,Short,No,No,Minor Injury,0,0,yes
Cat,7,Tabby,Female,White,Black,Large,Medium,No,No,Serious Injury,200,5,yes
";

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut args = std::env::args().skip(1);
    let csv_path = args.next();
    let artifact_path = args.next().unwrap_or_else(|| "adoption.bin".to_string());

    let source: Box<dyn DataSource> = match csv_path {
        Some(path) => Box::new(CsvFileSource::new(path)),
        None => Box::new(InMemorySource::new(read_csv(SAMPLE.as_bytes())?)),
    };

    println!("=== Shelter Adoption Training ===\n");
    let policy = ColumnPolicy::pet_adoption();
    println!("Column policy:\n{}\n", policy.to_json_string()?);

    let trainer = Trainer::new(policy, TrainingConfig::default())?;
    let outcome = trainer.run(source.as_ref(), &artifact_path)?;

    println!(
        "Split: {} train / {} validation / {} test",
        outcome.split.train.len(),
        outcome.split.validation.len(),
        outcome.split.test.len()
    );
    if let Some(best) = outcome.best_round {
        println!("Best boosting round: {}", best + 1);
    }
    println!("Features ({}): {:?}", outcome.artifact.schema().len(), outcome.artifact.schema().columns());
    println!("\nTest metrics:\n{}", outcome.metrics);
    println!("\nArtifact written to {}", artifact_path);
    Ok(())
}
