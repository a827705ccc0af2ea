use adoptml::dataset::{read_csv, Table};

pub const HEADER: &str = "Type,Age,Breed1,Gender,Color1,Color2,MaturitySize,FurLength,Vaccinated,Sterilized,Health,Fee,PhotoAmt,Adopted";

pub const DOG_RECORD: &str = r#"{"Type":"Dog","Age":2,"Breed1":"Golden Retriever","Gender":"Male","Color1":"Brown","Color2":"White","MaturitySize":"Large","FurLength":"Long","Vaccinated":"Yes","Sterilized":"No","Health":"Healthy","Fee":200,"PhotoAmt":5}"#;

pub const EXPECTED_FEATURES: [&str; 15] = [
    "Type_Cat",
    "Type_Dog",
    "Age",
    "Breed1",
    "Gender_Female",
    "Gender_Male",
    "Color1",
    "Color2",
    "MaturitySize",
    "FurLength",
    "Vaccinated",
    "Sterilized",
    "Health",
    "Fee",
    "PhotoAmt",
];

const BREEDS: [&str; 5] = ["Golden Retriever", "Beagle", "Tabby", "Mixed Breed", "Persian"];

/// Deterministic shelter records. Adopted when the listing has at least four
/// photos or the animal is at most three years old.
pub fn shelter_csv(n: usize) -> String {
    let mut out = String::from(HEADER);
    out.push('\n');
    for i in 0..n {
        let age = (i * 7) % 12 + 1;
        let photos = (i * 3) % 8;
        let adopted = if photos >= 4 || age <= 3 { "yes" } else { "no" };
        out.push_str(&format!(
            "{},{},{},{},{},{},{},{},{},{},{},{},{},{}\n",
            ["Dog", "Cat"][i % 2],
            age,
            BREEDS[i % 5],
            ["Male", "Female"][(i / 2) % 2],
            ["Brown", "Black", "White"][i % 3],
            ["White", "Brown", "Black"][(i / 3) % 3],
            ["Small", "Medium", "Large"][(i / 5) % 3],
            ["Short", "Medium", "Long"][(i / 7) % 3],
            ["Yes", "No"][(i / 4) % 2],
            ["No", "Yes"][(i / 6) % 2],
            ["Healthy", "Minor Injury", "Serious Injury"][(i / 11) % 3],
            (i * 37) % 250,
            photos,
            adopted,
        ));
    }
    out
}

pub fn shelter_table(n: usize) -> Table {
    read_csv(shelter_csv(n).as_bytes()).expect("generated CSV is well formed")
}

pub fn json_record(json: &str) -> Table {
    let value: serde_json::Value = serde_json::from_str(json).expect("valid JSON");
    let record = value.as_object().expect("JSON object").clone();
    Table::from_json_records(&[record]).expect("flat record")
}
