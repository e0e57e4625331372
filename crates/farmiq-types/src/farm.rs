//! Farm seed records.
//!
//! A `FarmRecord` describes the soil and weather conditions of one city and
//! the crop a prediction model recommended for it. The records are loaded
//! once at startup and rendered into memory summaries.

use serde::{Deserialize, Serialize};

/// One row of the farm prediction dataset.
///
/// Every field is kept as text exactly as it appears in the dataset; the
/// values are only ever interpolated into prose.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FarmRecord {
    #[serde(rename = "ID")]
    pub id: String,
    pub state: String,
    pub city: String,
    pub location: String,
    pub month: String,
    pub nitrogen: String,
    pub phosphorous: String,
    pub potassium: String,
    pub temperature: String,
    pub humidity: String,
    pub ph: String,
    #[serde(rename = "RainFall")]
    pub rainfall: String,
    pub crop_type: String,
}

/// Outcome of a seed run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SeedReport {
    pub collection: String,
    /// Keys written, in insertion order.
    pub keys: Vec<String>,
}

impl SeedReport {
    pub fn inserted(&self) -> usize {
        self.keys.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_farm_record_deserializes_dataset_keys() {
        let json = r#"{
            "State": "Texas",
            "City": "Dallas",
            "Location": "32.79°N 96.77°W",
            "Month": "January",
            "Nitrogen": "90",
            "Phosphorous": "60",
            "Potassium": "66",
            "Temperature": "75.8",
            "Humidity": "82",
            "Ph": "8",
            "RainFall": "55.1",
            "CropType": "lentil",
            "ID": "8"
        }"#;
        let record: FarmRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.id, "8");
        assert_eq!(record.city, "Dallas");
        assert_eq!(record.rainfall, "55.1");
        assert_eq!(record.crop_type, "lentil");
    }

    #[test]
    fn test_farm_record_missing_field_fails() {
        let json = r#"{"State": "Texas", "City": "Dallas", "ID": "8"}"#;
        assert!(serde_json::from_str::<FarmRecord>(json).is_err());
    }
}
