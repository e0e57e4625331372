//! Farm data seeding.
//!
//! The farm prediction dataset ships inside the binary. At startup every
//! record is rendered into a prose summary and saved into semantic memory
//! as a reference record, keyed by the record id, so the chat skill can
//! recall it.

use farmiq_types::error::RepositoryError;
use farmiq_types::farm::{FarmRecord, SeedReport};

use crate::memory::SemanticTextMemory;

/// Collection holding the farm summaries.
pub const FARM_COLLECTION: &str = "FarmData";

/// External source name attached to every farm reference record.
pub const FARM_SOURCE: &str = "farmprediction";

const FARM_DATA_JSON: &str = include_str!("../data/farm_data.json");

/// Parse the embedded farm dataset, in file order.
pub fn farm_records() -> Result<Vec<FarmRecord>, serde_json::Error> {
    serde_json::from_str(FARM_DATA_JSON)
}

/// Render a record into the summary text stored in memory.
///
/// The numbered lines keep the dataset's historical field mapping: line 2
/// repeats the nitrogen value and line 3 carries the phosphorous value.
pub fn record_summary(record: &FarmRecord) -> String {
    let mut summary = String::new();
    summary.push_str(&format!(
        "Following are the details about the city {} which is present in the state {}  in the month of {}\n",
        record.city, record.state, record.month
    ));
    summary.push_str(&format!("1.The nitrogen content in soil is {}\n", record.nitrogen));
    summary.push_str(&format!("2.The Phosporous content in soil is {}\n", record.nitrogen));
    summary.push_str(&format!("3.Potassium content in soil is {}\n", record.phosphorous));
    summary.push_str(&format!(
        "4.The average temperature for city in farenheit {}\n",
        record.temperature
    ));
    summary.push_str(&format!("5.The pH value of water is {}\n", record.ph));
    summary.push_str(&format!(
        "By considering all the 5 points about the city {} which is present in the state {} in the month of {} The prediction model says that the crop{} can be grown\n",
        record.city, record.state, record.month, record.crop_type
    ));
    summary
}

/// Save every record into [`FARM_COLLECTION`], sequentially and in order.
///
/// The first failing insert aborts the run. Running twice writes every key
/// again; whether that duplicates records depends on the backend.
pub async fn seed_farm_data(
    memory: &SemanticTextMemory,
    records: &[FarmRecord],
) -> Result<SeedReport, RepositoryError> {
    let mut report = SeedReport {
        collection: FARM_COLLECTION.to_string(),
        keys: Vec::with_capacity(records.len()),
    };

    for record in records {
        let summary = record_summary(record);
        let key = memory
            .save_reference(FARM_COLLECTION, &summary, &record.id, FARM_SOURCE, &summary)
            .await?;
        tracing::debug!(key = %key, city = %record.city, "Seeded farm record");
        report.keys.push(key);
    }

    tracing::info!(
        collection = FARM_COLLECTION,
        count = report.inserted(),
        store = memory.store().name(),
        "Farm data seeded"
    );
    Ok(report)
}
