//! `farmiq seed` - write the farm records into the configured memory store.

use anyhow::Result;
use console::style;

use farmiq_core::seed::{FARM_COLLECTION, farm_records, record_summary};
use farmiq_types::config::AppConfig;

use crate::state::{build_memory, seed_memory};

/// Print every record summary without touching a store.
pub fn dry_run(json: bool) -> Result<()> {
    let records = farm_records()?;

    if json {
        let summaries: Vec<serde_json::Value> = records
            .iter()
            .map(|r| serde_json::json!({ "key": r.id, "summary": record_summary(r) }))
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "collection": FARM_COLLECTION,
                "records": summaries,
            }))?
        );
        return Ok(());
    }

    for record in &records {
        println!();
        println!(
            "  {} {} ({}, {})",
            style(format!("[{}]", record.id)).dim(),
            style(&record.city).cyan().bold(),
            record.state,
            record.month
        );
        for line in record_summary(record).lines() {
            println!("    {line}");
        }
    }
    println!();
    println!(
        "  {} {} records would be written to '{}'",
        style("i").blue().bold(),
        records.len(),
        FARM_COLLECTION
    );
    println!();
    Ok(())
}

/// Seed the configured memory store and report the keys written.
pub async fn seed(config: &AppConfig, json: bool) -> Result<()> {
    let memory = build_memory(config)?;
    let report = seed_memory(&memory).await?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "store": memory.store().name(),
                "collection": report.collection,
                "keys": report.keys,
            }))?
        );
        return Ok(());
    }

    println!();
    println!(
        "  {} Seeded {} records into '{}' ({})",
        style("✓").green().bold(),
        style(report.inserted()).bold(),
        report.collection,
        memory.store().name()
    );
    println!("  Keys: {}", report.keys.join(", "));
    println!();
    Ok(())
}
