//! Snapshot command: import pre-parsed daily nutrition rows
//!
//! Takes a JSON array of snapshot rows (the spreadsheet parsing itself
//! lives outside this service) and upserts them by date.

use std::path::Path;

use crate::config::AppConfig;
use crate::error::Result;
use crate::models::DailySnapshot;
use crate::store::Store;

pub fn import(config: &AppConfig, file: &Path) -> Result<()> {
    let raw = std::fs::read_to_string(file)?;
    let snapshots: Vec<DailySnapshot> = serde_json::from_str(&raw)?;

    let store = Store::open(&config.db_path)?;
    for snapshot in &snapshots {
        store.upsert_snapshot(snapshot)?;
    }

    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "imported": snapshots.len(),
            "message": "Snapshots imported successfully",
        }))?
    );
    Ok(())
}
