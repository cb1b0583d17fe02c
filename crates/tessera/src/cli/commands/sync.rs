//! Sync command: run one vendor ingestion for a user

use crate::config::AppConfig;
use crate::error::Result;
use crate::models::{FetchRange, Vendor};
use crate::sync::SyncEngine;

use super::parse_date;

pub async fn run(
    config: &AppConfig,
    user: &str,
    vendor: &str,
    start_date: Option<String>,
    end_date: Option<String>,
) -> Result<()> {
    let vendor: Vendor = vendor.parse()?;

    let range = match (start_date, end_date) {
        (None, None) => None,
        (start, end) => {
            let today = chrono::Utc::now().date_naive();
            let start = start.as_deref().map(parse_date).transpose()?;
            let end = end.as_deref().map(parse_date).transpose()?;
            Some(FetchRange::new(
                start.unwrap_or(today),
                end.unwrap_or(today),
            ))
        }
    };

    let engine = SyncEngine::new(config)?;
    let outcome = engine.run(user, vendor, range).await?;

    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}
