//! Trend commands: single-entity and aggregated queries

use crate::config::AppConfig;
use crate::error::Result;
use crate::store::Store;
use crate::trends::{Bucket, TrendEngine};

use super::parse_date;

pub fn query(
    config: &AppConfig,
    entity: &str,
    start_date: Option<String>,
    end_date: Option<String>,
) -> Result<()> {
    let store = Store::open(&config.db_path)?;
    let engine = TrendEngine::new(&store);

    let start = start_date.as_deref().map(parse_date).transpose()?;
    let end = end_date.as_deref().map(parse_date).transpose()?;

    let points = engine.query(entity, start, end)?;
    println!("{}", serde_json::to_string_pretty(&points)?);
    Ok(())
}

pub fn aggregated(
    config: &AppConfig,
    entities: &[String],
    bucket: &str,
    start_date: Option<String>,
    end_date: Option<String>,
    limit: Option<usize>,
) -> Result<()> {
    let store = Store::open(&config.db_path)?;
    let engine = TrendEngine::new(&store);

    let bucket: Bucket = bucket.parse()?;
    let start = start_date.as_deref().map(parse_date).transpose()?;
    let end = end_date.as_deref().map(parse_date).transpose()?;

    let report = engine.query_aggregated(entities, start, end, bucket, limit)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
