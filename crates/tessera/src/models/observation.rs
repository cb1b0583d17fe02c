use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Vendor;

/// A normalized measurement produced by an adapter, not yet persisted.
///
/// Identity at the store is the tuple (user_id, observed_at, type, source);
/// re-upserting a reading with the same tuple overwrites only the value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub source: Vendor,
    #[serde(rename = "type")]
    pub type_key: String,
    pub label: String,
    pub unit: Option<String>,
    pub value: f64,
    pub observed_at: DateTime<Utc>,
    pub user_id: String,
    pub integration_id: String,
}

/// A persisted canonical observation row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Observation {
    pub id: String,
    pub source: Vendor,
    #[serde(rename = "type")]
    pub type_key: String,
    pub label: String,
    pub unit: Option<String>,
    pub value: f64,
    pub observed_at: DateTime<Utc>,
    pub user_id: String,
    pub integration_id: String,
    pub created_at: DateTime<Utc>,
}

/// One point of a trend query, shaped uniformly over both backing stores
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub date: DateTime<Utc>,
    pub label: String,
    pub unit: Option<String>,
    pub value: Option<f64>,
}
