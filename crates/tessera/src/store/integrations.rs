//! Integration rows: vendor connections and their credential lifecycle

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row};

use crate::error::{Result, TesseraError};
use crate::models::{Integration, Vendor};

use super::observations::{format_ts, parse_ts};
use super::Store;

const INTEGRATION_COLUMNS: &str = "id, vendor, access_token, refresh_token, external_user_id, \
     scope, expires_at, garmin_email, garmin_password, user_id, created_at";

impl Store {
    /// Create a connection row. One per (user, vendor).
    pub fn insert_integration(&self, integration: &Integration) -> Result<()> {
        self.conn()
            .execute(
                "INSERT INTO integrations
                     (id, vendor, access_token, refresh_token, external_user_id,
                      scope, expires_at, garmin_email, garmin_password, user_id)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                params![
                    integration.id,
                    integration.vendor.as_str(),
                    integration.access_token,
                    integration.refresh_token,
                    integration.external_user_id,
                    integration.scope,
                    integration.expires_at.as_ref().map(format_ts),
                    integration.garmin_email,
                    integration.garmin_password,
                    integration.user_id,
                ],
            )
            .map_err(|e| TesseraError::store(format!("Failed to insert integration: {}", e)))?;

        Ok(())
    }

    /// Look up the connection for (user, vendor)
    pub fn get_integration(&self, user_id: &str, vendor: Vendor) -> Result<Option<Integration>> {
        self.conn()
            .query_row(
                &format!(
                    "SELECT {} FROM integrations WHERE user_id = ? AND vendor = ? LIMIT 1",
                    INTEGRATION_COLUMNS
                ),
                params![user_id, vendor.as_str()],
                map_integration,
            )
            .optional()
            .map_err(|e| TesseraError::store(format!("Failed to get integration: {}", e)))?
            .map(resolve_integration)
            .transpose()
    }

    /// All connections for a user
    pub fn list_integrations(&self, user_id: &str) -> Result<Vec<Integration>> {
        let mut stmt = self
            .conn()
            .prepare(&format!(
                "SELECT {} FROM integrations WHERE user_id = ? ORDER BY created_at ASC",
                INTEGRATION_COLUMNS
            ))
            .map_err(|e| TesseraError::store(format!("Failed to prepare query: {}", e)))?;

        let rows = stmt
            .query_map(params![user_id], map_integration)
            .map_err(|e| TesseraError::store(format!("Failed to list integrations: {}", e)))?;

        let mut integrations = Vec::new();
        for row in rows {
            let raw =
                row.map_err(|e| TesseraError::store(format!("Failed to read row: {}", e)))?;
            integrations.push(resolve_integration(raw)?);
        }
        Ok(integrations)
    }

    /// Persist a refreshed token set in place
    pub fn update_integration_tokens(
        &self,
        integration_id: &str,
        access_token: &str,
        refresh_token: &str,
        scope: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<()> {
        let updated = self
            .conn()
            .execute(
                "UPDATE integrations
                 SET access_token = ?, refresh_token = ?, scope = ?, expires_at = ?
                 WHERE id = ?",
                params![
                    access_token,
                    refresh_token,
                    scope,
                    format_ts(&expires_at),
                    integration_id,
                ],
            )
            .map_err(|e| TesseraError::store(format!("Failed to update tokens: {}", e)))?;

        if updated == 0 {
            return Err(TesseraError::store(format!(
                "No integration with id {}",
                integration_id
            )));
        }
        Ok(())
    }

    /// Delete a connection and cascade to its observations.
    ///
    /// Observations go when they either carry this integration id or were
    /// produced by the disconnected vendor for this user. Returns the
    /// deleted row and the number of observations removed.
    pub fn disconnect_integration(
        &self,
        user_id: &str,
        integration_id: &str,
    ) -> Result<Option<(Integration, usize)>> {
        let deleted = self
            .conn()
            .query_row(
                &format!(
                    "DELETE FROM integrations WHERE id = ? AND user_id = ? RETURNING {}",
                    INTEGRATION_COLUMNS
                ),
                params![integration_id, user_id],
                map_integration,
            )
            .optional()
            .map_err(|e| TesseraError::store(format!("Failed to delete integration: {}", e)))?;

        let Some(raw) = deleted else {
            return Ok(None);
        };
        let integration = resolve_integration(raw)?;

        let removed = self
            .conn()
            .execute(
                "DELETE FROM observations
                 WHERE user_id = ? AND (integration_id = ? OR source = ?)",
                params![user_id, integration_id, integration.vendor.as_str()],
            )
            .map_err(|e| TesseraError::store(format!("Failed to cascade observations: {}", e)))?;

        Ok(Some((integration, removed)))
    }
}

/// Raw row shape before vendor/timestamp parsing
struct RawIntegration {
    id: String,
    vendor: String,
    access_token: Option<String>,
    refresh_token: Option<String>,
    external_user_id: Option<String>,
    scope: Option<String>,
    expires_at: Option<String>,
    garmin_email: Option<String>,
    garmin_password: Option<String>,
    user_id: String,
    created_at: Option<String>,
}

fn map_integration(row: &Row<'_>) -> rusqlite::Result<RawIntegration> {
    Ok(RawIntegration {
        id: row.get(0)?,
        vendor: row.get(1)?,
        access_token: row.get(2)?,
        refresh_token: row.get(3)?,
        external_user_id: row.get(4)?,
        scope: row.get(5)?,
        expires_at: row.get(6)?,
        garmin_email: row.get(7)?,
        garmin_password: row.get(8)?,
        user_id: row.get(9)?,
        created_at: row.get(10)?,
    })
}

fn resolve_integration(raw: RawIntegration) -> Result<Integration> {
    Ok(Integration {
        vendor: raw.vendor.parse::<Vendor>().map_err(|_| {
            TesseraError::store(format!("Unknown vendor in store: {}", raw.vendor))
        })?,
        id: raw.id,
        access_token: raw.access_token,
        refresh_token: raw.refresh_token,
        external_user_id: raw.external_user_id,
        scope: raw.scope,
        expires_at: raw.expires_at.as_deref().map(parse_ts).transpose()?,
        garmin_email: raw.garmin_email,
        garmin_password: raw.garmin_password,
        user_id: raw.user_id,
        created_at: raw.created_at.as_deref().map(parse_ts).transpose()?,
    })
}
