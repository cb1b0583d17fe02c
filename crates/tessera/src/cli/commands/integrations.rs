//! Integration commands: connect, disconnect, list

use serde::Serialize;

use crate::config::AppConfig;
use crate::crypto::{Cipher, XorCipher};
use crate::error::{Result, TesseraError};
use crate::models::{Integration, Vendor};
use crate::store::Store;

/// Connection summary safe to print (no secrets)
#[derive(Serialize)]
struct IntegrationSummary {
    id: String,
    vendor: Vendor,
    user_id: String,
    has_tokens: bool,
    has_credentials: bool,
    created_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl From<&Integration> for IntegrationSummary {
    fn from(integration: &Integration) -> Self {
        Self {
            id: integration.id.clone(),
            vendor: integration.vendor,
            user_id: integration.user_id.clone(),
            has_tokens: integration.refresh_token.is_some(),
            has_credentials: integration.garmin_email.is_some()
                && integration.garmin_password.is_some(),
            created_at: integration.created_at,
        }
    }
}

pub fn connect(
    config: &AppConfig,
    user: &str,
    vendor: &str,
    refresh_token: Option<String>,
    email: Option<String>,
    password: Option<String>,
) -> Result<()> {
    let vendor: Vendor = vendor.parse()?;
    let store = Store::open(&config.db_path)?;

    let integration = match vendor {
        Vendor::Withings => {
            let refresh_token = refresh_token.ok_or_else(|| {
                TesseraError::MissingCredentials("--refresh-token is required for withings".into())
            })?;
            let mut integration = Integration::new_token(user, vendor);
            integration.refresh_token = Some(refresh_token);
            integration
        }
        Vendor::Garmin => {
            let (email, password) = match (email, password) {
                (Some(e), Some(p)) => (e, p),
                _ => {
                    return Err(TesseraError::MissingCredentials(
                        "--email and --password are required for garmin".into(),
                    ))
                }
            };
            let cipher = XorCipher::new(&config.encryption_key);
            Integration::new_credentials(
                user,
                vendor,
                cipher.encrypt(&email),
                cipher.encrypt(&password),
            )
        }
    };

    store.insert_integration(&integration)?;
    println!(
        "{}",
        serde_json::to_string_pretty(&IntegrationSummary::from(&integration))?
    );
    Ok(())
}

pub fn disconnect(config: &AppConfig, user: &str, integration_id: &str) -> Result<()> {
    let store = Store::open(&config.db_path)?;

    let Some((deleted, removed)) = store.disconnect_integration(user, integration_id)? else {
        return Err(TesseraError::NotConnected(integration_id.to_string()));
    };

    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "deleted": IntegrationSummary::from(&deleted),
            "observations_removed": removed,
        }))?
    );
    Ok(())
}

pub fn list(config: &AppConfig, user: &str) -> Result<()> {
    let store = Store::open(&config.db_path)?;
    let summaries: Vec<IntegrationSummary> = store
        .list_integrations(user)?
        .iter()
        .map(IntegrationSummary::from)
        .collect();

    println!("{}", serde_json::to_string_pretty(&summaries)?);
    Ok(())
}
