use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Vendor;

/// One (user, vendor) connection.
///
/// Token vendors use the access/refresh token pair; credential vendors use
/// the encrypted email/password pair. The integration row is the sole
/// holder of vendor credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Integration {
    pub id: String,
    pub vendor: Vendor,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub external_user_id: Option<String>,
    pub scope: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub garmin_email: Option<String>,
    pub garmin_password: Option<String>,
    pub user_id: String,
    pub created_at: Option<DateTime<Utc>>,
}

impl Integration {
    /// A fresh token-vendor connection, ready to insert.
    pub fn new_token(user_id: impl Into<String>, vendor: Vendor) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            vendor,
            access_token: None,
            refresh_token: None,
            external_user_id: None,
            scope: None,
            expires_at: None,
            garmin_email: None,
            garmin_password: None,
            user_id: user_id.into(),
            created_at: None,
        }
    }

    /// A fresh credential-vendor connection holding an encrypted pair.
    pub fn new_credentials(
        user_id: impl Into<String>,
        vendor: Vendor,
        encrypted_email: String,
        encrypted_password: String,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            vendor,
            access_token: None,
            refresh_token: None,
            external_user_id: None,
            scope: None,
            expires_at: None,
            garmin_email: Some(encrypted_email),
            garmin_password: Some(encrypted_password),
            user_id: user_id.into(),
            created_at: None,
        }
    }
}
