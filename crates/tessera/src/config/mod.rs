//! Application configuration
//!
//! All configuration is carried by an explicit [`AppConfig`] handed into
//! constructors; business logic never reads the process environment. The
//! binary edge builds one with [`AppConfig::from_env`].

use std::env;
use std::path::PathBuf;

use crate::error::{Result, TesseraError};

/// Default data directory name
const DATA_DIR_NAME: &str = "tessera";

/// Withings OAuth application settings
#[derive(Debug, Clone)]
pub struct WithingsConfig {
    pub client_id: String,
    pub client_secret: String,
    pub base_url: String,
}

impl WithingsConfig {
    pub const DEFAULT_BASE_URL: &'static str = "https://wbsapi.withings.net";
}

/// Garmin companion service settings
#[derive(Debug, Clone)]
pub struct GarminServiceConfig {
    pub base_url: String,
    pub admin_key: Option<String>,
}

impl GarminServiceConfig {
    pub const DEFAULT_BASE_URL: &'static str = "http://localhost:3011";
}

/// Top-level configuration for adapters, orchestrator, and store
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub withings: WithingsConfig,
    pub garmin: GarminServiceConfig,
    pub encryption_key: String,
    pub db_path: PathBuf,
}

impl AppConfig {
    /// Build configuration from the environment. Only called at the binary
    /// edge; everything downstream receives the struct.
    pub fn from_env() -> Result<Self> {
        let client_id = env::var("WITHINGS_CLIENT_ID")
            .map_err(|_| TesseraError::config("WITHINGS_CLIENT_ID is required"))?;
        let client_secret = env::var("WITHINGS_CLIENT_SECRET")
            .map_err(|_| TesseraError::config("WITHINGS_CLIENT_SECRET is required"))?;
        let encryption_key = env::var("ENCRYPTION_KEY")
            .map_err(|_| TesseraError::config("ENCRYPTION_KEY is required"))?;

        let db_path = match env::var("TESSERA_DB") {
            Ok(p) => PathBuf::from(p),
            Err(_) => default_db_path()?,
        };

        Ok(Self {
            withings: WithingsConfig {
                client_id,
                client_secret,
                base_url: env::var("WITHINGS_BASE_URL")
                    .unwrap_or_else(|_| WithingsConfig::DEFAULT_BASE_URL.to_string()),
            },
            garmin: GarminServiceConfig {
                base_url: env::var("GARMIN_API_URL")
                    .unwrap_or_else(|_| GarminServiceConfig::DEFAULT_BASE_URL.to_string()),
                admin_key: env::var("GARMIN_ADMIN_KEY").ok(),
            },
            encryption_key,
            db_path,
        })
    }
}

/// Get the data directory path
/// Returns ~/.local/share/tessera on Unix, ~/Library/Application Support/tessera on macOS
pub fn data_dir() -> Result<PathBuf> {
    dirs::data_dir()
        .map(|p| p.join(DATA_DIR_NAME))
        .ok_or_else(|| TesseraError::config("Could not determine data directory"))
}

/// Default on-disk database location
pub fn default_db_path() -> Result<PathBuf> {
    let dir = data_dir()?;
    ensure_dir(&dir)?;
    Ok(dir.join("tessera.db"))
}

/// Ensure a directory exists, creating it if necessary
pub fn ensure_dir(path: &PathBuf) -> Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}
