use thiserror::Error;

/// Main error type for tessera
#[derive(Error, Debug)]
pub enum TesseraError {
    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Fetch error: {0}")]
    Fetch(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Caller is not authenticated")]
    Unauthenticated,

    #[error("No connected integration for vendor '{0}'")]
    NotConnected(String),

    #[error("Integration is missing required credentials: {0}")]
    MissingCredentials(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid date format: {0}. Expected YYYY-MM-DD")]
    InvalidDateFormat(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

pub type Result<T> = std::result::Result<T, TesseraError>;

impl TesseraError {
    /// Create an authentication error from a message
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Auth(msg.into())
    }

    /// Create a fetch error from a message
    pub fn fetch(msg: impl Into<String>) -> Self {
        Self::Fetch(msg.into())
    }

    /// Create a validation error from a message
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a store error from a message
    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    /// Create a configuration error from a message
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// HTTP status code this error maps to at the caller boundary
    pub fn status(&self) -> u16 {
        match self {
            Self::Unauthenticated => 401,
            Self::NotConnected(_) => 404,
            Self::MissingCredentials(_) => 400,
            Self::Validation(_) | Self::InvalidDateFormat(_) | Self::InvalidParameter(_) => 400,
            _ => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TesseraError::Auth("refresh token rejected".to_string());
        assert_eq!(
            err.to_string(),
            "Authentication error: refresh token rejected"
        );
    }

    #[test]
    fn test_not_connected_error() {
        let err = TesseraError::NotConnected("withings".to_string());
        assert!(err.to_string().contains("withings"));
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(TesseraError::Unauthenticated.status(), 401);
        assert_eq!(TesseraError::NotConnected("garmin".into()).status(), 404);
        assert_eq!(
            TesseraError::MissingCredentials("garmin email".into()).status(),
            400
        );
        assert_eq!(TesseraError::Fetch("timeout".into()).status(), 500);
        assert_eq!(TesseraError::Store("disk full".into()).status(), 500);
    }

    #[test]
    fn test_error_constructors() {
        assert!(matches!(TesseraError::auth("x"), TesseraError::Auth(_)));
        assert!(matches!(TesseraError::fetch("x"), TesseraError::Fetch(_)));
        assert!(matches!(
            TesseraError::validation("x"),
            TesseraError::Validation(_)
        ));
        assert!(matches!(TesseraError::store("x"), TesseraError::Store(_)));
    }
}
