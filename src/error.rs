use miette::Diagnostic;
use thiserror::Error;

/// Main error type for the application
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Credential error: {0}")]
    #[diagnostic(code(muistutin::credentials))]
    Credentials(String),

    #[error("Authorization exchange error: {0}")]
    #[diagnostic(code(muistutin::auth_exchange))]
    AuthExchange(String),

    #[error("Calendar fetch error: {0}")]
    #[diagnostic(code(muistutin::fetch))]
    Fetch(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(code(muistutin::config))]
    Config(String),

    #[error(transparent)]
    #[diagnostic(code(muistutin::io))]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(muistutin::serialization))]
    Serialization(String),

    #[error("Other error: {0}")]
    #[diagnostic(code(muistutin::other))]
    Other(String),
}

// Implement From for JSON serialization errors
impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

// Implement From for TOML deserialization errors
impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Type alias for Result with our Error type
pub type AppResult<T> = Result<T, Error>;

/// Helper to create credential errors
pub fn credential_error(message: &str) -> Error {
    Error::Credentials(message.to_string())
}

/// Helper to create authorization exchange errors
pub fn auth_error(message: &str) -> Error {
    Error::AuthExchange(message.to_string())
}

/// Helper to create calendar fetch errors
pub fn fetch_error(message: &str) -> Error {
    Error::Fetch(message.to_string())
}

/// Helper to create configuration errors
pub fn config_error(message: &str) -> Error {
    Error::Config(message.to_string())
}

/// Helper to create other errors
pub fn other_error(message: &str) -> Error {
    Error::Other(message.to_string())
}
