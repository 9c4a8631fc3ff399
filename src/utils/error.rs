use thiserror::Error;

#[derive(Error, Debug)]
pub enum AdapterError {
    #[error("HTTP request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Dropbox {endpoint} failed with status {status}: {summary}")]
    RemoteError {
        endpoint: String,
        status: u16,
        summary: String,
    },

    #[error("Dropbox returned an unusable shared link {url:?}: {reason}")]
    InvalidSharedLink { url: String, reason: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Filename generation failed: {message}")]
    NamingError { message: String },
}

impl AdapterError {
    /// The Dropbox `error_summary` of a failed remote call, if this is one.
    pub fn remote_summary(&self) -> Option<&str> {
        match self {
            AdapterError::RemoteError { summary, .. } => Some(summary),
            _ => None,
        }
    }

    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            AdapterError::ConfigError { .. }
                | AdapterError::InvalidConfigValueError { .. }
                | AdapterError::MissingConfigError { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, AdapterError>;
