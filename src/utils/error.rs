use thiserror::Error;

#[derive(Error, Debug)]
pub enum EnumError {
    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("CSV rendering error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Interrupted by user")]
    Interrupted,
}

impl EnumError {
    /// Short message meant for the terminal, without the variant prefix.
    pub fn user_friendly_message(&self) -> String {
        match self {
            EnumError::ValidationError { message } => message.clone(),
            EnumError::ConfigError { message } => format!("Bad configuration: {}", message),
            EnumError::InvalidConfigValueError { field, reason, .. } => {
                format!("Bad configuration for '{}': {}", field, reason)
            }
            EnumError::Interrupted => "-- Exited --".to_string(),
            other => other.to_string(),
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            EnumError::ValidationError { .. }
            | EnumError::ConfigError { .. }
            | EnumError::InvalidConfigValueError { .. }
            | EnumError::TomlError(_) => 1,
            EnumError::Interrupted => 130,
            _ => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, EnumError>;
