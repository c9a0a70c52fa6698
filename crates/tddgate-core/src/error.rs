use thiserror::Error;

#[derive(Debug, Error)]
pub enum GuardError {
    #[error("invalid test file pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("unknown placeholder '{placeholder}' in candidate template '{template}'")]
    InvalidTemplate {
        template: String,
        placeholder: String,
    },

    #[error("malformed hook payload: {0}")]
    MalformedPayload(#[source] serde_json::Error),

    #[error("hook payload is missing field '{0}'")]
    MissingField(&'static str),

    #[error("invalid log line: {0}")]
    InvalidLogLine(String),

    #[error("invalid action: {0}")]
    InvalidAction(String),

    #[error("invalid reason: {0}")]
    InvalidReason(String),

    #[error("config file already exists: {0}")]
    ConfigExists(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GuardError>;
