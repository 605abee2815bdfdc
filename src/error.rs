use thiserror::Error;

#[derive(Error, Debug)]
pub enum PomverError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Project validation failed: {0}")]
    ProjectValidation(String),

    #[error("POM parsing failed: {0}")]
    PomParsing(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Git operation failed: {0}")]
    GitOperation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PomverError>;
