//! Error types for Fluxo

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Database pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    /// Referenced transaction/budget/recurring id does not exist or belongs to another owner
    #[error("Not found: {0}")]
    NotFound(String),

    /// Malformed dates, unparseable amounts, unsupported enum values
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Text generator or email sender failed
    #[error("Dependency failure: {0}")]
    DependencyFailure(String),
}

impl Error {
    pub fn not_found(what: &str, id: i64) -> Self {
        Self::NotFound(format!("{} {} not found", what, id))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
