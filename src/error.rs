use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("{factor} must be within {range}, got {value}")]
    InvalidFactor {
        factor: &'static str,
        range: &'static str,
        value: i64,
    },

    #[error("invalid session: {0}")]
    InvalidSession(String),

    #[error("session history was not loaded ({0}); reload before saving")]
    HistoryUnavailable(String),
}

pub type Result<T> = std::result::Result<T, Error>;
