use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("migration to version {version} failed: {source}")]
    Migration {
        version: i64,
        #[source]
        source: rusqlite::Error,
    },
    #[error("unexpected {entity} variant: {variant}")]
    UnexpectedVariant {
        entity: &'static str,
        variant: String,
    },
    #[error("payload error: {0}")]
    Payload(#[from] serde_json::Error),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl CoreError {
    pub(crate) fn unexpected(entity: &'static str, variant: impl Into<String>) -> Self {
        CoreError::UnexpectedVariant {
            entity,
            variant: variant.into(),
        }
    }
}
