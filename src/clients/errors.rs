use rspotify::ClientError;
use thiserror::Error;

/// Result alias used across the crate
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Everything that can abort a load
#[derive(Error, Debug)]
pub enum Error {
    /// A day-precision release date is not `YYYY-MM-DD`
    #[error("Failed to parse catalog data, error: {0}")]
    ParseError(String),

    /// Catalog answered with something unusable
    #[error("Catalog API unexpected response: {0}")]
    UpstreamError(String),

    /// Catalog request failed
    #[error("Spotify error: {0}")]
    SpotifyError(#[from] ClientError),

    /// Missing credentials or an unusable client setup
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Connection, schema creation or commit failed
    #[error("Storage error: {0}")]
    StorageError(#[from] rusqlite::Error),

    /// An existing table does not have the expected columns
    #[error("Storage schema conflict: {0}")]
    SchemaConflict(String),

    /// Commit refused before writing: a parent handle belongs to another unit
    #[error("Staged entity references a parent from another unit of work: {0}")]
    StagingError(String),
}

impl Error {
    /// Schema creation or commit failed
    pub fn is_storage(&self) -> bool {
        matches!(
            self,
            Error::StorageError(_) | Error::SchemaConflict(_) | Error::StagingError(_)
        )
    }

    /// A catalog request failed or answered with something unusable
    pub fn is_upstream(&self) -> bool {
        matches!(self, Error::UpstreamError(_) | Error::SpotifyError(_))
    }
}

// Ids the catalog would reject count as upstream failures
impl From<rspotify::model::IdError> for Error {
    fn from(err: rspotify::model::IdError) -> Self {
        Error::UpstreamError(format!("invalid Spotify id: {err}"))
    }
}
