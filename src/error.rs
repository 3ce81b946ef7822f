use thiserror::Error;

/// Failure surfaced by the TMDB access layer.
///
/// Cloneable so a single failed request can be handed to every caller that
/// was waiting on the same cache key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TmdbError {
    #[error("TMDB API key is not configured")]
    MissingCredential,

    /// Non-2xx response; `message` comes from the provider's error envelope.
    #[error("TMDB API Error: {message}")]
    Api { status: u16, message: String },

    #[error("Failed to fetch data from TMDB: {0}")]
    Transport(String),

    #[error("Failed to decode TMDB response: {0}")]
    Decode(String),
}

impl TmdbError {
    pub fn is_configuration(&self) -> bool {
        matches!(self, TmdbError::MissingCredential)
    }

    /// Configuration errors cannot heal by waiting, everything else may.
    pub fn is_retryable(&self) -> bool {
        !self.is_configuration()
    }
}

pub type TmdbResult<T> = Result<T, TmdbError>;
