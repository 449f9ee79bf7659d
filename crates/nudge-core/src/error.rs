//! Error types for Nudge

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Database pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unparseable timestamp: {0}")]
    TimestampParse(String),

    #[error("Model error: {0}")]
    Model(String),

    #[error("Model call timed out after {0}s")]
    ModelTimeout(u64),

    #[error("Could not decode model response: {0}")]
    ResponseDecode(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Whether this error came from the text-generation backend
    ///
    /// HTTP failures only ever originate from backend calls in this crate,
    /// so they count as model failures too.
    pub fn is_model_failure(&self) -> bool {
        matches!(
            self,
            Error::Model(_) | Error::ModelTimeout(_) | Error::Http(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_failure_classification() {
        assert!(Error::Model("quota exceeded".into()).is_model_failure());
        assert!(Error::ModelTimeout(30).is_model_failure());
        assert!(!Error::ResponseDecode("not an array".into()).is_model_failure());
        assert!(!Error::Config("bad ttl".into()).is_model_failure());
    }

    #[test]
    fn test_display_messages() {
        assert_eq!(
            Error::ModelTimeout(30).to_string(),
            "Model call timed out after 30s"
        );
        assert_eq!(
            Error::TimestampParse("not-a-date".into()).to_string(),
            "Unparseable timestamp: not-a-date"
        );
    }
}
