//! Error types for the flashcards library.
//!
//! Scheduler failures are pure and leave stored state untouched; persistence
//! failures are wrapped from rusqlite and surfaced unchanged.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FlashcardsError {
    /// A rating outside again/hard/good/easy
    #[error("Invalid rating: {0}")]
    InvalidRating(String),

    /// Stored scheduling data that cannot be scheduled from
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// No card with this id
    #[error("Flashcard not found: {0}")]
    NotFound(i64),

    /// The next review date does not fit in a timestamp
    #[error("Next review date out of range")]
    DateOverflow,

    #[error("Config error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, FlashcardsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_rating_message() {
        let err = FlashcardsError::InvalidRating("meh".to_string());
        assert_eq!(err.to_string(), "Invalid rating: meh");
    }

    #[test]
    fn test_not_found_message() {
        let err = FlashcardsError::NotFound(42);
        assert_eq!(err.to_string(), "Flashcard not found: 42");
    }

    #[test]
    fn test_sqlite_error_conversion() {
        let err: FlashcardsError = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(matches!(err, FlashcardsError::Database(_)));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("nope").unwrap_err();
        let err: FlashcardsError = json_err.into();
        assert!(matches!(err, FlashcardsError::Json(_)));
    }
}
