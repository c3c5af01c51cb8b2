//! Self-reported recall quality for a single review.
use crate::error::{FlashcardsError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rating {
    /// Forgot the card
    Again,
    /// Recalled with difficulty
    Hard,
    Good,
    /// Recalled effortlessly
    Easy,
}

impl Rating {
    pub const ALL: [Rating; 4] = [Rating::Again, Rating::Hard, Rating::Good, Rating::Easy];

    pub fn as_str(&self) -> &'static str {
        match self {
            Rating::Again => "again",
            Rating::Hard => "hard",
            Rating::Good => "good",
            Rating::Easy => "easy",
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Rating {
    type Err = FlashcardsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "again" => Ok(Rating::Again),
            "hard" => Ok(Rating::Hard),
            "good" => Ok(Rating::Good),
            "easy" => Ok(Rating::Easy),
            other => Err(FlashcardsError::InvalidRating(other.to_string())),
        }
    }
}

/// Button numbering used by review screens: 1 = again .. 4 = easy.
impl TryFrom<u8> for Rating {
    type Error = FlashcardsError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            1 => Ok(Rating::Again),
            2 => Ok(Rating::Hard),
            3 => Ok(Rating::Good),
            4 => Ok(Rating::Easy),
            other => Err(FlashcardsError::InvalidRating(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_names() {
        assert_eq!("again".parse::<Rating>().unwrap(), Rating::Again);
        assert_eq!("Hard".parse::<Rating>().unwrap(), Rating::Hard);
        assert_eq!(" good ".parse::<Rating>().unwrap(), Rating::Good);
        assert_eq!("EASY".parse::<Rating>().unwrap(), Rating::Easy);
    }

    #[test]
    fn test_unknown_name_is_rejected() {
        let err = "perfect".parse::<Rating>().unwrap_err();
        assert!(matches!(err, FlashcardsError::InvalidRating(ref s) if s == "perfect"));
        assert!("".parse::<Rating>().is_err());
    }

    #[test]
    fn test_button_numbers() {
        assert_eq!(Rating::try_from(1).unwrap(), Rating::Again);
        assert_eq!(Rating::try_from(4).unwrap(), Rating::Easy);
        assert!(matches!(Rating::try_from(0), Err(FlashcardsError::InvalidRating(_))));
        assert!(matches!(Rating::try_from(5), Err(FlashcardsError::InvalidRating(_))));
    }

    #[test]
    fn test_serde_rejects_unknown_variant() {
        assert_eq!(serde_json::from_str::<Rating>(r#""easy""#).unwrap(), Rating::Easy);
        assert!(serde_json::from_str::<Rating>(r#""medium""#).is_err());
        assert_eq!(serde_json::to_string(&Rating::Again).unwrap(), r#""again""#);
    }
}
