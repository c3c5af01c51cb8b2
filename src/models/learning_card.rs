//! Wrapper for a card inside a review session that tracks this session's outcome.
use super::{CardRecord, Rating};
use chrono::{DateTime, Utc};

#[derive(Clone, Debug)]
pub struct LearningCard {
    pub record: CardRecord,
    /// Rated anything but `again` in the current round
    pub passed: bool,
    pub last_rating: Option<Rating>,
    pub last_rated_at: Option<DateTime<Utc>>,
}

impl LearningCard {
    pub fn new(record: CardRecord) -> Self {
        Self {
            record,
            passed: false,
            last_rating: None,
            last_rated_at: None,
        }
    }

    pub fn mark_rated(&mut self, rating: Rating, now: DateTime<Utc>) {
        self.passed = rating != Rating::Again;
        self.last_rating = Some(rating);
        self.last_rated_at = Some(now);
    }
}
