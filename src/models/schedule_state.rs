use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{FlashcardsError, Result};

pub const DEFAULT_EASE_FACTOR: f64 = 2.5;

/// Spaced repetition state attached to each flashcard.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleState {
    /// Days until the next review; 0 means unscheduled or just failed
    pub interval: i64,
    pub ease_factor: f64,
    pub next_review_date: DateTime<Utc>,
    pub learned: bool,
}

impl ScheduleState {
    /// State of a card with no scheduling history.
    pub fn unscheduled(now: DateTime<Utc>) -> Self {
        Self {
            interval: 0,
            ease_factor: DEFAULT_EASE_FACTOR,
            next_review_date: now,
            learned: false,
        }
    }

    /// Rejects stored values the scheduler must not silently coerce.
    ///
    /// An ease factor under `ease_floor` can only come from corrupted data,
    /// since every update leaves it at or above the floor.
    pub fn validate(&self, ease_floor: f64) -> Result<()> {
        if self.interval < 0 {
            return Err(FlashcardsError::InvalidState(format!(
                "negative interval {}",
                self.interval
            )));
        }
        if !self.ease_factor.is_finite() {
            return Err(FlashcardsError::InvalidState(format!(
                "ease factor {} is not a finite number",
                self.ease_factor
            )));
        }
        if self.ease_factor < ease_floor {
            return Err(FlashcardsError::InvalidState(format!(
                "ease factor {} is below the floor {}",
                self.ease_factor, ease_floor
            )));
        }
        Ok(())
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.next_review_date <= now
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unscheduled_defaults() {
        let now = Utc::now();
        let state = ScheduleState::unscheduled(now);

        assert_eq!(state.interval, 0);
        assert_eq!(state.ease_factor, DEFAULT_EASE_FACTOR);
        assert!(!state.learned);
        assert!(state.validate(1.3).is_ok());
    }

    #[test]
    fn test_validate_rejects_corruption() {
        let now = Utc::now();
        let negative = ScheduleState {
            interval: -3,
            ..ScheduleState::unscheduled(now)
        };
        let nan = ScheduleState {
            ease_factor: f64::NAN,
            ..ScheduleState::unscheduled(now)
        };
        let infinite = ScheduleState {
            ease_factor: f64::INFINITY,
            ..ScheduleState::unscheduled(now)
        };
        let below_zero = ScheduleState {
            ease_factor: -0.5,
            ..ScheduleState::unscheduled(now)
        };
        let below_floor = ScheduleState {
            ease_factor: 1.29,
            ..ScheduleState::unscheduled(now)
        };

        for state in [negative, nan, infinite, below_zero, below_floor] {
            assert!(matches!(
                state.validate(1.3),
                Err(FlashcardsError::InvalidState(_))
            ));
        }
    }

    #[test]
    fn test_floor_is_inclusive() {
        let state = ScheduleState {
            ease_factor: 1.3,
            ..ScheduleState::unscheduled(Utc::now())
        };
        assert!(state.validate(1.3).is_ok());
    }
}
