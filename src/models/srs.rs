//! Spaced repetition scheduler.
//!
//! Given a card's current schedule and a rating, computes the next interval and
//! ease factor:
//! - `again` resets the interval to 0 and lowers the ease factor
//! - `hard` grows the interval slightly and lowers the ease factor
//! - `good` multiplies the interval by the ease factor
//! - `easy` multiplies it further and raises the ease factor
//! - The ease factor never falls below its floor (1.3 by default)
//! - A card is never due again sooner than one day after a review
//!
//! `now` is always passed in, so every function here is deterministic.

use chrono::{DateTime, Days, NaiveTime, TimeDelta, Utc};
use log::debug;
use serde::{Deserialize, Serialize};

use super::{Rating, ScheduleState};
use crate::error::{FlashcardsError, Result};

/// Numeric policy of the scheduler.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerParams {
    pub ease_floor: f64,
    pub initial_ease: f64,
    pub again_penalty: f64,
    pub hard_penalty: f64,
    pub hard_multiplier: f64,
    pub easy_bonus: f64,
    pub easy_multiplier: f64,
    pub first_good_interval: u32,
    pub first_easy_interval: u32,
    pub seed_interval: u32,
    pub min_due_gap_days: u32,
}

impl Default for SchedulerParams {
    fn default() -> Self {
        Self {
            ease_floor: 1.3,
            initial_ease: 2.5,
            again_penalty: 0.2,
            hard_penalty: 0.15,
            hard_multiplier: 1.2,
            easy_bonus: 0.15,
            easy_multiplier: 1.3,
            first_good_interval: 1,
            first_easy_interval: 4,
            seed_interval: 1,
            min_due_gap_days: 1,
        }
    }
}

impl SchedulerParams {
    pub fn validate(&self) -> Result<()> {
        // below 1.0 a successful review would shorten the interval
        let growth = [
            ("ease_floor", self.ease_floor),
            ("hard_multiplier", self.hard_multiplier),
            ("easy_multiplier", self.easy_multiplier),
        ];
        for (name, value) in growth {
            if !value.is_finite() || value < 1.0 {
                return Err(FlashcardsError::Config(format!(
                    "scheduler.{name} must be at least 1.0, got {value}"
                )));
            }
        }

        let non_negative = [
            ("again_penalty", self.again_penalty),
            ("hard_penalty", self.hard_penalty),
            ("easy_bonus", self.easy_bonus),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(FlashcardsError::Config(format!(
                    "scheduler.{name} must be a non-negative number, got {value}"
                )));
            }
        }

        if !self.initial_ease.is_finite() || self.initial_ease < self.ease_floor {
            return Err(FlashcardsError::Config(format!(
                "scheduler.initial_ease {} is below ease_floor {}",
                self.initial_ease, self.ease_floor
            )));
        }

        let days = [
            ("first_good_interval", self.first_good_interval),
            ("first_easy_interval", self.first_easy_interval),
            ("seed_interval", self.seed_interval),
            ("min_due_gap_days", self.min_due_gap_days),
        ];
        for (name, value) in days {
            if value == 0 {
                return Err(FlashcardsError::Config(format!(
                    "scheduler.{name} must be at least one day"
                )));
            }
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Default)]
pub struct Scheduler {
    params: SchedulerParams,
}

impl Scheduler {
    pub fn new(params: SchedulerParams) -> Result<Self> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &SchedulerParams {
        &self.params
    }

    /// Computes the schedule that follows `state` after a review rated `rating`.
    ///
    /// Corrupted input (negative interval, non-finite ease or ease under the
    /// floor) is rejected with `InvalidState` instead of being clamped.
    pub fn update(
        &self,
        state: &ScheduleState,
        rating: Rating,
        now: DateTime<Utc>,
    ) -> Result<ScheduleState> {
        state.validate(self.params.ease_floor)?;

        let p = &self.params;
        let interval = state.interval;
        let ease = state.ease_factor;

        let (new_interval, new_ease) = match rating {
            Rating::Again => (0, ease - p.again_penalty),
            Rating::Hard => (
                floor_interval(interval as f64 * p.hard_multiplier).max(1),
                ease - p.hard_penalty,
            ),
            Rating::Good => {
                let next = if interval == 0 {
                    i64::from(p.first_good_interval)
                } else {
                    floor_interval(interval as f64 * ease)
                };
                (next, ease)
            }
            Rating::Easy => {
                let next = if interval == 0 {
                    i64::from(p.first_easy_interval)
                } else {
                    floor_interval(interval as f64 * ease * p.easy_multiplier)
                };
                (next, ease + p.easy_bonus)
            }
        };
        let new_ease = self.apply_ease_floor(new_ease);
        let next_review_date = self.due_after(now, new_interval)?;

        debug!(
            "rated {rating}: interval {interval} -> {new_interval}, ease {ease:.2} -> {new_ease:.2}, due {next_review_date}"
        );

        Ok(ScheduleState {
            interval: new_interval,
            ease_factor: new_ease,
            next_review_date,
            learned: state.learned,
        })
    }

    /// Initial schedule of a card that was just learned: first review the day
    /// after it was introduced, measured from the start of that day.
    pub fn seed(&self, now: DateTime<Utc>) -> ScheduleState {
        let start_of_day = now.date_naive().and_time(NaiveTime::MIN).and_utc();
        let next_review_date = start_of_day
            .checked_add_days(Days::new(u64::from(self.params.seed_interval)))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        ScheduleState {
            interval: i64::from(self.params.seed_interval),
            ease_factor: self.params.initial_ease,
            next_review_date,
            learned: true,
        }
    }

    /// Schedule of a card that has not been learned yet.
    pub fn unscheduled(&self, now: DateTime<Utc>) -> ScheduleState {
        ScheduleState {
            ease_factor: self.params.initial_ease,
            ..ScheduleState::unscheduled(now)
        }
    }

    /// Interval each rating would produce, in button order.
    pub fn preview(&self, state: &ScheduleState, now: DateTime<Utc>) -> Result<[(Rating, i64); 4]> {
        let mut intervals = [(Rating::Again, 0); 4];
        for (slot, rating) in intervals.iter_mut().zip(Rating::ALL) {
            *slot = (rating, self.update(state, rating, now)?.interval);
        }
        Ok(intervals)
    }

    fn apply_ease_floor(&self, ease: f64) -> f64 {
        ease.max(self.params.ease_floor)
    }

    /// A stored interval of 0 still waits `min_due_gap_days` before the card
    /// comes back, so `next_review_date - now` may exceed `interval`.
    fn due_after(&self, now: DateTime<Utc>, interval: i64) -> Result<DateTime<Utc>> {
        let days = interval.max(i64::from(self.params.min_due_gap_days));
        let gap = TimeDelta::try_days(days).ok_or(FlashcardsError::DateOverflow)?;
        now.checked_add_signed(gap)
            .ok_or(FlashcardsError::DateOverflow)
    }
}

/// Whole days only; partial days are dropped.
fn floor_interval(raw: f64) -> i64 {
    raw.floor() as i64
}

/// [`Scheduler::update`] with the default parameters.
pub fn update(state: &ScheduleState, rating: Rating, now: DateTime<Utc>) -> Result<ScheduleState> {
    Scheduler::default().update(state, rating, now)
}

/// [`Scheduler::seed`] with the default parameters.
pub fn seed(now: DateTime<Utc>) -> ScheduleState {
    Scheduler::default().seed(now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, 15, 9, 26).unwrap()
    }

    fn state(interval: i64, ease_factor: f64) -> ScheduleState {
        ScheduleState {
            interval,
            ease_factor,
            next_review_date: now(),
            learned: true,
        }
    }

    #[test]
    fn test_again_resets_interval_and_waits_one_day() {
        for interval in [0, 1, 7, 365] {
            let next = update(&state(interval, 2.5), Rating::Again, now()).unwrap();
            assert_eq!(next.interval, 0);
            assert_eq!(next.next_review_date, now() + TimeDelta::days(1));
            assert!((next.ease_factor - 2.3).abs() < 1e-9);
        }
    }

    #[test]
    fn test_first_good_review() {
        let next = update(&state(0, 2.5), Rating::Good, now()).unwrap();
        assert_eq!(next.interval, 1);
        assert_eq!(next.ease_factor, 2.5);
        assert_eq!(next.next_review_date, now() + TimeDelta::days(1));
    }

    #[test]
    fn test_first_easy_review() {
        let next = update(&state(0, 2.5), Rating::Easy, now()).unwrap();
        assert_eq!(next.interval, 4);
        assert!((next.ease_factor - 2.65).abs() < 1e-9);
        assert_eq!(next.next_review_date, now() + TimeDelta::days(4));
    }

    #[test]
    fn test_good_multiplies_by_ease() {
        let next = update(&state(10, 2.0), Rating::Good, now()).unwrap();
        assert_eq!(next.interval, 20);
        assert_eq!(next.next_review_date, now() + TimeDelta::days(20));
    }

    #[test]
    fn test_hard_grows_slightly() {
        let next = update(&state(10, 2.0), Rating::Hard, now()).unwrap();
        assert_eq!(next.interval, 12);
        assert!((next.ease_factor - 1.85).abs() < 1e-9);
    }

    #[test]
    fn test_hard_on_new_card_is_one_day() {
        let next = update(&state(0, 2.5), Rating::Hard, now()).unwrap();
        assert_eq!(next.interval, 1);
    }

    #[test]
    fn test_intervals_are_floored() {
        // 3 * 2.5 = 7.5, 3 * 2.5 * 1.3 = 9.75, 3 * 1.2 = 3.6
        assert_eq!(update(&state(3, 2.5), Rating::Good, now()).unwrap().interval, 7);
        assert_eq!(update(&state(3, 2.5), Rating::Easy, now()).unwrap().interval, 9);
        assert_eq!(update(&state(3, 2.5), Rating::Hard, now()).unwrap().interval, 3);
    }

    #[test]
    fn test_ease_never_below_floor() {
        let mut current = state(5, 1.35);
        for _ in 0..10 {
            for rating in Rating::ALL {
                let next = update(&current, rating, now()).unwrap();
                assert!(next.ease_factor >= 1.3, "{rating} gave {}", next.ease_factor);
            }
            current = update(&current, Rating::Again, now()).unwrap();
        }
        assert_eq!(current.ease_factor, 1.3);
    }

    #[test]
    fn test_ease_below_floor_is_rejected() {
        for (input, rating) in [
            (state(5, 0.0), Rating::Good),
            (state(10, 0.5), Rating::Easy),
            (state(2, 1.29), Rating::Hard),
        ] {
            let err = update(&input, rating, now()).unwrap_err();
            assert!(matches!(err, FlashcardsError::InvalidState(_)));
        }
    }

    #[test]
    fn test_floor_ease_still_grows_interval() {
        let good = update(&state(5, 1.3), Rating::Good, now()).unwrap();
        assert_eq!(good.interval, 6);
        assert_eq!(good.ease_factor, 1.3);

        let easy = update(&state(10, 1.3), Rating::Easy, now()).unwrap();
        assert_eq!(easy.interval, 16);
    }

    #[test]
    fn test_repeated_easy_keeps_raising_ease() {
        let mut current = state(0, 2.5);
        for _ in 0..10 {
            let next = update(&current, Rating::Easy, now()).unwrap();
            assert!(next.ease_factor > current.ease_factor);
            assert!(next.interval > current.interval);
            current = next;
        }
    }

    #[test]
    fn test_successful_ratings_never_shrink_interval() {
        for interval in [0, 1, 2, 5, 40] {
            for rating in [Rating::Hard, Rating::Good, Rating::Easy] {
                let next = update(&state(interval, 1.3), rating, now()).unwrap();
                assert!(next.interval >= interval);
            }
        }
    }

    #[test]
    fn test_learned_flag_is_carried() {
        let mut input = state(3, 2.5);
        input.learned = false;
        let next = update(&input, Rating::Good, now()).unwrap();
        assert!(!next.learned);
    }

    #[test]
    fn test_corrupted_state_is_rejected() {
        for bad in [state(-1, 2.5), state(4, f64::NAN), state(4, -1.0)] {
            let err = update(&bad, Rating::Good, now()).unwrap_err();
            assert!(matches!(err, FlashcardsError::InvalidState(_)));
        }
    }

    #[test]
    fn test_huge_interval_overflows_cleanly() {
        let err = update(&state(i64::MAX / 2, 2.5), Rating::Good, now()).unwrap_err();
        assert!(matches!(err, FlashcardsError::DateOverflow));
    }

    #[test]
    fn test_seed_is_start_of_next_day() {
        let expected = Utc.with_ymd_and_hms(2025, 3, 15, 0, 0, 0).unwrap();
        for (h, m, s) in [(0, 0, 0), (15, 9, 26), (23, 59, 59)] {
            let now = Utc.with_ymd_and_hms(2025, 3, 14, h, m, s).unwrap();
            let seeded = seed(now);
            assert_eq!(seeded.next_review_date, expected);
            assert_eq!(seeded.interval, 1);
            assert_eq!(seeded.ease_factor, 2.5);
            assert!(seeded.learned);
        }
    }

    #[test]
    fn test_update_is_deterministic() {
        let a = update(&state(6, 2.1), Rating::Hard, now()).unwrap();
        let b = update(&state(6, 2.1), Rating::Hard, now()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_preview_lists_every_rating() {
        let preview = Scheduler::default().preview(&state(10, 2.0), now()).unwrap();
        assert_eq!(
            preview,
            [
                (Rating::Again, 0),
                (Rating::Hard, 12),
                (Rating::Good, 20),
                (Rating::Easy, 26),
            ]
        );
    }

    #[test]
    fn test_custom_params() {
        let scheduler = Scheduler::new(SchedulerParams {
            first_easy_interval: 3,
            min_due_gap_days: 2,
            ..Default::default()
        })
        .unwrap();

        let easy = scheduler.update(&state(0, 2.5), Rating::Easy, now()).unwrap();
        assert_eq!(easy.interval, 3);

        let again = scheduler.update(&state(8, 2.5), Rating::Again, now()).unwrap();
        assert_eq!(again.next_review_date, now() + TimeDelta::days(2));
    }

    #[test]
    fn test_invalid_params_are_rejected() {
        let bad = [
            SchedulerParams {
                ease_floor: 0.0,
                ..Default::default()
            },
            SchedulerParams {
                hard_penalty: f64::NAN,
                ..Default::default()
            },
            SchedulerParams {
                initial_ease: 1.0,
                ..Default::default()
            },
            SchedulerParams {
                min_due_gap_days: 0,
                ..Default::default()
            },
            SchedulerParams {
                hard_multiplier: 0.5,
                ..Default::default()
            },
            SchedulerParams {
                easy_multiplier: 0.9,
                ..Default::default()
            },
            SchedulerParams {
                ease_floor: 0.8,
                ..Default::default()
            },
        ];
        for params in bad {
            assert!(matches!(
                Scheduler::new(params),
                Err(FlashcardsError::Config(_))
            ));
        }
    }
}
