//! Due-selection policy used to build review queues.

use chrono::{DateTime, Utc};

use super::ScheduleState;

/// Anything that carries a schedule and can be identified.
pub trait Scheduled {
    type Id: Clone;

    fn id(&self) -> Self::Id;
    fn schedule(&self) -> &ScheduleState;
}

impl<I: Clone> Scheduled for (I, ScheduleState) {
    type Id = I;

    fn id(&self) -> I {
        self.0.clone()
    }

    fn schedule(&self) -> &ScheduleState {
        &self.1
    }
}

/// Picks the learned items a user should review, most overdue first.
///
/// With `include_upcoming` every learned item is returned, which lets a user
/// study ahead of schedule. Items with equal due dates keep their input order.
pub fn select_due<T: Scheduled>(
    items: &[T],
    now: DateTime<Utc>,
    include_upcoming: bool,
) -> Vec<T::Id> {
    let mut selected: Vec<&T> = items
        .iter()
        .filter(|item| item.schedule().learned)
        .filter(|item| include_upcoming || item.schedule().is_due(now))
        .collect();

    // stable sort
    selected.sort_by_key(|item| item.schedule().next_review_date);
    selected.into_iter().map(|item| item.id()).collect()
}
