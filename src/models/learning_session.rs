//! Review session over a queue of learned cards.
//! Cards rated `again` are repeated in following rounds until every card passes.

use super::{CardRecord, LearningCard, Rating, ScheduleState, Scheduler};
use crate::database::db;
use crate::error::Result;
use chrono::{DateTime, Utc};
use log::debug;
use rusqlite::Connection;

/// Manages a review session with multiple rounds.
pub struct LearningSession {
    pub all_cards: Vec<LearningCard>,
    pub current_round_cards: Vec<usize>,
    pub current_index: usize,
    pub show_translation: bool,
    pub round_number: usize,
}

impl LearningSession {
    /// Creates a session from a review queue, keeping its order.
    pub fn new_from_queue(queue: Vec<CardRecord>) -> Self {
        let all_cards: Vec<LearningCard> = queue.into_iter().map(LearningCard::new).collect();
        let indices: Vec<usize> = (0..all_cards.len()).collect();

        Self {
            all_cards,
            current_round_cards: indices,
            current_index: 0,
            show_translation: false,
            round_number: 1,
        }
    }

    pub fn current_card(&self) -> Option<&LearningCard> {
        self.current_round_cards
            .get(self.current_index)
            .and_then(|&idx| self.all_cards.get(idx))
    }

    pub fn toggle_translation(&mut self) {
        self.show_translation = !self.show_translation;
    }

    pub fn next_card(&mut self) {
        if self.current_index + 1 < self.current_round_cards.len() {
            self.current_index += 1;
            self.show_translation = false;
        } else {
            self.start_next_round();
        }
    }

    /// Starts a new round with the cards rated `again`.
    /// If every card passed the session is complete.
    fn start_next_round(&mut self) {
        let failed_indices: Vec<usize> = self
            .current_round_cards
            .iter()
            .copied()
            .filter(|&idx| self.all_cards.get(idx).is_some_and(|card| !card.passed))
            .collect();

        if failed_indices.is_empty() {
            return;
        }

        debug!(
            "Round {} finished, {} cards to retry",
            self.round_number,
            failed_indices.len()
        );
        self.current_round_cards = failed_indices;
        self.current_index = 0;
        self.show_translation = false;
        self.round_number += 1;
    }

    /// Rates the current card and persists its new schedule.
    ///
    /// On error nothing changes, in the database or in the session.
    pub fn grade_current_card(
        &mut self,
        rating: Rating,
        scheduler: &Scheduler,
        now: DateTime<Utc>,
        conn: &mut Connection,
    ) -> Result<Option<ScheduleState>> {
        let Some(&actual_idx) = self.current_round_cards.get(self.current_index) else {
            return Ok(None);
        };
        let Some(card) = self.all_cards.get_mut(actual_idx) else {
            return Ok(None);
        };

        let next = db::apply_rating(card.record.id, rating, scheduler, now, conn)?;
        card.record.schedule = next.clone();
        card.mark_rated(rating, now);
        Ok(Some(next))
    }

    pub fn passed_count(&self) -> usize {
        self.current_round_cards
            .iter()
            .filter(|&&idx| self.all_cards.get(idx).is_some_and(|card| card.passed))
            .count()
    }

    pub fn total_count(&self) -> usize {
        self.current_round_cards.len()
    }

    pub fn remaining_count(&self) -> usize {
        self.total_count() - self.passed_count()
    }

    /// True once every card of the current round has passed.
    pub fn is_completed(&self) -> bool {
        self.current_round_cards.is_empty() || self.passed_count() == self.total_count()
    }

    pub fn phase_message(&self) -> String {
        if self.round_number == 1 {
            format!("Round {}: {} cards", self.round_number, self.total_count())
        } else {
            format!(
                "Round {} (Retry): {} cards to retry",
                self.round_number,
                self.total_count()
            )
        }
    }
}
