//! A stored flashcard together with its schedule.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::due::Scheduled;
use super::{Flashcard, ScheduleState};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardRecord {
    pub id: i64,
    #[serde(flatten)]
    pub flashcard: Flashcard,
    pub schedule: ScheduleState,
    pub created_at: DateTime<Utc>,
}

impl Scheduled for CardRecord {
    type Id = i64;

    fn id(&self) -> i64 {
        self.id
    }

    fn schedule(&self) -> &ScheduleState {
        &self.schedule
    }
}
