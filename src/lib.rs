pub mod config;
pub mod database;
pub mod error;
pub mod export;
pub mod models;

pub use config::Config;
pub use error::{FlashcardsError, Result};
pub use models::{
    CardRecord, Deck, Flashcard, LearningSession, Rating, ScheduleState, Scheduler,
    SchedulerParams, select_due,
};
