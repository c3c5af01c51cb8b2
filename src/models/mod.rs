pub mod card_record;
pub mod deck;
pub mod due;
pub mod flashcard;
pub mod learning_card;
pub mod learning_session;
pub mod rating;
pub mod schedule_state;
pub mod srs;

pub use card_record::CardRecord;
pub use deck::Deck;
pub use due::{Scheduled, select_due};
pub use flashcard::{Flashcard, FlashcardEdit};
pub use learning_card::LearningCard;
pub use learning_session::LearningSession;
pub use rating::Rating;
pub use schedule_state::ScheduleState;
pub use srs::{Scheduler, SchedulerParams};
