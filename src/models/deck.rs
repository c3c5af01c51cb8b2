//! Deck is a named set of flashcards, the unit of JSON import and export
use super::Flashcard;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Deck {
    pub name: String,
    pub flashcards: Vec<Flashcard>,
}

impl Deck {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            flashcards: Vec::new(),
        }
    }
}

impl Default for Deck {
    fn default() -> Self {
        Self::new("My Deck")
    }
}
