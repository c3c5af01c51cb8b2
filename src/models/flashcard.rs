//! Flashcard is a vocabulary word with its translation and an example sentence.
use serde::{Deserialize, Serialize};

pub const DEFAULT_CATEGORY: &str = "General";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flashcard {
    pub word: String,
    pub translation: String,
    #[serde(default)]
    pub sentence: String,
    #[serde(default)]
    pub sentence_translation: String,
    #[serde(default = "default_category")]
    pub category: String,
    /// Custom deck the user moved this card into
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deck_name: Option<String>,
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

impl Flashcard {
    pub fn new(word: &str, translation: &str) -> Self {
        Self {
            word: word.to_string(),
            translation: translation.to_string(),
            sentence: String::new(),
            sentence_translation: String::new(),
            category: default_category(),
            deck_name: None,
        }
    }

    pub fn with_sentence(mut self, sentence: &str, sentence_translation: &str) -> Self {
        self.sentence = sentence.to_string();
        self.sentence_translation = sentence_translation.to_string();
        self
    }

    /// Custom deck if the user picked one, otherwise the generated category.
    pub fn deck(&self) -> &str {
        self.deck_name.as_deref().unwrap_or(&self.category)
    }
}

/// Partial text update; `None` fields keep their stored value.
#[derive(Clone, Debug, Default)]
pub struct FlashcardEdit {
    pub word: Option<String>,
    pub translation: Option<String>,
    pub sentence: Option<String>,
    pub sentence_translation: Option<String>,
}

impl FlashcardEdit {
    pub fn is_empty(&self) -> bool {
        self.word.is_none()
            && self.translation.is_none()
            && self.sentence.is_none()
            && self.sentence_translation.is_none()
    }

    pub fn apply(&self, card: &mut Flashcard) {
        if let Some(word) = &self.word {
            card.word = word.clone();
        }
        if let Some(translation) = &self.translation {
            card.translation = translation.clone();
        }
        if let Some(sentence) = &self.sentence {
            card.sentence = sentence.clone();
        }
        if let Some(sentence_translation) = &self.sentence_translation {
            card.sentence_translation = sentence_translation.clone();
        }
    }
}
