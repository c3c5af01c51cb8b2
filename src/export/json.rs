//! JSON import/export of flashcard decks.
//! Generated vocabulary arrives as a deck file and is imported from here.

use crate::error::Result;
use crate::models::Deck;
use log::info;
use std::fs;
use std::path::Path;

/// Writes a deck as pretty-printed JSON, replacing any existing file.
pub fn export_json_to_path(deck: &Deck, path: &Path) -> Result<()> {
    let json_string = serde_json::to_string_pretty(deck)?;
    fs::write(path, json_string)?;
    info!(
        "Deck '{}' ({} cards) exported to '{}'",
        deck.name,
        deck.flashcards.len(),
        path.display()
    );
    Ok(())
}

/// Reads a deck from a JSON file.
/// Fails if the file is missing or is not a valid deck.
pub fn import_json(path: &Path) -> Result<Deck> {
    let contents = fs::read_to_string(path)?;
    let deck: Deck = serde_json::from_str(&contents)?;

    info!("Deck '{}' imported from '{}'", deck.name, path.display());
    Ok(deck)
}
