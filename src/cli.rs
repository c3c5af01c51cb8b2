//! Command-line interface definitions.

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use flashcards_app::Rating;
use std::path::PathBuf;

/// Vocabulary flashcards with spaced repetition reviews
#[derive(Parser, Debug)]
#[command(name = "flashcards")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Database file, overrides the config
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Pretend the current time is this RFC 3339 timestamp
    #[arg(long, global = true)]
    pub now: Option<DateTime<Utc>>,

    /// Debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Add a flashcard
    Add {
        word: String,
        translation: String,

        #[arg(long, default_value = "")]
        sentence: String,

        #[arg(long, default_value = "")]
        sentence_translation: String,

        #[arg(long)]
        category: Option<String>,

        /// Save the card as already learned
        #[arg(long)]
        learned: bool,
    },

    /// Import a deck from a JSON file
    Import { file: PathBuf },

    /// Export a deck to a JSON file
    Export { deck: String, file: PathBuf },

    /// List deck names
    Decks,

    /// Mark a card as learned so it enters the review cycle
    Learn { id: i64 },

    /// Edit the text of a card
    Edit {
        id: i64,

        #[arg(long)]
        word: Option<String>,

        #[arg(long)]
        translation: Option<String>,

        #[arg(long)]
        sentence: Option<String>,

        #[arg(long)]
        sentence_translation: Option<String>,
    },

    /// Move cards into a custom deck
    Deck {
        name: String,

        #[arg(required = true)]
        ids: Vec<i64>,
    },

    /// Delete a card
    Delete { id: i64 },

    /// List learned cards, newest first
    List,

    /// Show the review queue
    Queue {
        /// Include cards that are not due yet
        #[arg(short, long)]
        upcoming: bool,
    },

    /// Rate a card: again, hard, good or easy
    Review { id: i64, rating: Rating },

    /// Show the interval each rating would give a card
    Preview { id: i64 },

    /// Review the queue interactively
    Study {
        /// Include cards that are not due yet
        #[arg(short, long)]
        upcoming: bool,
    },

    /// Card counts, learned cards per day this week and the daily average
    Stats,
}
