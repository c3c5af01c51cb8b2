//! Database operations for the flashcard application
//!
//! Handles SQLite schema setup, flashcard CRUD and the persisted schedule of
//! every card. Ratings are applied inside an immediate transaction so two
//! reviews of the same card are serialized instead of overwriting each other.

use crate::error::{FlashcardsError, Result};
use crate::models::{
    CardRecord, Deck, Flashcard, FlashcardEdit, Rating, ScheduleState, Scheduled, Scheduler,
    select_due,
};
use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};
use log::{debug, info, warn};
use rusqlite::{Connection, OptionalExtension, Row, TransactionBehavior, params};
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

const SELECT_CARD: &str = "SELECT f.id, f.word, f.translation, f.sentence, f.sentence_translation,
        f.category, f.deck_name, f.created_at,
        s.learned, s.interval_days, s.ease_factor, s.next_review_date
     FROM flashcards f
     JOIN schedule s ON s.flashcard_id = f.id";

/// Card counts shown on the overview screen
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckStats {
    pub total: usize,
    pub learned: usize,
    pub due: usize,
}

/// Learned cards added on one day
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayProgress {
    pub date: NaiveDate,
    pub learned: usize,
}

const PROGRESS_DAYS: u64 = 7;
const SECONDS_PER_DAY: u64 = 86_400;

/// Opens (creating if needed) the database file and its tables
pub fn open_database(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let conn = Connection::open(path)?;
    init_schema(&conn)?;
    info!("Opened database at {}", path.display());
    Ok(conn)
}

/// Creates the flashcard and schedule tables if they don't exist
pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "PRAGMA foreign_keys = ON;

        CREATE TABLE IF NOT EXISTS flashcards (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            word TEXT NOT NULL,
            translation TEXT NOT NULL,
            sentence TEXT NOT NULL DEFAULT '',
            sentence_translation TEXT NOT NULL DEFAULT '',
            category TEXT NOT NULL,
            deck_name TEXT,
            created_at TEXT NOT NULL
        );

        -- one row per flashcard
        CREATE TABLE IF NOT EXISTS schedule (
            flashcard_id INTEGER PRIMARY KEY,
            learned INTEGER NOT NULL DEFAULT 0,
            interval_days INTEGER NOT NULL DEFAULT 0,
            ease_factor REAL NOT NULL DEFAULT 2.5,
            next_review_date TEXT NOT NULL,
            FOREIGN KEY (flashcard_id) REFERENCES flashcards(id) ON DELETE CASCADE
        );",
    )?;
    Ok(())
}

fn card_from_row(row: &Row) -> rusqlite::Result<CardRecord> {
    Ok(CardRecord {
        id: row.get(0)?,
        flashcard: Flashcard {
            word: row.get(1)?,
            translation: row.get(2)?,
            sentence: row.get(3)?,
            sentence_translation: row.get(4)?,
            category: row.get(5)?,
            deck_name: row.get(6)?,
        },
        created_at: row.get(7)?,
        schedule: ScheduleState {
            learned: row.get(8)?,
            interval: row.get(9)?,
            ease_factor: row.get(10)?,
            next_review_date: row.get(11)?,
        },
    })
}

fn query_cards(sql: &str, params: impl rusqlite::Params, conn: &Connection) -> Result<Vec<CardRecord>> {
    let mut stmt = conn.prepare(sql)?;
    let cards = stmt
        .query_map(params, card_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(cards)
}

fn read_schedule(flashcard_id: i64, conn: &Connection) -> Result<ScheduleState> {
    conn.query_row(
        "SELECT learned, interval_days, ease_factor, next_review_date
         FROM schedule WHERE flashcard_id = ?1",
        params![flashcard_id],
        |row| {
            Ok(ScheduleState {
                learned: row.get(0)?,
                interval: row.get(1)?,
                ease_factor: row.get(2)?,
                next_review_date: row.get(3)?,
            })
        },
    )
    .optional()?
    .ok_or(FlashcardsError::NotFound(flashcard_id))
}

fn write_schedule(flashcard_id: i64, state: &ScheduleState, conn: &Connection) -> Result<()> {
    let changed = conn.execute(
        "UPDATE schedule
         SET learned = ?1, interval_days = ?2, ease_factor = ?3, next_review_date = ?4
         WHERE flashcard_id = ?5",
        params![
            state.learned,
            state.interval,
            state.ease_factor,
            state.next_review_date,
            flashcard_id
        ],
    )?;
    if changed == 0 {
        return Err(FlashcardsError::NotFound(flashcard_id));
    }
    Ok(())
}

fn insert_card(
    card: &Flashcard,
    schedule: &ScheduleState,
    now: DateTime<Utc>,
    conn: &Connection,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO flashcards (word, translation, sentence, sentence_translation, category, deck_name, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            card.word,
            card.translation,
            card.sentence,
            card.sentence_translation,
            card.category,
            card.deck_name,
            now
        ],
    )?;
    let flashcard_id = conn.last_insert_rowid();

    conn.execute(
        "INSERT INTO schedule (flashcard_id, learned, interval_days, ease_factor, next_review_date)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            flashcard_id,
            schedule.learned,
            schedule.interval,
            schedule.ease_factor,
            schedule.next_review_date
        ],
    )?;
    Ok(flashcard_id)
}

/// Stores a new flashcard and returns its id
///
/// Cards saved as already learned are seeded straight into the review cycle.
pub fn add_flashcard(
    card: &Flashcard,
    learned: bool,
    scheduler: &Scheduler,
    now: DateTime<Utc>,
    conn: &Connection,
) -> Result<i64> {
    let schedule = if learned {
        scheduler.seed(now)
    } else {
        scheduler.unscheduled(now)
    };

    let tx = conn.unchecked_transaction()?;
    let flashcard_id = insert_card(card, &schedule, now, &tx)?;
    tx.commit()?;

    info!("Added flashcard {} '{}' (learned: {})", flashcard_id, card.word, learned);
    Ok(flashcard_id)
}

/// Imports every card of a deck, skipping words the deck already contains
///
/// Returns the number of cards added.
pub fn import_deck(
    deck: &Deck,
    scheduler: &Scheduler,
    now: DateTime<Utc>,
    conn: &Connection,
) -> Result<usize> {
    let mut existing: Vec<String> = cards_in_deck(&deck.name, conn)?
        .into_iter()
        .map(|record| record.flashcard.word)
        .collect();

    let tx = conn.unchecked_transaction()?;
    let mut added = 0;
    for card in &deck.flashcards {
        if existing.contains(&card.word) {
            warn!("Skipping '{}': already in deck '{}'", card.word, deck.name);
            continue;
        }
        let mut card = card.clone();
        if card.deck() != deck.name {
            card.deck_name = Some(deck.name.clone());
        }
        insert_card(&card, &scheduler.unscheduled(now), now, &tx)?;
        existing.push(card.word);
        added += 1;
    }
    tx.commit()?;

    info!("Imported {} of {} cards into '{}'", added, deck.flashcards.len(), deck.name);
    Ok(added)
}

/// Loads one card with its schedule
pub fn get_card(flashcard_id: i64, conn: &Connection) -> Result<CardRecord> {
    let sql = format!("{SELECT_CARD} WHERE f.id = ?1");
    conn.query_row(&sql, params![flashcard_id], card_from_row)
        .optional()?
        .ok_or(FlashcardsError::NotFound(flashcard_id))
}

/// Updates the text of a card; the schedule is left alone
pub fn edit_flashcard(flashcard_id: i64, edit: &FlashcardEdit, conn: &Connection) -> Result<CardRecord> {
    let mut record = get_card(flashcard_id, conn)?;
    if edit.is_empty() {
        return Ok(record);
    }
    edit.apply(&mut record.flashcard);

    conn.execute(
        "UPDATE flashcards
         SET word = ?1, translation = ?2, sentence = ?3, sentence_translation = ?4
         WHERE id = ?5",
        params![
            record.flashcard.word,
            record.flashcard.translation,
            record.flashcard.sentence,
            record.flashcard.sentence_translation,
            flashcard_id
        ],
    )?;

    info!("Edited flashcard {}", flashcard_id);
    Ok(record)
}

/// Moves the given cards into a custom deck
///
/// Unknown ids are ignored; returns how many cards were moved.
pub fn assign_deck(flashcard_ids: &[i64], deck_name: &str, conn: &Connection) -> Result<usize> {
    let tx = conn.unchecked_transaction()?;
    let mut moved = 0;
    for id in flashcard_ids {
        moved += tx.execute(
            "UPDATE flashcards SET deck_name = ?1 WHERE id = ?2",
            params![deck_name, id],
        )?;
    }
    tx.commit()?;

    info!("Moved {} cards into deck '{}'", moved, deck_name);
    Ok(moved)
}

/// Deletes a card and its schedule
pub fn delete_flashcard(flashcard_id: i64, conn: &Connection) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute(
        "DELETE FROM schedule WHERE flashcard_id = ?1",
        params![flashcard_id],
    )?;
    let deleted = tx.execute("DELETE FROM flashcards WHERE id = ?1", params![flashcard_id])?;
    if deleted == 0 {
        return Err(FlashcardsError::NotFound(flashcard_id));
    }
    tx.commit()?;

    info!("Deleted flashcard {}", flashcard_id);
    Ok(())
}

/// Marks a card as learned, seeding its schedule the first time
///
/// A card that is already learned keeps its schedule.
pub fn mark_learned(
    flashcard_id: i64,
    scheduler: &Scheduler,
    now: DateTime<Utc>,
    conn: &mut Connection,
) -> Result<ScheduleState> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let current = read_schedule(flashcard_id, &tx)?;
    if current.learned {
        debug!("Flashcard {} already learned", flashcard_id);
        return Ok(current);
    }

    let seeded = scheduler.seed(now);
    write_schedule(flashcard_id, &seeded, &tx)?;
    tx.commit()?;

    info!(
        "Flashcard {} learned, first review {}",
        flashcard_id, seeded.next_review_date
    );
    Ok(seeded)
}

/// Applies a review rating to a stored card and persists the new schedule
///
/// Reading, scheduling and writing happen in one immediate transaction. If
/// anything fails the stored schedule is left exactly as it was. Cards that
/// are not learned yet have no review cycle and are rejected.
pub fn apply_rating(
    flashcard_id: i64,
    rating: Rating,
    scheduler: &Scheduler,
    now: DateTime<Utc>,
    conn: &mut Connection,
) -> Result<ScheduleState> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let current = read_schedule(flashcard_id, &tx)?;
    if !current.learned {
        return Err(FlashcardsError::InvalidState(format!(
            "flashcard {flashcard_id} is not learned yet"
        )));
    }
    let next = scheduler.update(&current, rating, now)?;
    write_schedule(flashcard_id, &next, &tx)?;
    tx.commit()?;

    info!(
        "Flashcard {} rated {}, next review {}",
        flashcard_id, rating, next.next_review_date
    );
    Ok(next)
}

/// All learned cards, newest first
pub fn learned_cards(conn: &Connection) -> Result<Vec<CardRecord>> {
    let sql = format!("{SELECT_CARD} WHERE s.learned = 1 ORDER BY f.created_at DESC, f.id DESC");
    query_cards(&sql, [], conn)
}

/// Cards whose deck (custom deck or category) is `deck_name`
pub fn cards_in_deck(deck_name: &str, conn: &Connection) -> Result<Vec<CardRecord>> {
    let sql = format!("{SELECT_CARD} WHERE COALESCE(f.deck_name, f.category) = ?1 ORDER BY f.id");
    query_cards(&sql, params![deck_name], conn)
}

/// Names of every deck that holds at least one card
pub fn deck_names(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT DISTINCT COALESCE(deck_name, category) FROM flashcards ORDER BY 1",
    )?;
    let names = stmt
        .query_map([], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<String>>>()?;
    Ok(names)
}

/// Builds a deck from the stored cards for export
pub fn load_deck(deck_name: &str, conn: &Connection) -> Result<Deck> {
    let flashcards = cards_in_deck(deck_name, conn)?
        .into_iter()
        .map(|record| record.flashcard)
        .collect();
    Ok(Deck {
        name: deck_name.to_string(),
        flashcards,
    })
}

/// Learned cards to review, most overdue first
///
/// With `include_upcoming` cards that are not due yet are included as well.
pub fn review_queue(
    now: DateTime<Utc>,
    include_upcoming: bool,
    conn: &Connection,
) -> Result<Vec<CardRecord>> {
    let sql = format!("{SELECT_CARD} WHERE s.learned = 1 ORDER BY f.id");
    let cards = query_cards(&sql, [], conn)?;
    let ids = select_due(&cards, now, include_upcoming);

    let mut by_id: HashMap<i64, CardRecord> = cards.into_iter().map(|c| (c.id(), c)).collect();
    let queue: Vec<CardRecord> = ids.into_iter().filter_map(|id| by_id.remove(&id)).collect();

    debug!("Review queue has {} cards (upcoming: {})", queue.len(), include_upcoming);
    Ok(queue)
}

pub fn deck_stats(now: DateTime<Utc>, conn: &Connection) -> Result<DeckStats> {
    let total: i64 = conn.query_row("SELECT COUNT(*) FROM flashcards", [], |row| row.get(0))?;
    let learned: i64 = conn.query_row(
        "SELECT COUNT(*) FROM schedule WHERE learned = 1",
        [],
        |row| row.get(0),
    )?;
    let due = review_queue(now, false, conn)?.len();

    Ok(DeckStats {
        total: usize::try_from(total).unwrap_or_default(),
        learned: usize::try_from(learned).unwrap_or_default(),
        due,
    })
}

/// Learned cards per UTC day over the last week, oldest first, today last
///
/// A card counts on the day it was added.
pub fn weekly_progress(now: DateTime<Utc>, conn: &Connection) -> Result<Vec<DayProgress>> {
    let first_day = now
        .date_naive()
        .checked_sub_days(Days::new(PROGRESS_DAYS - 1))
        .ok_or(FlashcardsError::DateOverflow)?;
    let since = first_day.and_time(NaiveTime::MIN).and_utc();

    let mut stmt = conn.prepare(
        "SELECT f.created_at FROM flashcards f
         JOIN schedule s ON s.flashcard_id = f.id
         WHERE s.learned = 1 AND f.created_at >= ?1",
    )?;
    let added = stmt
        .query_map(params![since], |row| row.get::<_, DateTime<Utc>>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let progress = first_day
        .iter_days()
        .take(PROGRESS_DAYS as usize)
        .map(|date| DayProgress {
            date,
            learned: added.iter().filter(|at| at.date_naive() == date).count(),
        })
        .collect();
    Ok(progress)
}

/// Learned cards per day since the first card was added, rounded
///
/// Days are counted up to the end of today, at least one.
pub fn daily_average(now: DateTime<Utc>, conn: &Connection) -> Result<usize> {
    let first_added: Option<DateTime<Utc>> =
        conn.query_row("SELECT MIN(created_at) FROM flashcards", [], |row| row.get(0))?;
    let Some(first_added) = first_added else {
        return Ok(0);
    };

    let learned: i64 = conn.query_row(
        "SELECT COUNT(*) FROM schedule WHERE learned = 1",
        [],
        |row| row.get(0),
    )?;
    let end_of_today = now
        .date_naive()
        .and_time(NaiveTime::MIN)
        .and_utc()
        .checked_add_days(Days::new(1))
        .ok_or(FlashcardsError::DateOverflow)?;
    let seconds = u64::try_from((end_of_today - first_added).num_seconds()).unwrap_or_default();
    let days = seconds.div_ceil(SECONDS_PER_DAY).max(1);

    Ok((learned as f64 / days as f64).round() as usize)
}
