mod cli;

use chrono::{DateTime, Local, Utc};
use clap::Parser;
use eyre::{Result, WrapErr};
use flashcards_app::database::db;
use flashcards_app::export::json::{export_json_to_path, import_json};
use flashcards_app::models::FlashcardEdit;
use flashcards_app::*;
use log::info;
use rusqlite::Connection;
use std::io::{self, BufRead, Write};

use cli::{Cli, Commands};

/// Formats a timestamp as local YYYY-MM-DD HH:MM
fn format_time(time: DateTime<Utc>) -> String {
    time.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

fn setup_logging(cli: &Cli, config: &Config) {
    let level = if cli.verbose {
        "debug"
    } else {
        config.log_level.as_deref().unwrap_or("info")
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn print_card(record: &CardRecord) {
    let card = &record.flashcard;
    println!(
        "[{}] {} = {}  ({}, due {}, interval {}d, ease {:.2})",
        record.id,
        card.word,
        card.translation,
        card.deck(),
        format_time(record.schedule.next_review_date),
        record.schedule.interval,
        record.schedule.ease_factor
    );
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref()).wrap_err("Failed to load config")?;
    setup_logging(&cli, &config);

    let scheduler = Scheduler::new(config.scheduler.clone())?;
    let db_path = cli.db.clone().unwrap_or_else(|| config.database.path.clone());
    let mut conn = db::open_database(&db_path)
        .wrap_err_with(|| format!("Failed to open database {}", db_path.display()))?;

    // the clock is read once per command
    let now = cli.now.unwrap_or_else(Utc::now);
    info!("Running {:?} at {}", cli.command, now);

    run_command(&cli.command, &scheduler, now, &mut conn)
}

fn run_command(
    command: &Commands,
    scheduler: &Scheduler,
    now: DateTime<Utc>,
    conn: &mut Connection,
) -> Result<()> {
    match command {
        Commands::Add {
            word,
            translation,
            sentence,
            sentence_translation,
            category,
            learned,
        } => {
            let mut card = Flashcard::new(word, translation).with_sentence(sentence, sentence_translation);
            if let Some(category) = category {
                card.category = category.clone();
            }
            let id = db::add_flashcard(&card, *learned, scheduler, now, conn)?;
            println!("Added card {id}");
        }
        Commands::Import { file } => {
            let deck = import_json(file)
                .wrap_err_with(|| format!("Failed to import {}", file.display()))?;
            let added = db::import_deck(&deck, scheduler, now, conn)?;
            println!(
                "Imported {added} of {} cards into '{}'",
                deck.flashcards.len(),
                deck.name
            );
        }
        Commands::Export { deck, file } => {
            let deck = db::load_deck(deck, conn)?;
            export_json_to_path(&deck, file)
                .wrap_err_with(|| format!("Failed to export to {}", file.display()))?;
            println!("Exported {} cards to {}", deck.flashcards.len(), file.display());
        }
        Commands::Decks => {
            for name in db::deck_names(conn)? {
                println!("{name}");
            }
        }
        Commands::Learn { id } => {
            let state = db::mark_learned(*id, scheduler, now, conn)?;
            println!("Card {id} learned, first review {}", format_time(state.next_review_date));
        }
        Commands::Edit {
            id,
            word,
            translation,
            sentence,
            sentence_translation,
        } => {
            let edit = FlashcardEdit {
                word: word.clone(),
                translation: translation.clone(),
                sentence: sentence.clone(),
                sentence_translation: sentence_translation.clone(),
            };
            let record = db::edit_flashcard(*id, &edit, conn)?;
            print_card(&record);
        }
        Commands::Deck { name, ids } => {
            let moved = db::assign_deck(ids, name, conn)?;
            println!("Moved {moved} cards into '{name}'");
        }
        Commands::Delete { id } => {
            db::delete_flashcard(*id, conn)?;
            println!("Deleted card {id}");
        }
        Commands::List => {
            for record in db::learned_cards(conn)? {
                print_card(&record);
            }
        }
        Commands::Queue { upcoming } => {
            let queue = db::review_queue(now, *upcoming, conn)?;
            if queue.is_empty() {
                println!("Nothing to review");
            }
            for record in &queue {
                print_card(record);
            }
        }
        Commands::Review { id, rating } => {
            let state = db::apply_rating(*id, *rating, scheduler, now, conn)?;
            println!("Next review {}", format_time(state.next_review_date));
        }
        Commands::Preview { id } => {
            let record = db::get_card(*id, conn)?;
            for (rating, interval) in scheduler.preview(&record.schedule, now)? {
                println!("{:>5}: {interval}d", rating.as_str());
            }
        }
        Commands::Study { upcoming } => {
            let queue = db::review_queue(now, *upcoming, conn)?;
            study(LearningSession::new_from_queue(queue), scheduler, now, conn)?;
        }
        Commands::Stats => {
            let stats = db::deck_stats(now, conn)?;
            println!(
                "{} cards, {} learned, {} due",
                stats.total, stats.learned, stats.due
            );
            println!("\nLearned this week:");
            for day in db::weekly_progress(now, conn)? {
                println!("  {} {}: {}", day.date.format("%a"), day.date, day.learned);
            }
            println!("Daily average: {}", db::daily_average(now, conn)?);
        }
    }
    Ok(())
}

/// Reads a rating as a button number (1-4) or a name. `None` means quit.
fn read_rating(lines: &mut impl Iterator<Item = io::Result<String>>) -> Result<Option<Rating>> {
    loop {
        print!("Rate 1-4 (again/hard/good/easy), q to quit: ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            return Ok(None);
        };
        let line = line?;
        let input = line.trim();
        if input.eq_ignore_ascii_case("q") {
            return Ok(None);
        }

        let parsed = match input.parse::<u8>() {
            Ok(number) => Rating::try_from(number),
            Err(_) => input.parse::<Rating>(),
        };
        match parsed {
            Ok(rating) => return Ok(Some(rating)),
            Err(e) => println!("{e}"),
        }
    }
}

fn study(
    mut session: LearningSession,
    scheduler: &Scheduler,
    now: DateTime<Utc>,
    conn: &mut Connection,
) -> Result<()> {
    if session.is_completed() {
        println!("Nothing to review");
        return Ok(());
    }

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut round = 0;

    while !session.is_completed() {
        if session.round_number != round {
            round = session.round_number;
            println!("\n{}", session.phase_message());
        }
        let Some(card) = session.current_card() else {
            break;
        };
        let flashcard = card.record.flashcard.clone();
        println!("\n{}", flashcard.word);
        if !flashcard.sentence.is_empty() {
            println!("  {}", flashcard.sentence);
        }

        print!("Press Enter to show the translation");
        io::stdout().flush()?;
        if lines.next().transpose()?.is_none() {
            break;
        }
        session.toggle_translation();
        println!("{}", flashcard.translation);
        if !flashcard.sentence_translation.is_empty() {
            println!("  {}", flashcard.sentence_translation);
        }

        let Some(rating) = read_rating(&mut lines)? else {
            break;
        };
        if let Some(state) = session.grade_current_card(rating, scheduler, now, conn)? {
            println!("Next review {}", format_time(state.next_review_date));
        }
        session.next_card();
    }

    println!(
        "\nSession finished: {} of {} cards passed",
        session.passed_count(),
        session.total_count()
    );
    Ok(())
}
