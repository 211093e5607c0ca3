//! Word management commands for CLI.

use clap::Subcommand;
use memodict_core::{now_ms, AddOutcome, LookupResult, SortKey, Word};

#[derive(Subcommand)]
pub enum WordAction {
    /// Add a word to the collection
    Add {
        /// Word text
        term: String,
        /// Comma-separated translations
        #[arg(long)]
        translation: Option<String>,
        /// Phonetic transcription
        #[arg(long)]
        phonetic: Option<String>,
        /// Pronunciation audio URL
        #[arg(long)]
        audio_url: Option<String>,
        /// Dictionary-API shaped meanings payload, as JSON
        #[arg(long)]
        meanings_json: Option<String>,
    },
    /// List words
    List {
        /// Sort order: created, term, ease or interval
        #[arg(long, default_value = "term")]
        sort: String,
        /// Print raw JSON
        #[arg(long)]
        json: bool,
    },
    /// Remove a word
    Remove {
        /// Word ID
        id: String,
    },
    /// List words due for review
    Due {
        /// Print raw JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: WordAction) -> Result<(), Box<dyn std::error::Error>> {
    let (mut collection, config) = super::open_collection()?;

    match action {
        WordAction::Add {
            term,
            translation,
            phonetic,
            audio_url,
            meanings_json,
        } => {
            let meanings = match meanings_json {
                Some(raw) => serde_json::from_str(&raw)?,
                None => serde_json::Value::Null,
            };
            let entry = LookupResult {
                word: term,
                translation: translation
                    .map(|t| t.split(',').map(|s| s.trim().to_string()).collect())
                    .unwrap_or_default(),
                meanings,
                phonetic,
                audio_url,
            };
            match collection.add(entry, now_ms())? {
                AddOutcome::Added(word) => {
                    println!("Word added: {}", word.id);
                    println!("{}", serde_json::to_string_pretty(&word)?);
                    super::maybe_auto_push(&collection, &config);
                }
                AddOutcome::Duplicate(word) => {
                    println!("Already in the collection: {} ({})", word.word, word.id);
                }
            }
        }
        WordAction::List { sort, json } => {
            let key = SortKey::parse(&sort).ok_or_else(|| {
                format!("unknown sort key: {sort} (expected created, term, ease or interval)")
            })?;
            let words = collection.list(key);
            print_words(&words, json, "The collection is empty.")?;
        }
        WordAction::Remove { id } => {
            if collection.remove(&id)? {
                println!("Word removed: {id}");
                super::maybe_auto_push(&collection, &config);
            } else {
                println!("No such word: {id}");
            }
        }
        WordAction::Due { json } => {
            let words = collection.due(now_ms());
            print_words(&words, json, "Nothing due for review.")?;
        }
    }
    Ok(())
}

fn print_words(words: &[Word], json: bool, empty_msg: &str) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        println!("{}", serde_json::to_string_pretty(words)?);
        return Ok(());
    }
    if words.is_empty() {
        println!("{empty_msg}");
        return Ok(());
    }
    for w in words {
        let translation = if w.translation.is_empty() {
            String::new()
        } else {
            format!("  [{}]", w.translation.join(", "))
        };
        println!(
            "{}  {}{}  ({} reps, every {}d)",
            w.id, w.word, translation, w.repetitions, w.interval
        );
    }
    Ok(())
}
