//! Interactive drill over due words.
//!
//! Presents due words in random order, reveals the stored payload on
//! Enter, and feeds the self-assessed grade back into the scheduler.

use std::io::Write;

use memodict_core::{now_ms, Grade};
use rand::seq::SliceRandom;

pub fn run(limit: Option<usize>) -> Result<(), Box<dyn std::error::Error>> {
    let (mut collection, config) = super::open_collection()?;

    let mut due = collection.due(now_ms());
    if due.is_empty() {
        println!("Nothing due for review.");
        return Ok(());
    }
    due.shuffle(&mut rand::thread_rng());
    if let Some(n) = limit {
        due.truncate(n);
    }

    let total = due.len();
    let stdin = std::io::stdin();
    let mut graded = 0usize;
    for (i, word) in due.iter().enumerate() {
        println!();
        println!("[{}/{}] {}", i + 1, total, word.word);
        if let Some(phonetic) = &word.phonetic {
            println!("  {phonetic}");
        }
        print!("  press Enter to reveal... ");
        std::io::stdout().flush()?;
        let mut line = String::new();
        stdin.read_line(&mut line)?;

        if word.translation.is_empty() {
            println!("  (no stored translation)");
        } else {
            println!("  {}", word.translation.join(", "));
        }

        print!("  grade 0-3 (s = skip, q = quit): ");
        std::io::stdout().flush()?;
        line.clear();
        stdin.read_line(&mut line)?;
        let answer = line.trim();
        if answer == "q" {
            break;
        }
        if answer == "s" || answer.is_empty() {
            continue;
        }
        let Ok(raw) = answer.parse::<i64>() else {
            println!("  not a grade, skipping");
            continue;
        };
        collection.review(&word.id, Grade::from_raw(raw), now_ms())?;
        graded += 1;
    }

    println!();
    println!("Session done: {graded} of {total} graded.");
    if graded > 0 {
        super::maybe_auto_push(&collection, &config);
    }
    Ok(())
}
