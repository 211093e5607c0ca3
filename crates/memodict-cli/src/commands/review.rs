//! Single-review grading command.

use memodict_core::{now_ms, Grade};

pub fn run(id: &str, grade: i64) -> Result<(), Box<dyn std::error::Error>> {
    let (mut collection, config) = super::open_collection()?;

    match collection.review(id, Grade::from_raw(grade), now_ms())? {
        Some(word) => {
            println!(
                "{}: next review in {}d (ease {:.2}, {} in a row)",
                word.word,
                word.interval.max(1),
                word.ease,
                word.repetitions
            );
            super::maybe_auto_push(&collection, &config);
        }
        None => println!("No such word: {id}"),
    }
    Ok(())
}
