//! SQLite-based durable storage for the word collection.
//!
//! One row per word; nested payloads (translation, meanings, history) are
//! stored as JSON text columns. Reconciliation and import apply their whole
//! change set inside a single transaction.

use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

use super::data_dir;
use crate::error::StoreError;
use crate::word::{default_ease, Word};

/// SQLite database for word storage.
pub struct WordDb {
    conn: Connection,
}

impl WordDb {
    /// Open the database at `~/.config/memodict/memodict.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, StoreError> {
        let path = data_dir()
            .map_err(|e| StoreError::QueryFailed(e.to_string()))?
            .join("memodict.db");
        Self::open_at(&path)
    }

    /// Open the database at an explicit path (tests, backups).
    pub fn open_at(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(|source| StoreError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()
            .map_err(|e| StoreError::MigrationFailed(e.to_string()))?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(StoreError::from)?;
        let db = Self { conn };
        db.migrate()
            .map_err(|e| StoreError::MigrationFailed(e.to_string()))?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS words (
                id           TEXT PRIMARY KEY,
                word         TEXT NOT NULL,
                translation  TEXT NOT NULL DEFAULT '[]',
                meanings     TEXT NOT NULL DEFAULT 'null',
                phonetic     TEXT,
                audio_url    TEXT,
                created_at   INTEGER NOT NULL,
                updated_at   INTEGER,
                next_review  INTEGER NOT NULL,
                interval_days INTEGER NOT NULL DEFAULT 0,
                ease         REAL NOT NULL DEFAULT 2.5,
                repetitions  INTEGER NOT NULL DEFAULT 0,
                history      TEXT NOT NULL DEFAULT '[]'
            );

            CREATE INDEX IF NOT EXISTS idx_words_word ON words(word);
            CREATE INDEX IF NOT EXISTS idx_words_next_review ON words(next_review);",
        )
    }

    /// Insert or replace one word.
    ///
    /// # Errors
    /// Returns an error if the write fails.
    pub fn upsert(&self, word: &Word) -> Result<(), rusqlite::Error> {
        upsert_in(&self.conn, word)
    }

    /// Delete one word by id. Returns whether a row existed.
    pub fn delete(&self, id: &str) -> Result<bool, rusqlite::Error> {
        let affected = self
            .conn
            .execute("DELETE FROM words WHERE id = ?1", params![id])?;
        Ok(affected > 0)
    }

    pub fn get(&self, id: &str) -> Result<Option<Word>, rusqlite::Error> {
        self.conn
            .query_row(
                &format!("SELECT {WORD_COLUMNS} FROM words WHERE id = ?1"),
                params![id],
                row_to_word,
            )
            .optional()
    }

    pub fn list_all(&self) -> Result<Vec<Word>, rusqlite::Error> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {WORD_COLUMNS} FROM words"))?;
        let rows = stmt.query_map([], row_to_word)?;
        rows.collect()
    }

    /// Apply a reconciliation change set atomically: either every upsert
    /// and delete lands, or none do.
    ///
    /// # Errors
    /// Returns an error if any statement or the commit fails; the
    /// transaction rolls back on drop.
    pub fn apply_merge(
        &mut self,
        upserts: &[Word],
        deletes: &[String],
    ) -> Result<(), rusqlite::Error> {
        let tx = self.conn.transaction()?;
        for word in upserts {
            upsert_in(&tx, word)?;
        }
        for id in deletes {
            tx.execute("DELETE FROM words WHERE id = ?1", params![id])?;
        }
        tx.commit()
    }
}

fn upsert_in(conn: &Connection, word: &Word) -> Result<(), rusqlite::Error> {
    let translation =
        serde_json::to_string(&word.translation).unwrap_or_else(|_| "[]".to_string());
    let history = serde_json::to_string(&word.history).unwrap_or_else(|_| "[]".to_string());
    conn.execute(
        "INSERT OR REPLACE INTO words
         (id, word, translation, meanings, phonetic, audio_url,
          created_at, updated_at, next_review, interval_days, ease,
          repetitions, history)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        params![
            word.id,
            word.word,
            translation,
            word.meanings.to_string(),
            word.phonetic,
            word.audio_url,
            word.created_at,
            word.updated_at,
            word.next_review,
            word.interval,
            word.ease,
            word.repetitions,
            history,
        ],
    )?;
    Ok(())
}

const WORD_COLUMNS: &str = "id, word, translation, meanings, phonetic, audio_url, \
     created_at, updated_at, next_review, interval_days, ease, repetitions, history";

fn row_to_word(row: &rusqlite::Row) -> Result<Word, rusqlite::Error> {
    let translation: String = row.get(2)?;
    let meanings: String = row.get(3)?;
    let history: String = row.get(12)?;

    let mut word = Word {
        id: row.get(0)?,
        word: row.get(1)?,
        translation: serde_json::from_str(&translation).unwrap_or_default(),
        meanings: serde_json::from_str(&meanings).unwrap_or_default(),
        phonetic: row.get(4)?,
        audio_url: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
        next_review: row.get(8)?,
        interval: row.get(9)?,
        ease: row.get(10)?,
        repetitions: row.get(11)?,
        history: serde_json::from_str(&history).unwrap_or_default(),
    };
    if word.ease <= 0.0 {
        word.ease = default_ease();
    }
    Ok(word)
}
