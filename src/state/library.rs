use chrono::{DateTime, NaiveDate, NaiveTime};
use rusqlite::{params, Connection, Result as SqlResult, Row};
use std::path::{Path, PathBuf};

use super::data::GameRecord;
use crate::error::StoreError;

/// The Library manages the SQLite game catalogue.
///
/// It is a plain record store: no validation and no existence checks.
/// Updates and deletes of an unknown id touch zero rows and succeed.
pub struct Library {
    conn: Connection,
    db_path: Option<PathBuf>,
}

impl Library {
    /// Open or create the database at `db_path` and initialize the schema.
    pub fn open(db_path: &Path) -> Result<Self, StoreError> {
        // Ensure the parent directory exists
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(db_path)?;
        tracing::info!("Database opened at {}", db_path.display());

        let library = Library {
            conn,
            db_path: Some(db_path.to_path_buf()),
        };
        library.init_schema()?;
        Ok(library)
    }

    /// Open a throwaway database that lives only as long as this value
    #[cfg(test)]
    pub fn open_in_memory() -> SqlResult<Self> {
        let library = Library {
            conn: Connection::open_in_memory()?,
            db_path: None,
        };
        library.init_schema()?;
        Ok(library)
    }

    /// Create the games table and its index if they don't exist.
    fn init_schema(&self) -> SqlResult<()> {
        // AUTOINCREMENT keeps ids from being reused after a delete
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS games (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                title           TEXT NOT NULL,
                developer       TEXT NOT NULL,
                genre           TEXT NOT NULL,
                release_date    INTEGER NOT NULL,
                cover_image     TEXT NOT NULL DEFAULT ''
            );
            CREATE INDEX IF NOT EXISTS idx_games_title ON games(title);",
        )?;

        tracing::debug!("Database schema initialized");
        Ok(())
    }

    pub fn record_count(&self) -> SqlResult<i64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM games", [], |row| row.get(0))
    }

    /// All games ordered by title.
    ///
    /// Titles compare with SQLite's BINARY collation (byte order, so
    /// "Zelda" sorts before "asteroids"). Equal titles fall back to id.
    pub fn list_all(&self) -> SqlResult<Vec<GameRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, developer, genre, release_date, cover_image
             FROM games
             ORDER BY title COLLATE BINARY, id",
        )?;

        let rows = stmt.query_map([], record_from_row)?;
        rows.collect()
    }

    /// Insert a new game and return its assigned id.
    /// The record's own `id` is ignored.
    pub fn insert(&self, record: &GameRecord) -> SqlResult<i64> {
        self.conn.execute(
            "INSERT INTO games (title, developer, genre, release_date, cover_image)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                record.title,
                record.developer,
                record.genre,
                date_to_millis(record.release_date),
                record.cover_image,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Overwrite every field of the row with the record's id
    pub fn update(&self, record: &GameRecord) -> SqlResult<()> {
        self.conn.execute(
            "UPDATE games
             SET title = ?1, developer = ?2, genre = ?3, release_date = ?4, cover_image = ?5
             WHERE id = ?6",
            params![
                record.title,
                record.developer,
                record.genre,
                date_to_millis(record.release_date),
                record.cover_image,
                record.id,
            ],
        )?;
        Ok(())
    }

    pub fn delete(&self, record: &GameRecord) -> SqlResult<()> {
        self.conn
            .execute("DELETE FROM games WHERE id = ?1", params![record.id])?;
        Ok(())
    }

    /// Every non-empty cover reference currently stored
    pub fn cover_paths(&self) -> SqlResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT cover_image FROM games WHERE cover_image != ''")?;
        let rows = stmt.query_map([], |row| row.get(0))?;
        rows.collect()
    }

    #[cfg(test)]
    pub(crate) fn conn_for_tests(&self) -> &Connection {
        &self.conn
    }
}

fn record_from_row(row: &Row<'_>) -> SqlResult<GameRecord> {
    let millis: i64 = row.get(4)?;
    let release_date =
        millis_to_date(millis).ok_or(rusqlite::Error::IntegralValueOutOfRange(4, millis))?;

    Ok(GameRecord {
        id: row.get(0)?,
        title: row.get(1)?,
        developer: row.get(2)?,
        genre: row.get(3)?,
        release_date,
        cover_image: row.get(5)?,
    })
}

/// Release dates are stored as epoch milliseconds of midnight UTC
fn date_to_millis(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp_millis()
}

fn millis_to_date(millis: i64) -> Option<NaiveDate> {
    DateTime::from_timestamp_millis(millis).map(|dt| dt.date_naive())
}

// Implement Debug for better error messages
impl std::fmt::Debug for Library {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Library")
            .field("db_path", &self.db_path)
            .finish()
    }
}
