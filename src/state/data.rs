/// Shared data structures for the application state
///
/// These structs represent the data model that flows between
/// the database layer and the UI layer.
use chrono::NaiveDate;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use std::fmt;

/// Id carried by a record that has not been saved yet
pub const NEW_RECORD_ID: i64 = 0;

/// The fixed set of genres a game can be filed under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Genre {
    Action,
    Adventure,
    Rpg,
    Shooter,
    Strategy,
    Sports,
}

impl Genre {
    /// All genres in display order; the first one is the default
    pub const ALL: [Genre; 6] = [
        Genre::Action,
        Genre::Adventure,
        Genre::Rpg,
        Genre::Shooter,
        Genre::Strategy,
        Genre::Sports,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Genre::Action => "Action",
            Genre::Adventure => "Adventure",
            Genre::Rpg => "RPG",
            Genre::Shooter => "Shooter",
            Genre::Strategy => "Strategy",
            Genre::Sports => "Sports",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|genre| genre.as_str() == name)
    }
}

impl Default for Genre {
    fn default() -> Self {
        Self::ALL[0]
    }
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Genres are stored by display name so the table stays readable
impl ToSql for Genre {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Genre {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let name = value.as_str()?;
        Genre::from_name(name)
            .ok_or_else(|| FromSqlError::Other(format!("unknown genre '{name}'").into()))
    }
}

/// A single catalogued video game
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameRecord {
    /// Database ID, or `NEW_RECORD_ID` while unsaved
    pub id: i64,
    pub title: String,
    pub developer: String,
    pub genre: Genre,
    pub release_date: NaiveDate,
    /// Path to the cover image; empty when there is no cover
    pub cover_image: String,
}

impl GameRecord {
    /// A blank record used to start the "add" flow
    pub fn blank(today: NaiveDate) -> Self {
        Self {
            id: NEW_RECORD_ID,
            title: String::new(),
            developer: String::new(),
            genre: Genre::default(),
            release_date: today,
            cover_image: String::new(),
        }
    }

    pub fn is_new(&self) -> bool {
        self.id == NEW_RECORD_ID
    }
}
