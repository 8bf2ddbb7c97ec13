/// Edit form state, independent of any widget toolkit
///
/// The form works on local copies of every field. Nothing reaches the
/// catalog until `submit` accepts the input.
use chrono::NaiveDate;

use super::data::{GameRecord, Genre, NEW_RECORD_ID};
use crate::error::ValidationError;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Where a validated record should go
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveRoute {
    Add(GameRecord),
    Update(GameRecord),
}

impl SaveRoute {
    pub fn for_record(record: GameRecord) -> Self {
        if record.is_new() {
            SaveRoute::Add(record)
        } else {
            SaveRoute::Update(record)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditForm {
    /// The record as it was when editing started
    original: GameRecord,
    pub title: String,
    pub developer: String,
    pub genre: Genre,
    /// Raw text of the release date input
    pub release_date: String,
    pub cover_image: String,
}

impl EditForm {
    /// Form for a game that has not been saved yet
    pub fn new_record(today: NaiveDate) -> Self {
        Self::from_record(&GameRecord::blank(today))
    }

    pub fn from_record(record: &GameRecord) -> Self {
        Self {
            original: record.clone(),
            title: record.title.clone(),
            developer: record.developer.clone(),
            genre: record.genre,
            release_date: record.release_date.format(DATE_FORMAT).to_string(),
            cover_image: record.cover_image.clone(),
        }
    }

    pub fn id(&self) -> i64 {
        self.original.id
    }

    pub fn is_new(&self) -> bool {
        self.original.id == NEW_RECORD_ID
    }

    /// Only saved games can be deleted from the form
    pub fn can_delete(&self) -> bool {
        !self.is_new()
    }

    pub fn heading(&self) -> &'static str {
        if self.is_new() {
            "Add Game"
        } else {
            "Edit Game"
        }
    }

    /// The record being edited, ignoring unsaved changes
    pub fn original(&self) -> &GameRecord {
        &self.original
    }

    /// Validate the input and decide whether it is an add or an update
    pub fn submit(&self) -> Result<SaveRoute, ValidationError> {
        let title = self.title.trim();
        let developer = self.developer.trim();
        if title.is_empty() || developer.is_empty() {
            return Err(ValidationError::MissingRequired);
        }

        let release_date = parse_date(&self.release_date)?;

        Ok(SaveRoute::for_record(GameRecord {
            id: self.original.id,
            title: title.to_string(),
            developer: developer.to_string(),
            genre: self.genre,
            release_date,
            cover_image: self.cover_image.clone(),
        }))
    }
}

fn parse_date(input: &str) -> Result<NaiveDate, ValidationError> {
    let input = input.trim();
    NaiveDate::parse_from_str(input, DATE_FORMAT)
        .map_err(|_| ValidationError::InvalidReleaseDate(input.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn saved() -> GameRecord {
        GameRecord {
            id: 7,
            title: "Portal".to_string(),
            developer: "Valve".to_string(),
            genre: Genre::Action,
            release_date: NaiveDate::from_ymd_opt(2007, 10, 10).unwrap(),
            cover_image: "/covers/portal.jpg".to_string(),
        }
    }

    #[test]
    fn test_new_form_defaults() {
        let form = EditForm::new_record(today());

        assert!(form.is_new());
        assert!(!form.can_delete());
        assert_eq!(form.heading(), "Add Game");
        assert_eq!(form.genre, Genre::Action);
        assert_eq!(form.release_date, "2024-06-01");
        assert!(form.cover_image.is_empty());
    }

    #[test]
    fn test_blank_fields_are_rejected() {
        let mut form = EditForm::new_record(today());
        assert_eq!(form.submit(), Err(ValidationError::MissingRequired));

        form.title = "   ".to_string();
        form.developer = "Valve".to_string();
        assert_eq!(form.submit(), Err(ValidationError::MissingRequired));

        form.title = "Portal".to_string();
        form.developer = "\t".to_string();
        assert_eq!(form.submit(), Err(ValidationError::MissingRequired));
    }

    #[test]
    fn test_bad_date_is_rejected() {
        let mut form = EditForm::from_record(&saved());
        form.release_date = "10/10/2007".to_string();

        assert_eq!(
            form.submit(),
            Err(ValidationError::InvalidReleaseDate("10/10/2007".to_string()))
        );
    }

    #[test]
    fn test_new_form_routes_to_add_with_trimmed_fields() {
        let mut form = EditForm::new_record(today());
        form.title = "  Portal ".to_string();
        form.developer = "Valve  ".to_string();
        form.genre = Genre::Strategy;

        let route = form.submit().unwrap();

        assert_eq!(
            route,
            SaveRoute::Add(GameRecord {
                id: NEW_RECORD_ID,
                title: "Portal".to_string(),
                developer: "Valve".to_string(),
                genre: Genre::Strategy,
                release_date: today(),
                cover_image: String::new(),
            })
        );
    }

    #[test]
    fn test_saved_form_routes_to_update() {
        let mut form = EditForm::from_record(&saved());
        assert!(form.can_delete());
        assert_eq!(form.heading(), "Edit Game");

        form.title = "Portal 2".to_string();
        form.release_date = "2011-04-19".to_string();

        match form.submit().unwrap() {
            SaveRoute::Update(record) => {
                assert_eq!(record.id, 7);
                assert_eq!(record.title, "Portal 2");
                assert_eq!(record.release_date, NaiveDate::from_ymd_opt(2011, 4, 19).unwrap());
                assert_eq!(record.cover_image, "/covers/portal.jpg");
            }
            other => panic!("expected update, got {other:?}"),
        }
    }

    #[test]
    fn test_unchanged_form_reproduces_record() {
        let record = saved();
        let mut form = EditForm::from_record(&record);
        assert_eq!(form.submit(), Ok(SaveRoute::Update(record.clone())));

        form.title = "Something else".to_string();
        assert_eq!(form.original(), &record);
    }
}
