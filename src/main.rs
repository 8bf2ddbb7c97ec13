use chrono::Local;
use iced::futures::{stream, Stream};
use iced::widget::{column, container, text};
use iced::{Element, Length, Size, Subscription, Task, Theme};
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

mod config;
mod cover;
mod error;
mod state;
mod ui;

use config::{AppConfig, Settings, ThemeChoice};
use cover::CoverOutcome;
use error::{StoreError, ValidationError};
use state::catalog::{Catalog, GameList};
use state::data::{GameRecord, Genre};
use state::form::{EditForm, SaveRoute};
use state::library::Library;

/// Which screen is showing; editing state lives here, not in the catalog
#[derive(Debug, Clone)]
enum Screen {
    List,
    Edit(EditForm),
}

/// A transient message shown at the bottom of the window
#[derive(Debug, Clone)]
struct Notice {
    id: u64,
    text: String,
}

/// One unit of catalog work started by the UI
#[derive(Debug, Clone)]
enum CatalogOp {
    Load,
    Add(GameRecord),
    Update(GameRecord),
    Delete(GameRecord),
}

impl CatalogOp {
    /// Prefix for the notice shown when the operation fails
    fn failure_text(&self) -> &'static str {
        match self {
            CatalogOp::Load => "Could not load games",
            CatalogOp::Add(_) | CatalogOp::Update(_) => "Could not save changes",
            CatalogOp::Delete(_) => "Could not delete game",
        }
    }

    async fn run(self, catalog: Catalog) -> Result<(), StoreError> {
        match self {
            CatalogOp::Load => catalog.load().await,
            CatalogOp::Add(record) => catalog.add(record).await,
            CatalogOp::Update(record) => catalog.update(record).await,
            CatalogOp::Delete(record) => catalog.delete(record).await,
        }
    }
}

/// Main application state
struct GameShelf {
    catalog: Catalog,
    /// Last list published by the catalog
    games: GameList,
    screen: Screen,
    notice: Option<Notice>,
    next_notice_id: u64,
    covers_dir: PathBuf,
    settings: Settings,
}

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    /// A catalog operation finished; the error is already formatted
    Synced(&'static str, Result<(), String>),
    /// The catalog published a new list
    CatalogChanged(GameList),
    AddPressed,
    EditPressed(GameRecord),
    DeletePressed(GameRecord),
    TitleChanged(String),
    DeveloperChanged(String),
    GenreSelected(Genre),
    ReleaseDateChanged(String),
    ChooseCover,
    CoverPicked(CoverOutcome),
    RemoveCover,
    Save,
    Cancel,
    DeleteEditing,
    DismissNotice(u64),
}

impl GameShelf {
    /// Create the application and start the initial load
    fn new(catalog: Catalog, config: AppConfig) -> (Self, Task<Message>) {
        let app = GameShelf {
            games: catalog.current(),
            catalog,
            screen: Screen::List,
            notice: None,
            next_notice_id: 0,
            covers_dir: config.covers_dir(),
            settings: config.settings,
        };
        let load = app.run(CatalogOp::Load);
        (app, load)
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Synced(failure, result) => match result {
                Ok(()) => Task::none(),
                Err(err) => {
                    tracing::error!("{failure}: {err}");
                    self.notify(format!("{failure}: {err}"))
                }
            },
            Message::CatalogChanged(games) => {
                self.games = games;
                Task::none()
            }
            Message::AddPressed => {
                self.screen = Screen::Edit(EditForm::new_record(Local::now().date_naive()));
                Task::none()
            }
            Message::EditPressed(record) => {
                self.screen = Screen::Edit(EditForm::from_record(&record));
                Task::none()
            }
            Message::DeletePressed(record) => self.run(CatalogOp::Delete(record)),
            Message::TitleChanged(value) => self.edit_form(|form| form.title = value),
            Message::DeveloperChanged(value) => self.edit_form(|form| form.developer = value),
            Message::GenreSelected(genre) => self.edit_form(|form| form.genre = genre),
            Message::ReleaseDateChanged(value) => self.edit_form(|form| form.release_date = value),
            Message::RemoveCover => self.edit_form(|form| form.cover_image.clear()),
            Message::ChooseCover => {
                if !matches!(self.screen, Screen::Edit(_)) {
                    return Task::none();
                }
                Task::perform(
                    cover::pick_from_gallery(self.covers_dir.clone(), self.settings.cover_max_edge),
                    Message::CoverPicked,
                )
            }
            Message::CoverPicked(outcome) => match outcome {
                CoverOutcome::Acquired(path) => self.edit_form(|form| form.cover_image = path),
                CoverOutcome::Cancelled => self.notify("No image selected.".to_string()),
                CoverOutcome::Failed(reason) => self.notify(reason),
            },
            Message::Save => match self.save_op() {
                Ok(Some(op)) => self.run(op),
                Ok(None) => Task::none(),
                Err(err) => self.notify(err.to_string()),
            },
            Message::Cancel => {
                self.screen = Screen::List;
                Task::none()
            }
            Message::DeleteEditing => {
                let Screen::Edit(form) = &self.screen else {
                    return Task::none();
                };
                if !form.can_delete() {
                    return Task::none();
                }
                let record = form.original().clone();
                tracing::debug!("Deleting game #{} from the edit form", form.id());
                self.screen = Screen::List;
                self.run(CatalogOp::Delete(record))
            }
            Message::DismissNotice(id) => {
                if self.notice.as_ref().is_some_and(|notice| notice.id == id) {
                    self.notice = None;
                }
                Task::none()
            }
        }
    }

    /// Build the user interface
    fn view(&self) -> Element<'_, Message> {
        let screen = match &self.screen {
            Screen::List => ui::list::view(&self.games),
            Screen::Edit(form) => ui::edit::view(form),
        };

        let mut content = column![container(screen).height(Length::Fill)];
        if let Some(notice) = &self.notice {
            content = content.push(
                container(text(&notice.text).size(14))
                    .padding(12)
                    .width(Length::Fill)
                    .style(container::rounded_box),
            );
        }

        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    fn theme(&self) -> Theme {
        match self.settings.theme {
            ThemeChoice::Dark => Theme::Dark,
            ThemeChoice::Light => Theme::Light,
        }
    }

    fn subscription(&self) -> Subscription<Message> {
        Subscription::run_with_id("catalog", catalog_updates(self.catalog.subscribe()))
    }

    /// Validate the open form and leave the edit screen on success.
    /// Returns the catalog work to start, `None` when no form is open.
    fn save_op(&mut self) -> Result<Option<CatalogOp>, ValidationError> {
        let Screen::Edit(form) = &self.screen else {
            return Ok(None);
        };
        let op = match form.submit()? {
            SaveRoute::Add(record) => CatalogOp::Add(record),
            SaveRoute::Update(record) => CatalogOp::Update(record),
        };
        self.screen = Screen::List;
        Ok(Some(op))
    }

    /// Start a catalog operation in the background
    fn run(&self, op: CatalogOp) -> Task<Message> {
        let failure = op.failure_text();
        let catalog = self.catalog.clone();
        Task::perform(
            async move { op.run(catalog).await.map_err(|err| err.to_string()) },
            move |result| Message::Synced(failure, result),
        )
    }

    fn edit_form(&mut self, change: impl FnOnce(&mut EditForm)) -> Task<Message> {
        if let Screen::Edit(form) = &mut self.screen {
            change(form);
        }
        Task::none()
    }

    /// Show a notice and schedule its removal
    fn notify(&mut self, text: String) -> Task<Message> {
        self.next_notice_id += 1;
        let id = self.next_notice_id;
        self.notice = Some(Notice { id, text });

        let lifetime = Duration::from_secs(self.settings.notice_seconds);
        Task::perform(
            async move { tokio::time::sleep(lifetime).await },
            move |_| Message::DismissNotice(id),
        )
    }
}

fn main() -> anyhow::Result<()> {
    init_logging();

    let config = AppConfig::load()?;
    let library = Library::open(&config.database_path())?;
    tracing::info!("Game Shelf starting with {} games", library.record_count()?);

    let referenced: HashSet<PathBuf> = library
        .cover_paths()?
        .into_iter()
        .map(PathBuf::from)
        .collect();
    cover::prune_orphaned_covers(&config.covers_dir(), &referenced);

    let catalog = Catalog::new(library, config.settings.serialize_mutations);

    iced::application("Game Shelf", GameShelf::update, GameShelf::view)
        .theme(GameShelf::theme)
        .subscription(GameShelf::subscription)
        .window_size(Size::new(720.0, 640.0))
        .centered()
        .run_with(move || GameShelf::new(catalog, config))
        .map_err(|err| anyhow::anyhow!("UI failed: {err}"))
}

/// Every list the catalog publishes, starting with the current one
fn catalog_updates(receiver: watch::Receiver<GameList>) -> impl Stream<Item = Message> {
    stream::unfold((receiver, true), |(mut receiver, first)| async move {
        if !first {
            receiver.changed().await.ok()?;
        }
        let games = receiver.borrow_and_update().clone();
        Some((Message::CatalogChanged(games), (receiver, false)))
    })
}

fn init_logging() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("game_shelf=info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::data::NEW_RECORD_ID;
    use chrono::NaiveDate;
    use iced::futures::StreamExt;

    fn app() -> (GameShelf, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_from(dir.path().to_path_buf()).unwrap();
        let catalog = Catalog::new(Library::open_in_memory().unwrap(), false);
        let (app, _load) = GameShelf::new(catalog, config);
        (app, dir)
    }

    fn editing(app: &GameShelf) -> &EditForm {
        match &app.screen {
            Screen::Edit(form) => form,
            Screen::List => panic!("expected the edit screen"),
        }
    }

    fn portal() -> GameRecord {
        GameRecord {
            id: NEW_RECORD_ID,
            title: "Portal".to_string(),
            developer: "Valve".to_string(),
            genre: Genre::Action,
            release_date: NaiveDate::from_ymd_opt(2007, 10, 10).unwrap(),
            cover_image: String::new(),
        }
    }

    #[test]
    fn test_add_opens_blank_form() {
        let (mut app, _dir) = app();

        let _ = app.update(Message::AddPressed);

        let form = editing(&app);
        assert!(form.is_new());
        assert!(!form.can_delete());
        assert_eq!(form.genre, Genre::Action);
        assert!(form.title.is_empty());
    }

    #[test]
    fn test_blank_save_dispatches_nothing() {
        let (mut app, _dir) = app();
        let _ = app.update(Message::AddPressed);
        let _ = app.update(Message::DeveloperChanged("Valve".to_string()));

        for title in ["", "   ", "\t\n"] {
            let _ = app.update(Message::TitleChanged(title.to_string()));
            assert!(matches!(app.save_op(), Err(ValidationError::MissingRequired)));
            assert_eq!(editing(&app).developer, "Valve");
        }

        let _ = app.update(Message::Save);
        assert!(matches!(app.screen, Screen::Edit(_)));
        assert_eq!(
            app.notice.as_ref().map(|n| n.text.as_str()),
            Some("Title and Developer cannot be empty.")
        );
    }

    #[tokio::test]
    async fn test_valid_save_dispatches_add_and_reaches_store() {
        let (mut app, _dir) = app();
        let _ = app.update(Message::AddPressed);
        let _ = app.update(Message::TitleChanged(" Portal ".to_string()));
        let _ = app.update(Message::DeveloperChanged("Valve".to_string()));

        let op = app.save_op().unwrap();

        assert!(matches!(app.screen, Screen::List));
        assert!(app.notice.is_none());
        match op {
            Some(CatalogOp::Add(record)) => {
                assert_eq!(record.title, "Portal");
                CatalogOp::Add(record).run(app.catalog.clone()).await.unwrap();
            }
            other => panic!("expected an add, got {other:?}"),
        }
        let games = app.catalog.current();
        assert_eq!(games.len(), 1);
        assert_eq!(games[0].title, "Portal");
    }

    #[test]
    fn test_saving_existing_game_dispatches_update() {
        let (mut app, _dir) = app();
        let _ = app.update(Message::EditPressed(GameRecord { id: 3, ..portal() }));
        let _ = app.update(Message::TitleChanged("Portal 2".to_string()));

        match app.save_op() {
            Ok(Some(CatalogOp::Update(record))) => {
                assert_eq!(record.id, 3);
                assert_eq!(record.title, "Portal 2");
            }
            other => panic!("expected an update, got {other:?}"),
        }
    }

    #[test]
    fn test_save_without_form_does_nothing() {
        let (mut app, _dir) = app();
        assert!(matches!(app.save_op(), Ok(None)));
    }

    #[test]
    fn test_cancel_discards_edits() {
        let (mut app, _dir) = app();
        let _ = app.update(Message::EditPressed(GameRecord { id: 3, ..portal() }));
        let _ = app.update(Message::TitleChanged("Changed".to_string()));

        let _ = app.update(Message::Cancel);
        assert!(matches!(app.screen, Screen::List));

        let _ = app.update(Message::EditPressed(GameRecord { id: 3, ..portal() }));
        assert_eq!(editing(&app).title, "Portal");
    }

    #[test]
    fn test_delete_from_form_only_for_saved_games() {
        let (mut app, _dir) = app();
        let _ = app.update(Message::AddPressed);
        let _ = app.update(Message::DeleteEditing);
        assert!(matches!(app.screen, Screen::Edit(_)));

        let _ = app.update(Message::EditPressed(GameRecord { id: 3, ..portal() }));
        let _ = app.update(Message::DeleteEditing);
        assert!(matches!(app.screen, Screen::List));
    }

    #[test]
    fn test_cover_outcomes() {
        let (mut app, _dir) = app();
        let _ = app.update(Message::AddPressed);

        let _ = app.update(Message::CoverPicked(CoverOutcome::Acquired("/covers/a.jpg".to_string())));
        assert_eq!(editing(&app).cover_image, "/covers/a.jpg");

        let _ = app.update(Message::CoverPicked(CoverOutcome::Failed("broken".to_string())));
        assert_eq!(editing(&app).cover_image, "/covers/a.jpg");
        assert_eq!(app.notice.as_ref().map(|n| n.text.as_str()), Some("broken"));

        let _ = app.update(Message::CoverPicked(CoverOutcome::Cancelled));
        assert_eq!(editing(&app).cover_image, "/covers/a.jpg");

        let _ = app.update(Message::RemoveCover);
        assert!(editing(&app).cover_image.is_empty());
    }

    #[test]
    fn test_stale_dismissal_keeps_newer_notice() {
        let (mut app, _dir) = app();
        let _ = app.update(Message::CoverPicked(CoverOutcome::Failed("first".to_string())));
        let first = app.notice.as_ref().unwrap().id;
        let _ = app.update(Message::CoverPicked(CoverOutcome::Failed("second".to_string())));

        let _ = app.update(Message::DismissNotice(first));
        assert_eq!(app.notice.as_ref().map(|n| n.text.as_str()), Some("second"));

        let second = app.notice.as_ref().unwrap().id;
        let _ = app.update(Message::DismissNotice(second));
        assert!(app.notice.is_none());
    }

    #[tokio::test]
    async fn test_catalog_updates_stream_published_lists() {
        let (mut app, _dir) = app();
        let mut updates = Box::pin(catalog_updates(app.catalog.subscribe()));

        let Some(Message::CatalogChanged(games)) = updates.next().await else {
            panic!("expected the current list first");
        };
        assert!(games.is_empty());

        app.catalog.add(portal()).await.unwrap();
        let Some(message @ Message::CatalogChanged(_)) = updates.next().await else {
            panic!("expected a published list");
        };
        let _ = app.update(message);
        assert_eq!(app.games.len(), 1);
        assert_eq!(app.games[0].title, "Portal");
    }

    #[tokio::test]
    async fn test_sync_failures_notify_without_touching_list() {
        let (mut app, _dir) = app();
        let _ = app.update(Message::CatalogChanged(std::sync::Arc::new(vec![portal()])));

        let _ = app.update(Message::Synced("Could not save changes", Ok(())));
        assert_eq!(app.games.len(), 1);
        assert!(app.notice.is_none());

        let _ = app.update(Message::Synced("Could not save changes", Err("disk full".to_string())));
        assert_eq!(app.games.len(), 1);
        assert_eq!(
            app.notice.as_ref().map(|n| n.text.as_str()),
            Some("Could not save changes: disk full")
        );
    }
}
