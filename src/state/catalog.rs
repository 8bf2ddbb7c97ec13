/// Observable game list kept in step with the Library
///
/// Every mutation is followed by a full reload; observers only ever see a
/// complete list straight from `Library::list_all`. Storage calls run on
/// tokio's blocking pool so the UI thread never waits on SQLite.
use std::sync::{Arc, Mutex};
use tokio::sync::{watch, Mutex as AsyncMutex};

use super::data::GameRecord;
use super::library::Library;
use crate::error::StoreError;

pub type GameList = Arc<Vec<GameRecord>>;

/// Cheap to clone; all clones share the same store and state
#[derive(Clone)]
pub struct Catalog {
    store: Arc<Mutex<Library>>,
    state: Arc<watch::Sender<GameList>>,
    /// Held across mutate-then-reload when serialization is enabled
    gate: Option<Arc<AsyncMutex<()>>>,
}

impl Catalog {
    pub fn new(library: Library, serialize_mutations: bool) -> Self {
        let (state, _) = watch::channel(GameList::default());
        Self {
            store: Arc::new(Mutex::new(library)),
            state: Arc::new(state),
            gate: serialize_mutations.then(|| Arc::new(AsyncMutex::new(()))),
        }
    }

    /// Receive every list published from now on
    pub fn subscribe(&self) -> watch::Receiver<GameList> {
        self.state.subscribe()
    }

    /// The most recently published list
    pub fn current(&self) -> GameList {
        self.state.borrow().clone()
    }

    /// Fetch every game and publish the result
    pub async fn load(&self) -> Result<(), StoreError> {
        let games = self.run_blocking(|library| library.list_all()).await?;
        tracing::debug!("Publishing {} games", games.len());
        self.state.send_replace(Arc::new(games));
        Ok(())
    }

    /// Insert the record, then reload. The new id only reaches callers
    /// through the reloaded list.
    pub async fn add(&self, record: GameRecord) -> Result<(), StoreError> {
        let _guard = self.lock_gate().await;
        let id = self.run_blocking(move |library| library.insert(&record)).await?;
        tracing::info!("Added game #{id}");
        self.load().await
    }

    pub async fn update(&self, record: GameRecord) -> Result<(), StoreError> {
        let _guard = self.lock_gate().await;
        let id = record.id;
        self.run_blocking(move |library| library.update(&record)).await?;
        tracing::info!("Updated game #{id}");
        self.load().await
    }

    pub async fn delete(&self, record: GameRecord) -> Result<(), StoreError> {
        let _guard = self.lock_gate().await;
        let id = record.id;
        self.run_blocking(move |library| library.delete(&record)).await?;
        tracing::info!("Deleted game #{id}");
        self.load().await
    }

    async fn lock_gate(&self) -> Option<tokio::sync::OwnedMutexGuard<()>> {
        match &self.gate {
            Some(gate) => Some(Arc::clone(gate).lock_owned().await),
            None => None,
        }
    }

    /// Run one storage call on the blocking pool.
    /// The connection lock is held for that call only.
    async fn run_blocking<T, F>(&self, job: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Library) -> rusqlite::Result<T> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || {
            let library = store.lock().map_err(|_| StoreError::Poisoned)?;
            job(&library).map_err(StoreError::from)
        })
        .await?
    }
}

impl std::fmt::Debug for Catalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Catalog")
            .field("games", &self.state.borrow().len())
            .field("serialized", &self.gate.is_some())
            .finish()
    }
}
