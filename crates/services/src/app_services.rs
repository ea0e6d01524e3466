use std::sync::Arc;

use storage::repository::Storage;
use storage::results::ResultStore;

use crate::Clock;
use crate::config::SessionConfig;
use crate::error::AppServicesError;
use crate::sessions::{SessionController, SessionHandle, SessionObserver, SessionRuntime};

/// Assembles the result store and session configuration for a front end.
#[derive(Clone)]
pub struct AppServices {
    results: ResultStore,
    config: SessionConfig,
    clock: Clock,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        config: SessionConfig,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::from_storage(&storage, clock, config))
    }

    #[must_use]
    pub fn in_memory(clock: Clock, config: SessionConfig) -> Self {
        Self::from_storage(&Storage::in_memory(), clock, config)
    }

    #[must_use]
    pub fn from_storage(storage: &Storage, clock: Clock, config: SessionConfig) -> Self {
        Self {
            results: ResultStore::new(Arc::clone(&storage.values)),
            config,
            clock,
        }
    }

    #[must_use]
    pub fn results(&self) -> &ResultStore {
        &self.results
    }

    /// Load results and wire a controller into an event loop.
    ///
    /// Spawn or await `SessionRuntime::run`; drive it through the handle.
    pub async fn launch(
        &self,
        observer: Arc<dyn SessionObserver>,
    ) -> (SessionRuntime, SessionHandle) {
        let (controller, ticks) =
            SessionController::load(self.results.clone(), observer, self.config).await;
        SessionRuntime::new(controller.with_clock(self.clock), ticks)
    }
}
