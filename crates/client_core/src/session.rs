//! Who is logged in, and where to send them when nobody is.
//!
//! Identity is persisted under a single key ([`SESSION_STORAGE_KEY`]) by a
//! [`SessionStore`]. Pages never read storage directly: they receive a
//! [`SessionContext`] that pairs the store with a [`Navigator`].

use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, MutexGuard},
};

use shared::domain::{Route, Username};
use thiserror::Error;
use tracing::{info, warn};

pub const SESSION_STORAGE_KEY: &str = "loggedInUser";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub username: Username,
}

#[derive(Debug, Error)]
pub enum SessionStoreError {
    #[error("failed to access session file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("session file '{path}' is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub trait SessionStore: Send + Sync {
    fn load(&self) -> Result<Option<Session>, SessionStoreError>;
    fn save(&self, session: &Session) -> Result<(), SessionStoreError>;
    fn clear(&self) -> Result<(), SessionStoreError>;
}

pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Default)]
pub struct MemorySessionStore {
    session: Mutex<Option<Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(username: &str) -> Self {
        Self {
            session: Mutex::new(Some(Session {
                username: Username::new(username),
            })),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<Session>, SessionStoreError> {
        Ok(lock(&self.session).clone())
    }

    fn save(&self, session: &Session) -> Result<(), SessionStoreError> {
        *lock(&self.session) = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionStoreError> {
        *lock(&self.session) = None;
        Ok(())
    }
}

/// Key/value JSON document on disk, one entry per storage key.
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<BTreeMap<String, String>, SessionStoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(source) => {
                return Err(SessionStoreError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&raw).map_err(|source| SessionStoreError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<(), SessionStoreError> {
        let io_err = |source: io::Error| SessionStoreError::Io {
            path: self.path.clone(),
            source,
        };
        if entries.is_empty() {
            return match fs::remove_file(&self.path) {
                Err(err) if err.kind() != io::ErrorKind::NotFound => Err(io_err(err)),
                _ => Ok(()),
            };
        }
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let raw = serde_json::to_string_pretty(entries).map_err(|source| {
            SessionStoreError::Corrupt {
                path: self.path.clone(),
                source,
            }
        })?;
        fs::write(&self.path, raw).map_err(io_err)
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<Session>, SessionStoreError> {
        let entries = self.read_entries()?;
        Ok(entries
            .get(SESSION_STORAGE_KEY)
            .filter(|username| !username.is_empty())
            .map(|username| Session {
                username: Username::new(username.clone()),
            }))
    }

    fn save(&self, session: &Session) -> Result<(), SessionStoreError> {
        // a corrupt file is replaced rather than blocking login
        let mut entries = self.read_entries().unwrap_or_default();
        entries.insert(
            SESSION_STORAGE_KEY.to_string(),
            session.username.as_str().to_string(),
        );
        self.write_entries(&entries)
    }

    fn clear(&self) -> Result<(), SessionStoreError> {
        let mut entries = self.read_entries().unwrap_or_default();
        entries.remove(SESSION_STORAGE_KEY);
        self.write_entries(&entries)
    }
}

/// Remembers every navigation request, newest last.
#[derive(Default)]
pub struct RecordingNavigator {
    history: Mutex<Vec<Route>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> Vec<Route> {
        lock(&self.history).clone()
    }

    pub fn last(&self) -> Option<Route> {
        lock(&self.history).last().copied()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: Route) {
        lock(&self.history).push(route);
    }
}

/// Session access handed to every page.
#[derive(Clone)]
pub struct SessionContext {
    store: Arc<dyn SessionStore>,
    navigator: Arc<dyn Navigator>,
}

impl SessionContext {
    pub fn new(store: Arc<dyn SessionStore>, navigator: Arc<dyn Navigator>) -> Self {
        Self { store, navigator }
    }

    /// Storage failures read as "nobody is logged in".
    pub fn current_user(&self) -> Option<Session> {
        match self.store.load() {
            Ok(session) => session,
            Err(err) => {
                warn!("failed to read stored session: {err}");
                None
            }
        }
    }

    /// `None` means the caller must render nothing: a redirect to the login
    /// page has already been requested.
    pub fn require_session(&self) -> Option<Session> {
        let session = self.current_user();
        if session.is_none() {
            info!("no stored session; redirecting to {}", Route::Login);
            self.navigator.navigate(Route::Login);
        }
        session
    }

    pub fn establish_session(&self, username: Username) -> Result<Session, SessionStoreError> {
        let session = Session { username };
        self.store.save(&session)?;
        info!(username = %session.username, "session established");
        self.navigator.navigate(Route::Dashboard);
        Ok(session)
    }

    /// Always ends on the login page, even when storage could not be cleared.
    pub fn clear_session(&self) {
        if let Err(err) = self.store.clear() {
            warn!("failed to clear stored session: {err}");
        }
        self.navigator.navigate(Route::Login);
    }

    pub fn navigate(&self, route: Route) {
        self.navigator.navigate(route);
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
