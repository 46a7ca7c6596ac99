//! On-device persistence of the single session token.
//!
//! # Design
//! One token per device, stored under the fixed key `token`. Stores report
//! failures instead of hiding them; it is the app facade that decides an
//! unreadable store means "not logged in".

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::SESSION_PATH_ENV;
use crate::error::SessionError;

/// Key the token is stored under.
pub const TOKEN_KEY: &str = "token";

const APP_DIR: &str = "galaxy-missions";
const SESSION_FILE: &str = "session.json";

/// Get/set/clear access to the persisted bearer token.
pub trait SessionStore {
    fn get(&self) -> Result<Option<String>, SessionError>;
    fn set(&mut self, token: &str) -> Result<(), SessionError>;
    fn clear(&mut self) -> Result<(), SessionError>;
}

impl<S: SessionStore + ?Sized> SessionStore for Box<S> {
    fn get(&self) -> Result<Option<String>, SessionError> {
        (**self).get()
    }

    fn set(&mut self, token: &str) -> Result<(), SessionError> {
        (**self).set(token)
    }

    fn clear(&mut self) -> Result<(), SessionError> {
        (**self).clear()
    }
}

/// Keeps the token for the lifetime of the process only.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    token: Option<String>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self) -> Result<Option<String>, SessionError> {
        Ok(self.token.clone())
    }

    fn set(&mut self, token: &str) -> Result<(), SessionError> {
        self.token = Some(token.to_string());
        Ok(())
    }

    fn clear(&mut self) -> Result<(), SessionError> {
        self.token = None;
        Ok(())
    }
}

/// A small JSON key-value file, `{"token": "..."}`, that survives restarts.
///
/// A missing file reads as "no token". Other keys found in the file are
/// preserved across writes.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `$GALAXY_SESSION_PATH` if set, otherwise
    /// `<data dir>/galaxy-missions/session.json`.
    pub fn default_location() -> Result<Self, SessionError> {
        if let Ok(path) = std::env::var(SESSION_PATH_ENV) {
            if !path.is_empty() {
                return Ok(Self::new(path));
            }
        }
        let dir = dirs::data_dir().ok_or(SessionError::NoDataDir)?;
        Ok(Self::new(dir.join(APP_DIR).join(SESSION_FILE)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>, SessionError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) if raw.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, entries: &BTreeMap<String, String>) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(entries)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self) -> Result<Option<String>, SessionError> {
        Ok(self.load()?.remove(TOKEN_KEY))
    }

    fn set(&mut self, token: &str) -> Result<(), SessionError> {
        let mut entries = match self.load() {
            Ok(entries) => entries,
            // A corrupt file is replaced; anything else is reported.
            Err(SessionError::Corrupt(_)) => BTreeMap::new(),
            Err(e) => return Err(e),
        };
        entries.insert(TOKEN_KEY.to_string(), token.to_string());
        self.save(&entries)?;
        debug!(path = %self.path.display(), "session token stored");
        Ok(())
    }

    fn clear(&mut self) -> Result<(), SessionError> {
        let mut entries = match self.load() {
            Ok(entries) => entries,
            // Unreadable contents are discarded along with the token.
            Err(SessionError::Corrupt(_)) => BTreeMap::new(),
            Err(e) => return Err(e),
        };
        entries.remove(TOKEN_KEY);
        if entries.is_empty() {
            match fs::remove_file(&self.path) {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        } else {
            self.save(&entries)?;
        }
        debug!(path = %self.path.display(), "session token cleared");
        Ok(())
    }
}
