//! Local session cache.
//!
//! Holds the optimistic "logged in" hint and the last known `UserRecord`.
//! The file-backed store keeps both entries in one document at
//! `<home>/session.json` (0600), so they are written and removed together.
//! Nothing in here authorizes anything: privileged pages re-confirm with the
//! server through the session guard.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::paths;
use crate::models::UserRecord;

/// Client-held belief about whether the user is authenticated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub logged_in: bool,
    pub user: Option<UserRecord>,
}

impl Session {
    pub fn logged_out() -> Self {
        Self::default()
    }

    pub fn logged_in_as(user: UserRecord) -> Self {
        Self {
            logged_in: true,
            user: Some(user),
        }
    }

    /// A flag without a user (or a user without the flag) reads as logged out.
    fn normalized(logged_in: bool, user: Option<UserRecord>) -> Self {
        match (logged_in, user) {
            (true, Some(user)) => Self::logged_in_as(user),
            _ => Self::logged_out(),
        }
    }
}

/// Persistent key/value store for the session hint.
pub trait SessionStore {
    /// Returns the cached session. Never fails: an unreadable cache is a
    /// logged-out cache.
    fn get(&self) -> Session;

    /// Records a successful login (or a fresher profile) for `user`.
    ///
    /// # Errors
    /// Returns an error if the cache cannot be persisted.
    fn set_logged_in(&mut self, user: &UserRecord) -> Result<()>;

    /// Drops both the flag and the user. Clearing an empty cache succeeds.
    ///
    /// # Errors
    /// Returns an error if the persisted cache cannot be removed.
    fn clear(&mut self) -> Result<()>;
}

/// In-process store. Survives for the lifetime of the value only.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    session: Session,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(user: UserRecord) -> Self {
        Self {
            session: Session::logged_in_as(user),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self) -> Session {
        self.session.clone()
    }

    fn set_logged_in(&mut self, user: &UserRecord) -> Result<()> {
        self.session = Session::logged_in_as(user.clone());
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.session = Session::logged_out();
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct SessionDocument {
    #[serde(default)]
    logged_in: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user: Option<UserRecord>,
}

/// Store backed by a single JSON document on disk.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `<home>/session.json`.
    pub fn default_location() -> Self {
        Self::new(paths::session_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self) -> Session {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Session::logged_out(),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "session cache unreadable");
                return Session::logged_out();
            }
        };

        match serde_json::from_str::<SessionDocument>(&contents) {
            Ok(doc) => Session::normalized(doc.logged_in, doc.user),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "session cache corrupt");
                Session::logged_out()
            }
        }
    }

    fn set_logged_in(&mut self, user: &UserRecord) -> Result<()> {
        let doc = SessionDocument {
            logged_in: true,
            user: Some(user.clone()),
        };
        let contents =
            serde_json::to_string_pretty(&doc).context("Failed to serialize session cache")?;
        write_private_file(&self.path, &contents)
    }

    fn clear(&mut self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e)
                .with_context(|| format!("Failed to remove {}", self.path.display())),
        }
    }
}

/// Writes `contents` to `path` with restricted permissions (0600).
///
/// The data goes to a sibling temp file first and is renamed into place, so
/// readers see either the old document or the new one.
pub(crate) fn write_private_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let tmp_path = path.with_extension("json.tmp");

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(&tmp_path)
            .with_context(|| format!("Failed to open {} for writing", tmp_path.display()))?;
        file.write_all(contents.as_bytes())
            .with_context(|| format!("Failed to write to {}", tmp_path.display()))?;
    }

    #[cfg(not(unix))]
    {
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&tmp_path)
            .with_context(|| format!("Failed to open {} for writing", tmp_path.display()))?;
        file.write_all(contents.as_bytes())
            .with_context(|| format!("Failed to write to {}", tmp_path.display()))?;
    }

    fs::rename(&tmp_path, path).with_context(|| {
        format!(
            "Failed to rename {} to {}",
            tmp_path.display(),
            path.display()
        )
    })?;

    Ok(())
}
