//! Persistent cookie jar holding the ambient session credential.
//!
//! Wraps a `cookie_store` behind reqwest's cookie provider seam, so
//! Set-Cookie attributes (Path, Domain, Secure, expiry) are honoured the way
//! a browser would. The jar is saved to `<home>/cookies.json` (0600) after
//! every change, session cookies included, since the CLI spans processes.
//! Cookie values are never logged.

use std::fmt;
use std::fs::{self, File};
use std::io::{BufReader, ErrorKind};
use std::path::PathBuf;
use std::sync::{MutexGuard, PoisonError};

use anyhow::{Context, Result, anyhow};
use cookie_store::CookieStore;
use reqwest::Url;
use reqwest::cookie::CookieStore as ProvideCookies;
use reqwest::header::HeaderValue;
use reqwest_cookie_store::CookieStoreMutex;

use crate::config::paths;
use crate::session::write_private_file;

#[derive(Default)]
pub struct CookieJar {
    path: Option<PathBuf>,
    store: CookieStoreMutex,
}

impl fmt::Debug for CookieJar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CookieJar")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl CookieJar {
    /// Jar that lives only as long as the process.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Loads the jar persisted at `path`, dropping cookies that expired in
    /// the meantime. A missing file is an empty jar; an unreadable one is
    /// logged and treated as empty.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let store = match File::open(&path) {
            Ok(file) => cookie_store::serde::json::load(BufReader::new(file)).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "cookie jar corrupt, starting empty");
                CookieStore::default()
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => CookieStore::default(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "cookie jar unreadable, starting empty");
                CookieStore::default()
            }
        };

        Self {
            path: Some(path),
            store: CookieStoreMutex::new(store),
        }
    }

    /// Jar at `<home>/cookies.json`.
    pub fn default_location() -> Self {
        Self::load(paths::cookies_path())
    }

    /// Drops every cookie and removes the persisted jar.
    ///
    /// # Errors
    /// Returns an error if the persisted jar cannot be removed.
    pub fn clear(&self) -> Result<()> {
        self.lock().clear();
        let Some(path) = &self.path else {
            return Ok(());
        };
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("Failed to remove {}", path.display())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, CookieStore> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn persist(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let mut contents = Vec::new();
        cookie_store::serde::json::save_incl_expired_and_nonpersistent(&self.lock(), &mut contents)
            .map_err(|e| anyhow!(e))
            .context("Failed to serialize cookies")?;
        let contents = String::from_utf8(contents).context("Cookie jar is not UTF-8")?;
        write_private_file(path, &contents)
    }
}

impl ProvideCookies for CookieJar {
    fn set_cookies(&self, cookie_headers: &mut dyn Iterator<Item = &HeaderValue>, url: &Url) {
        self.store.set_cookies(cookie_headers, url);
        tracing::debug!(host = url.host_str(), "cookies updated");

        if let Err(e) = self.persist() {
            tracing::warn!(error = %e, "failed to persist cookie jar");
        }
    }

    fn cookies(&self, url: &Url) -> Option<HeaderValue> {
        self.store.cookies(url)
    }
}

#[cfg(test)]
mod tests {
    use std::thread;
    use std::time::Duration;

    use tempfile::tempdir;

    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    fn set(jar: &CookieJar, url: &Url, headers: &[&str]) {
        let values: Vec<HeaderValue> = headers
            .iter()
            .map(|h| HeaderValue::from_str(h).unwrap())
            .collect();
        jar.set_cookies(&mut values.iter(), url);
    }

    fn sent(jar: &CookieJar, to: &str) -> Option<String> {
        jar.cookies(&url(to))
            .map(|h| h.to_str().unwrap().to_string())
    }

    #[test]
    fn test_cookies_are_scoped_to_host() {
        let jar = CookieJar::in_memory();
        let service = url("http://127.0.0.1:3000/api/auth/login");
        set(&jar, &service, &["sid=abc; Path=/; HttpOnly", "theme=dark; Path=/"]);

        let header = sent(&jar, "http://127.0.0.1:3000/api/posts/list").unwrap();
        assert!(header.contains("sid=abc"));
        assert!(header.contains("theme=dark"));
        assert!(sent(&jar, "http://other.example/api").is_none());
    }

    #[test]
    fn test_path_restricted_cookie_stays_on_its_path() {
        let jar = CookieJar::in_memory();
        set(
            &jar,
            &url("http://board.example/api/auth/login"),
            &["sid=abc; Path=/", "adm=1; Path=/admin"],
        );

        assert_eq!(
            sent(&jar, "http://board.example/api/posts/list").as_deref(),
            Some("sid=abc")
        );
        assert!(sent(&jar, "http://board.example/admin/users").unwrap().contains("adm=1"));
    }

    #[test]
    fn test_secure_cookie_is_not_sent_over_http() {
        let jar = CookieJar::in_memory();
        set(
            &jar,
            &url("https://board.example/api/auth/login"),
            &["sid=abc; Path=/; Secure"],
        );

        assert!(sent(&jar, "https://board.example/api/posts/list").is_some());
        assert!(sent(&jar, "http://board.example/api/posts/list").is_none());
    }

    #[test]
    fn test_cookie_is_not_sent_once_expired() {
        let jar = CookieJar::in_memory();
        let service = url("http://board.example/api/auth/login");
        set(&jar, &service, &["sid=abc; Path=/; Max-Age=1"]);
        assert!(sent(&jar, "http://board.example/api/posts/list").is_some());

        thread::sleep(Duration::from_millis(2100));

        assert!(sent(&jar, "http://board.example/api/posts/list").is_none());
    }

    #[test]
    fn test_server_can_remove_cookie() {
        let jar = CookieJar::in_memory();
        let service = url("http://localhost/api/auth/login");
        set(&jar, &service, &["sid=abc; Path=/"]);
        assert!(jar.cookies(&service).is_some());

        set(&jar, &service, &["sid=deleted; Path=/; Max-Age=0"]);
        assert!(jar.cookies(&service).is_none());
    }

    #[test]
    fn test_jar_persists_session_cookies_and_clears() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cookies.json");
        let service = url("http://localhost/api/auth/login");

        let jar = CookieJar::load(&path);
        set(&jar, &service, &["sid=abc; Path=/; HttpOnly"]);
        assert!(path.exists());

        let reloaded = CookieJar::load(&path);
        assert_eq!(
            sent(&reloaded, "http://localhost/api/posts/list").as_deref(),
            Some("sid=abc")
        );

        reloaded.clear().unwrap();
        assert!(!path.exists());
        assert!(reloaded.cookies(&service).is_none());
        reloaded.clear().unwrap();
    }

    #[test]
    fn test_corrupt_jar_loads_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cookies.json");
        fs::write(&path, "[not a jar").unwrap();

        let jar = CookieJar::load(&path);
        assert!(sent(&jar, "http://localhost/api").is_none());
    }
}
