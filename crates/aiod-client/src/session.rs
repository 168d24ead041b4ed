use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use tempfile::NamedTempFile;

use crate::error::{AiodError, Result};
use crate::token::Token;

/// Holder of the single live token for a client and its clones.
///
/// All read-modify-write sequences run under one mutex. When a token file is
/// configured every change is written to disk first, while the lock is held,
/// so memory never runs ahead of the file.
#[derive(Clone, Default)]
pub struct SessionStore {
    current: Arc<Mutex<Option<Token>>>,
    token_file: Option<PathBuf>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("token_file", &self.token_file)
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    #[must_use]
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Opens a file-backed store. A missing file means an anonymous session.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let loaded = read_token_file(&path)?;
        Ok(Self {
            current: Arc::new(Mutex::new(loaded)),
            token_file: Some(path),
        })
    }

    #[must_use]
    pub fn token_file(&self) -> Option<&Path> {
        self.token_file.as_deref()
    }

    pub fn current(&self) -> Result<Option<Token>> {
        Ok(self.lock()?.clone())
    }

    pub fn is_authenticated(&self) -> Result<bool> {
        Ok(self.lock()?.is_some())
    }

    /// Returns the token unless it is locally known to be expired, in which
    /// case the session is cleared and `None` is returned.
    pub fn live_token(&self) -> Result<Option<Token>> {
        let mut guard = self.lock()?;
        match guard.as_ref() {
            Some(token) if token.is_expired() => {
                tracing::warn!(
                    expires_at = ?token.expires_at(),
                    "stored token expired; session cleared"
                );
                self.persist(None)?;
                *guard = None;
                Ok(None)
            }
            other => Ok(other.cloned()),
        }
    }

    pub fn replace(&self, token: Token) -> Result<()> {
        let mut guard = self.lock()?;
        self.persist(Some(&token))?;
        *guard = Some(token);
        Ok(())
    }

    /// Removes the token and hands it back so the caller can revoke it.
    pub fn take(&self) -> Result<Option<Token>> {
        let mut guard = self.lock()?;
        if guard.is_some() {
            self.persist(None)?;
        }
        Ok(guard.take())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Option<Token>>> {
        self.current
            .lock()
            .map_err(|_| AiodError::SessionPoisoned)
    }

    fn persist(&self, token: Option<&Token>) -> Result<()> {
        let Some(path) = &self.token_file else {
            return Ok(());
        };
        match token {
            Some(token) => write_token_file(path, token),
            None => match fs::remove_file(path) {
                Ok(()) => Ok(()),
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(err) => Err(err.into()),
            },
        }
    }
}

fn read_token_file(path: &Path) -> Result<Option<Token>> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err.into()),
    };
    let token = toml::from_str::<Token>(&raw).map_err(|err| {
        AiodError::TokenFile(format!("failed to parse {}: {err}", path.display()))
    })?;
    Ok(Some(token))
}

/// Writes through a sibling temp file (mode 0600 on unix) renamed over the
/// target, so readers see either the old token or the new one.
fn write_token_file(path: &Path, token: &Token) -> Result<()> {
    let serialized = toml::to_string(token).map_err(|err| {
        AiodError::TokenFile(format!("failed to encode {}: {err}", path.display()))
    })?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut staged = NamedTempFile::new_in(dir)?;
    staged.write_all(serialized.as_bytes())?;
    staged.as_file().sync_all()?;
    staged.persist(path).map_err(|err| err.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn take_on_empty_store_is_none() {
        let store = SessionStore::in_memory();
        assert!(store.take().expect("take").is_none());
        assert!(!store.is_authenticated().expect("status"));
    }

    #[test]
    fn expired_token_is_cleared_on_read() {
        let store = SessionStore::in_memory();
        let past = Utc::now() - Duration::seconds(5);
        store
            .replace(Token::new("stale").with_expires_at(past))
            .expect("replace");
        assert!(store.live_token().expect("live").is_none());
        assert!(store.current().expect("current").is_none());
    }

    #[test]
    fn clones_share_one_session() {
        let store = SessionStore::in_memory();
        let clone = store.clone();
        store.replace(Token::new("shared")).expect("replace");
        let seen = clone.live_token().expect("live").expect("token");
        assert_eq!(seen.access_token(), "shared");
    }

    #[test]
    fn token_file_round_trips_across_store_instances() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("nested").join("token.toml");

        let store = SessionStore::open(&path).expect("open");
        assert!(store.current().expect("current").is_none());
        let token = Token::new("persisted").with_refresh_token("refresh");
        store.replace(token.clone()).expect("replace");
        assert!(path.exists());

        let reopened = SessionStore::open(&path).expect("reopen");
        assert_eq!(reopened.current().expect("current"), Some(token));

        reopened.take().expect("take");
        assert!(!path.exists());
    }

    #[cfg(unix)]
    #[test]
    fn token_file_is_private_to_owner() {
        use std::os::unix::fs::PermissionsExt;

        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("token.toml");
        let store = SessionStore::open(&path).expect("open");
        store.replace(Token::new("secret")).expect("replace");
        store.replace(Token::new("rotated")).expect("rotate");

        let mode = fs::metadata(&path).expect("metadata").permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        let leftovers = fs::read_dir(temp.path()).expect("read dir").count();
        assert_eq!(leftovers, 1, "staging files must not be left behind");
    }

    #[test]
    fn failed_removal_keeps_token_in_memory() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("token.toml");
        let store = SessionStore::open(&path).expect("open");
        store.replace(Token::new("kept")).expect("replace");

        // A directory at the token path makes removal fail with something
        // other than NotFound.
        fs::remove_file(&path).expect("remove");
        fs::create_dir(&path).expect("mkdir");

        assert!(store.take().is_err());
        let current = store.current().expect("current").expect("token kept");
        assert_eq!(current.access_token(), "kept");
    }

    #[test]
    fn failed_removal_of_expired_token_keeps_state_consistent() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("token.toml");
        let store = SessionStore::open(&path).expect("open");
        let past = Utc::now() - Duration::seconds(5);
        store
            .replace(Token::new("stale").with_expires_at(past))
            .expect("replace");

        fs::remove_file(&path).expect("remove");
        fs::create_dir(&path).expect("mkdir");

        assert!(store.live_token().is_err());
        assert!(store.is_authenticated().expect("status"));
    }

    #[test]
    fn poisoned_lock_is_reported_as_session_error() {
        let store = SessionStore::in_memory();
        let holder = store.clone();
        let _ = std::thread::spawn(move || {
            let _guard = holder.current.lock().expect("lock");
            panic!("poison the session lock");
        })
        .join();

        let err = store.current().expect_err("poisoned");
        assert!(matches!(err, AiodError::SessionPoisoned));
        assert!(!err.is_local());
    }

    #[test]
    fn corrupt_token_file_is_reported() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("token.toml");
        fs::write(&path, "not = [valid").expect("write");
        let err = SessionStore::open(&path).expect_err("must fail");
        assert!(matches!(err, AiodError::TokenFile(_)));
    }
}
