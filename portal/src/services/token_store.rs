//! # Token Storage
//!
//! Persistence for the access/refresh token pair. The file format keeps the
//! `accessToken` / `refreshToken` key names used by the browser portal, so a
//! token file can be inspected or seeded by hand.

use crate::core::error::{PortalError, Result};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StoredTokens {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

/// Where the session tokens live between runs.
pub trait TokenStore: Send + Sync {
    fn access_token(&self) -> Option<String>;

    fn refresh_token(&self) -> Option<String>;

    /// Store a new pair. A `None` refresh token keeps the current one.
    fn set_tokens(&self, access_token: &str, refresh_token: Option<&str>) -> Result<()>;

    fn clear(&self) -> Result<()>;
}

/// Process-local storage, used by tests and short-lived sessions.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    tokens: RwLock<StoredTokens>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tokens(access_token: &str, refresh_token: &str) -> Self {
        Self {
            tokens: RwLock::new(StoredTokens {
                access_token: Some(access_token.to_string()),
                refresh_token: Some(refresh_token.to_string()),
            }),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn access_token(&self) -> Option<String> {
        self.tokens.read().access_token.clone()
    }

    fn refresh_token(&self) -> Option<String> {
        self.tokens.read().refresh_token.clone()
    }

    fn set_tokens(&self, access_token: &str, refresh_token: Option<&str>) -> Result<()> {
        let mut tokens = self.tokens.write();
        tokens.access_token = Some(access_token.to_string());
        if let Some(refresh) = refresh_token {
            tokens.refresh_token = Some(refresh.to_string());
        }
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.tokens.write() = StoredTokens::default();
        Ok(())
    }
}

/// JSON file storage. The file is rewritten on every change and removed on clear.
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
    cache: RwLock<StoredTokens>,
}

impl FileTokenStore {
    /// Open (or lazily create) the token file at `path`.
    ///
    /// A missing file means "no session"; an unreadable one is an error.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let cache = match std::fs::read_to_string(&path) {
            Ok(contents) if contents.trim().is_empty() => StoredTokens::default(),
            Ok(contents) => serde_json::from_str(&contents).map_err(|e| {
                PortalError::Storage(format!("Corrupt token file {}: {}", path.display(), e))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => StoredTokens::default(),
            Err(e) => return Err(e.into()),
        };

        tracing::debug!(
            path = %path.display(),
            has_session = cache.access_token.is_some(),
            "Opened token store"
        );

        Ok(Self {
            path,
            cache: RwLock::new(cache),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, tokens: &StoredTokens) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(tokens)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

impl TokenStore for FileTokenStore {
    fn access_token(&self) -> Option<String> {
        self.cache.read().access_token.clone()
    }

    fn refresh_token(&self) -> Option<String> {
        self.cache.read().refresh_token.clone()
    }

    fn set_tokens(&self, access_token: &str, refresh_token: Option<&str>) -> Result<()> {
        let snapshot = {
            let mut tokens = self.cache.write();
            tokens.access_token = Some(access_token.to_string());
            if let Some(refresh) = refresh_token {
                tokens.refresh_token = Some(refresh.to_string());
            }
            tokens.clone()
        };
        self.persist(&snapshot)
    }

    fn clear(&self) -> Result<()> {
        *self.cache.write() = StoredTokens::default();
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_keeps_refresh_token_when_not_rotated() {
        let store = MemoryTokenStore::with_tokens("access-1", "refresh-1");
        store.set_tokens("access-2", None).unwrap();

        assert_eq!(store.access_token().as_deref(), Some("access-2"));
        assert_eq!(store.refresh_token().as_deref(), Some("refresh-1"));

        store.clear().unwrap();
        assert!(store.access_token().is_none());
        assert!(store.refresh_token().is_none());
    }

    #[test]
    fn test_file_store_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/tokens.json");

        let store = FileTokenStore::open(&path).unwrap();
        assert!(store.access_token().is_none());
        store.set_tokens("access-1", Some("refresh-1")).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"accessToken\""));
        assert!(raw.contains("\"refreshToken\""));

        let reopened = FileTokenStore::open(&path).unwrap();
        assert_eq!(reopened.access_token().as_deref(), Some("access-1"));
        assert_eq!(reopened.refresh_token().as_deref(), Some("refresh-1"));

        reopened.clear().unwrap();
        assert!(!path.exists());
        reopened.clear().unwrap();
    }

    #[test]
    fn test_file_store_rejects_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tokens.json");
        std::fs::write(&path, "{not json").unwrap();

        assert!(matches!(FileTokenStore::open(&path), Err(PortalError::Storage(_))));
    }
}
