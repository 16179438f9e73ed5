//! Session token persistence.
//!
//! The bearer token lives in a small JSON file next to the config. It is
//! read once at startup to decide the initial authenticated state, saved
//! on login, and erased on logout.

use anyhow::Result;
use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::{io::ErrorKind, path::PathBuf};
use tokio::fs;

/// Abstract token storage so the worker depends on the seam, not on the
/// filesystem.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Read the persisted token, if any.
    async fn load(&self) -> Result<Option<String>>;
    /// Persist the token after a successful login.
    async fn save(&self, token: &str) -> Result<()>;
    /// Erase the persisted token on logout.
    async fn clear(&self) -> Result<()>;
}

/// On-disk shape of the session file.
#[derive(Debug, Serialize, Deserialize)]
struct SessionFile {
    token: String,
}

/// File-backed session store (`session.json` by default).
#[derive(Clone)]
pub struct FileSession {
    path: PathBuf,
}

impl FileSession {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SessionStore for FileSession {
    async fn load(&self) -> Result<Option<String>> {
        match fs::read(&self.path).await {
            Ok(data) => {
                let file: SessionFile = serde_json::from_slice(&data)?;
                Ok(Some(file.token))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, token: &str) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).await?;
        }
        let data = serde_json::to_vec_pretty(&SessionFile {
            token: token.to_string(),
        })?;
        fs::write(&self.path, data).await?;
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Short, stable fingerprint of a token for log lines. The raw token is
/// never written to the log file.
pub fn fingerprint(token: &str) -> String {
    let hash = Sha256::digest(token.as_bytes());
    let encoded = URL_SAFE_NO_PAD.encode(hash);
    encoded.chars().take(8).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_session() -> FileSession {
        let path = std::env::temp_dir().join(format!("asn_session_{}.json", uuid::Uuid::new_v4()));
        FileSession::new(path)
    }

    #[tokio::test]
    async fn save_load_clear_roundtrip() {
        let store = temp_session();
        assert_eq!(store.load().await.unwrap(), None);

        store.save("bearer-token-123").await.unwrap();
        assert_eq!(
            store.load().await.unwrap().as_deref(),
            Some("bearer-token-123")
        );

        store.clear().await.unwrap();
        assert_eq!(store.load().await.unwrap(), None);
        // Clearing an already-missing session is fine.
        store.clear().await.unwrap();
    }

    #[test]
    fn fingerprint_is_short_and_not_the_token() {
        let fp = fingerprint("super-secret-token");
        assert_eq!(fp.len(), 8);
        assert!(!"super-secret-token".contains(&fp));
        // Stable for the same input, different for another.
        assert_eq!(fp, fingerprint("super-secret-token"));
        assert_ne!(fp, fingerprint("other-token"));
    }
}
