//! Token bundle persistence for Garmin Connect sessions.
//!
//! Stores the OAuth2 token bundle as JSON in a fixed, well-known
//! directory (`~/.garminconnect`), with owner-only permissions on
//! Unix. The directory matches what garth-based tooling uses.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use super::{ConnectError, OAUTH2_TOKEN_FILE, TOKEN_DIR_NAME};

/// An OAuth2 token bundle obtained from the SSO exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionTokens {
    /// Bearer token sent with every Connect API request.
    pub access_token: String,

    /// Token type reported by the exchange (normally "Bearer").
    pub token_type: String,

    /// Refresh token, when the exchange issued one.
    #[serde(default)]
    pub refresh_token: Option<String>,

    /// When the access token stops being accepted.
    pub expires_at: DateTime<Utc>,

    /// When the refresh token stops being accepted.
    #[serde(default)]
    pub refresh_token_expires_at: Option<DateTime<Utc>>,
}

impl SessionTokens {
    /// Builds a bundle from exchange response fields, converting the
    /// relative `expires_in` lifetimes into absolute timestamps.
    pub fn from_exchange(
        access_token: String,
        token_type: String,
        refresh_token: Option<String>,
        expires_in: i64,
        refresh_token_expires_in: Option<i64>,
    ) -> Self {
        let now = Utc::now();
        Self {
            access_token,
            token_type,
            refresh_token,
            expires_at: now + Duration::seconds(expires_in),
            refresh_token_expires_at: refresh_token_expires_in
                .map(|secs| now + Duration::seconds(secs)),
        }
    }

    /// Whether the access token has already expired.
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}

/// Reads and writes the token bundle at the fixed token directory.
pub struct TokenStore {
    /// Directory holding the token bundle.
    dir: PathBuf,
}

impl TokenStore {
    /// Creates a store rooted at `~/.garminconnect`.
    pub fn new() -> Result<Self, ConnectError> {
        let dir = dirs::home_dir()
            .ok_or_else(|| ConnectError::TokenStorage("Could not find home directory".to_string()))?
            .join(TOKEN_DIR_NAME);
        Ok(Self { dir })
    }

    /// Creates a store rooted at an explicit directory.
    #[allow(dead_code)]
    pub fn at(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Returns the directory holding the token bundle.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Whether any token files exist in the bundle directory.
    ///
    /// Mirrors the check other Garmin tooling performs: the directory
    /// may contain token files written by garth under different names.
    pub fn has_tokens(&self) -> bool {
        if !self.dir.exists() {
            return false;
        }
        let pattern = self.dir.join("*.json");
        glob::glob(&pattern.to_string_lossy())
            .map(|mut entries| entries.any(|e| e.is_ok()))
            .unwrap_or(false)
    }

    /// Persists the token bundle, creating the directory if needed.
    ///
    /// The directory is created with mode 0700 and the token file is
    /// set to 0600 on Unix, so the bundle stays owner-readable only.
    pub fn save(&self, tokens: &SessionTokens) -> Result<(), ConnectError> {
        fs::create_dir_all(&self.dir).map_err(|e| {
            ConnectError::TokenStorage(format!("Failed to create token directory: {e}"))
        })?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = fs::Permissions::from_mode(0o700);
            fs::set_permissions(&self.dir, perms).map_err(|e| {
                ConnectError::TokenStorage(format!("Failed to set directory permissions: {e}"))
            })?;
        }

        let path = self.token_path();
        let json = serde_json::to_string_pretty(tokens)
            .map_err(|e| ConnectError::TokenStorage(format!("Serialization error: {e}")))?;

        fs::write(&path, json)
            .map_err(|e| ConnectError::TokenStorage(format!("Failed to write token file: {e}")))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = fs::Permissions::from_mode(0o600);
            fs::set_permissions(&path, perms).map_err(|e| {
                ConnectError::TokenStorage(format!("Failed to set file permissions: {e}"))
            })?;
        }

        Ok(())
    }

    /// Loads the stored token bundle, or `None` when absent.
    pub fn load(&self) -> Result<Option<SessionTokens>, ConnectError> {
        let path = self.token_path();

        if !path.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(&path)
            .map_err(|e| ConnectError::TokenStorage(format!("Failed to read token file: {e}")))?;

        let tokens: SessionTokens = serde_json::from_str(&json)
            .map_err(|e| ConnectError::TokenStorage(format!("Invalid token file: {e}")))?;

        Ok(Some(tokens))
    }

    /// Deletes the stored token bundle.
    ///
    /// Only removes the token file; other files in the directory (for
    /// example `config.yaml`) are left alone.
    pub fn delete(&self) -> Result<(), ConnectError> {
        let path = self.token_path();

        if path.exists() {
            fs::remove_file(&path).map_err(|e| {
                ConnectError::TokenStorage(format!("Failed to delete token file: {e}"))
            })?;
        }

        Ok(())
    }

    fn token_path(&self) -> PathBuf {
        self.dir.join(OAUTH2_TOKEN_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample_tokens() -> SessionTokens {
        SessionTokens::from_exchange(
            "access-abc".to_string(),
            "Bearer".to_string(),
            Some("refresh-xyz".to_string()),
            3600,
            Some(7776000),
        )
    }

    #[test]
    fn test_from_exchange_sets_expiry_in_future() {
        let tokens = sample_tokens();
        assert!(tokens.expires_at > Utc::now());
        assert!(!tokens.is_expired());
    }

    #[test]
    fn test_is_expired_for_past_expiry() {
        let mut tokens = sample_tokens();
        tokens.expires_at = Utc::now() - Duration::seconds(10);
        assert!(tokens.is_expired());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempdir().unwrap();
        let store = TokenStore::at(dir.path().join("bundle"));
        let tokens = sample_tokens();

        store.save(&tokens).unwrap();
        let loaded = store.load().unwrap().expect("tokens should exist");

        assert_eq!(loaded.access_token, tokens.access_token);
        assert_eq!(loaded.refresh_token, tokens.refresh_token);
        assert_eq!(loaded.expires_at, tokens.expires_at);
    }

    #[test]
    fn test_load_missing_returns_none() {
        let dir = tempdir().unwrap();
        let store = TokenStore::at(dir.path().join("empty"));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_has_tokens_after_save() {
        let dir = tempdir().unwrap();
        let store = TokenStore::at(dir.path().to_path_buf());
        assert!(!store.has_tokens());

        store.save(&sample_tokens()).unwrap();
        assert!(store.has_tokens());
    }

    #[test]
    fn test_delete_removes_token_file() {
        let dir = tempdir().unwrap();
        let store = TokenStore::at(dir.path().to_path_buf());
        store.save(&sample_tokens()).unwrap();

        store.delete().unwrap();
        assert!(store.load().unwrap().is_none());
        // Deleting again is not an error.
        store.delete().unwrap();
    }

    #[test]
    fn test_load_rejects_garbage_file() {
        let dir = tempdir().unwrap();
        let store = TokenStore::at(dir.path().to_path_buf());
        fs::create_dir_all(dir.path()).unwrap();
        fs::write(dir.path().join(OAUTH2_TOKEN_FILE), "not json").unwrap();

        assert!(matches!(
            store.load(),
            Err(ConnectError::TokenStorage(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_save_sets_owner_only_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let store = TokenStore::at(dir.path().join("bundle"));
        store.save(&sample_tokens()).unwrap();

        let dir_mode = fs::metadata(store.dir()).unwrap().permissions().mode();
        let file_mode = fs::metadata(store.dir().join(OAUTH2_TOKEN_FILE))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(dir_mode & 0o777, 0o700);
        assert_eq!(file_mode & 0o777, 0o600);
    }
}
