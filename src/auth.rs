//! Authentication collaborator contracts and the cached-credential store.
//!
//! Login flows live outside this crate. The orchestrator only needs to know
//! whether a profile's authenticators hold usable credentials; the
//! [`CachedTokenAuthenticator`] answers that from credential files written
//! by those flows.

use crate::config::models::Profile;
use crate::config::profile_name::ProfileName;
use crate::constants;
use crate::error::Error;
use crate::fs::{FileSystem, OsFileSystem};
use crate::logging::redact_sensitive_value;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::path::PathBuf;
use tracing::debug;

/// A cached credential.
#[derive(Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct Token {
    pub access_token: String,
    /// `None` means the credential does not expire.
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl Token {
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expiry| expiry <= now)
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("access_token", &redact_sensitive_value(&self.access_token))
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// One configured way of authenticating a profile.
pub trait Authenticator {
    fn name(&self) -> &str;

    /// Cheap check for whether credentials are present at all.
    fn is_authenticated(&self, profile: &Profile) -> bool;

    /// Loads the credential, optionally refreshing it first.
    ///
    /// # Errors
    ///
    /// Returns an error if the credential cannot be loaded.
    fn load_authentication(&self, profile: &Profile, refresh: bool) -> Result<Token, Error>;
}

/// Builds authenticators from a profile's configured entries.
pub trait AuthenticatorProvider {
    /// Returns `None` for authenticator names this provider does not know.
    fn authenticator(&self, name: &str, settings: &Value) -> Option<Box<dyn Authenticator>>;
}

/// A valid credential obtained for one authenticator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub authenticator: String,
    pub token: Token,
}

/// Reads `credentials/<profile>/<authenticator>.json`.
///
/// There is no network refresh flow here; a refresh request re-reads the
/// file so that credentials renewed by another process are picked up.
pub struct CachedTokenAuthenticator<F: FileSystem> {
    name: String,
    credentials_root: PathBuf,
    fs: F,
}

impl<F: FileSystem> CachedTokenAuthenticator<F> {
    pub fn new(name: impl Into<String>, credentials_root: PathBuf, fs: F) -> Self {
        Self {
            name: name.into(),
            credentials_root,
            fs,
        }
    }

    fn credential_path(&self, profile: &Profile) -> Result<PathBuf, Error> {
        let profile_name = ProfileName::new(&profile.name)?;
        let authenticator_name = ProfileName::new(&self.name)?;
        Ok(self
            .credentials_root
            .join(profile_name.as_str())
            .join(format!("{}.{}", authenticator_name.as_str(), constants::FILE_EXT_JSON)))
    }
}

impl<F: FileSystem> Authenticator for CachedTokenAuthenticator<F> {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_authenticated(&self, profile: &Profile) -> bool {
        self.credential_path(profile)
            .is_ok_and(|path| self.fs.exists(&path))
    }

    fn load_authentication(&self, profile: &Profile, refresh: bool) -> Result<Token, Error> {
        let path = self.credential_path(profile)?;
        if refresh {
            debug!(
                target: "portico::auth",
                "refresh requested for '{}', re-reading {}",
                self.name,
                path.display()
            );
        }
        let content = self.fs.read_to_string(&path)?;
        let token: Token = serde_json::from_str(&content)?;
        Ok(token)
    }
}

/// Provides a [`CachedTokenAuthenticator`] for every configured entry.
pub struct CachedTokenProvider {
    credentials_root: PathBuf,
}

impl CachedTokenProvider {
    #[must_use]
    pub fn new(config_dir: &std::path::Path) -> Self {
        Self {
            credentials_root: config_dir.join(constants::DIR_CREDENTIALS),
        }
    }
}

impl AuthenticatorProvider for CachedTokenProvider {
    fn authenticator(&self, name: &str, _settings: &Value) -> Option<Box<dyn Authenticator>> {
        Some(Box::new(CachedTokenAuthenticator::new(
            name,
            self.credentials_root.clone(),
            OsFileSystem,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_token_expiry() {
        let now = Utc::now();
        let token = Token {
            access_token: "abc".to_string(),
            expires_at: Some(now - Duration::seconds(1)),
        };
        assert!(token.is_expired_at(now));

        let forever = Token {
            access_token: "abc".to_string(),
            expires_at: None,
        };
        assert!(!forever.is_expired_at(now));
    }

    #[test]
    fn test_token_debug_redacts_secret() {
        let token = Token {
            access_token: "super-secret".to_string(),
            expires_at: None,
        };
        let debug = format!("{token:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_cached_token_authenticator_reads_credential_file() {
        let dir = tempfile::tempdir().unwrap();
        let profile_dir = dir.path().join("dev");
        std::fs::create_dir_all(&profile_dir).unwrap();
        std::fs::write(
            profile_dir.join("apikey.json"),
            r#"{"access_token": "t0k", "expires_at": "2999-01-01T00:00:00Z"}"#,
        )
        .unwrap();

        let profile = Profile {
            name: "dev".to_string(),
            ..Profile::default()
        };
        let authenticator =
            CachedTokenAuthenticator::new("apikey", dir.path().to_path_buf(), OsFileSystem);
        assert!(authenticator.is_authenticated(&profile));
        let token = authenticator.load_authentication(&profile, false).unwrap();
        assert_eq!(token.access_token, "t0k");
        assert!(!token.is_expired());

        let missing = CachedTokenAuthenticator::new("sso", dir.path().to_path_buf(), OsFileSystem);
        assert!(!missing.is_authenticated(&profile));
    }
}
