//! The user-profile store and the authentication boundary.
//!
//! Profiles live in a single JSON document (`$RENDA_HOME/users.json`) keyed by username. The
//! ledger side of the application reads and writes only the `daily_goal` field; everything else
//! belongs to the authentication boundary.
//!
//! Secret hashing is deliberately behind the [`SecretHasher`] seam. [`Sha256Hasher`] is the
//! built-in development provider; a deployment that needs a slow KDF substitutes its own
//! implementation without touching the store.

use crate::error::{Error, Result};
use crate::utils;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::PathBuf;

/// Usernames shorter than this are rejected at registration.
pub const MIN_USERNAME_LEN: usize = 3;
/// Usernames longer than this are rejected at registration.
pub const MAX_USERNAME_LEN: usize = 32;

/// Checks a username against the registration policy: 3-32 characters from
/// `[A-Za-z0-9_.-]`, beginning and ending with a letter or digit.
///
/// The charset is what makes the username -> ledger-file mapping safe: there is no way to spell
/// a path separator or an ambiguous snapshot filename with these characters.
pub fn validate_username(name: &str) -> Result<()> {
    let invalid = |reason: &str| {
        Err(Error::InvalidUsername {
            name: name.to_string(),
            reason: reason.to_string(),
        })
    };
    if name.len() < MIN_USERNAME_LEN {
        return invalid("must be at least 3 characters");
    }
    if name.len() > MAX_USERNAME_LEN {
        return invalid("must be at most 32 characters");
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
    {
        return invalid("may only contain letters, digits, '_', '.' and '-'");
    }
    let first = name.chars().next().unwrap_or_default();
    let last = name.chars().last().unwrap_or_default();
    if !first.is_ascii_alphanumeric() || !last.is_ascii_alphanumeric() {
        return invalid("must begin and end with a letter or digit");
    }
    Ok(())
}

/// One entry in the user document.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub username: String,
    pub password_hash: String,
    pub display_name: String,
    pub created_at: DateTime<Utc>,
    /// The daily income target. Zero means no goal is set.
    #[serde(default)]
    pub daily_goal: Decimal,
}

impl UserProfile {
    pub fn new(
        username: impl Into<String>,
        password_hash: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password_hash: password_hash.into(),
            display_name: display_name.into(),
            created_at: Utc::now(),
            daily_goal: Decimal::ZERO,
        }
    }
}

/// The file-backed profile document. Cheap to clone; all state is on disk.
#[derive(Debug, Clone)]
pub struct UserStore {
    path: PathBuf,
}

impl UserStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    async fn read_doc(&self) -> Result<BTreeMap<String, UserProfile>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => serde_json::from_str(&text).map_err(|e| {
                Error::Storage(anyhow::anyhow!(e).context(format!(
                    "Failed to parse user store at {}",
                    self.path.display()
                )))
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(Error::Storage(anyhow::anyhow!(e).context(format!(
                "Unable to read user store at {}",
                self.path.display()
            )))),
        }
    }

    async fn write_doc(&self, doc: &BTreeMap<String, UserProfile>) -> Result<()> {
        let text = serde_json::to_string_pretty(doc)
            .map_err(|e| Error::Storage(anyhow::anyhow!(e).context("Unable to serialize user store")))?;
        utils::write_atomic(&self.path, text).await?;
        Ok(())
    }

    pub async fn get(&self, username: &str) -> Result<Option<UserProfile>> {
        Ok(self.read_doc().await?.get(username).cloned())
    }

    /// Adds a new profile. Fails with `UsernameTaken` if the username already exists.
    pub async fn insert(&self, profile: UserProfile) -> Result<()> {
        let mut doc = self.read_doc().await?;
        if doc.contains_key(&profile.username) {
            return Err(Error::UsernameTaken(profile.username));
        }
        doc.insert(profile.username.clone(), profile);
        self.write_doc(&doc).await
    }

    /// The user's daily goal, zero when unset or when the user has no profile yet.
    pub async fn daily_goal(&self, username: &str) -> Result<Decimal> {
        Ok(self
            .get(username)
            .await?
            .map(|p| p.daily_goal)
            .unwrap_or_default())
    }

    /// Persists a new daily goal on the user's profile.
    pub async fn set_daily_goal(&self, username: &str, goal: Decimal) -> Result<()> {
        let mut doc = self.read_doc().await?;
        let profile = doc.get_mut(username).ok_or(Error::InvalidCredentials)?;
        profile.daily_goal = goal;
        self.write_doc(&doc).await
    }
}

/// The authentication boundary. The ledger engine only ever sees this interface; how secrets
/// are hashed and checked is the provider's concern.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Creates a profile for a new user.
    async fn register(&self, username: &str, secret: &str, display_name: &str) -> Result<()>;

    /// Checks a username/secret pair against the stored profile.
    async fn authenticate(&self, username: &str, secret: &str) -> Result<()>;
}

/// Hashes and verifies secrets. Implementations must be deterministic for a given
/// (username, secret) pair.
pub trait SecretHasher: Send + Sync {
    fn hash(&self, username: &str, secret: &str) -> String;

    fn verify(&self, username: &str, secret: &str, stored: &str) -> bool {
        self.hash(username, secret) == stored
    }
}

/// SHA-256 over the username-salted secret. Suitable for local single-machine use; swap in a
/// slow KDF behind [`SecretHasher`] for anything exposed to the network.
#[derive(Debug, Default, Clone, Copy)]
pub struct Sha256Hasher;

impl SecretHasher for Sha256Hasher {
    fn hash(&self, username: &str, secret: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(username.as_bytes());
        hasher.update([0u8]);
        hasher.update(secret.as_bytes());
        format!("{:x}", hasher.finalize())
    }
}

/// An `AuthProvider` over the file-backed [`UserStore`].
#[derive(Debug, Clone)]
pub struct StoreAuth<H: SecretHasher> {
    users: UserStore,
    hasher: H,
}

impl<H: SecretHasher> StoreAuth<H> {
    pub fn new(users: UserStore, hasher: H) -> Self {
        Self { users, hasher }
    }
}

#[async_trait]
impl<H: SecretHasher> AuthProvider for StoreAuth<H> {
    async fn register(&self, username: &str, secret: &str, display_name: &str) -> Result<()> {
        validate_username(username)?;
        if secret.is_empty() {
            return Err(Error::Validation("the secret cannot be empty".to_string()));
        }
        let display_name = if display_name.trim().is_empty() {
            username
        } else {
            display_name
        };
        self.users
            .insert(UserProfile::new(
                username,
                self.hasher.hash(username, secret),
                display_name,
            ))
            .await
    }

    async fn authenticate(&self, username: &str, secret: &str) -> Result<()> {
        let profile = self
            .users
            .get(username)
            .await?
            .ok_or(Error::InvalidCredentials)?;
        if self.hasher.verify(username, secret, &profile.password_hash) {
            Ok(())
        } else {
            Err(Error::InvalidCredentials)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store(dir: &TempDir) -> UserStore {
        UserStore::new(dir.path().join("users.json"))
    }

    fn auth(dir: &TempDir) -> StoreAuth<Sha256Hasher> {
        StoreAuth::new(store(dir), Sha256Hasher)
    }

    #[test]
    fn test_username_length_policy() {
        assert!(matches!(
            validate_username("ab"),
            Err(Error::InvalidUsername { .. })
        ));
        assert!(validate_username("abc").is_ok());
        assert!(validate_username(&"a".repeat(33)).is_err());
    }

    #[test]
    fn test_username_charset_policy() {
        assert!(validate_username("maria_07").is_ok());
        assert!(validate_username("maria.silva").is_ok());
        assert!(validate_username("../maria").is_err());
        assert!(validate_username("maria silva").is_err());
        assert!(validate_username(".maria").is_err());
        assert!(validate_username("maria.").is_err());
    }

    #[tokio::test]
    async fn test_register_and_authenticate() {
        let dir = TempDir::new().unwrap();
        let auth = auth(&dir);
        auth.register("maria", "s3cret", "Maria").await.unwrap();
        auth.authenticate("maria", "s3cret").await.unwrap();

        let err = auth.authenticate("maria", "wrong").await.unwrap_err();
        assert!(matches!(err, Error::InvalidCredentials));
        let err = auth.authenticate("nobody", "s3cret").await.unwrap_err();
        assert!(matches!(err, Error::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_register_short_username_fails() {
        let dir = TempDir::new().unwrap();
        let auth = auth(&dir);
        let err = auth.register("ab", "s3cret", "Ab").await.unwrap_err();
        assert!(matches!(err, Error::InvalidUsername { .. }));
        auth.register("abc", "s3cret", "Abc").await.unwrap();
    }

    #[tokio::test]
    async fn test_register_duplicate_fails() {
        let dir = TempDir::new().unwrap();
        let auth = auth(&dir);
        auth.register("maria", "one", "Maria").await.unwrap();
        let err = auth.register("maria", "two", "Maria").await.unwrap_err();
        assert!(matches!(err, Error::UsernameTaken(_)));
    }

    #[tokio::test]
    async fn test_secrets_are_not_stored_verbatim() {
        let dir = TempDir::new().unwrap();
        let auth = auth(&dir);
        auth.register("maria", "s3cret", "Maria").await.unwrap();
        let profile = store(&dir).get("maria").await.unwrap().unwrap();
        assert_ne!(profile.password_hash, "s3cret");
        assert!(!profile.password_hash.is_empty());
    }

    #[tokio::test]
    async fn test_daily_goal_defaults_to_zero() {
        let dir = TempDir::new().unwrap();
        let users = store(&dir);
        assert_eq!(users.daily_goal("nobody").await.unwrap(), Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_set_goal_requires_profile() {
        let dir = TempDir::new().unwrap();
        let users = store(&dir);
        let err = users
            .set_daily_goal("nobody", Decimal::ONE)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_corrupt_user_store_is_a_storage_error() {
        let dir = TempDir::new().unwrap();
        let users = store(&dir);
        tokio::fs::write(dir.path().join("users.json"), "{ not json")
            .await
            .unwrap();
        let err = users.get("maria").await.unwrap_err();
        assert!(matches!(err, Error::Storage(_)));
    }
}
