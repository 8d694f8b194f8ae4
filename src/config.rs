//! Configuration file handling.
//!
//! The configuration file is stored at `$RENDA_HOME/config.json` and contains settings for the
//! application including backup rotation and the zero-amount entry policy.

use crate::home::Home;
use crate::utils;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_NAME: &str = "renda";
const CONFIG_VERSION: u8 = 1;
const BACKUP_COPIES: u32 = 5;

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$RENDA_HOME` and from there it loads `$RENDA_HOME/config.json`. It also carries
/// the `Home` directory layout so that everything path-related hangs off one object.
#[derive(Debug, Clone)]
pub struct Config {
    home: Home,
    config_file: ConfigFile,
}

impl Config {
    /// Creates the data directory, its subdirectories, and an initial `config.json` with default
    /// settings.
    ///
    /// # Arguments
    /// - `dir` - The directory that will be the root of the data directory, e.g. `$HOME/renda`
    ///
    /// # Errors
    /// - Returns an error if any file operations fail.
    pub async fn create(dir: impl Into<PathBuf>) -> Result<Self> {
        let home = Home::new(dir).await?;
        let config_file = ConfigFile::default();
        config_file.save(home.config_file()).await?;
        Ok(Self { home, config_file })
    }

    /// This will
    /// - validate that the home directory and the config file exist
    /// - load the config file
    /// - return the loaded configuration object
    pub async fn load(renda_home: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = renda_home.into();
        let root = utils::canonicalize(&maybe_relative).await.context(
            "Renda home is missing. Did you run 'renda init'?",
        )?;
        let config_path = root.join("config.json");
        if !config_path.is_file() {
            bail!(
                "The config file is missing '{}'. Did you run 'renda init'?",
                config_path.display()
            )
        }
        let config_file = ConfigFile::load(&config_path).await?;
        let home = Home::new(root).await?;
        Ok(Self { home, config_file })
    }

    pub fn home(&self) -> &Home {
        &self.home
    }

    pub fn root(&self) -> &Path {
        self.home.root()
    }

    pub fn backup_copies(&self) -> u32 {
        self.config_file.backup_copies
    }

    /// Whether `add` accepts records with a zero amount. Default is to reject them, matching the
    /// entry form's behavior of ignoring an untouched amount field.
    pub fn allow_zero_amounts(&self) -> bool {
        self.config_file.allow_zero_amounts
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "renda",
///   "config_version": 1,
///   "backup_copies": 5,
///   "allow_zero_amounts": false
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "renda"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// Number of backup copies to keep
    backup_copies: u32,

    /// Whether records with a zero amount may be added
    #[serde(default)]
    allow_zero_amounts: bool,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            backup_copies: BACKUP_COPIES,
            allow_zero_amounts: false,
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile asynchronously from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config: ConfigFile = utils::deserialize(path).await?;

        // Validate app_name
        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );

        Ok(config)
    }

    /// Saves the ConfigFile to the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be written
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let p = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(p, data).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_create_then_load() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("renda");
        let created = Config::create(&root).await.unwrap();
        assert_eq!(created.backup_copies(), BACKUP_COPIES);
        assert!(!created.allow_zero_amounts());

        let loaded = Config::load(&root).await.unwrap();
        assert_eq!(loaded.backup_copies(), created.backup_copies());
    }

    #[tokio::test]
    async fn test_load_without_init_fails() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("never-initialized");
        assert!(Config::load(&root).await.is_err());
    }

    #[tokio::test]
    async fn test_load_rejects_foreign_app_name() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("renda");
        Config::create(&root).await.unwrap();
        tokio::fs::write(
            root.join("config.json"),
            r#"{"app_name":"other","config_version":1,"backup_copies":5}"#,
        )
        .await
        .unwrap();
        assert!(Config::load(&root).await.is_err());
    }
}
