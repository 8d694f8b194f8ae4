//! The `Home` object represents the file paths of the `$RENDA_HOME` directory and those paths
//! which are not configurable within `$RENDA_HOME` such as `$RENDA_HOME/config.json`.

use crate::utils;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// The single-user data file that predates multi-tenancy. It is read only by the legacy
/// migration path.
pub const LEGACY_LEDGER_FILE: &str = "rendimentos.csv";

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Home {
    root: PathBuf,
    ledgers: PathBuf,
    backups: PathBuf,
    users_file: PathBuf,
    config_file: PathBuf,
}

impl Home {
    /// This will create the `renda_home` directory, if it does not exist, and canonicalize itself.
    pub async fn new(renda_home: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = renda_home.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create renda home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;
        let home = Self {
            ledgers: root.join("ledgers"),
            backups: root.join(".backups"),
            users_file: root.join("users.json"),
            config_file: root.join("config.json"),
            root,
        };
        utils::make_dir(&home.ledgers).await?;
        utils::make_dir(&home.backups).await?;
        Ok(home)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding one CSV ledger file per user.
    pub fn ledgers(&self) -> &Path {
        &self.ledgers
    }

    pub fn backups(&self) -> &Path {
        &self.backups
    }

    /// The user-profile document, keyed by username.
    pub fn users_file(&self) -> &Path {
        &self.users_file
    }

    pub fn config_file(&self) -> &Path {
        &self.config_file
    }

    /// Where the pre-multi-tenant ledger file sits, if the installation has one.
    pub fn legacy_ledger(&self) -> PathBuf {
        self.root.join(LEGACY_LEDGER_FILE)
    }
}

#[tokio::test]
async fn test_home() {
    use tempfile::TempDir;
    let dir = TempDir::new().unwrap();
    let home_dir = dir.path().to_owned();
    let home = Home::new(home_dir).await.unwrap();
    assert!(tokio::fs::read_dir(home.ledgers()).await.is_ok());
    assert!(tokio::fs::read_dir(home.backups()).await.is_ok());
    assert_eq!(
        home.legacy_ledger().file_name().unwrap(),
        LEGACY_LEDGER_FILE
    );
}
