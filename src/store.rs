//! The per-user durable ledger store.
//!
//! Each user owns exactly one CSV file under `$RENDA_HOME/ledgers/`, named after the username.
//! The username character policy (see `users::validate_username`) is what makes the mapping
//! deterministic and collision-free, and it is re-checked here so that no caller can reach
//! another user's file through a crafted name.
//!
//! Saves are atomic: content is written to a temporary sibling and renamed over the target, so a
//! concurrent `load` sees either the old file or the new one, never a torn write.

use crate::backup::Backup;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::model::{Ledger, RawRecord, LEDGER_HEADER};
use crate::users::validate_username;
use crate::validate::{validate, Validated};
use crate::utils;
use anyhow::{anyhow, Context};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct LedgerStore {
    ledgers_dir: PathBuf,
    backup: Backup,
}

impl LedgerStore {
    pub fn new(config: &Config) -> Self {
        Self {
            ledgers_dir: config.home().ledgers().to_path_buf(),
            backup: Backup::new(config.home().backups(), config.backup_copies()),
        }
    }

    /// The storage location owned by `user`. Deterministic; distinct users map to distinct files.
    pub fn ledger_path(&self, user: &str) -> PathBuf {
        self.ledgers_dir.join(format!("{user}.csv"))
    }

    /// Reads `user`'s durable ledger.
    ///
    /// A missing file means the user has no records yet and yields an empty ledger, not an
    /// error. Any other read failure is a storage error. Raw rows are routed through the
    /// validator; the number of dropped rows is reported on the returned `Validated` and is
    /// never fatal.
    pub async fn load(&self, user: &str) -> Result<Validated> {
        validate_username(user)?;
        let path = self.ledger_path(user);
        let text = match tokio::fs::read_to_string(&path).await {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No ledger file for '{user}' yet, starting empty");
                return Ok(Validated::default());
            }
            Err(e) => {
                return Err(Error::Storage(
                    anyhow!(e).context(format!("Unable to read ledger at {}", path.display())),
                ))
            }
        };

        let (rows, unreadable) = read_rows(&text)?;
        let mut validated = validate(rows);
        validated.dropped += unreadable;
        if validated.dropped > 0 {
            warn!(
                "Dropped {} invalid row(s) while loading the ledger for '{user}'",
                validated.dropped
            );
        }
        Ok(validated)
    }

    /// Writes `user`'s ledger, replacing the previous file atomically.
    ///
    /// The rows are re-validated on the way out; no invalid row ever reaches durable state. If
    /// validation strips every row from a non-empty ledger, or the ledger was empty to begin
    /// with, the save is aborted with `EmptyLedger` and the prior file is left untouched. An
    /// intentional "delete everything" goes through [`LedgerStore::clear`] instead, which is the
    /// explicit representation of an empty ledger.
    pub async fn save(&self, user: &str, ledger: &Ledger) -> Result<()> {
        validate_username(user)?;
        let validated = validate(ledger.iter().map(|r| r.to_raw()));
        if validated.dropped > 0 {
            warn!(
                "Dropped {} invalid row(s) while saving the ledger for '{user}'",
                validated.dropped
            );
        }
        if validated.ledger.is_empty() {
            return Err(Error::EmptyLedger);
        }
        let text = write_rows(validated.ledger.iter().map(|r| r.to_raw()))?;
        utils::write_atomic(self.ledger_path(user), text).await?;
        Ok(())
    }

    /// Explicitly clears `user`'s ledger, leaving a valid header-only file behind.
    pub async fn clear(&self, user: &str) -> Result<()> {
        validate_username(user)?;
        let text = write_rows(std::iter::empty())?;
        utils::write_atomic(self.ledger_path(user), text).await?;
        Ok(())
    }

    /// Produces a timestamped, independent copy of `user`'s ledger file under the backups
    /// directory. Returns `None` when the user has no ledger file yet. Callers treat failures
    /// as non-fatal; a snapshot never blocks a save or load.
    pub async fn snapshot(&self, user: &str) -> Result<Option<PathBuf>> {
        validate_username(user)?;
        let path = self.ledger_path(user);
        if !path.is_file() {
            return Ok(None);
        }
        let backup_path = self.backup.snapshot(user, &path).await?;
        Ok(Some(backup_path))
    }

    /// One-shot import of a pre-multi-tenancy ledger file into `user`'s ledger.
    ///
    /// This is the only operation that may move records across ownership boundaries. The source
    /// rows are validated, appended to whatever `user` already has, and saved; the source file
    /// is then renamed with a `.migrated` suffix so the import cannot silently run twice.
    /// Returns the number of records imported.
    pub async fn migrate_legacy(&self, source: &Path, user: &str) -> Result<usize> {
        validate_username(user)?;
        let text = utils::read(source).await?;
        let (rows, unreadable) = read_rows(&text)?;
        let had_rows = !rows.is_empty() || unreadable > 0;
        let validated = validate(rows);
        if validated.dropped + unreadable > 0 {
            warn!(
                "Dropped {} invalid legacy row(s) from {}",
                validated.dropped + unreadable,
                source.display()
            );
        }
        if validated.ledger.is_empty() {
            if had_rows {
                // Corrupt source. Do not mark it migrated; leave everything for inspection.
                return Err(Error::EmptyLedger);
            }
            return Ok(0);
        }

        let mut ledger = self.load(user).await?.ledger;
        let imported = validated.ledger.len();
        for record in validated.ledger {
            ledger.push(record);
        }
        self.save(user, &ledger).await?;

        let mut migrated_name = source.as_os_str().to_os_string();
        migrated_name.push(".migrated");
        utils::rename(source, PathBuf::from(migrated_name)).await?;

        Ok(imported)
    }
}

/// Parses ledger CSV text into raw rows. Rows the CSV layer itself cannot decode (for example a
/// file whose header lacks the required columns) are counted, not fatal: the caller folds the
/// count into the validator's dropped total.
fn read_rows(text: &str) -> Result<(Vec<RawRecord>, usize)> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());
    let mut rows = Vec::new();
    let mut unreadable = 0;
    for result in rdr.deserialize() {
        match result {
            Ok(row) => rows.push(row),
            Err(e) => {
                warn!("Unreadable ledger row: {e}");
                unreadable += 1;
            }
        }
    }
    Ok((rows, unreadable))
}

/// Serializes raw rows to ledger CSV text. The full header is always written, which is how
/// legacy two-column files pick up the optional columns on their first save. Exports use the
/// same writer, so a downloaded view is indistinguishable from a ledger file.
pub(crate) fn write_rows(rows: impl Iterator<Item = RawRecord>) -> Result<String> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    wtr.write_record(LEDGER_HEADER)
        .context("Unable to write ledger header")
        .map_err(Error::Storage)?;
    for row in rows {
        wtr.serialize(row)
            .context("Unable to serialize ledger row")
            .map_err(Error::Storage)?;
    }
    let bytes = wtr
        .into_inner()
        .context("Unable to flush ledger contents")
        .map_err(Error::Storage)?;
    String::from_utf8(bytes)
        .context("Ledger contents were not valid UTF-8")
        .map_err(Error::Storage)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{parse_date, Amount, IncomeRecord, DEFAULT_CATEGORY};
    use crate::test::TestEnv;
    use std::str::FromStr;

    fn record(date: &str, amount: &str) -> IncomeRecord {
        IncomeRecord::new(
            parse_date(date).unwrap(),
            Amount::from_str(amount).unwrap(),
            None,
            None,
        )
    }

    #[tokio::test]
    async fn test_load_missing_file_is_empty() {
        let env = TestEnv::new().await;
        let store = env.store();
        let loaded = store.load("maria").await.unwrap();
        assert!(loaded.ledger.is_empty());
        assert_eq!(loaded.dropped, 0);
    }

    #[tokio::test]
    async fn test_save_load_round_trip() {
        let env = TestEnv::new().await;
        let store = env.store();
        let ledger = Ledger::new(vec![
            record("2024-01-05", "100.00"),
            record("2024-01-06", "50.50"),
        ]);
        store.save("maria", &ledger).await.unwrap();

        let loaded = store.load("maria").await.unwrap();
        assert_eq!(loaded.dropped, 0);
        assert_eq!(loaded.ledger, ledger);

        // load is stable: a second read observes the same thing
        let again = store.load("maria").await.unwrap();
        assert_eq!(again.ledger, loaded.ledger);
    }

    #[tokio::test]
    async fn test_save_rejects_fully_stripped_ledger() {
        let env = TestEnv::new().await;
        let store = env.store();
        store
            .save("maria", &Ledger::new(vec![record("2024-01-05", "100.00")]))
            .await
            .unwrap();
        let before = tokio::fs::read_to_string(store.ledger_path("maria"))
            .await
            .unwrap();

        // The only row is invalid (negative), so validation strips everything.
        let bad = Ledger::new(vec![record("2024-01-05", "-5.00")]);
        let err = store.save("maria", &bad).await.unwrap_err();
        assert!(matches!(err, Error::EmptyLedger));

        // Prior durable state is unchanged.
        let after = tokio::fs::read_to_string(store.ledger_path("maria"))
            .await
            .unwrap();
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn test_save_rejects_empty_ledger() {
        let env = TestEnv::new().await;
        let store = env.store();
        let err = store.save("maria", &Ledger::default()).await.unwrap_err();
        assert!(matches!(err, Error::EmptyLedger));
    }

    #[tokio::test]
    async fn test_clear_writes_header_only_file() {
        let env = TestEnv::new().await;
        let store = env.store();
        store
            .save("maria", &Ledger::new(vec![record("2024-01-05", "100.00")]))
            .await
            .unwrap();
        store.clear("maria").await.unwrap();

        let text = tokio::fs::read_to_string(store.ledger_path("maria"))
            .await
            .unwrap();
        assert_eq!(text, "Data,Valor,Categoria,Descrição\n");
        let loaded = store.load("maria").await.unwrap();
        assert!(loaded.ledger.is_empty());
        assert_eq!(loaded.dropped, 0);
    }

    #[tokio::test]
    async fn test_legacy_two_column_file_readable() {
        let env = TestEnv::new().await;
        let store = env.store();
        env.write_ledger_file("maria", "Data,Valor\n2024-01-05,100.0\n2024-01-06,7.5\n")
            .await;

        let loaded = store.load("maria").await.unwrap();
        assert_eq!(loaded.dropped, 0);
        assert_eq!(loaded.ledger.len(), 2);
        let first = &loaded.ledger.records()[0];
        assert_eq!(first.category, DEFAULT_CATEGORY);
        assert_eq!(first.description, "");

        // Saving upgrades the file to the full header.
        store.save("maria", &loaded.ledger).await.unwrap();
        let text = tokio::fs::read_to_string(store.ledger_path("maria"))
            .await
            .unwrap();
        assert!(text.starts_with("Data,Valor,Categoria,Descrição\n"));
    }

    #[tokio::test]
    async fn test_corrupt_rows_dropped_on_load() {
        let env = TestEnv::new().await;
        let store = env.store();
        env.write_ledger_file(
            "maria",
            "Data,Valor,Categoria,Descrição\n2024-01-05,100.00,,\nnot-a-date,50.00,,\n2024-01-06,abc,,\n",
        )
        .await;

        let loaded = store.load("maria").await.unwrap();
        assert_eq!(loaded.ledger.len(), 1);
        assert_eq!(loaded.dropped, 2);
    }

    #[tokio::test]
    async fn test_users_are_isolated() {
        let env = TestEnv::new().await;
        let store = env.store();
        store
            .save("maria", &Ledger::new(vec![record("2024-01-05", "100.00")]))
            .await
            .unwrap();
        store
            .save("joao", &Ledger::new(vec![record("2024-01-05", "1.00")]))
            .await
            .unwrap();

        assert_ne!(store.ledger_path("maria"), store.ledger_path("joao"));
        assert_eq!(store.load("maria").await.unwrap().ledger.len(), 1);
        assert_eq!(
            store.load("joao").await.unwrap().ledger.records()[0]
                .amount
                .to_string(),
            "1.00"
        );
    }

    #[tokio::test]
    async fn test_path_traversal_rejected() {
        let env = TestEnv::new().await;
        let store = env.store();
        let err = store.load("../maria").await.unwrap_err();
        assert!(matches!(err, Error::InvalidUsername { .. }));
    }

    #[tokio::test]
    async fn test_snapshot_missing_ledger_is_none() {
        let env = TestEnv::new().await;
        let store = env.store();
        assert!(store.snapshot("maria").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_snapshot_copies_current_file() {
        let env = TestEnv::new().await;
        let store = env.store();
        store
            .save("maria", &Ledger::new(vec![record("2024-01-05", "100.00")]))
            .await
            .unwrap();
        let path = store.snapshot("maria").await.unwrap().unwrap();
        let original = tokio::fs::read_to_string(store.ledger_path("maria"))
            .await
            .unwrap();
        let copy = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(original, copy);
    }

    #[tokio::test]
    async fn test_migrate_legacy() {
        let env = TestEnv::new().await;
        let store = env.store();
        store
            .save("maria", &Ledger::new(vec![record("2024-01-05", "100.00")]))
            .await
            .unwrap();

        let legacy = env.config().home().legacy_ledger();
        tokio::fs::write(&legacy, "Data,Valor\n2023-12-01,10.0\n2023-12-02,20.0\n")
            .await
            .unwrap();

        let imported = store.migrate_legacy(&legacy, "maria").await.unwrap();
        assert_eq!(imported, 2);
        assert_eq!(store.load("maria").await.unwrap().ledger.len(), 3);

        // The source is renamed so the import cannot run twice.
        assert!(!legacy.exists());
        let mut renamed = legacy.as_os_str().to_os_string();
        renamed.push(".migrated");
        assert!(std::path::PathBuf::from(renamed).exists());
    }

    #[tokio::test]
    async fn test_migrate_corrupt_source_refused() {
        let env = TestEnv::new().await;
        let store = env.store();
        let legacy = env.config().home().legacy_ledger();
        tokio::fs::write(&legacy, "Data,Valor\nbroken,broken\n")
            .await
            .unwrap();

        let err = store.migrate_legacy(&legacy, "maria").await.unwrap_err();
        assert!(matches!(err, Error::EmptyLedger));
        // Source stays put for inspection.
        assert!(legacy.exists());
    }
}
