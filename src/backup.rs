//! Backup management for per-user ledger snapshots.

use crate::utils;
use anyhow::{Context, Result};
use chrono::Local;
use std::path::{Path, PathBuf};

/// Manages snapshot creation and rotation.
///
/// The `Backup` struct is immutable and owns copies of the paths and settings it needs.
#[derive(Debug, Clone)]
pub struct Backup {
    backups_dir: PathBuf,
    backup_copies: u32,
}

impl Backup {
    pub fn new(backups_dir: impl Into<PathBuf>, backup_copies: u32) -> Self {
        Self {
            backups_dir: backups_dir.into(),
            backup_copies,
        }
    }

    /// Copies `source` into the backups directory as an independent snapshot of `user`'s ledger.
    ///
    /// The filename format is `{user}.YYYY-MM-DD-NNN.csv` where NNN is a sequence number.
    /// Automatically rotates old snapshots, keeping only `backup_copies` files per user.
    ///
    /// Returns the path to the created snapshot.
    pub async fn snapshot(&self, user: &str, source: &Path) -> Result<PathBuf> {
        let date = today();
        let seq = self.next_sequence_number(user, &date).await?;
        let filename = format!("{user}.{date}-{seq:03}.csv");
        let path = self.backups_dir.join(&filename);

        utils::copy(source, &path).await?;

        self.rotate(user).await?;

        Ok(path)
    }

    /// Scans the backups directory for existing snapshots with the given user and date,
    /// and returns the next sequence number.
    async fn next_sequence_number(&self, user: &str, date: &str) -> Result<u32> {
        let mut max_seq: u32 = 0;

        let mut dir = utils::read_dir(&self.backups_dir).await?;
        while let Some(entry) = dir
            .next_entry()
            .await
            .context("Failed to read directory entry")?
        {
            let file_name = entry.file_name();
            let name = file_name.to_string_lossy();
            if let Some(seq) = parse_sequence_number(&name, user, date) {
                max_seq = max_seq.max(seq);
            }
        }

        Ok(max_seq + 1)
    }

    /// Rotates old snapshots, keeping only `backup_copies` files for the given user.
    async fn rotate(&self, user: &str) -> Result<()> {
        // Collect all matching snapshot files
        let mut files: Vec<(PathBuf, String)> = Vec::new();

        let mut dir = utils::read_dir(&self.backups_dir).await?;
        while let Some(entry) = dir
            .next_entry()
            .await
            .context("Failed to read directory entry")?
        {
            let file_name = entry.file_name();
            let name = file_name.to_string_lossy().to_string();

            if is_snapshot_file(&name, user) {
                files.push((entry.path(), name));
            }
        }

        // Sort by filename (which sorts by date and sequence number due to format)
        files.sort_by(|a, b| a.1.cmp(&b.1));

        // Delete oldest files if we have more than backup_copies
        let to_delete = files.len().saturating_sub(self.backup_copies as usize);
        for (path, _) in files.into_iter().take(to_delete) {
            utils::remove(&path).await?;
        }

        Ok(())
    }
}

/// Returns today's date in YYYY-MM-DD format.
fn today() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}

/// Parses the sequence number from a snapshot filename.
/// Returns None if the filename doesn't match the expected pattern.
fn parse_sequence_number(filename: &str, user: &str, date: &str) -> Option<u32> {
    // Pattern: {user}.{date}-{NNN}.csv
    let expected_start = format!("{user}.{date}-");
    let remainder = filename.strip_prefix(&expected_start)?;
    let seq_str = remainder.strip_suffix(".csv")?;
    seq_str.parse().ok()
}

/// Checks if a filename is a snapshot belonging to the given user.
///
/// Usernames cannot contain `.`-free ambiguity tricks here: the date segment that follows the
/// username starts with a digit and usernames that end in a dot are rejected at registration.
fn is_snapshot_file(filename: &str, user: &str) -> bool {
    filename.starts_with(&format!("{user}.")) && filename.ends_with(".csv")
}
