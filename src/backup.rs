//! Rotating copies of the records database, taken before destructive operations.

use crate::config::ACCOUNTBOOK_SQLITE;
use crate::{utils, Config, Result};
use anyhow::Context;
use chrono::{Local, NaiveDate};
use std::path::PathBuf;
use tracing::debug;

/// Manages backup file creation and rotation.
///
/// The `Backup` struct is immutable and owns copies of the paths and settings it needs.
/// Create a new instance via `Config::backup()` or `Backup::new()`.
#[derive(Debug, Clone)]
pub struct Backup {
    backups_dir: PathBuf,
    backup_copies: u32,
    sqlite_path: PathBuf,
}

impl Backup {
    pub fn new(config: &Config) -> Self {
        Self {
            backups_dir: config.backups().to_path_buf(),
            backup_copies: config.backup_copies(),
            sqlite_path: config.sqlite_path().to_path_buf(),
        }
    }

    /// Copies the SQLite database file to the backups directory.
    ///
    /// The filename format is `accountbook.sqlite.YYYY-MM-DD-NNN`. Old backups are rotated so
    /// that only `backup_copies` files remain.
    ///
    /// Returns the path to the created backup file.
    pub async fn copy_sqlite(&self) -> Result<PathBuf> {
        let date = today();
        let seq = self.next_sequence_number(&date).await?;
        let path = self
            .backups_dir
            .join(format!("{ACCOUNTBOOK_SQLITE}.{date}-{seq:03}"));

        utils::copy(&self.sqlite_path, &path).await?;
        debug!("Backed up the database to {}", path.display());

        self.rotate().await?;
        Ok(path)
    }

    /// Names of the backup files currently in the backups directory, oldest first.
    async fn list(&self) -> Result<Vec<(PathBuf, String)>> {
        let mut files = Vec::new();
        let mut dir = utils::read_dir(&self.backups_dir).await?;
        while let Some(entry) = dir
            .next_entry()
            .await
            .context("Failed to read directory entry")?
        {
            let name = entry.file_name().to_string_lossy().to_string();
            if is_backup_file(&name) {
                files.push((entry.path(), name));
            }
        }
        // The name format makes lexical order chronological
        files.sort_by(|a, b| a.1.cmp(&b.1));
        Ok(files)
    }

    async fn next_sequence_number(&self, date: &str) -> Result<u32> {
        let max_seq = self
            .list()
            .await?
            .iter()
            .filter_map(|(_, name)| parse_sequence_number(name, date))
            .max()
            .unwrap_or(0);
        Ok(max_seq + 1)
    }

    async fn rotate(&self) -> Result<()> {
        let files = self.list().await?;
        let to_delete = files.len().saturating_sub(self.backup_copies as usize);
        for (path, _) in files.into_iter().take(to_delete) {
            debug!("Removing old backup {}", path.display());
            utils::remove(&path).await?;
        }
        Ok(())
    }
}

/// Returns today's date in YYYY-MM-DD format.
fn today() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}

/// Parses `NNN` out of `accountbook.sqlite.{date}-NNN`.
fn parse_sequence_number(filename: &str, date: &str) -> Option<u32> {
    let expected_start = format!("{ACCOUNTBOOK_SQLITE}.{date}-");
    filename.strip_prefix(&expected_start)?.parse().ok()
}

/// True only for `accountbook.sqlite.YYYY-MM-DD-NNN` with a real date and three digits.
fn is_backup_file(filename: &str) -> bool {
    let Some(rest) = filename.strip_prefix(&format!("{ACCOUNTBOOK_SQLITE}.")) else {
        return false;
    };
    let Some((date, seq)) = rest.rsplit_once('-') else {
        return false;
    };
    seq.len() == 3
        && seq.bytes().all(|b| b.is_ascii_digit())
        && date.len() == "YYYY-MM-DD".len()
        && NaiveDate::parse_from_str(date, "%Y-%m-%d").is_ok()
}
