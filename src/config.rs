//! Configuration file handling for the account book.
//!
//! The configuration file is stored at `$ACCOUNTBOOK_HOME/config.json` and holds the backup and
//! display settings of the application.

use crate::backup::Backup;
use crate::db::Db;
use crate::{utils, Result};
use anyhow::{bail, ensure, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_NAME: &str = "accountbook";
const CONFIG_VERSION: u8 = 1;
const BACKUP_COPIES: u32 = 5;
const CURRENCY_UNIT: &str = "won";
const BACKUPS: &str = ".backups";
const CONFIG_JSON: &str = "config.json";
pub(crate) const ACCOUNTBOOK_SQLITE: &str = "accountbook.sqlite";

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$ACCOUNTBOOK_HOME` and from there it loads `$ACCOUNTBOOK_HOME/config.json` and
/// opens the records database. It provides paths to the other items that are expected in a
/// certain location within the home directory.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    backups: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
    db: Db,
    sqlite_path: PathBuf,
}

impl Config {
    /// Creates the data directory, its subdirectories, an initial `config.json` with default
    /// settings and an empty records database.
    ///
    /// # Arguments
    /// - `dir` - The directory that will be the root of data directory, e.g. `$HOME/accountbook`
    ///
    /// # Errors
    /// - Returns an error if the directory already holds a config file or a database, or if any
    ///   file operation fails.
    pub async fn create(dir: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the accountbook home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;

        let backups_dir = root.join(BACKUPS);
        utils::make_dir(&backups_dir).await?;

        let config_path = root.join(CONFIG_JSON);
        ensure!(
            !config_path.exists(),
            "The accountbook home is already initialized, found '{}'",
            config_path.display()
        );

        let db_path = root.join(ACCOUNTBOOK_SQLITE);
        let db = Db::init(&db_path)
            .await
            .context("Unable to create SQLite DB")?;

        // Written last so that a failed database init leaves the directory re-initializable
        let config_file = ConfigFile::default();
        config_file.save(&config_path).await?;

        Ok(Self {
            root,
            backups: backups_dir,
            config_path,
            config_file,
            db,
            sqlite_path: db_path,
        })
    }

    /// This will
    /// - validate that the `accountbook_home` exists and that the config file exists
    /// - load the config file
    /// - validate that the backups directory exists
    /// - open the records database, migrating it if needed
    pub async fn load(accountbook_home: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = accountbook_home.into();
        let root = utils::canonicalize(&maybe_relative)
            .await
            .context("The accountbook home is missing, run 'accountbook init' first")?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!("The config file is missing '{}'", config_path.display())
        }
        let config_file = ConfigFile::load(&config_path).await?;

        let backups = root.join(BACKUPS);
        if !backups.is_dir() {
            bail!("The backups directory is missing '{}'", backups.display())
        }

        let db_path = root.join(ACCOUNTBOOK_SQLITE);
        let db = Db::load(&db_path)
            .await
            .context("Unable to load SQLite DB")?;

        Ok(Self {
            root,
            backups,
            config_path,
            config_file,
            db,
            sqlite_path: db_path,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub(crate) fn db(&self) -> &Db {
        &self.db
    }

    pub fn backups(&self) -> &Path {
        &self.backups
    }

    pub fn sqlite_path(&self) -> &Path {
        &self.sqlite_path
    }

    pub fn backup_copies(&self) -> u32 {
        self.config_file.backup_copies
    }

    /// The word printed after amounts, e.g. `15,000 won`.
    pub fn currency_unit(&self) -> &str {
        &self.config_file.currency_unit
    }

    /// Creates a new `Backup` instance for managing backup files.
    pub fn backup(&self) -> Backup {
        Backup::new(self)
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "accountbook",
///   "config_version": 1,
///   "backup_copies": 5,
///   "currency_unit": "won"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "accountbook"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// Number of backup copies to keep
    #[serde(default = "default_backup_copies")]
    backup_copies: u32,

    #[serde(default = "default_currency_unit")]
    currency_unit: String,
}

fn default_backup_copies() -> u32 {
    BACKUP_COPIES
}

fn default_currency_unit() -> String {
    CURRENCY_UNIT.to_string()
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            backup_copies: BACKUP_COPIES,
            currency_unit: CURRENCY_UNIT.to_string(),
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile asynchronously from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or if it belongs to another app.
    async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = utils::read(path).await?;

        let config: ConfigFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file at {}", path.display()))?;

        ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );
        ensure!(
            config.backup_copies > 0,
            "backup_copies in config file must be at least 1"
        );

        Ok(config)
    }

    async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let p = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(p, data)
            .await
            .context("Unable to write config file")
    }
}
