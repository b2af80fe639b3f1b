//! This module is responsible for reading, writing and managing the SQLite database of records.

pub(crate) mod migrations;

use crate::model::{format_for_storage, parse_date_time, Amount, Kind, NewRecord, Record};
use crate::store::{Fetched, Store};
use crate::{utils, Result};
use anyhow::{bail, Context};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{FromRow, SqlitePool};
use std::collections::HashSet;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, trace, warn};

/// The SQLite implementation of `Store`. Cloning shares the same connection pool.
#[derive(Debug, Clone)]
pub(crate) struct Db {
    pool: SqlitePool,
}

impl Db {
    /// - Validates that no file currently exists at `path`
    /// - Creates a new SQLite file at `path`
    /// - Initializes the schema to the current version
    pub(crate) async fn init(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            bail!("A database already exists at {}", path.display());
        }
        let pool = connect(path, true).await?;
        bootstrap_schema_version(&pool).await?;
        migrations::run(&pool, 0, migrations::CURRENT_VERSION).await?;
        debug!("Created records database at {}", path.display());
        Ok(Self { pool })
    }

    /// - Validates that there is a SQLite file at `path`
    /// - Opens it
    /// - Updates the schema with migrations if it is out-of-date
    pub(crate) async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            bail!(
                "The database is missing '{}', run 'accountbook init' first",
                path.display()
            );
        }
        let pool = connect(path, false).await?;
        let db = Self { pool };
        let version = db.schema_version().await?;
        if version > migrations::CURRENT_VERSION {
            bail!(
                "The database schema version {version} is newer than this program supports ({}). \
                Is a newer version of accountbook available?",
                migrations::CURRENT_VERSION
            );
        }
        migrations::run(&db.pool, version, migrations::CURRENT_VERSION).await?;
        Ok(db)
    }

    pub(crate) async fn schema_version(&self) -> Result<i32> {
        let row: (i32,) = sqlx::query_as("SELECT MAX(version) FROM schema_version")
            .fetch_one(&self.pool)
            .await
            .context("Failed to query schema version")?;
        Ok(row.0)
    }

    /// Returns the number of rows in the records table, including rows that fail validation.
    #[cfg(test)]
    pub(crate) async fn _count_records(&self) -> Result<u64> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM records")
            .fetch_one(&self.pool)
            .await
            .context("Failed to count records")?;
        Ok(row.0 as u64)
    }

    #[cfg(test)]
    pub(crate) async fn _close(&self) {
        self.pool.close().await;
    }

    #[cfg(test)]
    pub(crate) async fn _execute_raw(&self, sql: &str) -> Result<()> {
        sqlx::query(sql)
            .execute(&self.pool)
            .await
            .context("Failed to execute raw SQL")?;
        Ok(())
    }
}

/// Opens a single-connection pool on the SQLite file at `path`.
pub(crate) async fn connect(path: &Path, create: bool) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(create)
        // Backups copy the database file alone, so nothing may be left in a WAL file
        .journal_mode(SqliteJournalMode::Delete);
    SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .with_context(|| format!("Unable to open SQLite database {}", path.display()))
}

/// Creates the `schema_version` table at version 0, the state the first migration starts from.
pub(crate) async fn bootstrap_schema_version(pool: &SqlitePool) -> Result<()> {
    sqlx::query("CREATE TABLE schema_version (version INTEGER NOT NULL)")
        .execute(pool)
        .await
        .context("Failed to create schema_version table")?;
    sqlx::query("INSERT INTO schema_version (version) VALUES (0)")
        .execute(pool)
        .await
        .context("Failed to insert initial schema version")?;
    Ok(())
}

/// A row of the records table exactly as stored, before validation.
#[derive(Debug, Clone, FromRow)]
struct RecordRow {
    id: String,
    category: Option<String>,
    amount: String,
    is_income: bool,
    date: String,
}

impl TryFrom<RecordRow> for Record {
    type Error = crate::Error;

    fn try_from(row: RecordRow) -> Result<Self> {
        let date = parse_date_time(&row.date)
            .with_context(|| format!("Record '{}' has an invalid date '{}'", row.id, row.date))?;
        let amount = Amount::from_str(&row.amount).map_err(|e| {
            anyhow::anyhow!(
                "Record '{}' has an invalid amount '{}': {e}",
                row.id,
                row.amount
            )
        })?;
        Ok(Record::new(
            row.id,
            NewRecord {
                category: row.category,
                amount,
                kind: Kind::from_is_income(row.is_income),
                date,
            },
        ))
    }
}

const SELECT_RECORDS: &str = "SELECT id, category, amount, is_income, date FROM records";

#[async_trait::async_trait]
impl Store for Db {
    async fn fetch_all(&self) -> Result<Fetched> {
        let rows: Vec<RecordRow> = sqlx::query_as(&format!("{SELECT_RECORDS} ORDER BY date, id"))
            .fetch_all(&self.pool)
            .await
            .context("Failed to fetch records")?;

        let mut fetched = Fetched::default();
        for row in rows {
            match Record::try_from(row) {
                Ok(record) => fetched.records.push(record),
                Err(e) => {
                    warn!("Skipping record: {e:#}");
                    fetched.quarantined += 1;
                }
            }
        }
        trace!(
            "Fetched {} records, {} quarantined",
            fetched.records.len(),
            fetched.quarantined
        );
        Ok(fetched)
    }

    async fn get(&self, id: &str) -> Result<Option<Record>> {
        let row: Option<RecordRow> = sqlx::query_as(&format!("{SELECT_RECORDS} WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("Failed to fetch record '{id}'"))?;
        row.map(Record::try_from).transpose()
    }

    async fn insert(&self, record: NewRecord) -> Result<Record> {
        let record = Record::new(utils::generate_record_id(), record);
        sqlx::query(
            "INSERT INTO records (id, category, amount, is_income, date) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(record.id())
        .bind(record.category())
        .bind(record.amount().value().to_string())
        .bind(record.is_income())
        .bind(format_for_storage(&record.date()))
        .execute(&self.pool)
        .await
        .context("Failed to save record")?;
        debug!("Inserted record {}", record.id());
        Ok(record)
    }

    async fn update(&self, record: &Record) -> Result<Record> {
        let result = sqlx::query(
            "UPDATE records SET category = ?, amount = ?, is_income = ?, date = ? WHERE id = ?",
        )
        .bind(record.category())
        .bind(record.amount().value().to_string())
        .bind(record.is_income())
        .bind(format_for_storage(&record.date()))
        .bind(record.id())
        .execute(&self.pool)
        .await
        .with_context(|| format!("Failed to save record '{}'", record.id()))?;
        if result.rows_affected() == 0 {
            bail!("Record not found: {}", record.id());
        }
        debug!("Updated record {}", record.id());
        Ok(record.clone())
    }

    async fn delete(&self, ids: &[String]) -> Result<Vec<String>> {
        let mut seen = HashSet::new();
        let ids: Vec<String> = ids
            .iter()
            .filter(|id| seen.insert(id.as_str()))
            .cloned()
            .collect();

        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin delete transaction")?;
        for id in &ids {
            let result = sqlx::query("DELETE FROM records WHERE id = ?")
                .bind(id)
                .execute(&mut *tx)
                .await
                .with_context(|| format!("Failed to delete record '{id}'"))?;
            if result.rows_affected() == 0 {
                // Dropping `tx` rolls back the deletes that did succeed
                bail!("Record not found: {id}");
            }
        }
        tx.commit()
            .await
            .context("Failed to commit delete transaction")?;
        debug!("Deleted {} records", ids.len());
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::at;
    use tempfile::TempDir;

    async fn new_db() -> (TempDir, Db) {
        let dir = TempDir::new().unwrap();
        let db = Db::init(dir.path().join("accountbook.sqlite")).await.unwrap();
        (dir, db)
    }

    #[tokio::test]
    async fn test_init_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("accountbook.sqlite");
        let db = Db::init(&path).await.unwrap();
        assert_eq!(db.schema_version().await.unwrap(), migrations::CURRENT_VERSION);
        db._close().await;

        let db = Db::load(&path).await.unwrap();
        assert_eq!(db._count_records().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_init_refuses_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("accountbook.sqlite");
        utils::write(&path, "").await.unwrap();
        assert!(Db::init(&path).await.is_err());
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = Db::load(dir.path().join("nope.sqlite")).await.unwrap_err();
        assert!(err.to_string().contains("accountbook init"));
    }

    #[tokio::test]
    async fn test_insert_get_update() {
        let (_dir, db) = new_db().await;
        let new = NewRecord::new("Food", 10000u64, Kind::Expense, at(2024, 5, 1, 9));
        let inserted = db.insert(new).await.unwrap();
        assert!(inserted.id().starts_with("rec-"));

        let fetched = db.get(inserted.id()).await.unwrap().unwrap();
        assert_eq!(fetched, inserted);

        let mut edited = fetched.clone();
        edited.amount = Amount::from(12000);
        edited.kind = Kind::Income;
        edited.category = Some("Salary".to_string());
        db.update(&edited).await.unwrap();
        assert_eq!(db.get(inserted.id()).await.unwrap().unwrap(), edited);
    }

    #[tokio::test]
    async fn test_fractional_amount_survives_storage() {
        let (_dir, db) = new_db().await;
        let amount = Amount::from_str("1234.56").unwrap();
        let new = NewRecord::new("Food", amount, Kind::Expense, at(2024, 5, 1, 9));
        let inserted = db.insert(new).await.unwrap();
        let fetched = db.get(inserted.id()).await.unwrap().unwrap();
        assert_eq!(fetched.amount(), amount);
    }

    #[tokio::test]
    async fn test_update_missing_record() {
        let (_dir, db) = new_db().await;
        let ghost = Record::new(
            "rec-ghost",
            NewRecord::new("Food", 1u64, Kind::Expense, at(2024, 5, 1, 0)),
        );
        let err = db.update(&ghost).await.unwrap_err();
        assert!(err.to_string().contains("Record not found"));
    }

    #[tokio::test]
    async fn test_delete_is_all_or_nothing() {
        let (_dir, db) = new_db().await;
        let a = db
            .insert(NewRecord::new("Food", 1u64, Kind::Expense, at(2024, 5, 1, 0)))
            .await
            .unwrap();
        let b = db
            .insert(NewRecord::new("Travel", 2u64, Kind::Expense, at(2024, 5, 2, 0)))
            .await
            .unwrap();

        let ids = vec![a.id().to_string(), "rec-missing".to_string()];
        assert!(db.delete(&ids).await.is_err());
        assert_eq!(db._count_records().await.unwrap(), 2);

        let ids = vec![a.id().to_string(), b.id().to_string()];
        assert_eq!(db.delete(&ids).await.unwrap(), ids);
        assert_eq!(db._count_records().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delete_repeated_id_once() {
        let (_dir, db) = new_db().await;
        let a = db
            .insert(NewRecord::new("Food", 1u64, Kind::Expense, at(2024, 5, 1, 0)))
            .await
            .unwrap();
        let b = db
            .insert(NewRecord::new("Travel", 2u64, Kind::Expense, at(2024, 5, 2, 0)))
            .await
            .unwrap();

        let ids = vec![a.id().to_string(), b.id().to_string(), a.id().to_string()];
        let deleted = db.delete(&ids).await.unwrap();
        assert_eq!(deleted, vec![a.id().to_string(), b.id().to_string()]);
        assert_eq!(db._count_records().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_fetch_all_ordered_by_date() {
        let (_dir, db) = new_db().await;
        for (category, day) in [("Food", 3), ("Travel", 1), ("Phone", 2)] {
            db.insert(NewRecord::new(category, 1u64, Kind::Expense, at(2024, 5, day, 0)))
                .await
                .unwrap();
        }
        let fetched = db.fetch_all().await.unwrap();
        let categories: Vec<&str> = fetched
            .records
            .iter()
            .filter_map(|r| r.category())
            .collect();
        assert_eq!(categories, vec!["Travel", "Phone", "Food"]);
        assert_eq!(fetched.quarantined, 0);
    }

    #[tokio::test]
    async fn test_fetch_all_quarantines_bad_rows() {
        let (_dir, db) = new_db().await;
        db.insert(NewRecord::new("Food", 10000u64, Kind::Expense, at(2024, 5, 1, 0)))
            .await
            .unwrap();
        db._execute_raw(
            "INSERT INTO records (id, category, amount, is_income, date) VALUES \
             ('bad-date', 'Food', '500', 0, ''), \
             ('worse-date', 'Food', '500', 0, '31/05/2024'), \
             ('bad-amount', 'Food', '-500', 0, '2024-05-02 00:00:00')",
        )
        .await
        .unwrap();

        let fetched = db.fetch_all().await.unwrap();
        assert_eq!(fetched.records.len(), 1);
        assert_eq!(fetched.quarantined, 3);
        assert_eq!(db._count_records().await.unwrap(), 4);
        assert!(db.get("bad-date").await.is_err());
    }

    #[tokio::test]
    async fn test_missing_category_round_trips_as_none() {
        let (_dir, db) = new_db().await;
        db._execute_raw(
            "INSERT INTO records (id, category, amount, is_income, date) VALUES \
             ('no-cat', NULL, '700', 1, '2024-05-02 10:00:00')",
        )
        .await
        .unwrap();
        let record = db.get("no-cat").await.unwrap().unwrap();
        assert_eq!(record.category(), None);
        assert!(record.is_income());
    }
}
