//! Shared test utilities for creating test environments.
//!
//! This module is only compiled when running tests (`#[cfg(test)]`).

use crate::model::{Kind, NewRecord, Record};
use crate::store::Store;
use crate::Config;
use chrono::{NaiveDate, NaiveDateTime};
use tempfile::TempDir;

/// Test environment that sets up an accountbook home directory with Config and database.
/// Holds TempDir to keep the directory alive for the duration of the test.
pub struct TestEnv {
    _temp_dir: TempDir,
    config: Config,
}

impl TestEnv {
    /// Creates a test environment with Config and initialized database.
    pub async fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("accountbook");
        let config = Config::create(&root).await.unwrap();
        Self {
            _temp_dir: temp_dir,
            config,
        }
    }

    /// Returns a clone of the Config.
    pub fn config(&self) -> Config {
        self.config.clone()
    }

    /// Inserts one record directly through the store.
    pub async fn insert(
        &self,
        category: &str,
        amount: u64,
        kind: Kind,
        date: NaiveDateTime,
    ) -> Record {
        self.config
            .db()
            .insert(NewRecord::new(category, amount, kind, date))
            .await
            .unwrap()
    }

    /// Inserts the May 2024 sample month:
    /// - 2024-05-01: Food 10,000 and Food 5,000 (expense), Salary 3,000,000 (income)
    /// - 2024-05-03: Travel 20,000 (expense)
    /// - 2024-06-02: Food 7,000 (expense)
    pub async fn insert_sample_records(&self) -> Vec<Record> {
        let samples = [
            ("Food", 10_000, Kind::Expense, at(2024, 5, 1, 12)),
            ("Food", 5_000, Kind::Expense, at(2024, 5, 1, 19)),
            ("Salary", 3_000_000, Kind::Income, at(2024, 5, 1, 9)),
            ("Travel", 20_000, Kind::Expense, at(2024, 5, 3, 8)),
            ("Food", 7_000, Kind::Expense, at(2024, 6, 2, 13)),
        ];
        let mut records = Vec::new();
        for (category, amount, kind, date) in samples {
            records.push(self.insert(category, amount, kind, date).await);
        }
        records
    }
}

/// A date and hour, for building test records.
pub fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, 0, 0)
        .unwrap()
}
