//! Schema migrations of the records database.
//!
//! Each version has a pair of SQL files in this directory: `migration_NN_up.sql` takes the schema
//! from `NN-1` to `NN` and `migration_NN_down.sql` takes it back.

use anyhow::{bail, Context};
use sqlx::{Executor, SqlitePool};
use tracing::debug;

use crate::Result;

/// The schema version this build of the program reads and writes.
pub(crate) const CURRENT_VERSION: i32 = 1;

struct Migration {
    /// The version reached by running `up_sql`.
    version: i32,
    up_sql: &'static str,
    down_sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    up_sql: include_str!("migration_01_up.sql"),
    down_sql: include_str!("migration_01_down.sql"),
}];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Up,
    Down,
}

/// Runs migrations to bring the records database from `current_ver` to `target_ver`, up or
/// down, one version per transaction. Every migration needed is checked to exist before any
/// of them runs.
pub(crate) async fn run(pool: &SqlitePool, current_ver: i32, target_ver: i32) -> Result<()> {
    if current_ver == target_ver {
        debug!("Records schema already at version {target_ver}");
        return Ok(());
    }
    validate_migrations(current_ver, target_ver)?;

    let steps: Vec<(i32, Direction)> = if current_ver < target_ver {
        ((current_ver + 1)..=target_ver)
            .map(|v| (v, Direction::Up))
            .collect()
    } else {
        ((target_ver + 1)..=current_ver)
            .rev()
            .map(|v| (v, Direction::Down))
            .collect()
    };

    for (version, direction) in steps {
        let migration = find(version)?;
        debug!("Running migration {version:02} ({direction:?})");
        match direction {
            Direction::Up => apply(pool, migration.up_sql, version).await?,
            Direction::Down => apply(pool, migration.down_sql, version - 1).await?,
        }
    }

    debug!("Records schema now at version {target_ver}");
    Ok(())
}

fn find(version: i32) -> Result<&'static Migration> {
    MIGRATIONS
        .iter()
        .find(|m| m.version == version)
        .with_context(|| format!("Migration {version} not found"))
}

/// Executes one migration script and records `new_version` in `schema_version` in the same
/// transaction.
async fn apply(pool: &SqlitePool, sql: &str, new_version: i32) -> Result<()> {
    let mut tx = pool
        .begin()
        .await
        .context("Failed to begin migration transaction")?;

    // The script may hold several statements
    tx.execute(sql)
        .await
        .with_context(|| format!("Failed to migrate the records schema to {new_version}"))?;

    sqlx::query("DELETE FROM schema_version")
        .execute(&mut *tx)
        .await
        .context("Failed to clear schema_version")?;
    sqlx::query("INSERT INTO schema_version (version) VALUES (?)")
        .bind(new_version)
        .execute(&mut *tx)
        .await
        .context("Failed to update schema_version")?;

    tx.commit()
        .await
        .context("Failed to commit migration transaction")
}

fn validate_migrations(current_version: i32, target_version: i32) -> Result<()> {
    let (low, high) = if current_version < target_version {
        (current_version + 1, target_version)
    } else {
        (target_version + 1, current_version)
    };
    if let Some(missing) = (low..=high).find(|v| !MIGRATIONS.iter().any(|m| m.version == *v)) {
        bail!(
            "Migration {missing} is missing but required to migrate from version \
            {current_version} to {target_version}"
        );
    }
    Ok(())
}
