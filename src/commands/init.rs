use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;

/// Creates the data directory, its `.backups` subdirectory, an initial `config.json` with
/// default settings and an empty records database.
///
/// # Errors
/// - Returns an error if the directory is already initialized or any file operation fails.
pub async fn init(accountbook_home: &Path) -> Result<Out<()>> {
    let config = Config::create(accountbook_home)
        .await
        .context("Unable to create the data directory and configs")
        .pub_result(ErrorType::Config)?;
    Ok(format!(
        "Successfully created the accountbook directory at {}",
        config.root().display()
    )
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_init_creates_loadable_home() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("books");
        let out = init(&home).await.unwrap();
        assert!(out.message().starts_with("Successfully created"));
        assert!(Config::load(&home).await.is_ok());
    }

    #[tokio::test]
    async fn test_init_twice_is_config_error() {
        let dir = TempDir::new().unwrap();
        init(dir.path()).await.unwrap();
        let err = init(dir.path()).await.unwrap_err();
        assert!(err.to_string().starts_with("config error"));
    }
}
