use crate::Result;
use anyhow::Context;
use std::path::{Path, PathBuf};
use tokio::fs::ReadDir;
use uuid::Uuid;

/// Prefix of identifiers generated for records created by this program.
const RECORD_ID_PREFIX: &str = "rec-";

/// Write a file.
pub(crate) async fn write(path: impl AsRef<Path>, contents: impl AsRef<[u8]>) -> Result<()> {
    let path = path.as_ref();
    tokio::fs::write(path, contents)
        .await
        .context(format!("Unable to write to {}", path.to_string_lossy()))
}

/// Read a file to a `String`.
pub async fn read(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read file at {}", path.display()))
}

/// Create a directory and any missing parents.
pub(crate) async fn make_dir(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    tokio::fs::create_dir_all(path)
        .await
        .with_context(|| format!("Unable to create directory at {}", path.to_string_lossy()))
}

pub(crate) async fn canonicalize(path: impl AsRef<Path>) -> Result<PathBuf> {
    let path = path.as_ref();
    tokio::fs::canonicalize(path)
        .await
        .with_context(|| format!("Unable to canonicalize the path {}", path.to_string_lossy()))
}

pub(crate) async fn read_dir(path: impl AsRef<Path>) -> Result<ReadDir> {
    let path = path.as_ref();
    tokio::fs::read_dir(path)
        .await
        .with_context(|| format!("Unable to read directory {}", path.to_string_lossy()))
}

/// Copies `from` -> `to`, overwriting `to` if it exists.
pub(crate) async fn copy(from: impl AsRef<Path>, to: impl AsRef<Path>) -> Result<()> {
    let (from, to) = (from.as_ref(), to.as_ref());
    tokio::fs::copy(from, to).await.with_context(|| {
        format!(
            "Unable to copy file from '{}' to '{}'",
            from.to_string_lossy(),
            to.to_string_lossy()
        )
    })?;
    Ok(())
}

pub(crate) async fn remove(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    tokio::fs::remove_file(path)
        .await
        .with_context(|| format!("Unable to remove file {}", path.to_string_lossy()))
}

/// Generates a unique record ID like `rec-3f2b9c0e8d7a4b6c9e1f0a2b3c4d5e6f`.
pub(crate) fn generate_record_id() -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("{RECORD_ID_PREFIX}{id}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_generate_record_id_is_prefixed_and_unique() {
        let a = generate_record_id();
        let b = generate_record_id();
        assert!(a.starts_with("rec-"), "unexpected id {a}");
        assert_eq!(a.len(), RECORD_ID_PREFIX.len() + 32);
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_write_copy_remove() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.txt");
        let b = dir.path().join("nested").join("b.txt");
        write(&a, "hello").await.unwrap();
        make_dir(b.parent().unwrap()).await.unwrap();
        copy(&a, &b).await.unwrap();
        assert_eq!(read(&b).await.unwrap(), "hello");
        remove(&a).await.unwrap();
        assert!(!a.exists());
        assert!(read(&a).await.is_err());
    }
}
