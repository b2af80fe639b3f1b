//! Error aliases and the tagging used by command handlers to say which layer failed.

use serde::{Deserialize, Serialize};

pub type Error = anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// The layer in which a command failed. Prefixed to the error message that reaches the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    /// The data directory or `config.json` could not be created or loaded.
    Config,
    /// A SQLite operation failed, including a failed commit.
    Database,
    /// The arguments given by the user were rejected.
    Request,
}

serde_plain::derive_display_from_serialize!(ErrorType);

/// Converts an internal result into one that is presented to the user, tagged with the
/// `ErrorType` and carrying the whole context chain in its message.
pub trait IntoResult<T> {
    fn pub_result(self, error_type: ErrorType) -> Result<T>;
}

impl<T, E> IntoResult<T> for std::result::Result<T, E>
where
    E: Into<Error>,
{
    fn pub_result(self, error_type: ErrorType) -> Result<T> {
        self.map_err(|e| {
            let e: Error = e.into();
            anyhow::anyhow!("{error_type} error: {e:#}")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_pub_result_prefixes_error_type() {
        let r: Result<()> = Err(anyhow::anyhow!("disk full")).context("Unable to commit");
        let err = r.pub_result(ErrorType::Database).unwrap_err();
        assert_eq!(err.to_string(), "database error: Unable to commit: disk full");
    }

    #[test]
    fn test_pub_result_passes_ok_through() {
        let r: Result<u8> = Ok(7);
        assert_eq!(r.pub_result(ErrorType::Request).unwrap(), 7);
    }
}
