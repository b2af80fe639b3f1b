//! Delete command handler.

use crate::args::DeleteArgs;
use crate::commands::{plural, Out};
use crate::error::{ErrorType, IntoResult};
use crate::store::Store;
use crate::{Config, Result};
use tracing::info;

/// Deletes one or more records by ID atomically, after taking a backup of the database.
///
/// This operation is all-or-nothing: either all specified records are deleted, or none are.
/// If any record ID is not found, the entire operation is rolled back.
pub async fn delete(config: Config, args: DeleteArgs) -> Result<Out<Vec<String>>> {
    let backup = config
        .backup()
        .copy_sqlite()
        .await
        .pub_result(ErrorType::Database)?;
    info!("Backed up the database to {}", backup.display());

    let deleted = config
        .db()
        .delete(args.ids())
        .await
        .pub_result(ErrorType::Database)?;

    let count = deleted.len();
    let message = format!("Deleted {count} record{}", plural(count));
    Ok(Out::new(message, deleted))
}
