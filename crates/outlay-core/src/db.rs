use crate::error::CoreError;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use std::path::Path;

pub type DbPool = sqlx::SqlitePool;

/// Opens (creating if necessary) the SQLite database at `path` and runs the
/// embedded migrations.
///
/// WAL journaling keeps readers unblocked during a materialization run while
/// still serializing writers, and foreign keys must be on for the
/// `ON DELETE SET NULL` back-reference from expenses to rules.
pub async fn establish_connection(path: impl AsRef<Path>) -> Result<DbPool, CoreError> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new().connect_with(options).await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}
