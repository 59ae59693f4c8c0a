use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Database error")]
    Database(#[from] sqlx::Error),

    #[error("Migration error")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("IO error")]
    Io(#[from] std::io::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Ambiguous ID prefix matched multiple rules")]
    AmbiguousId(Vec<(String, String)>),

    #[error("Data integrity violation: {0}")]
    DataIntegrity(String),

    #[error("Rule {0} has more than {1} pending occurrences; edit the rule before reprocessing")]
    TooManyPending(String, u32),

    #[error("Rule {0} was modified concurrently; the run was aborted and can be retried")]
    ConcurrentModification(String),
}
