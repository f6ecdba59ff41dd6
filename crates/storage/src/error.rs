use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Not found")]
    NotFound,

    /// A uniqueness rule on names or CPFs was broken
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A referenced category or training center does not exist
    #[error("Missing reference: {0}")]
    MissingReference(String),
}

pub type Result<T> = std::result::Result<T, StorageError>;

impl StorageError {
    pub fn is_unique_violation(&self) -> bool {
        matches!(
            self,
            StorageError::Database(sqlx::Error::Database(e))
                if e.code().as_deref() == Some("23505")
        )
    }

    pub fn is_foreign_key_violation(&self) -> bool {
        matches!(
            self,
            StorageError::Database(sqlx::Error::Database(e))
                if e.code().as_deref() == Some("23503")
        )
    }

    /// Turns a unique violation reported by Postgres into a `Conflict`,
    /// leaving every other error untouched.
    pub fn unique_as_conflict(self, message: impl FnOnce() -> String) -> Self {
        if self.is_unique_violation() {
            let message = message();
            tracing::warn!(error = %self, "Unique constraint rejected write: {}", message);
            StorageError::Conflict(message)
        } else {
            self
        }
    }
}
