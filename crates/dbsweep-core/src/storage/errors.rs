use crate::errors::SweepError;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("SQLite error: {source}")]
    Sqlite {
        #[from]
        source: rusqlite::Error,
    },

    #[error("Storage backend failed: {message}")]
    Backend { message: String },

    #[error("Column '{column}' holds a value that cannot be read")]
    UnreadableColumn { column: String },
}

impl SweepError for StorageError {
    fn error_code(&self) -> &'static str {
        match self {
            StorageError::Sqlite { .. } => "STORAGE_SQLITE_ERROR",
            StorageError::Backend { .. } => "STORAGE_BACKEND_ERROR",
            StorageError::UnreadableColumn { .. } => "STORAGE_UNREADABLE_COLUMN",
        }
    }
}
