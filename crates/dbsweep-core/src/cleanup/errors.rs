use crate::errors::SweepError;
use crate::sites::SiteError;
use crate::storage::StorageError;

#[derive(Debug, thiserror::Error)]
pub enum CleanupError {
    #[error("Unknown cleanup category '{category}'")]
    UnknownCategory { category: String },

    #[error("A handler is already registered for '{category}'")]
    DuplicateCategory { category: String },

    #[error("Handler for '{handler}' cannot be registered under '{category}'")]
    CategoryMismatch { category: String, handler: String },

    #[error("Cannot sort '{category}' by '{column}'. Sortable columns: {allowed}")]
    InvalidSortColumn {
        category: String,
        column: String,
        allowed: String,
    },

    #[error("Invalid pagination: {message}")]
    InvalidPagination { message: String },

    #[error("'{category}' has no date column to filter on")]
    DateFilterUnsupported { category: String },

    #[error("'{category}' deletes through its own delete path, not by primary key")]
    CustomDeleteRequired { category: String },

    #[error("Invalid item for '{category}': {message}")]
    InvalidItem { category: String, message: String },

    #[error("Site error: {source}")]
    Site {
        #[from]
        source: SiteError,
    },

    #[error("Storage error: {source}")]
    Storage {
        #[from]
        source: StorageError,
    },
}

impl SweepError for CleanupError {
    fn error_code(&self) -> &'static str {
        match self {
            CleanupError::UnknownCategory { .. } => "CLEANUP_UNKNOWN_CATEGORY",
            CleanupError::DuplicateCategory { .. } => "CLEANUP_DUPLICATE_CATEGORY",
            CleanupError::CategoryMismatch { .. } => "CLEANUP_CATEGORY_MISMATCH",
            CleanupError::InvalidSortColumn { .. } => "CLEANUP_INVALID_SORT_COLUMN",
            CleanupError::InvalidPagination { .. } => "CLEANUP_INVALID_PAGINATION",
            CleanupError::DateFilterUnsupported { .. } => "CLEANUP_DATE_FILTER_UNSUPPORTED",
            CleanupError::CustomDeleteRequired { .. } => "CLEANUP_CUSTOM_DELETE_REQUIRED",
            CleanupError::InvalidItem { .. } => "CLEANUP_INVALID_ITEM",
            CleanupError::Site { .. } => "CLEANUP_SITE_ERROR",
            CleanupError::Storage { .. } => "CLEANUP_STORAGE_ERROR",
        }
    }

    fn is_user_error(&self) -> bool {
        matches!(
            self,
            CleanupError::UnknownCategory { .. }
                | CleanupError::InvalidSortColumn { .. }
                | CleanupError::InvalidPagination { .. }
                | CleanupError::DateFilterUnsupported { .. }
                | CleanupError::InvalidItem { .. }
        )
    }
}
