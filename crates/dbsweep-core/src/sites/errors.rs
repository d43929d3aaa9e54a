use crate::errors::SweepError;
use crate::storage::StorageError;

use super::types::SiteId;

#[derive(Debug, thiserror::Error)]
pub enum SiteError {
    #[error("Site {site_id} is not part of this installation")]
    UnknownSite { site_id: SiteId },

    #[error("Failed to switch to site {site_id}: {message}")]
    SwitchFailed { site_id: SiteId, message: String },

    #[error("Failed to open database: {message}")]
    OpenFailed { message: String },

    #[error("Failed to list sites: {source}")]
    ListFailed {
        #[from]
        source: StorageError,
    },
}

impl SweepError for SiteError {
    fn error_code(&self) -> &'static str {
        match self {
            SiteError::UnknownSite { .. } => "SITE_UNKNOWN",
            SiteError::SwitchFailed { .. } => "SITE_SWITCH_FAILED",
            SiteError::OpenFailed { .. } => "SITE_OPEN_FAILED",
            SiteError::ListFailed { .. } => "SITE_LIST_FAILED",
        }
    }

    fn is_user_error(&self) -> bool {
        matches!(self, SiteError::UnknownSite { .. })
    }
}
