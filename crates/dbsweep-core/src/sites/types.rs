use serde::{Deserialize, Serialize};

/// Identifier of one data partition.
pub type SiteId = i64;

/// Id of the main site, whose tables carry the bare prefix.
pub const MAIN_SITE_ID: SiteId = 1;

/// One isolated data partition of a multi-site installation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Site {
    pub id: SiteId,
    pub domain: String,
    pub path: String,
}

impl Site {
    pub fn new(id: SiteId, domain: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            id,
            domain: domain.into(),
            path: path.into(),
        }
    }

    /// A site known only by id, with no metadata.
    pub fn bare(id: SiteId) -> Self {
        Self::new(id, "", "/")
    }
}

/// Table prefix of a site: `{base}` for the main site, `{base}{id}_` otherwise.
pub fn site_table_prefix(base_prefix: &str, site_id: SiteId) -> String {
    if site_id == MAIN_SITE_ID {
        base_prefix.to_string()
    } else {
        format!("{}{}_", base_prefix, site_id)
    }
}
