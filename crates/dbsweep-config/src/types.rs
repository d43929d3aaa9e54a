use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Top-level configuration file layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    pub database: DatabaseConfig,
    pub sites: SitesConfig,
    pub listing: ListingConfig,
    pub handlers: HandlersConfig,
}

/// Where the installation's tables live.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite database file. `None` means an in-memory database, which is
    /// only useful for tests.
    pub path: Option<PathBuf>,
    /// Prefix of the main site's tables. Site `n > 1` uses `{prefix}{n}_`.
    pub table_prefix: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: None,
            table_prefix: "wp_".to_string(),
        }
    }
}

impl DatabaseConfig {
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn table_prefix(&self) -> &str {
        &self.table_prefix
    }
}

/// Explicit site list. When absent, sites are discovered from the database.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SitesConfig {
    pub ids: Option<Vec<i64>>,
}

impl SitesConfig {
    pub fn ids(&self) -> Option<&[i64]> {
        self.ids.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingConfig {
    pub page_size: u32,
    pub max_page_size: u32,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            page_size: 20,
            max_page_size: 500,
        }
    }
}

/// Per-category handler settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HandlersConfig {
    pub unused_relationships: UnusedRelationshipsConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnusedRelationshipsConfig {
    /// Taxonomy whose relationships are swept when their content is gone.
    /// Stock installations use 1 (the default category).
    pub term_taxonomy_id: i64,
}

impl Default for UnusedRelationshipsConfig {
    fn default() -> Self {
        Self {
            term_taxonomy_id: 1,
        }
    }
}
