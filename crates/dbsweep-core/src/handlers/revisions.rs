//! Stored post revisions.

use crate::cleanup::{CleanupHandler, Predicate};
use crate::storage::{SqlValue, StorageSession};

pub const ITEMS_TYPE: &str = "revisions";

#[derive(Debug, Clone, Copy, Default)]
pub struct RevisionsHandler;

impl CleanupHandler for RevisionsHandler {
    fn items_type(&self) -> &'static str {
        ITEMS_TYPE
    }

    fn table(&self) -> &'static str {
        "posts"
    }

    fn pk(&self) -> &'static str {
        "ID"
    }

    fn base_where(&self, _session: &dyn StorageSession) -> Predicate {
        Predicate::new("main.post_type = ?", vec![SqlValue::from("revision")])
    }

    fn columns(&self) -> &'static [&'static str] {
        &["ID", "post_parent", "post_title", "post_name", "post_modified"]
    }

    fn name_column(&self) -> &'static str {
        "post_title"
    }

    fn value_column(&self) -> &'static str {
        "post_name"
    }

    fn is_all_sites_sortable(&self) -> bool {
        false
    }

    fn sortable_columns(&self) -> &'static [&'static str] {
        &["ID", "post_parent", "post_title", "post_modified", "size", "site_id"]
    }

    fn date_column(&self) -> Option<&'static str> {
        Some("post_modified")
    }
}
