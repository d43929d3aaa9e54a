//! Post metadata whose post no longer exists.

use crate::cleanup::{CleanupHandler, Predicate};
use crate::storage::StorageSession;

pub const ITEMS_TYPE: &str = "unused_postmeta";

#[derive(Debug, Clone, Copy, Default)]
pub struct UnusedPostmetaHandler;

impl CleanupHandler for UnusedPostmetaHandler {
    fn items_type(&self) -> &'static str {
        ITEMS_TYPE
    }

    fn table(&self) -> &'static str {
        "postmeta"
    }

    fn pk(&self) -> &'static str {
        "meta_id"
    }

    fn base_where(&self, session: &dyn StorageSession) -> Predicate {
        let posts = session.table("posts");
        Predicate::new(
            format!("NOT EXISTS (SELECT 1 FROM {posts} AS p WHERE p.ID = main.post_id)"),
            Vec::new(),
        )
    }

    fn columns(&self) -> &'static [&'static str] {
        &["meta_id", "post_id", "meta_key", "meta_value"]
    }

    fn name_column(&self) -> &'static str {
        "meta_key"
    }

    fn value_column(&self) -> &'static str {
        "meta_value"
    }

    fn is_all_sites_sortable(&self) -> bool {
        true
    }

    fn sortable_columns(&self) -> &'static [&'static str] {
        &["meta_id", "post_id", "meta_key", "size", "site_id"]
    }
}
