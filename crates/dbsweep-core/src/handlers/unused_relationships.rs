//! Term relationships whose object no longer exists.
//!
//! Rows in `term_relationships` are keyed by `(object_id, term_taxonomy_id)`,
//! so this handler carries both columns in its identity and deletes on both.

use dbsweep_config::UnusedRelationshipsConfig;
use tracing::{debug, info};

use crate::cleanup::operations::{check_items, group_by_site, sweep_site};
use crate::cleanup::{
    CandidateRow, CleanupError, CleanupHandler, CompositeId, DeleteStrategy, Predicate,
    SweepReport,
};
use crate::sites::SiteRegistry;
use crate::storage::{SqlValue, StorageSession};

pub const ITEMS_TYPE: &str = "unused_relationships";

const TERM_TAXONOMY_ID: &str = "term_taxonomy_id";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnusedRelationshipsHandler {
    term_taxonomy_id: i64,
}

impl Default for UnusedRelationshipsHandler {
    fn default() -> Self {
        Self::new(1)
    }
}

impl UnusedRelationshipsHandler {
    pub fn new(term_taxonomy_id: i64) -> Self {
        Self { term_taxonomy_id }
    }

    pub fn from_config(config: &UnusedRelationshipsConfig) -> Self {
        Self::new(config.term_taxonomy_id)
    }

    pub fn term_taxonomy_id(&self) -> i64 {
        self.term_taxonomy_id
    }
}

impl CleanupHandler for UnusedRelationshipsHandler {
    fn items_type(&self) -> &'static str {
        ITEMS_TYPE
    }

    fn table(&self) -> &'static str {
        "term_relationships"
    }

    fn pk(&self) -> &'static str {
        "object_id"
    }

    fn base_where(&self, session: &dyn StorageSession) -> Predicate {
        let posts = session.table("posts");
        Predicate::new(
            format!(
                "main.term_taxonomy_id = ? AND NOT EXISTS \
                 (SELECT 1 FROM {posts} AS p WHERE p.ID = main.object_id)"
            ),
            vec![SqlValue::Integer(self.term_taxonomy_id)],
        )
    }

    fn columns(&self) -> &'static [&'static str] {
        &["object_id", "term_taxonomy_id", "term_order"]
    }

    fn name_column(&self) -> &'static str {
        TERM_TAXONOMY_ID
    }

    fn value_column(&self) -> &'static str {
        "term_order"
    }

    fn is_all_sites_sortable(&self) -> bool {
        true
    }

    fn sortable_columns(&self) -> &'static [&'static str] {
        &["object_id", "term_taxonomy_id", "term_order", "size", "site_id"]
    }

    fn delete_strategy(&self) -> DeleteStrategy {
        DeleteStrategy::Custom
    }

    fn add_composite_id(&self, rows: Vec<CandidateRow>) -> Vec<CandidateRow> {
        rows.into_iter()
            .map(|mut row| {
                let object_id = row.columns.get_i64("object_id");
                let term_taxonomy_id = row.columns.get_i64(TERM_TAXONOMY_ID);
                row.composite_id = object_id.zip(term_taxonomy_id).map(|(id, tt)| {
                    CompositeId::new(ITEMS_TYPE, row.site_id, id).with_term_taxonomy(tt)
                });
                row
            })
            .collect()
    }

    fn delete(
        &self,
        sites: &dyn SiteRegistry,
        items: &[CompositeId],
    ) -> Result<SweepReport, CleanupError> {
        if items.is_empty() {
            debug!(
                event = "core.cleanup.delete_skipped",
                category = ITEMS_TYPE,
                reason = "no items"
            );
            return Ok(SweepReport::default());
        }

        check_items(ITEMS_TYPE, items, true)?;
        let groups = group_by_site(items);

        info!(
            event = "core.cleanup.delete_started",
            category = ITEMS_TYPE,
            items = items.len(),
            sites = groups.len()
        );

        let mut report = SweepReport::default();
        for (site_id, group) in groups {
            sweep_site(sites, ITEMS_TYPE, "delete", site_id, &mut report, |session| {
                let table = session.table(self.table());
                let sql = format!(
                    "DELETE FROM {table} WHERE object_id = ? AND term_taxonomy_id = ?"
                );
                let mut deleted = 0;
                for item in &group {
                    // check_items guarantees the taxonomy id.
                    let Some(term_taxonomy_id) = item.term_taxonomy_id else {
                        continue;
                    };
                    deleted += session.execute(
                        &sql,
                        &[
                            SqlValue::Integer(item.id),
                            SqlValue::Integer(term_taxonomy_id),
                        ],
                    )?;
                }
                Ok(deleted)
            });
        }

        info!(
            event = "core.cleanup.delete_completed",
            category = ITEMS_TYPE,
            affected = report.affected(),
            failed_sites = report.failures().count()
        );

        Ok(report)
    }

    fn purge(&self, sites: &dyn SiteRegistry) -> Result<SweepReport, CleanupError> {
        let site_list = sites.list_sites()?;

        info!(
            event = "core.cleanup.purge_started",
            category = ITEMS_TYPE,
            term_taxonomy_id = self.term_taxonomy_id,
            sites = site_list.len()
        );

        let mut report = SweepReport::default();
        for site in &site_list {
            sweep_site(sites, ITEMS_TYPE, "purge", site.id, &mut report, |session| {
                let table = session.table(self.table());
                let predicate = self.base_where(session);
                session.execute(
                    &format!("DELETE FROM {table} AS main WHERE {}", predicate.sql),
                    &predicate.params,
                )
            });
        }

        info!(
            event = "core.cleanup.purge_completed",
            category = ITEMS_TYPE,
            affected = report.affected(),
            failed_sites = report.failures().count()
        );

        Ok(report)
    }
}
