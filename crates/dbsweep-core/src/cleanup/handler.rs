//! Cleanup handler trait definition.

use crate::sites::SiteRegistry;
use crate::storage::StorageSession;

use super::errors::CleanupError;
use super::operations;
use super::types::{
    CandidateRow, CompositeId, DeleteStrategy, FindQuery, FindResult, Predicate, SweepReport,
};

/// Trait defining one category of cleanup.
///
/// Implementors describe their table and the predicate selecting unwanted
/// rows; `find`, `delete`, and `purge` come with cross-site defaults built
/// on that description. A handler whose rows have no single-column key
/// returns [`DeleteStrategy::Custom`] and overrides `delete` and
/// `add_composite_id`.
pub trait CleanupHandler: Send + Sync {
    /// Category key, e.g. `"unused_relationships"`.
    fn items_type(&self) -> &'static str;

    /// Base table name; the session resolves it to the site's table.
    fn table(&self) -> &'static str;

    /// Single-column key used by the generic delete path.
    fn pk(&self) -> &'static str;

    /// Boolean expression over the `main` alias selecting unwanted rows.
    ///
    /// The session resolves any other tables the predicate references.
    fn base_where(&self, session: &dyn StorageSession) -> Predicate;

    /// Columns selected from `table()` for listings.
    fn columns(&self) -> &'static [&'static str];

    fn name_column(&self) -> &'static str;

    fn value_column(&self) -> &'static str;

    /// Whether a cross-site listing is globally ordered by the sort column.
    /// When false, rows are grouped by site first.
    fn is_all_sites_sortable(&self) -> bool;

    /// Columns a listing may be sorted by. Anything else is rejected.
    fn sortable_columns(&self) -> &'static [&'static str];

    fn delete_strategy(&self) -> DeleteStrategy {
        DeleteStrategy::PrimaryKey { recheck: true }
    }

    fn date_column(&self) -> Option<&'static str> {
        None
    }

    /// Attach each row's identity. Defaults to `{items_type, site_id, pk}`.
    fn add_composite_id(&self, rows: Vec<CandidateRow>) -> Vec<CandidateRow> {
        operations::attach_primary_key_ids(self.items_type(), self.pk(), rows)
    }

    /// One page of candidates across all sites (or `query.site_id`).
    fn find(
        &self,
        sites: &dyn SiteRegistry,
        query: &FindQuery,
    ) -> Result<FindResult, CleanupError> {
        operations::find_candidates(self, sites, query)
    }

    /// Delete the selected rows, one switch per distinct site.
    fn delete(
        &self,
        sites: &dyn SiteRegistry,
        items: &[CompositeId],
    ) -> Result<SweepReport, CleanupError> {
        operations::delete_by_primary_key(self, sites, items)
    }

    /// Delete every row matching `base_where()` on every site.
    fn purge(&self, sites: &dyn SiteRegistry) -> Result<SweepReport, CleanupError> {
        operations::purge_matching(self, sites)
    }
}
