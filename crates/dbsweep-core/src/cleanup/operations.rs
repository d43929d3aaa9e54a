//! Default cross-site orchestration shared by all cleanup handlers.

use std::cmp::Ordering;

use tracing::{debug, info, warn};

use crate::sites::{SiteError, SiteId, SiteRegistry, SiteScope, with_site};
use crate::storage::{Row, SqlValue, StorageError, StorageSession};

use super::errors::CleanupError;
use super::handler::CleanupHandler;
use super::types::{
    CandidateRow, CompositeId, DeleteStrategy, FindQuery, FindResult, SITE_ID_COLUMN, SIZE_COLUMN,
    SortDirection, SweepReport,
};

/// Format of date columns as stored by the host.
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Reject a listing request before any statement is built.
pub fn validate_query<H>(handler: &H, query: &FindQuery) -> Result<(), CleanupError>
where
    H: CleanupHandler + ?Sized,
{
    if query.page == 0 {
        return Err(CleanupError::InvalidPagination {
            message: "page numbers start at 1".to_string(),
        });
    }
    if query.page_size == 0 {
        return Err(CleanupError::InvalidPagination {
            message: "page size must be positive".to_string(),
        });
    }
    fetch_limit(query)?;

    if let Some(column) = query.sort_column.as_deref()
        && !handler.sortable_columns().contains(&column)
    {
        return Err(CleanupError::InvalidSortColumn {
            category: handler.items_type().to_string(),
            column: column.to_string(),
            allowed: handler.sortable_columns().join(", "),
        });
    }

    if query.older_than.is_some() && handler.date_column().is_none() {
        return Err(CleanupError::DateFilterUnsupported {
            category: handler.items_type().to_string(),
        });
    }

    Ok(())
}

/// Rows each site must return so the merged listing can cover `page`.
fn fetch_limit(query: &FindQuery) -> Result<i64, CleanupError> {
    i64::from(query.page)
        .checked_mul(i64::from(query.page_size))
        .ok_or_else(|| CleanupError::InvalidPagination {
            message: format!(
                "page {} of size {} is out of range",
                query.page, query.page_size
            ),
        })
}

/// Default identity: `{items_type, site_id, id: <pk column>}`.
pub fn attach_primary_key_ids(
    items_type: &str,
    pk: &str,
    rows: Vec<CandidateRow>,
) -> Vec<CandidateRow> {
    rows.into_iter()
        .map(|mut row| {
            row.composite_id = row
                .columns
                .get_i64(pk)
                .map(|id| CompositeId::new(items_type, row.site_id, id));
            row
        })
        .collect()
}

/// Reject items addressed to another category, or missing a required
/// `term_taxonomy_id`, before any site is touched.
pub fn check_items(
    category: &str,
    items: &[CompositeId],
    require_term_taxonomy: bool,
) -> Result<(), CleanupError> {
    for item in items {
        if item.items_type != category {
            return Err(CleanupError::InvalidItem {
                category: category.to_string(),
                message: format!(
                    "item {}:{} belongs to '{}'",
                    item.site_id, item.id, item.items_type
                ),
            });
        }
        if require_term_taxonomy && item.term_taxonomy_id.is_none() {
            return Err(CleanupError::InvalidItem {
                category: category.to_string(),
                message: format!(
                    "item {}:{} is missing its term_taxonomy_id",
                    item.site_id, item.id
                ),
            });
        }
    }
    Ok(())
}

/// Group items by site, keeping sites in first-seen order.
pub fn group_by_site(items: &[CompositeId]) -> Vec<(SiteId, Vec<&CompositeId>)> {
    let mut groups: Vec<(SiteId, Vec<&CompositeId>)> = Vec::new();
    for item in items {
        match groups.iter_mut().find(|(site_id, _)| *site_id == item.site_id) {
            Some((_, group)) => group.push(item),
            None => groups.push((item.site_id, vec![item])),
        }
    }
    groups
}

/// Run one site's share of a delete or purge and record it in `report`.
///
/// The work runs as one storage unit inside a [`SiteScope`]. A failure of
/// the switch or of any statement is recorded against the site with a zero
/// count; the caller moves on to the next site.
pub fn sweep_site(
    sites: &dyn SiteRegistry,
    category: &str,
    operation: &str,
    site_id: SiteId,
    report: &mut SweepReport,
    mut work: impl FnMut(&dyn StorageSession) -> Result<u64, StorageError>,
) {
    match run_in_site(sites, site_id, &mut work) {
        Ok(affected) => {
            debug!(
                event = "core.cleanup.site_completed",
                category = category,
                operation = operation,
                site_id = site_id,
                affected = affected
            );
            report.record_success(site_id, affected);
        }
        Err(e) => {
            warn!(
                event = "core.cleanup.site_failed",
                category = category,
                operation = operation,
                site_id = site_id,
                error = %e
            );
            report.record_failure(site_id, e.to_string());
        }
    }
}

fn run_in_site(
    sites: &dyn SiteRegistry,
    site_id: SiteId,
    work: &mut dyn FnMut(&dyn StorageSession) -> Result<u64, StorageError>,
) -> Result<u64, CleanupError> {
    let scope = SiteScope::enter(sites, site_id)?;
    Ok(scope.session().atomically(work)?)
}

/// Sites a listing covers: all of them, or the one requested.
fn target_sites(
    sites: &dyn SiteRegistry,
    only: Option<SiteId>,
) -> Result<Vec<SiteId>, CleanupError> {
    let all: Vec<SiteId> = sites.list_sites()?.into_iter().map(|s| s.id).collect();
    match only {
        None => Ok(all),
        Some(site_id) if all.contains(&site_id) => Ok(vec![site_id]),
        Some(site_id) => Err(SiteError::UnknownSite { site_id }.into()),
    }
}

fn size_expression(columns: &[&str]) -> String {
    columns
        .iter()
        .map(|c| format!("COALESCE(LENGTH(main.{c}), 0)"))
        .collect::<Vec<_>>()
        .join(" + ")
}

fn order_clause(pk: &str, sort_column: &str, direction: &str) -> String {
    match sort_column {
        // Constant within one site; merged across sites in memory.
        SITE_ID_COLUMN => format!("main.{pk} ASC"),
        SIZE_COLUMN => format!("{SIZE_COLUMN} {direction}, main.{pk} ASC"),
        column if column == pk => format!("main.{pk} {direction}"),
        column => format!("main.{column} {direction}, main.{pk} ASC"),
    }
}

/// Count and fetch the first `limit` candidates of one site.
fn fetch_site<H>(
    handler: &H,
    session: &dyn StorageSession,
    query: &FindQuery,
    sort_column: &str,
    limit: i64,
) -> Result<(u64, Vec<Row>), CleanupError>
where
    H: CleanupHandler + ?Sized,
{
    let table = session.table(handler.table());
    let mut predicate = handler.base_where(session);

    if let Some(cutoff) = query.older_than {
        let date_column =
            handler
                .date_column()
                .ok_or_else(|| CleanupError::DateFilterUnsupported {
                    category: handler.items_type().to_string(),
                })?;
        predicate = predicate.and(
            &format!("main.{date_column} < ?"),
            [SqlValue::from(cutoff.format(DATE_FORMAT).to_string())],
        );
    }

    let counted = session.query(
        &format!(
            "SELECT COUNT(*) AS total FROM {table} AS main WHERE {}",
            predicate.sql
        ),
        &predicate.params,
    )?;
    let count = counted
        .first()
        .and_then(|row| row.get_i64("total"))
        .and_then(|n| u64::try_from(n).ok())
        .unwrap_or(0);
    if count == 0 {
        return Ok((0, Vec::new()));
    }

    let columns = handler.columns();
    let select = columns
        .iter()
        .map(|c| format!("main.{c}"))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!(
        "SELECT {select}, {size} AS {SIZE_COLUMN} FROM {table} AS main WHERE {filter} \
         ORDER BY {order} LIMIT ?",
        size = size_expression(columns),
        filter = predicate.sql,
        order = order_clause(handler.pk(), sort_column, query.direction.as_sql()),
    );

    let mut params = predicate.params;
    params.push(SqlValue::Integer(limit));

    Ok((count, session.query(&sql, &params)?))
}

/// Default `find`: per-site top-N, merged with the same ordering, then sliced.
pub fn find_candidates<H>(
    handler: &H,
    sites: &dyn SiteRegistry,
    query: &FindQuery,
) -> Result<FindResult, CleanupError>
where
    H: CleanupHandler + ?Sized,
{
    validate_query(handler, query)?;

    let category = handler.items_type();
    let pk = handler.pk();
    let sort_column = query.sort_column.as_deref().unwrap_or(pk);
    let site_ids = target_sites(sites, query.site_id)?;

    info!(
        event = "core.cleanup.find_started",
        category = category,
        sort_column = sort_column,
        direction = %query.direction,
        page = query.page,
        page_size = query.page_size,
        sites = site_ids.len()
    );

    let limit = fetch_limit(query)?;
    let mut total = 0_u64;
    let mut rows: Vec<CandidateRow> = Vec::new();

    // A partial listing would misreport the total, so any site failure aborts.
    for site_id in &site_ids {
        let (count, site_rows) = with_site(sites, *site_id, |session| {
            fetch_site(handler, session, query, sort_column, limit)
        })?;
        total += count;
        rows.extend(
            site_rows
                .into_iter()
                .map(|columns| CandidateRow::new(*site_id, columns)),
        );
    }

    let site_rank = |site_id: SiteId| site_ids.iter().position(|id| *id == site_id);
    let site_major = !handler.is_all_sites_sortable();
    rows.sort_by(|a, b| {
        let by_site = if site_major {
            site_rank(a.site_id).cmp(&site_rank(b.site_id))
        } else {
            Ordering::Equal
        };
        let mut by_column = a.sort_value(sort_column).sql_cmp(&b.sort_value(sort_column));
        if query.direction == SortDirection::Desc {
            by_column = by_column.reverse();
        }
        by_site
            .then(by_column)
            .then_with(|| a.sort_value(pk).sql_cmp(&b.sort_value(pk)))
    });

    let offset = usize::try_from(limit - i64::from(query.page_size)).unwrap_or(usize::MAX);
    let page_size = usize::try_from(query.page_size).unwrap_or(usize::MAX);
    let page: Vec<CandidateRow> = rows.into_iter().skip(offset).take(page_size).collect();
    let page = handler.add_composite_id(page);

    info!(
        event = "core.cleanup.find_completed",
        category = category,
        total = total,
        returned = page.len()
    );

    Ok(FindResult {
        rows: page,
        total,
        page: query.page,
        page_size: query.page_size,
    })
}

/// Default `delete`: one `DELETE ... WHERE pk = ?` per item.
pub fn delete_by_primary_key<H>(
    handler: &H,
    sites: &dyn SiteRegistry,
    items: &[CompositeId],
) -> Result<SweepReport, CleanupError>
where
    H: CleanupHandler + ?Sized,
{
    let category = handler.items_type();
    let recheck = match handler.delete_strategy() {
        DeleteStrategy::PrimaryKey { recheck } => recheck,
        DeleteStrategy::Custom => {
            return Err(CleanupError::CustomDeleteRequired {
                category: category.to_string(),
            });
        }
    };

    if items.is_empty() {
        debug!(event = "core.cleanup.delete_skipped", category = category, reason = "no items");
        return Ok(SweepReport::default());
    }

    check_items(category, items, false)?;
    let groups = group_by_site(items);

    info!(
        event = "core.cleanup.delete_started",
        category = category,
        items = items.len(),
        sites = groups.len()
    );

    let mut report = SweepReport::default();
    for (site_id, group) in groups {
        sweep_site(sites, category, "delete", site_id, &mut report, |session| {
            let table = session.table(handler.table());
            let pk = handler.pk();
            let (sql, guard_params) = if recheck {
                let guard = handler.base_where(session);
                (
                    format!(
                        "DELETE FROM {table} AS main WHERE main.{pk} = ? AND ({})",
                        guard.sql
                    ),
                    guard.params,
                )
            } else {
                (
                    format!("DELETE FROM {table} AS main WHERE main.{pk} = ?"),
                    Vec::new(),
                )
            };

            let mut deleted = 0;
            for item in &group {
                let mut params = Vec::with_capacity(guard_params.len() + 1);
                params.push(SqlValue::Integer(item.id));
                params.extend(guard_params.iter().cloned());
                deleted += session.execute(&sql, &params)?;
            }
            Ok(deleted)
        });
    }

    info!(
        event = "core.cleanup.delete_completed",
        category = category,
        affected = report.affected(),
        failed_sites = report.failures().count()
    );

    Ok(report)
}

/// Default `purge`: `DELETE ... WHERE base_where()` on every site.
pub fn purge_matching<H>(
    handler: &H,
    sites: &dyn SiteRegistry,
) -> Result<SweepReport, CleanupError>
where
    H: CleanupHandler + ?Sized,
{
    let category = handler.items_type();
    let site_list = sites.list_sites()?;

    info!(
        event = "core.cleanup.purge_started",
        category = category,
        sites = site_list.len()
    );

    let mut report = SweepReport::default();
    for site in &site_list {
        sweep_site(sites, category, "purge", site.id, &mut report, |session| {
            let table = session.table(handler.table());
            let predicate = handler.base_where(session);
            session.execute(
                &format!("DELETE FROM {table} AS main WHERE {}", predicate.sql),
                &predicate.params,
            )
        });
    }

    info!(
        event = "core.cleanup.purge_completed",
        category = category,
        affected = report.affected(),
        failed_sites = report.failures().count()
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cleanup::types::Predicate;
    use crate::sites::SqliteSiteRegistry;
    use crate::test_support::{RecordingSites, count_rows, fixture_registry, seed};
    use chrono::NaiveDate;

    /// Postmeta rows with an empty key, keyed by `meta_id`.
    struct BlankMetaKeys {
        all_sites_sortable: bool,
        strategy: DeleteStrategy,
    }

    impl Default for BlankMetaKeys {
        fn default() -> Self {
            Self {
                all_sites_sortable: true,
                strategy: DeleteStrategy::PrimaryKey { recheck: true },
            }
        }
    }

    impl CleanupHandler for BlankMetaKeys {
        fn items_type(&self) -> &'static str {
            "blank_meta_keys"
        }
        fn table(&self) -> &'static str {
            "postmeta"
        }
        fn pk(&self) -> &'static str {
            "meta_id"
        }
        fn base_where(&self, _session: &dyn StorageSession) -> Predicate {
            Predicate::new("main.meta_key = ?", vec![SqlValue::from("")])
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
            self.all_sites_sortable
        }
        fn sortable_columns(&self) -> &'static [&'static str] {
            &["meta_id", "meta_value", "size", "site_id"]
        }
        fn delete_strategy(&self) -> DeleteStrategy {
            self.strategy
        }
    }

    /// Sites 1 and 2 with blank-key rows, site 3 with none.
    fn seeded() -> SqliteSiteRegistry {
        let registry = fixture_registry(&[1, 2, 3]);
        seed(
            &registry,
            1,
            "INSERT INTO {p}postmeta VALUES
                (1, 10, '', 'bb'), (2, 10, '', 'dddd'), (3, 10, 'keep', 'x');",
        );
        seed(
            &registry,
            2,
            "INSERT INTO {p}postmeta VALUES
                (1, 20, '', 'a'), (2, 20, '', 'ccc'), (5, 20, 'keep', 'y');",
        );
        seed(&registry, 3, "INSERT INTO {p}postmeta VALUES (1, 30, 'keep', 'z');");
        registry
    }

    fn fixture() -> RecordingSites {
        RecordingSites::new(seeded())
    }

    fn values(result: &FindResult) -> Vec<(SiteId, String)> {
        result
            .rows
            .iter()
            .map(|r| {
                (
                    r.site_id,
                    r.columns
                        .get("meta_value")
                        .and_then(SqlValue::as_str)
                        .unwrap_or_default()
                        .to_string(),
                )
            })
            .collect()
    }

    #[test]
    fn test_find_rejects_unlisted_sort_column_without_switching() {
        let sites = fixture();
        let query = FindQuery::new(1, 10).sorted_by("post_id; DROP TABLE x", SortDirection::Asc);

        let err = BlankMetaKeys::default().find(&sites, &query).unwrap_err();
        assert!(matches!(err, CleanupError::InvalidSortColumn { .. }));
        assert!(sites.switches().is_empty());
    }

    #[test]
    fn test_find_rejects_zero_page() {
        let sites = fixture();
        let err = BlankMetaKeys::default()
            .find(&sites, &FindQuery::new(0, 10))
            .unwrap_err();
        assert!(matches!(err, CleanupError::InvalidPagination { .. }));
        assert!(sites.switches().is_empty());
    }

    #[test]
    fn test_find_rejects_out_of_range_page_without_switching() {
        let sites = fixture();
        let err = BlankMetaKeys::default()
            .find(&sites, &FindQuery::new(u32::MAX, u32::MAX))
            .unwrap_err();
        assert!(matches!(err, CleanupError::InvalidPagination { .. }));
        assert!(sites.switches().is_empty());
    }

    #[test]
    fn test_find_accepts_largest_page_size_on_first_page() {
        let sites = fixture();
        let result = BlankMetaKeys::default()
            .find(&sites, &FindQuery::new(1, u32::MAX))
            .unwrap();
        assert_eq!(result.total, 4);
        assert_eq!(result.rows.len(), 4);
    }

    #[test]
    fn test_find_merges_sites_in_sort_order() {
        let sites = fixture();
        let handler = BlankMetaKeys::default();

        let asc = handler
            .find(&sites, &FindQuery::new(1, 10).sorted_by("meta_value", SortDirection::Asc))
            .unwrap();
        assert_eq!(asc.total, 4);
        assert_eq!(
            values(&asc),
            vec![
                (2, "a".to_string()),
                (1, "bb".to_string()),
                (2, "ccc".to_string()),
                (1, "dddd".to_string()),
            ]
        );

        let desc = handler
            .find(&sites, &FindQuery::new(1, 10).sorted_by("size", SortDirection::Desc))
            .unwrap();
        let sizes: Vec<i64> = desc.rows.iter().map(CandidateRow::size).collect();
        let mut sorted = sizes.clone();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(sizes, sorted);
    }

    #[test]
    fn test_find_pages_across_sites() {
        let sites = fixture();
        let handler = BlankMetaKeys::default();
        let query = |page| FindQuery::new(page, 3).sorted_by("meta_value", SortDirection::Asc);

        let first = handler.find(&sites, &query(1)).unwrap();
        let second = handler.find(&sites, &query(2)).unwrap();
        let third = handler.find(&sites, &query(3)).unwrap();

        assert_eq!(first.rows.len(), 3);
        assert_eq!(values(&second), vec![(1, "dddd".to_string())]);
        assert!(third.rows.is_empty());
        assert_eq!(third.total, 4);
    }

    #[test]
    fn test_find_by_site_id_descending() {
        let sites = fixture();
        let result = BlankMetaKeys::default()
            .find(&sites, &FindQuery::new(1, 10).sorted_by("site_id", SortDirection::Desc))
            .unwrap();
        let site_ids: Vec<SiteId> = result.rows.iter().map(|r| r.site_id).collect();
        assert_eq!(site_ids, vec![2, 2, 1, 1]);
    }

    #[test]
    fn test_find_site_major_when_not_all_sites_sortable() {
        let sites = fixture();
        let handler = BlankMetaKeys {
            all_sites_sortable: false,
            ..BlankMetaKeys::default()
        };
        let result = handler
            .find(&sites, &FindQuery::new(1, 10).sorted_by("meta_value", SortDirection::Asc))
            .unwrap();
        assert_eq!(
            values(&result),
            vec![
                (1, "bb".to_string()),
                (1, "dddd".to_string()),
                (2, "a".to_string()),
                (2, "ccc".to_string()),
            ]
        );
    }

    #[test]
    fn test_find_attaches_primary_key_identity() {
        let sites = fixture();
        let result = BlankMetaKeys::default()
            .find(&sites, &FindQuery::new(1, 10).for_site(2))
            .unwrap();
        let ids: Vec<CompositeId> = result
            .rows
            .iter()
            .filter_map(|r| r.composite_id.clone())
            .collect();
        assert_eq!(
            ids,
            vec![
                CompositeId::new("blank_meta_keys", 2, 1),
                CompositeId::new("blank_meta_keys", 2, 2),
            ]
        );
        assert_eq!(sites.switches(), vec![2]);
    }

    #[test]
    fn test_find_unknown_site_is_rejected() {
        let sites = fixture();
        let err = BlankMetaKeys::default()
            .find(&sites, &FindQuery::new(1, 10).for_site(9))
            .unwrap_err();
        assert!(matches!(
            err,
            CleanupError::Site {
                source: SiteError::UnknownSite { site_id: 9 }
            }
        ));
    }

    #[test]
    fn test_find_date_filter_requires_date_column() {
        let sites = fixture();
        let cutoff = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let err = BlankMetaKeys::default()
            .find(&sites, &FindQuery::new(1, 10).older_than(cutoff))
            .unwrap_err();
        assert!(matches!(err, CleanupError::DateFilterUnsupported { .. }));
    }

    #[test]
    fn test_delete_empty_input_touches_no_site() {
        let sites = fixture();
        let report = BlankMetaKeys::default().delete(&sites, &[]).unwrap();
        assert_eq!(report.affected(), 0);
        assert!(sites.switches().is_empty());
    }

    #[test]
    fn test_delete_switches_once_per_distinct_site() {
        let sites = fixture();
        let items = vec![
            CompositeId::new("blank_meta_keys", 2, 1),
            CompositeId::new("blank_meta_keys", 1, 1),
            CompositeId::new("blank_meta_keys", 2, 2),
        ];

        let report = BlankMetaKeys::default().delete(&sites, &items).unwrap();

        assert_eq!(report.affected(), 3);
        assert_eq!(sites.switches(), vec![2, 1]);
        assert_eq!(sites.restores(), vec![2, 1]);
        assert_eq!(count_rows(sites.inner(), 1, "postmeta"), 2);
        assert_eq!(count_rows(sites.inner(), 2, "postmeta"), 1);
    }

    #[test]
    fn test_delete_recheck_spares_rows_that_no_longer_match() {
        let sites = fixture();
        // meta_id 3 on site 1 has a real key.
        let items = vec![CompositeId::new("blank_meta_keys", 1, 3)];
        let report = BlankMetaKeys::default().delete(&sites, &items).unwrap();
        assert_eq!(report.affected(), 0);
        assert_eq!(count_rows(sites.inner(), 1, "postmeta"), 3);

        let unguarded = BlankMetaKeys {
            strategy: DeleteStrategy::PrimaryKey { recheck: false },
            ..BlankMetaKeys::default()
        };
        assert_eq!(unguarded.delete(&sites, &items).unwrap().affected(), 1);
    }

    #[test]
    fn test_delete_refuses_custom_strategy() {
        let sites = fixture();
        let handler = BlankMetaKeys {
            strategy: DeleteStrategy::Custom,
            ..BlankMetaKeys::default()
        };
        let err = handler
            .delete(&sites, &[CompositeId::new("blank_meta_keys", 1, 1)])
            .unwrap_err();
        assert!(matches!(err, CleanupError::CustomDeleteRequired { .. }));
        assert!(sites.switches().is_empty());
    }

    #[test]
    fn test_delete_rejects_foreign_items_up_front() {
        let sites = fixture();
        let items = vec![
            CompositeId::new("blank_meta_keys", 1, 1),
            CompositeId::new("revisions", 2, 1),
        ];
        let err = BlankMetaKeys::default().delete(&sites, &items).unwrap_err();
        assert!(matches!(err, CleanupError::InvalidItem { .. }));
        assert!(sites.switches().is_empty());
        assert_eq!(count_rows(sites.inner(), 1, "postmeta"), 3);
    }

    #[test]
    fn test_purge_reports_every_site_and_is_idempotent() {
        let sites = fixture();
        let handler = BlankMetaKeys::default();

        let report = handler.purge(&sites).unwrap();
        assert_eq!(report.affected(), 4);
        let per_site: Vec<(SiteId, u64)> =
            report.sites.iter().map(|s| (s.site_id, s.affected)).collect();
        assert_eq!(per_site, vec![(1, 2), (2, 2), (3, 0)]);
        assert_eq!(count_rows(sites.inner(), 1, "postmeta"), 1);
        assert_eq!(count_rows(sites.inner(), 3, "postmeta"), 1);

        assert_eq!(handler.purge(&sites).unwrap().affected(), 0);
    }

    #[test]
    fn test_purge_continues_past_failed_switch() {
        let sites = RecordingSites::new(seeded()).failing_on(&[2]);
        let report = BlankMetaKeys::default().purge(&sites).unwrap();

        assert_eq!(report.affected(), 2);
        let failed: Vec<SiteId> = report.failures().map(|s| s.site_id).collect();
        assert_eq!(failed, vec![2]);
        assert_eq!(sites.switches(), vec![1, 2, 3]);
        assert_eq!(sites.restores(), vec![1, 2, 3]);
        assert_eq!(count_rows(sites.inner(), 2, "postmeta"), 3);
    }

    #[test]
    fn test_delete_statement_failure_rolls_back_site_and_continues() {
        let registry = seeded();
        seed(
            &registry,
            1,
            "CREATE TRIGGER {p}keep_2 BEFORE DELETE ON {p}postmeta
             WHEN old.meta_id = 2
             BEGIN SELECT RAISE(ABORT, 'row is locked'); END;",
        );
        let sites = RecordingSites::new(registry);
        let items = vec![
            CompositeId::new("blank_meta_keys", 1, 1),
            CompositeId::new("blank_meta_keys", 1, 2),
            CompositeId::new("blank_meta_keys", 2, 1),
        ];

        let report = BlankMetaKeys::default().delete(&sites, &items).unwrap();

        let per_site: Vec<(SiteId, u64)> =
            report.sites.iter().map(|s| (s.site_id, s.affected)).collect();
        assert_eq!(per_site, vec![(1, 0), (2, 1)]);
        assert!(report.sites[0].error.as_deref().unwrap().contains("row is locked"));
        assert_eq!(count_rows(sites.inner(), 1, "postmeta"), 3);
        assert_eq!(count_rows(sites.inner(), 2, "postmeta"), 2);
        assert_eq!(sites.restores(), vec![1, 2]);
    }

    #[test]
    fn test_purge_statement_failure_counts_zero_and_continues() {
        let registry = seeded();
        seed(&registry, 2, "DROP TABLE {p}postmeta;");
        let sites = RecordingSites::new(registry);

        let report = BlankMetaKeys::default().purge(&sites).unwrap();

        let per_site: Vec<(SiteId, u64)> =
            report.sites.iter().map(|s| (s.site_id, s.affected)).collect();
        assert_eq!(per_site, vec![(1, 2), (2, 0), (3, 0)]);
        let failed: Vec<SiteId> = report.failures().map(|s| s.site_id).collect();
        assert_eq!(failed, vec![2]);
        assert_eq!(sites.switches(), vec![1, 2, 3]);
        assert_eq!(sites.restores(), vec![1, 2, 3]);
    }

    #[test]
    fn test_group_by_site_keeps_first_seen_order() {
        let items = vec![
            CompositeId::new("x", 3, 1),
            CompositeId::new("x", 1, 2),
            CompositeId::new("x", 3, 4),
        ];
        let groups = group_by_site(&items);
        let shape: Vec<(SiteId, usize)> = groups.iter().map(|(s, g)| (*s, g.len())).collect();
        assert_eq!(shape, vec![(3, 2), (1, 1)]);
    }
}
