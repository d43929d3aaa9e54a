//! Shared fixtures for unit tests: an in-memory multi-site schema and a
//! registry wrapper that records every switch and restore.

use parking_lot::Mutex;
use rusqlite::Connection;

use crate::sites::types::site_table_prefix;
use crate::sites::{Site, SiteError, SiteId, SiteRegistry, SqliteSiteRegistry};
use crate::storage::{SqlValue, StorageSession};

pub(crate) const PREFIX: &str = "wp_";

const SITE_SCHEMA: &str = "
    CREATE TABLE {p}posts (
        ID INTEGER PRIMARY KEY,
        post_type TEXT NOT NULL DEFAULT 'post',
        post_title TEXT NOT NULL DEFAULT '',
        post_name TEXT NOT NULL DEFAULT '',
        post_parent INTEGER NOT NULL DEFAULT 0,
        post_modified TEXT NOT NULL DEFAULT '2024-01-01 00:00:00'
    );
    CREATE TABLE {p}term_relationships (
        object_id INTEGER NOT NULL,
        term_taxonomy_id INTEGER NOT NULL,
        term_order INTEGER NOT NULL DEFAULT 0,
        PRIMARY KEY (object_id, term_taxonomy_id)
    );
    CREATE TABLE {p}postmeta (
        meta_id INTEGER PRIMARY KEY,
        post_id INTEGER NOT NULL,
        meta_key TEXT,
        meta_value TEXT
    );
";

/// An in-memory installation with the given sites and empty tables.
pub(crate) fn fixture_registry(site_ids: &[SiteId]) -> SqliteSiteRegistry {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!(
        "CREATE TABLE {PREFIX}blogs (blog_id INTEGER PRIMARY KEY, domain TEXT, path TEXT);"
    ))
    .unwrap();

    for id in site_ids {
        let prefix = site_table_prefix(PREFIX, *id);
        conn.execute_batch(&SITE_SCHEMA.replace("{p}", &prefix))
            .unwrap();
        conn.execute(
            &format!("INSERT INTO {PREFIX}blogs VALUES (?1, 'example.test', ?2)"),
            rusqlite::params![id, format!("/site{}/", id)],
        )
        .unwrap();
    }

    SqliteSiteRegistry::from_connection(conn, PREFIX, None)
}

/// Run `sql` with `{p}` replaced by the site's table prefix.
pub(crate) fn seed(registry: &SqliteSiteRegistry, site_id: SiteId, sql: &str) {
    registry
        .execute_batch(&sql.replace("{p}", &site_table_prefix(PREFIX, site_id)))
        .unwrap();
}

/// Count rows of a site's table.
pub(crate) fn count_rows(registry: &SqliteSiteRegistry, site_id: SiteId, base_table: &str) -> i64 {
    let session = registry.switch_to(site_id).unwrap();
    let table = session.table(base_table);
    let rows = session
        .query(&format!("SELECT COUNT(*) AS n FROM {table}"), &[])
        .unwrap();
    drop(session);
    registry.restore(site_id);
    rows[0].get_i64("n").unwrap()
}

/// Whether a relationship row is still present.
pub(crate) fn relationship_exists(
    registry: &SqliteSiteRegistry,
    site_id: SiteId,
    object_id: i64,
    term_taxonomy_id: i64,
) -> bool {
    let session = registry.switch_to(site_id).unwrap();
    let table = session.table("term_relationships");
    let rows = session
        .query(
            &format!("SELECT 1 AS hit FROM {table} WHERE object_id = ? AND term_taxonomy_id = ?"),
            &[SqlValue::from(object_id), SqlValue::from(term_taxonomy_id)],
        )
        .unwrap();
    drop(session);
    registry.restore(site_id);
    !rows.is_empty()
}

/// Wraps a registry and records every switch and restore, optionally failing
/// the switch for chosen sites.
pub(crate) struct RecordingSites {
    inner: SqliteSiteRegistry,
    failing: Vec<SiteId>,
    switches: Mutex<Vec<SiteId>>,
    restores: Mutex<Vec<SiteId>>,
    // Whether each open switch reached `inner`; injected failures did not.
    forwarded: Mutex<Vec<bool>>,
}

impl RecordingSites {
    pub(crate) fn new(inner: SqliteSiteRegistry) -> Self {
        Self {
            inner,
            failing: Vec::new(),
            switches: Mutex::new(Vec::new()),
            restores: Mutex::new(Vec::new()),
            forwarded: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn failing_on(mut self, site_ids: &[SiteId]) -> Self {
        self.failing = site_ids.to_vec();
        self
    }

    pub(crate) fn inner(&self) -> &SqliteSiteRegistry {
        &self.inner
    }

    pub(crate) fn switches(&self) -> Vec<SiteId> {
        self.switches.lock().clone()
    }

    pub(crate) fn restores(&self) -> Vec<SiteId> {
        self.restores.lock().clone()
    }
}

impl SiteRegistry for RecordingSites {
    fn list_sites(&self) -> Result<Vec<Site>, SiteError> {
        self.inner.list_sites()
    }

    fn switch_to(&self, site_id: SiteId) -> Result<Box<dyn StorageSession + '_>, SiteError> {
        self.switches.lock().push(site_id);
        let injected = self.failing.contains(&site_id);
        self.forwarded.lock().push(!injected);
        if injected {
            return Err(SiteError::SwitchFailed {
                site_id,
                message: "injected failure".to_string(),
            });
        }
        self.inner.switch_to(site_id)
    }

    fn restore(&self, site_id: SiteId) {
        self.restores.lock().push(site_id);
        if self.forwarded.lock().pop().unwrap_or(true) {
            self.inner.restore(site_id);
        }
    }
}
