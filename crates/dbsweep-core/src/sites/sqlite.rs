use dbsweep_config::{DatabaseConfig, SitesConfig};
use parking_lot::{Mutex, ReentrantMutex};
use rusqlite::Connection;
use tracing::{debug, info};

use crate::storage::{SqlValue, SqliteSession, StorageError, StorageSession};

use super::errors::SiteError;
use super::traits::SiteRegistry;
use super::types::{MAIN_SITE_ID, Site, SiteId, site_table_prefix};

/// Site registry over a single SQLite database laid out like a multi-site
/// install: the main site's tables use the bare prefix, every other site
/// uses `{prefix}{id}_`, and `{prefix}blogs` lists the sites.
pub struct SqliteSiteRegistry {
    conn: ReentrantMutex<Connection>,
    table_prefix: String,
    site_ids: Option<Vec<SiteId>>,
    active: Mutex<Vec<Frame>>,
}

/// One `switch_to` awaiting its `restore`. Failed switches get a frame too,
/// so their restore never pops an enclosing scope on the same site.
#[derive(Debug, Clone, Copy)]
struct Frame {
    site_id: SiteId,
    entered: bool,
}

impl SqliteSiteRegistry {
    /// Open the configured database file (in-memory when no path is set).
    pub fn open(database: &DatabaseConfig, sites: &SitesConfig) -> Result<Self, SiteError> {
        let conn = match database.path() {
            Some(path) => Connection::open(path),
            None => Connection::open_in_memory(),
        }
        .map_err(|e| SiteError::OpenFailed {
            message: e.to_string(),
        })?;

        info!(
            event = "core.sites.database_opened",
            path = ?database.path(),
            table_prefix = database.table_prefix()
        );

        Ok(Self::from_connection(
            conn,
            database.table_prefix(),
            sites.ids().map(<[SiteId]>::to_vec),
        ))
    }

    pub fn from_connection(
        conn: Connection,
        table_prefix: impl Into<String>,
        site_ids: Option<Vec<SiteId>>,
    ) -> Self {
        Self {
            conn: ReentrantMutex::new(conn),
            table_prefix: table_prefix.into(),
            site_ids,
            active: Mutex::new(Vec::new()),
        }
    }

    /// The innermost active site, if any.
    pub fn active_site(&self) -> Option<SiteId> {
        self.active
            .lock()
            .iter()
            .rev()
            .find(|frame| frame.entered)
            .map(|frame| frame.site_id)
    }

    /// Run raw SQL against the database outside any site context.
    pub fn execute_batch(&self, sql: &str) -> Result<(), StorageError> {
        self.conn.lock().execute_batch(sql)?;
        Ok(())
    }

    fn open_site(&self, site_id: SiteId) -> Result<SqliteSession<'_>, SiteError> {
        if !self.list_sites()?.iter().any(|site| site.id == site_id) {
            return Err(SiteError::UnknownSite { site_id });
        }

        Ok(SqliteSession::new(
            self.conn.lock(),
            site_id,
            site_table_prefix(&self.table_prefix, site_id),
        ))
    }

    fn main_session(&self) -> SqliteSession<'_> {
        SqliteSession::new(self.conn.lock(), MAIN_SITE_ID, self.table_prefix.clone())
    }

    fn discover_sites(&self) -> Result<Vec<Site>, StorageError> {
        let session = self.main_session();
        let blogs = session.table("blogs");

        let exists = session.query(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?",
            &[SqlValue::from(blogs.as_str())],
        )?;
        if exists.is_empty() {
            return Ok(Vec::new());
        }

        let rows = session.query(
            &format!("SELECT blog_id, domain, path FROM {blogs} ORDER BY blog_id"),
            &[],
        )?;

        Ok(rows
            .into_iter()
            .filter_map(|row| {
                let id = row.get_i64("blog_id")?;
                let text = |column: &str| {
                    row.get(column)
                        .and_then(SqlValue::as_str)
                        .unwrap_or_default()
                        .to_string()
                };
                Some(Site::new(id, text("domain"), text("path")))
            })
            .collect())
    }
}

impl SiteRegistry for SqliteSiteRegistry {
    fn list_sites(&self) -> Result<Vec<Site>, SiteError> {
        let discovered = self.discover_sites()?;

        let sites = match &self.site_ids {
            Some(ids) => ids
                .iter()
                .map(|id| {
                    discovered
                        .iter()
                        .find(|site| site.id == *id)
                        .cloned()
                        .unwrap_or_else(|| Site::bare(*id))
                })
                .collect(),
            None if discovered.is_empty() => vec![Site::bare(MAIN_SITE_ID)],
            None => discovered,
        };

        debug!(event = "core.sites.listed", count = sites.len());

        Ok(sites)
    }

    fn switch_to(&self, site_id: SiteId) -> Result<Box<dyn StorageSession + '_>, SiteError> {
        let opened = self.open_site(site_id);
        self.active.lock().push(Frame {
            site_id,
            entered: opened.is_ok(),
        });
        let session = opened?;

        debug!(event = "core.sites.switched", site_id = site_id);

        Ok(Box::new(session))
    }

    fn restore(&self, site_id: SiteId) {
        let mut active = self.active.lock();
        match active.last() {
            Some(frame) if frame.site_id == site_id => {
                active.pop();
            }
            top => {
                debug!(
                    event = "core.sites.restore_unmatched",
                    site_id = site_id,
                    top = ?top.map(|frame| frame.site_id)
                );
            }
        }
    }
}
