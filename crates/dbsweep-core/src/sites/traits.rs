//! Site registry trait definition.

use crate::storage::StorageSession;

use super::errors::SiteError;
use super::types::{Site, SiteId};

/// Enumerates the sites of an installation and hands out per-site sessions.
///
/// `switch_to` and `restore` always come in pairs; use
/// [`super::SiteScope`] rather than calling them directly.
pub trait SiteRegistry: Send + Sync {
    /// All sites, in a stable order.
    fn list_sites(&self) -> Result<Vec<Site>, SiteError>;

    /// Make `site_id` the active site and return a session bound to it.
    fn switch_to(&self, site_id: SiteId) -> Result<Box<dyn StorageSession + '_>, SiteError>;

    /// Return to the site that was active before the matching `switch_to`.
    ///
    /// Called even when `switch_to` failed.
    fn restore(&self, site_id: SiteId);
}
