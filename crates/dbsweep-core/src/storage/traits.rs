//! Storage session trait definition.

use crate::sites::SiteId;

use super::errors::StorageError;
use super::types::{Row, SqlValue};

/// A handle to one site's tables.
///
/// Returned by [`crate::sites::SiteRegistry::switch_to`] and valid until the
/// owning [`crate::sites::SiteScope`] is dropped. Every literal value goes
/// through `params`; only handler-authored SQL fragments and table names
/// resolved by [`StorageSession::table`] are spliced into statement text.
pub trait StorageSession {
    /// The site this session is bound to.
    fn site_id(&self) -> SiteId;

    /// Resolve a base table name (e.g. `posts`) to this site's physical table.
    fn table(&self, base: &str) -> String;

    /// Run a statement that returns rows.
    fn query(&self, sql: &str, params: &[SqlValue]) -> Result<Vec<Row>, StorageError>;

    /// Run a statement and return the number of affected rows.
    fn execute(&self, sql: &str, params: &[SqlValue]) -> Result<u64, StorageError>;

    /// Run `work` as one unit: its writes are kept only if it returns `Ok`.
    fn atomically(
        &self,
        work: &mut dyn FnMut(&dyn StorageSession) -> Result<u64, StorageError>,
    ) -> Result<u64, StorageError>;
}
