use parking_lot::ReentrantMutexGuard;
use rusqlite::types::{ToSqlOutput, Value, ValueRef};
use rusqlite::{Connection, ToSql, params_from_iter};
use tracing::{debug, warn};

use crate::sites::SiteId;

use super::errors::StorageError;
use super::traits::StorageSession;
use super::types::{Row, SqlValue};

const SITE_SAVEPOINT: &str = "dbsweep_site";

impl ToSql for SqlValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            SqlValue::Null => ToSqlOutput::Owned(Value::Null),
            SqlValue::Integer(i) => ToSqlOutput::Owned(Value::Integer(*i)),
            SqlValue::Real(r) => ToSqlOutput::Owned(Value::Real(*r)),
            SqlValue::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
        })
    }
}

fn read_value(value: ValueRef<'_>) -> SqlValue {
    match value {
        ValueRef::Null => SqlValue::Null,
        ValueRef::Integer(i) => SqlValue::Integer(i),
        ValueRef::Real(r) => SqlValue::Real(r),
        // Blobs are listed, never matched on, so a lossy rendering is enough.
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            SqlValue::Text(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}

/// A session on one site of a SQLite-backed installation.
///
/// Holds the registry's connection lock for its whole lifetime, so statements
/// from different sessions never interleave across threads.
pub struct SqliteSession<'a> {
    conn: ReentrantMutexGuard<'a, Connection>,
    site_id: SiteId,
    table_prefix: String,
}

impl<'a> SqliteSession<'a> {
    pub(crate) fn new(
        conn: ReentrantMutexGuard<'a, Connection>,
        site_id: SiteId,
        table_prefix: String,
    ) -> Self {
        Self {
            conn,
            site_id,
            table_prefix,
        }
    }
}

impl StorageSession for SqliteSession<'_> {
    fn site_id(&self) -> SiteId {
        self.site_id
    }

    fn table(&self, base: &str) -> String {
        format!("{}{}", self.table_prefix, base)
    }

    fn query(&self, sql: &str, params: &[SqlValue]) -> Result<Vec<Row>, StorageError> {
        let mut stmt = self.conn.prepare(sql)?;
        let names: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

        let mut rows = stmt.query(params_from_iter(params.iter()))?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            let mut record = Row::new();
            for (idx, name) in names.iter().enumerate() {
                let value = row
                    .get_ref(idx)
                    .map_err(|_| StorageError::UnreadableColumn {
                        column: name.clone(),
                    })?;
                record.insert(name.as_str(), read_value(value));
            }
            records.push(record);
        }

        debug!(
            event = "core.storage.query_completed",
            site_id = self.site_id,
            rows = records.len()
        );

        Ok(records)
    }

    fn execute(&self, sql: &str, params: &[SqlValue]) -> Result<u64, StorageError> {
        let affected = self.conn.execute(sql, params_from_iter(params.iter()))?;

        debug!(
            event = "core.storage.execute_completed",
            site_id = self.site_id,
            affected = affected
        );

        Ok(affected as u64)
    }

    fn atomically(
        &self,
        work: &mut dyn FnMut(&dyn StorageSession) -> Result<u64, StorageError>,
    ) -> Result<u64, StorageError> {
        // Savepoints rather than BEGIN so nested sessions on the same
        // connection compose.
        self.conn
            .execute_batch(&format!("SAVEPOINT {SITE_SAVEPOINT}"))?;

        match work(self) {
            Ok(affected) => {
                self.conn
                    .execute_batch(&format!("RELEASE SAVEPOINT {SITE_SAVEPOINT}"))?;
                Ok(affected)
            }
            Err(e) => {
                if let Err(rollback_err) = self.conn.execute_batch(&format!(
                    "ROLLBACK TO SAVEPOINT {SITE_SAVEPOINT}; RELEASE SAVEPOINT {SITE_SAVEPOINT}"
                )) {
                    warn!(
                        event = "core.storage.rollback_failed",
                        site_id = self.site_id,
                        error = %rollback_err
                    );
                }
                Err(e)
            }
        }
    }
}
