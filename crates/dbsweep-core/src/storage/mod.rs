pub mod errors;
pub mod sqlite;
pub mod traits;
pub mod types;

// Public API exports
pub use errors::StorageError;
pub use sqlite::SqliteSession;
pub use traits::StorageSession;
pub use types::{Row, SqlValue};
