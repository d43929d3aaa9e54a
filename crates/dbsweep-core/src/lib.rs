//! Core library for dbsweep.
//!
//! A cleanup handler identifies one category of unwanted rows, lists them
//! with sorting and paging, deletes an operator-selected subset, and purges
//! everything that matches. Every operation runs the same statements against
//! each site of a multi-site installation in turn.

pub mod cleanup;
pub mod errors;
pub mod events;
pub mod handlers;
mod logging;
pub mod sites;
pub mod storage;

#[cfg(test)]
pub(crate) mod test_support;

pub use cleanup::{
    CandidateRow, CleanupError, CleanupHandler, CleanupTypeRegistry, CompositeId, DeleteStrategy,
    FindQuery, FindResult, Predicate, SiteOutcome, SortDirection, SweepReport,
};
pub use errors::SweepError;
pub use handlers::builtin_registry;
pub use logging::init_logging;
pub use sites::{Site, SiteError, SiteId, SiteRegistry, SiteScope, SqliteSiteRegistry};
pub use storage::{Row, SqlValue, StorageError, StorageSession};
