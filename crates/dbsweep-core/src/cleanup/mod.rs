pub mod errors;
pub mod handler;
pub mod operations;
pub mod registry;
pub mod types;

// Public API exports
pub use errors::CleanupError;
pub use handler::CleanupHandler;
pub use registry::CleanupTypeRegistry;
pub use types::{
    CandidateRow, CompositeId, DeleteStrategy, FindQuery, FindResult, Predicate, SiteOutcome,
    SortDirection, SweepReport,
};
