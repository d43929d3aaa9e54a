pub mod errors;
pub mod scope;
pub mod sqlite;
pub mod traits;
pub mod types;

// Public API exports
pub use errors::SiteError;
pub use scope::{SiteScope, with_site};
pub use sqlite::SqliteSiteRegistry;
pub use traits::SiteRegistry;
pub use types::{Site, SiteId};
