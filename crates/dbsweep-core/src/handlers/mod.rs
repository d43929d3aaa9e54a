pub mod revisions;
pub mod unused_postmeta;
pub mod unused_relationships;

use dbsweep_config::SweepConfig;
use tracing::info;

use crate::cleanup::{CleanupError, CleanupTypeRegistry};

pub use revisions::RevisionsHandler;
pub use unused_postmeta::UnusedPostmetaHandler;
pub use unused_relationships::UnusedRelationshipsHandler;

/// Registry holding every built-in cleanup category, configured from `config`.
pub fn builtin_registry(config: &SweepConfig) -> Result<CleanupTypeRegistry, CleanupError> {
    let mut registry = CleanupTypeRegistry::new();

    registry.register(
        unused_relationships::ITEMS_TYPE,
        Box::new(UnusedRelationshipsHandler::from_config(
            &config.handlers.unused_relationships,
        )),
    )?;
    registry.register(unused_postmeta::ITEMS_TYPE, Box::new(UnusedPostmetaHandler))?;
    registry.register(revisions::ITEMS_TYPE, Box::new(RevisionsHandler))?;

    info!(
        event = "core.cleanup.registry_built",
        categories = ?registry.categories()
    );

    Ok(registry)
}
