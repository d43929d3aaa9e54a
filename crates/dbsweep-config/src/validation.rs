use crate::errors::ConfigError;
use crate::types::SweepConfig;

/// Validate a parsed configuration.
///
/// The table prefix is spliced into SQL identifiers, so it is restricted to
/// ASCII alphanumerics and underscores.
pub fn validate_config(config: &SweepConfig) -> Result<(), ConfigError> {
    let prefix = config.database.table_prefix();
    if prefix.is_empty() {
        return Err(invalid("database.table_prefix must not be empty"));
    }
    if !prefix
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(invalid(format!(
            "database.table_prefix '{}' may only contain letters, digits, and underscores",
            prefix
        )));
    }

    if let Some(ids) = config.sites.ids() {
        if ids.is_empty() {
            return Err(invalid("sites.ids must list at least one site when set"));
        }
        if let Some(bad) = ids.iter().find(|id| **id < 1) {
            return Err(invalid(format!("sites.ids contains non-positive id {}", bad)));
        }
    }

    let listing = &config.listing;
    if listing.max_page_size == 0 {
        return Err(invalid("listing.max_page_size must be positive"));
    }
    if listing.page_size == 0 || listing.page_size > listing.max_page_size {
        return Err(invalid(format!(
            "listing.page_size must be between 1 and {}",
            listing.max_page_size
        )));
    }

    if config.handlers.unused_relationships.term_taxonomy_id < 1 {
        return Err(invalid(
            "handlers.unused_relationships.term_taxonomy_id must be positive",
        ));
    }

    Ok(())
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::InvalidConfiguration {
        message: message.into(),
    }
}
