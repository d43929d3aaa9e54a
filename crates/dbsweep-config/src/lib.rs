//! Configuration for dbsweep.
//!
//! Loaded from TOML. Every section has defaults, so an empty file (or no file
//! at all) yields a usable single-site configuration.

mod errors;
mod loading;
mod types;
mod validation;

pub use errors::ConfigError;
pub use loading::{CONFIG_ENV_VAR, default_config_path, load_config, load_config_from_path, parse_config};
pub use types::{
    DatabaseConfig, HandlersConfig, ListingConfig, SitesConfig, SweepConfig,
    UnusedRelationshipsConfig,
};
pub use validation::validate_config;
