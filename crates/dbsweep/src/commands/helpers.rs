use std::path::PathBuf;

use clap::ArgMatches;
use tracing::error;

use dbsweep_config::SweepConfig;
use dbsweep_core::events;
use dbsweep_core::{CleanupHandler, CleanupTypeRegistry, SqliteSiteRegistry, SweepReport};

use crate::color;

/// Load configuration honoring the global `--config` flag.
pub(crate) fn load_config(matches: &ArgMatches) -> Result<SweepConfig, Box<dyn std::error::Error>> {
    let explicit = matches.get_one::<String>("config").map(PathBuf::from);

    dbsweep_config::load_config(explicit.as_deref()).map_err(|e| {
        eprintln!("{}", color::error(&format!("Failed to load config: {}", e)));
        error!(event = "cli.config_load_failed", error = %e);
        events::log_app_error(&e);
        e.into()
    })
}

/// Look up a category, reporting unknown ones with the list of valid keys.
pub(crate) fn resolve_handler<'r>(
    registry: &'r CleanupTypeRegistry,
    category: &str,
) -> Result<&'r dyn CleanupHandler, Box<dyn std::error::Error>> {
    registry.get(category).map_err(|e| {
        eprintln!("{}", color::error(&e.to_string()));
        eprintln!(
            "{}",
            color::muted(&format!("Known categories: {}", registry.categories().join(", ")))
        );
        error!(event = "cli.category_unknown", category = category);
        events::log_app_error(&e);
        e.into()
    })
}

pub(crate) fn open_sites(
    config: &SweepConfig,
) -> Result<SqliteSiteRegistry, Box<dyn std::error::Error>> {
    SqliteSiteRegistry::open(&config.database, &config.sites).map_err(|e| {
        eprintln!("{}", color::error(&format!("Failed to open database: {}", e)));
        error!(event = "cli.database_open_failed", error = %e);
        events::log_app_error(&e);
        e.into()
    })
}

/// Error for a sweep that left some sites unprocessed.
pub(crate) fn format_partial_failure_error(operation: &str, report: &SweepReport) -> String {
    let failed: Vec<String> = report
        .failures()
        .map(|site| {
            format!(
                "site {}: {}",
                site.site_id,
                site.error.as_deref().unwrap_or("unknown error")
            )
        })
        .collect();
    format!(
        "{} incomplete: {} of {} site(s) failed ({})",
        operation,
        failed.len(),
        report.sites.len(),
        failed.join("; ")
    )
}
