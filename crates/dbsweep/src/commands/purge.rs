use clap::ArgMatches;
use tracing::{error, info, warn};

use dbsweep_config::SweepConfig;
use dbsweep_core::{CleanupHandler, CleanupTypeRegistry};
use dbsweep_core::events;

use super::helpers::{format_partial_failure_error, open_sites, resolve_handler};
use super::json_types::SweepOutput;
use crate::{color, table};

pub(crate) fn handle_purge_command(
    matches: &ArgMatches,
    config: &SweepConfig,
    registry: &CleanupTypeRegistry,
) -> Result<(), Box<dyn std::error::Error>> {
    let category = matches
        .get_one::<String>("category")
        .ok_or("Category argument is required")?;
    let json_output = matches.get_flag("json");

    let handler = resolve_handler(registry, category)?;

    if !matches.get_flag("yes") {
        eprintln!(
            "{}",
            color::warning(&format!(
                "Purge deletes every '{}' row on every site. Re-run with --yes to confirm.",
                category
            ))
        );
        warn!(event = "cli.purge_unconfirmed", category = category.as_str());
        return Err("Purge not confirmed".into());
    }

    info!(event = "cli.purge_started", category = category.as_str());

    let sites = open_sites(config)?;

    let report = match handler.purge(&sites) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("{}", color::error(&format!("Failed to purge '{}': {}", category, e)));
            error!(event = "cli.purge_failed", category = category.as_str(), error = %e);
            events::log_app_error(&e);
            return Err(e.into());
        }
    };

    if json_output {
        let output = SweepOutput {
            category,
            operation: "purge",
            affected: report.affected(),
            complete: report.is_complete(),
            report: &report,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!(
            "Purged {} {} row(s) across {} site(s).",
            color::count(report.affected()),
            color::accent(category),
            report.sites.len()
        );
        table::print_report_table(&report);
    }

    if !report.is_complete() {
        let message = format_partial_failure_error("Purge", &report);
        eprintln!("{}", color::error(&message));
        warn!(
            event = "cli.purge_partial_failure",
            category = category.as_str(),
            failed_sites = report.failures().count()
        );
        return Err(message.into());
    }

    info!(
        event = "cli.purge_completed",
        category = category.as_str(),
        affected = report.affected()
    );
    Ok(())
}
