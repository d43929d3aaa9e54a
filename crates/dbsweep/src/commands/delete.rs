use clap::ArgMatches;
use tracing::{error, info, warn};

use dbsweep_config::SweepConfig;
use dbsweep_core::events;
use dbsweep_core::{CleanupHandler, CleanupTypeRegistry, CompositeId};

use super::helpers::{format_partial_failure_error, open_sites, resolve_handler};
use super::json_types::SweepOutput;
use crate::{color, table};

pub(crate) fn handle_delete_command(
    matches: &ArgMatches,
    config: &SweepConfig,
    registry: &CleanupTypeRegistry,
) -> Result<(), Box<dyn std::error::Error>> {
    let category = matches
        .get_one::<String>("category")
        .ok_or("Category argument is required")?;
    let json_output = matches.get_flag("json");

    let handler = resolve_handler(registry, category)?;
    let items = parse_items(category, matches)?;

    info!(
        event = "cli.delete_started",
        category = category.as_str(),
        items = items.len()
    );

    let sites = open_sites(config)?;

    let report = match handler.delete(&sites, &items) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("{}", color::error(&format!("Failed to delete '{}' rows: {}", category, e)));
            error!(event = "cli.delete_failed", category = category.as_str(), error = %e);
            events::log_app_error(&e);
            return Err(e.into());
        }
    };

    if json_output {
        let output = SweepOutput {
            category,
            operation: "delete",
            affected: report.affected(),
            complete: report.is_complete(),
            report: &report,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!(
            "Deleted {} {} row(s) across {} site(s).",
            color::count(report.affected()),
            color::accent(category),
            report.sites.len()
        );
        if !report.sites.is_empty() {
            table::print_report_table(&report);
        }
    }

    if !report.is_complete() {
        let message = format_partial_failure_error("Delete", &report);
        eprintln!("{}", color::error(&message));
        warn!(
            event = "cli.delete_partial_failure",
            category = category.as_str(),
            failed_sites = report.failures().count()
        );
        return Err(message.into());
    }

    info!(
        event = "cli.delete_completed",
        category = category.as_str(),
        affected = report.affected()
    );
    Ok(())
}

fn parse_items(
    category: &str,
    matches: &ArgMatches,
) -> Result<Vec<CompositeId>, Box<dyn std::error::Error>> {
    matches
        .get_many::<String>("item")
        .into_iter()
        .flatten()
        .map(|spec| {
            CompositeId::parse(category, spec).map_err(|message| {
                eprintln!("{}", color::error(&message));
                error!(event = "cli.delete_invalid_item", item = spec.as_str());
                Box::<dyn std::error::Error>::from(message)
            })
        })
        .collect()
}
