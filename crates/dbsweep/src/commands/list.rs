use clap::ArgMatches;
use tracing::{error, info};

use dbsweep_config::SweepConfig;
use dbsweep_core::events;
use dbsweep_core::{CleanupHandler, CleanupTypeRegistry, FindQuery, FindResult, SortDirection};

use super::helpers::{open_sites, resolve_handler};
use super::json_types::ListOutput;
use crate::{color, table};

pub(crate) fn handle_list_command(
    matches: &ArgMatches,
    config: &SweepConfig,
    registry: &CleanupTypeRegistry,
) -> Result<(), Box<dyn std::error::Error>> {
    let category = matches
        .get_one::<String>("category")
        .ok_or("Category argument is required")?;
    let json_output = matches.get_flag("json");

    let query = build_query(matches, config)?;

    info!(
        event = "cli.list_started",
        category = category.as_str(),
        page = query.page,
        page_size = query.page_size,
        json_output = json_output
    );

    let handler = resolve_handler(registry, category)?;
    let sites = open_sites(config)?;

    match handler.find(&sites, &query) {
        Ok(result) => {
            let pages = page_count(&result);
            if json_output {
                let output = ListOutput {
                    category,
                    pages,
                    result: &result,
                };
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else if result.rows.is_empty() {
                println!("No {} candidates found.", color::accent(category));
            } else {
                println!(
                    "{} candidates (page {} of {}, {} total):",
                    color::accent(category),
                    result.page,
                    pages,
                    color::bold(&result.total.to_string())
                );
                table::print_candidates_table(handler, &result.rows);
                println!(
                    "{}",
                    color::muted("Pass the Item column to `dbsweep delete` with --item.")
                );
            }

            info!(
                event = "cli.list_completed",
                category = category.as_str(),
                total = result.total,
                returned = result.rows.len()
            );
            Ok(())
        }
        Err(e) => {
            eprintln!("{}", color::error(&format!("Failed to list '{}': {}", category, e)));
            error!(event = "cli.list_failed", category = category.as_str(), error = %e);
            events::log_app_error(&e);
            Err(e.into())
        }
    }
}

fn build_query(
    matches: &ArgMatches,
    config: &SweepConfig,
) -> Result<FindQuery, Box<dyn std::error::Error>> {
    let page = matches.get_one::<u32>("page").copied().unwrap_or(1);
    let page_size = matches
        .get_one::<u32>("per-page")
        .copied()
        .unwrap_or(config.listing.page_size);

    if page_size > config.listing.max_page_size {
        eprintln!(
            "{}",
            color::error(&format!(
                "--per-page {} exceeds listing.max_page_size ({})",
                page_size, config.listing.max_page_size
            ))
        );
        error!(
            event = "cli.list_page_size_rejected",
            page_size = page_size,
            max_page_size = config.listing.max_page_size
        );
        return Err("Page size too large".into());
    }

    let mut query = FindQuery::new(page, page_size);

    if let Some(column) = matches.get_one::<String>("sort") {
        let direction = matches
            .get_one::<String>("dir")
            .map(|d| d.parse::<SortDirection>())
            .transpose()?
            .unwrap_or_default();
        query = query.sorted_by(column.as_str(), direction);
    }

    if let Some(site_id) = matches.get_one::<i64>("site") {
        query = query.for_site(*site_id);
    }

    if let Some(days) = matches.get_one::<u32>("older-than-days") {
        let cutoff = chrono::Local::now().naive_local() - chrono::Duration::days(i64::from(*days));
        query = query.older_than(cutoff);
    }

    Ok(query)
}

fn page_count(result: &FindResult) -> u64 {
    let page_size = u64::from(result.page_size.max(1));
    result.total.div_ceil(page_size).max(1)
}
