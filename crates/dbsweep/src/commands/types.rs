use clap::ArgMatches;
use tracing::info;

use dbsweep_core::{CleanupHandler, CleanupTypeRegistry};

use super::json_types::CategoryInfo;
use crate::table;

pub(crate) fn handle_types_command(
    matches: &ArgMatches,
    registry: &CleanupTypeRegistry,
) -> Result<(), Box<dyn std::error::Error>> {
    let json_output = matches.get_flag("json");
    info!(event = "cli.types_started", json_output = json_output);

    let handlers: Vec<&dyn CleanupHandler> = registry.handlers().collect();

    if json_output {
        let infos: Vec<CategoryInfo<'_>> = handlers
            .iter()
            .map(|h| CategoryInfo {
                category: h.items_type(),
                table: h.table(),
                primary_key: h.pk(),
                sortable_columns: h.sortable_columns(),
                date_column: h.date_column(),
                all_sites_sortable: h.is_all_sites_sortable(),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&infos)?);
    } else {
        println!("Cleanup categories:");
        table::print_types_table(&handlers);
    }

    info!(event = "cli.types_completed", count = handlers.len());
    Ok(())
}
