use clap::ArgMatches;
use tracing::error;

use dbsweep_core::events;

use crate::color;

mod delete;
mod helpers;
mod json_types;
mod list;
mod purge;
mod types;

pub fn run_command(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    events::log_app_startup();

    let config = helpers::load_config(matches)?;
    let registry = match dbsweep_core::builtin_registry(&config) {
        Ok(registry) => registry,
        Err(e) => {
            eprintln!("{}", color::error(&format!("Failed to register handlers: {}", e)));
            error!(event = "cli.registry_failed", error = %e);
            events::log_app_error(&e);
            return Err(e.into());
        }
    };

    match matches.subcommand() {
        Some(("types", sub_matches)) => types::handle_types_command(sub_matches, &registry),
        Some(("list", sub_matches)) => list::handle_list_command(sub_matches, &config, &registry),
        Some(("delete", sub_matches)) => {
            delete::handle_delete_command(sub_matches, &config, &registry)
        }
        Some(("purge", sub_matches)) => purge::handle_purge_command(sub_matches, &config, &registry),
        _ => {
            error!(event = "cli.command_unknown");
            Err("Unknown command".into())
        }
    }
}
