use clap::{Arg, ArgAction, Command};

pub fn build_cli() -> Command {
    Command::new("dbsweep")
        .about("List and remove orphaned rows across every site of an installation")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging output")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .help("Path to a config file (overrides DBSWEEP_CONFIG and ~/.dbsweep/config.toml)")
                .value_name("PATH")
                .global(true),
        )
        .arg(
            Arg::new("no-color")
                .long("no-color")
                .help("Disable colored output")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(
            Command::new("types")
                .about("List the registered cleanup categories")
                .arg(json_arg()),
        )
        .subcommand(
            Command::new("list")
                .about("List candidate rows of a category across all sites")
                .arg(category_arg())
                .arg(
                    Arg::new("sort")
                        .long("sort")
                        .help("Column to sort by (see `dbsweep types` for each category's columns)")
                        .value_name("COLUMN"),
                )
                .arg(
                    Arg::new("dir")
                        .long("dir")
                        .help("Sort direction")
                        .value_parser(["asc", "desc"])
                        .default_value("asc"),
                )
                .arg(
                    Arg::new("page")
                        .long("page")
                        .help("Page number, starting at 1")
                        .value_parser(clap::value_parser!(u32).range(1..))
                        .default_value("1"),
                )
                .arg(
                    Arg::new("per-page")
                        .long("per-page")
                        .help("Rows per page (defaults to listing.page_size from config)")
                        .value_parser(clap::value_parser!(u32).range(1..)),
                )
                .arg(
                    Arg::new("site")
                        .long("site")
                        .help("Only list rows of this site")
                        .value_parser(clap::value_parser!(i64)),
                )
                .arg(
                    Arg::new("older-than-days")
                        .long("older-than-days")
                        .help("Only rows last modified more than N days ago")
                        .value_parser(clap::value_parser!(u32)),
                )
                .arg(json_arg()),
        )
        .subcommand(
            Command::new("delete")
                .about("Delete selected rows of a category")
                .arg(category_arg())
                .arg(
                    Arg::new("item")
                        .long("item")
                        .help("Row to delete as SITE:ID, or SITE:ID:TERM_TAXONOMY_ID for relationships")
                        .value_name("ITEM")
                        .action(ArgAction::Append)
                        .required(true),
                )
                .arg(json_arg()),
        )
        .subcommand(
            Command::new("purge")
                .about("Delete every matching row of a category on every site")
                .arg(category_arg())
                .arg(
                    Arg::new("yes")
                        .long("yes")
                        .help("Confirm the purge; nothing is deleted without it")
                        .action(ArgAction::SetTrue),
                )
                .arg(json_arg()),
        )
}

fn category_arg() -> Arg {
    Arg::new("category")
        .help("Cleanup category, e.g. unused_relationships")
        .required(true)
        .index(1)
}

fn json_arg() -> Arg {
    Arg::new("json")
        .long("json")
        .help("Output in JSON format")
        .action(ArgAction::SetTrue)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        build_cli().debug_assert();
    }

    #[test]
    fn test_list_defaults() {
        let matches = build_cli()
            .try_get_matches_from(vec!["dbsweep", "list", "unused_relationships"])
            .unwrap();
        let sub = matches.subcommand_matches("list").unwrap();
        assert_eq!(
            sub.get_one::<String>("category").unwrap(),
            "unused_relationships"
        );
        assert_eq!(sub.get_one::<String>("dir").unwrap(), "asc");
        assert_eq!(*sub.get_one::<u32>("page").unwrap(), 1);
        assert!(sub.get_one::<u32>("per-page").is_none());
        assert!(!sub.get_flag("json"));
    }

    #[test]
    fn test_list_with_options() {
        let matches = build_cli()
            .try_get_matches_from(vec![
                "dbsweep",
                "-v",
                "list",
                "revisions",
                "--sort",
                "post_modified",
                "--dir",
                "desc",
                "--page",
                "3",
                "--per-page",
                "50",
                "--older-than-days",
                "30",
                "--json",
            ])
            .unwrap();
        assert!(matches.get_flag("verbose"));
        let sub = matches.subcommand_matches("list").unwrap();
        assert_eq!(sub.get_one::<String>("sort").unwrap(), "post_modified");
        assert_eq!(sub.get_one::<String>("dir").unwrap(), "desc");
        assert_eq!(*sub.get_one::<u32>("page").unwrap(), 3);
        assert_eq!(*sub.get_one::<u32>("per-page").unwrap(), 50);
        assert_eq!(*sub.get_one::<u32>("older-than-days").unwrap(), 30);
        assert!(sub.get_flag("json"));
    }

    #[test]
    fn test_list_rejects_zero_page_and_bad_direction() {
        assert!(
            build_cli()
                .try_get_matches_from(vec!["dbsweep", "list", "revisions", "--page", "0"])
                .is_err()
        );
        assert!(
            build_cli()
                .try_get_matches_from(vec!["dbsweep", "list", "revisions", "--dir", "up"])
                .is_err()
        );
    }

    #[test]
    fn test_delete_collects_items() {
        let matches = build_cli()
            .try_get_matches_from(vec![
                "dbsweep",
                "delete",
                "unused_relationships",
                "--item",
                "1:10:1",
                "--item",
                "2:40:1",
            ])
            .unwrap();
        let sub = matches.subcommand_matches("delete").unwrap();
        let items: Vec<&String> = sub.get_many::<String>("item").unwrap().collect();
        assert_eq!(items, vec!["1:10:1", "2:40:1"]);
    }

    #[test]
    fn test_delete_requires_items() {
        assert!(
            build_cli()
                .try_get_matches_from(vec!["dbsweep", "delete", "revisions"])
                .is_err()
        );
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let matches = build_cli()
            .try_get_matches_from(vec![
                "dbsweep",
                "purge",
                "revisions",
                "--yes",
                "--config",
                "/tmp/sweep.toml",
                "--no-color",
            ])
            .unwrap();
        assert_eq!(
            matches.get_one::<String>("config").unwrap(),
            "/tmp/sweep.toml"
        );
        assert!(matches.get_flag("no-color"));
        assert!(matches.subcommand_matches("purge").unwrap().get_flag("yes"));
    }

    #[test]
    fn test_subcommand_required() {
        assert!(build_cli().try_get_matches_from(vec!["dbsweep"]).is_err());
    }
}
