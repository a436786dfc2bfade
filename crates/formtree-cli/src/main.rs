//! `formtree` command line

mod commands;
mod telemetry;

use anyhow::Context;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;

fn path_arg(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name)
        .long(name)
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help(help)
}

fn cli() -> Command {
    Command::new("formtree")
        .version(formtree_blocks::VERSION)
        .about("Check, normalise and save documents against formtree layouts")
        .arg_required_else_help(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count)
                .global(true)
                .help("Increase log verbosity (repeatable)"),
        )
        .arg(
            Arg::new("log-format")
                .long("log-format")
                .default_value("text")
                .value_parser(["text", "json"])
                .global(true)
                .help("Log line format"),
        )
        .subcommand(
            Command::new("check")
                .about("Validate a JSON document against a layout; exits 1 when invalid")
                .arg(path_arg("layout", "Layout document (JSON, YAML or TOML)"))
                .arg(path_arg("data", "JSON document to validate"))
                .arg(
                    Arg::new("scope")
                        .long("scope")
                        .help("Validation scope (activates scoped rules)"),
                ),
        )
        .subcommand(
            Command::new("roundtrip")
                .about("Distribute a document into a layout and print what it collects")
                .arg(path_arg("layout", "Layout document (JSON, YAML or TOML)"))
                .arg(path_arg("data", "JSON document to distribute")),
        )
        .subcommand(
            Command::new("save")
                .about("Create or update a record in a JSON file store")
                .arg(path_arg("layout", "Layout document (JSON, YAML or TOML)"))
                .arg(path_arg("store", "JSON file holding the record"))
                .arg(path_arg("data", "JSON document with the edited values"))
                .arg(
                    Arg::new("config")
                        .long("config")
                        .value_parser(value_parser!(PathBuf))
                        .help("CRUD configuration (TOML)"),
                )
                .arg(
                    Arg::new("update")
                        .long("update")
                        .action(ArgAction::SetTrue)
                        .help("Edit the stored record instead of inserting a new one"),
                ),
        )
}

fn path<'a>(args: &'a ArgMatches, name: &str) -> anyhow::Result<&'a PathBuf> {
    args.get_one::<PathBuf>(name)
        .with_context(|| format!("missing --{name}"))
}

async fn run(matches: &ArgMatches) -> anyhow::Result<i32> {
    match matches.subcommand() {
        Some(("check", args)) => commands::check(
            path(args, "layout")?,
            path(args, "data")?,
            args.get_one::<String>("scope").map(String::as_str),
        ),
        Some(("roundtrip", args)) => commands::roundtrip(path(args, "layout")?, path(args, "data")?),
        Some(("save", args)) => {
            commands::save(commands::SaveOptions {
                layout: path(args, "layout")?,
                store: path(args, "store")?,
                data: path(args, "data")?,
                config: args.get_one::<PathBuf>("config").map(PathBuf::as_path),
                update: args.get_flag("update"),
            })
            .await
        }
        _ => Ok(2),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let matches = cli().get_matches();

    let format = matches
        .get_one::<String>("log-format")
        .map_or(telemetry::LogFormat::Text, |name| telemetry::LogFormat::parse(name));
    telemetry::init(matches.get_count("verbose"), format)?;

    let code = run(&matches).await?;
    std::process::exit(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        cli().debug_assert();
    }

    #[test]
    fn parses_save_flags() {
        let matches = cli()
            .try_get_matches_from([
                "formtree", "-vv", "save", "--layout", "l.yaml", "--store", "s.json", "--data",
                "d.json", "--update",
            ])
            .unwrap();
        assert_eq!(matches.get_count("verbose"), 2);
        let (name, args) = matches.subcommand().unwrap();
        assert_eq!(name, "save");
        assert!(args.get_flag("update"));
        assert_eq!(path(args, "store").unwrap(), &PathBuf::from("s.json"));
    }

    #[test]
    fn requires_paths() {
        assert!(cli()
            .try_get_matches_from(["formtree", "check", "--layout", "l.yaml"])
            .is_err());
    }
}
