use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::builder::PossibleValuesParser;
use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};
use savor_types::DemoRole;
use tracing_subscriber::EnvFilter;

mod cart_cmd;
mod demo_cmd;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let matches = build_cli().get_matches();

    match matches.subcommand() {
        Some(("demo", sub)) => demo_cmd::run(sub).await,
        Some(("cart", sub)) => cart_cmd::run(sub).await,
        other => bail!("unsupported command: {:?}", other.map(|(name, _)| name)),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn role_arg(required: bool) -> Arg {
    Arg::new("role")
        .required(required)
        .value_parser(PossibleValuesParser::new(["user", "admin"]))
        .help("Demo account and script")
}

/// Role argument, when given.
pub(crate) fn parse_role(matches: &ArgMatches) -> Result<Option<DemoRole>> {
    matches
        .get_one::<String>("role")
        .map(|raw| raw.parse::<DemoRole>().map_err(anyhow::Error::from))
        .transpose()
}

fn build_cli() -> Command {
    let demo = Command::new("demo")
        .about("Play scripted storefront demos")
        .subcommand_required(true)
        .subcommand(Command::new("list").about("List the shipped demo scripts"))
        .subcommand(Command::new("show").about("Print a shipped script as YAML").arg(role_arg(true)))
        .subcommand(
            Command::new("run")
                .about("Play a demo against the headless storefront page")
                .arg(role_arg(false))
                .arg(
                    Arg::new("file")
                        .long("file")
                        .short('f')
                        .action(ArgAction::Set)
                        .value_parser(value_parser!(PathBuf))
                        .help("Path to a YAML/JSON demo script"),
                )
                .arg(
                    Arg::new("speed")
                        .long("speed")
                        .short('s')
                        .action(ArgAction::Set)
                        .value_parser(value_parser!(f64))
                        .help("Playback speed multiplier (presets: 0.5, 1, 2)"),
                )
                .arg(
                    Arg::new("api")
                        .long("api")
                        .action(ArgAction::SetTrue)
                        .help("Sign in with a demo account before playing"),
                ),
        )
        .subcommand(
            Command::new("speed").about("Save the preferred playback speed").arg(
                Arg::new("speed")
                    .required(true)
                    .value_parser(value_parser!(f64))
                    .help("Positive multiplier"),
            ),
        )
        .subcommand(Command::new("role").about("Save the preferred demo role").arg(role_arg(true)));

    let cart = Command::new("cart")
        .about("Manage the guest cart")
        .subcommand_required(true)
        .subcommand(Command::new("show").about("Print the guest cart"))
        .subcommand(
            Command::new("add")
                .about("Add a product to the cart")
                .arg(Arg::new("id").required(true).help("Product id"))
                .arg(Arg::new("title").long("title").action(ArgAction::Set).help("Product title"))
                .arg(
                    Arg::new("price")
                        .long("price")
                        .required(true)
                        .action(ArgAction::Set)
                        .value_parser(value_parser!(f64)),
                )
                .arg(
                    Arg::new("quantity")
                        .long("quantity")
                        .short('q')
                        .action(ArgAction::Set)
                        .default_value("1")
                        .value_parser(value_parser!(u32).range(1..)),
                ),
        )
        .subcommand(
            Command::new("remove")
                .about("Remove a product from the cart")
                .arg(Arg::new("id").required(true)),
        )
        .subcommand(Command::new("clear").about("Empty the guest cart"))
        .subcommand(
            Command::new("sync")
                .about("Sign in with a demo account and merge the guest cart into it")
                .arg(role_arg(false)),
        );

    Command::new("savor")
        .about("Savor storefront demo runner")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(demo)
        .subcommand(cart)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_tree_is_consistent() {
        build_cli().debug_assert();
    }

    #[test]
    fn parses_demo_run_flags() {
        let matches = build_cli()
            .try_get_matches_from(["savor", "demo", "run", "admin", "--speed", "2", "--api"])
            .unwrap();
        let (_, demo) = matches.subcommand().unwrap();
        let (_, run) = demo.subcommand().unwrap();
        assert_eq!(parse_role(run).unwrap(), Some(DemoRole::Admin));
        assert_eq!(run.get_one::<f64>("speed"), Some(&2.0));
        assert!(run.get_flag("api"));
    }

    #[test]
    fn rejects_unknown_roles_and_zero_quantities() {
        assert!(build_cli().try_get_matches_from(["savor", "demo", "show", "guest"]).is_err());
        assert!(
            build_cli()
                .try_get_matches_from(["savor", "cart", "add", "p1", "--price", "3", "-q", "0"])
                .is_err()
        );
    }
}
