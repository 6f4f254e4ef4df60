//! rosterctl - fairness rankings and configuration from seed data

use anyhow::{bail, Context};
use clap::{value_parser, Arg, Command};
use roster_core::{RosterConfig, RosterService, SavedRoster, SeedDocument};
use roster_store::{EntityStore, MemoryStore, RosterQuery};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    let config_arg = Arg::new("config")
        .long("config")
        .value_parser(value_parser!(PathBuf))
        .help("Configuration file (TOML)");

    Command::new("rosterctl")
        .version(roster_core::VERSION)
        .about("Roster finalization and fairness ordering")
        .subcommand_required(true)
        .subcommand(
            Command::new("rank")
                .about("Seed an in-memory store, finalize a roster and print its rankings")
                .arg(
                    Arg::new("seed")
                        .long("seed")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Seed document (TOML)"),
                )
                .arg(config_arg.clone())
                .arg(
                    Arg::new("roster")
                        .long("roster")
                        .required(true)
                        .help("Name of the roster to finalize"),
                ),
        )
        .subcommand(
            Command::new("config")
                .about("Print the effective configuration")
                .arg(config_arg),
        )
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<RosterConfig> {
    match path {
        Some(path) => RosterConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display())),
        None => Ok(RosterConfig::default()),
    }
}

/// Seed a fresh store, finalize the latest roster named `roster_name`
/// and return its assignments with rankings
async fn rank(seed: &Path, config: RosterConfig, roster_name: &str) -> anyhow::Result<SavedRoster> {
    let document = SeedDocument::load(seed)
        .with_context(|| format!("loading seed from {}", seed.display()))?;
    let store = Arc::new(MemoryStore::new());
    document.apply(store.as_ref(), &config).await?;

    let Some(roster) = store
        .list_rosters(&RosterQuery::all())
        .await?
        .into_iter()
        .filter(|r| r.name == roster_name)
        .max_by_key(|r| r.date)
    else {
        bail!("no roster named {roster_name:?} in {}", seed.display());
    };

    let service = RosterService::new(store, config);
    service.finalize(roster.id).await?;
    Ok(service.get_assignments(roster.id).await?)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let matches = cli().get_matches();

    match matches.subcommand() {
        Some(("rank", args)) => {
            let config = load_config(args.get_one::<PathBuf>("config"))?;
            let seed = args
                .get_one::<PathBuf>("seed")
                .context("--seed is required")?;
            let roster = args
                .get_one::<String>("roster")
                .context("--roster is required")?;

            let saved = rank(seed, config, roster).await?;
            println!("{}", serde_json::to_string_pretty(&saved)?);
        }
        Some(("config", args)) => {
            let config = load_config(args.get_one::<PathBuf>("config"))?;
            print!("{}", config.to_toml_string()?);
        }
        _ => {}
    }

    Ok(())
}
