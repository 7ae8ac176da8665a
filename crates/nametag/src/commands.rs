use std::path::Path;

use clap::ArgMatches;
use tracing::error;

use nametag_config::{ConfigError, NametagConfig};

mod config;
mod replay;

use config::handle_config_command;
use replay::handle_replay_command;

/// Effective configuration: the `--config` file if given, the hierarchy
/// otherwise.
pub fn load_config(matches: &ArgMatches) -> Result<NametagConfig, ConfigError> {
    match matches.get_one::<String>("config") {
        Some(path) => NametagConfig::load_from_path(Path::new(path)),
        None => NametagConfig::load_hierarchy(),
    }
}

pub fn run_command(
    matches: &ArgMatches,
    config: &NametagConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    match matches.subcommand() {
        Some(("replay", sub_matches)) => handle_replay_command(sub_matches, config),
        Some(("config", sub_matches)) => handle_config_command(sub_matches, config),
        _ => {
            error!(event = "cli.command_unknown");
            Err("Unknown command".into())
        }
    }
}
