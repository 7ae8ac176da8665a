use clap::ArgMatches;
use serde::Serialize;
use tracing::info;

use nametag_config::{LogFormat, NametagConfig};

/// Config with every default filled in.
#[derive(Debug, Serialize)]
struct EffectiveConfig<'a> {
    teams: EffectiveTeams<'a>,
    logging: EffectiveLogging<'a>,
}

#[derive(Debug, Serialize)]
struct EffectiveTeams<'a> {
    name_prefix: &'a str,
}

#[derive(Debug, Serialize)]
struct EffectiveLogging<'a> {
    format: LogFormat,
    filter: &'a str,
    to_file: bool,
}

impl<'a> From<&'a NametagConfig> for EffectiveConfig<'a> {
    fn from(config: &'a NametagConfig) -> Self {
        Self {
            teams: EffectiveTeams {
                name_prefix: config.teams.name_prefix(),
            },
            logging: EffectiveLogging {
                format: config.logging.format(),
                filter: config.logging.filter(),
                to_file: config.logging.to_file(),
            },
        }
    }
}

pub(crate) fn handle_config_command(
    matches: &ArgMatches,
    config: &NametagConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let json_output = matches.get_flag("json");
    info!(event = "cli.config_started", json_output = json_output);

    let effective = EffectiveConfig::from(config);
    if json_output {
        println!("{}", serde_json::to_string_pretty(&effective)?);
    } else {
        print!("{}", toml::to_string_pretty(&effective)?);
    }

    info!(event = "cli.config_completed");
    Ok(())
}
