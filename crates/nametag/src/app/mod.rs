mod config;
mod global;
mod replay;


use clap::Command;

pub fn build_cli() -> Command {
    global::root_command()
        .subcommand(replay::replay_command())
        .subcommand(config::config_command())
}
