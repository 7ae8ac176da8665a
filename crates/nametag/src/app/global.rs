use clap::{Arg, ArgAction, Command};

pub fn root_command() -> Command {
    Command::new("nametag")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Bucket prefix/suffix labels into shared teams and keep observers in sync")
        .long_about("nametag binds each labeled subject to a small-integer-named team whose prefix and suffix render around the subject's name. The CLI replays scripted sessions against an in-memory group and prints every sync message an observer would receive.")
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
                .help("Read configuration from this file instead of the config hierarchy")
                .value_name("PATH")
                .global(true),
        )
        .subcommand_required(true)
        .arg_required_else_help(true)
}
