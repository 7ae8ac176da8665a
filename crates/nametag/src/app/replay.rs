use clap::{Arg, ArgAction, Command};

pub fn replay_command() -> Command {
    Command::new("replay")
        .about("Replay a scripted label session and print every sync message as JSON lines")
        .arg(
            Arg::new("script")
                .help("Path to the TOML script")
                .value_name("SCRIPT")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("summary")
                .long("summary")
                .help("Finish with a JSON line describing the final teams")
                .action(ArgAction::SetTrue),
        )
}
