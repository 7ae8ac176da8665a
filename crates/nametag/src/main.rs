use nametag_core::{init_logging, init_logging_with, with_bootstrap_logging};
use tracing::error;

mod app;
mod commands;
mod script;

fn main() {
    let app = app::build_cli();
    let matches = app.get_matches();

    let verbose = matches.get_flag("verbose");
    let quiet = !verbose;

    let loaded = with_bootstrap_logging(quiet, || commands::load_config(&matches));
    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            init_logging(quiet);
            eprintln!("❌ Could not load config: {}", e);
            error!(
                event = "cli.config.load_failed",
                error = %e,
                error_code = e.error_code()
            );
            std::process::exit(1);
        }
    };
    init_logging_with(&config.logging, quiet);

    if let Err(e) = commands::run_command(&matches, &config) {
        // Handlers already printed a user-facing message.
        drop(e);
        std::process::exit(1);
    }
}
