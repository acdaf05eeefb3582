use clap::Parser;
use color_eyre::Result;
use std::path::Path;

use dayboard::{Config, Profile, cli::{Cli, Commands}, logging, store};

fn main() -> Result<()> {
    // Set up error reporting with color-eyre
    color_eyre::install()?;

    let cli = Cli::parse();

    // --dev switches to separate dev config, database and logs
    let profile = if cli.dev {
        Profile::Dev
    } else {
        Profile::Prod
    };

    let config = match cli.config.as_deref() {
        Some(path) => Config::load_from_path(Path::new(path), profile)?,
        None => Config::load_with_profile(profile)?,
    };

    // Dropping the guard flushes buffered log lines
    let _log_guard = logging::init(profile)?;
    tracing::info!(?profile, backend = ?config.backend, "starting dayboard");

    let mut backend = store::open_backend(&config)?;

    match cli.command {
        None | Some(Commands::Tui) => {
            let app = dayboard::tui::App::new(config, backend)?;
            dayboard::tui::run_event_loop(app)?;
        }
        Some(command) => {
            dayboard::cli::run_command(command, backend.as_mut(), &config)?;
        }
    }

    Ok(())
}
