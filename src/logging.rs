use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::utils::{self, Profile};

/// Environment variable holding an `EnvFilter` directive, e.g. `dayboard=debug`
pub const LOG_ENV_VAR: &str = "DAYBOARD_LOG";

/// Where log files land for a profile: `<data dir>/logs`, or `./logs` if the
/// platform has no data dir.
pub fn log_dir(profile: Profile) -> PathBuf {
    utils::get_data_dir(profile)
        .map(|dir| dir.join("logs"))
        .unwrap_or_else(|| PathBuf::from("logs"))
}

/// Route `tracing` output to a daily-rotated file. The terminal belongs to the TUI,
/// so nothing is written to stdout. Keep the returned guard alive until exit or
/// buffered lines are lost.
pub fn init(profile: Profile) -> std::io::Result<WorkerGuard> {
    let dir = log_dir(profile);
    std::fs::create_dir_all(&dir)?;

    let file_appender = tracing_appender::rolling::daily(&dir, "dayboard.log");
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("info"));

    // A second init (tests, embedding) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .with_target(false)
        .try_init();

    Ok(guard)
}
