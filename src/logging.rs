use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "WIKITYPE_LOG";
pub const LOG_FILE: &str = "wikitype.log";

/// Send tracing output to a file in `dir`; the terminal belongs to the TUI.
///
/// The returned guard flushes the writer on drop and must be held for the
/// life of the program. Returns `None` if logging could not be set up.
pub fn init(dir: &Path) -> Option<WorkerGuard> {
    if std::fs::create_dir_all(dir).is_err() {
        return None;
    }

    let file_appender = tracing_appender::rolling::never(dir, LOG_FILE);
    let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(nb_writer)
        .with_ansi(false)
        .try_init()
        .ok()
        .map(|_| guard)
}
