use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

const DEBUG_VAR: &str = "MKVBATCH_DEBUG";
const FILTER_VAR: &str = "MKVBATCH_LOG";

/// Initialize logging.
///
/// With `MKVBATCH_DEBUG` set, everything down to debug goes to a daily log
/// file under the user data folder. Otherwise diagnostics go to stderr,
/// filtered by `MKVBATCH_LOG` (default `warn`). The returned guard must be
/// held until exit so buffered file output is flushed.
pub fn init_logging(color: bool) -> Option<WorkerGuard> {
    if std::env::var(DEBUG_VAR).is_ok() {
        let log_dir = dirs::data_local_dir()
            .unwrap_or_else(|| std::path::PathBuf::from("."))
            .join("mkvbatch");

        let _ = std::fs::create_dir_all(&log_dir);

        let file_appender = tracing_appender::rolling::daily(&log_dir, "mkvbatch.log");
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        tracing_subscriber::fmt()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_env_filter(
                EnvFilter::from_env(FILTER_VAR).add_directive(tracing::Level::DEBUG.into()),
            )
            .init();

        tracing::info!("mkvbatch logging initialized in {}", log_dir.display());
        Some(guard)
    } else {
        let filter = EnvFilter::try_from_env(FILTER_VAR).unwrap_or_else(|_| EnvFilter::new("warn"));
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_ansi(color)
            .with_target(false)
            .with_env_filter(filter)
            .init();
        None
    }
}
