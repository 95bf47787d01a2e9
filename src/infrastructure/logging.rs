use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter directive.
pub const LOG_FILTER_ENV: &str = "CUSTVIEW_LOG";

/// Installs a file-backed `tracing` subscriber.
///
/// Nothing is installed without a path: stdout and stderr belong to the
/// terminal UI. Returns whether a subscriber was installed.
pub fn init_logging(log_file: Option<&Path>) -> io::Result<bool> {
    let Some(path) = log_file else {
        return Ok(false);
    };

    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let env_filter =
        EnvFilter::try_from_env(LOG_FILTER_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(io::Error::other)?;

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_no_path_installs_nothing() {
        assert!(!init_logging(None).unwrap());
    }

    #[test]
    fn test_events_land_in_log_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("custview.log");

        assert!(init_logging(Some(&path)).unwrap());
        tracing::info!(page = 2, "logging smoke test");

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.contains("logging smoke test"));
        assert!(contents.contains("page=2"));
    }
}
