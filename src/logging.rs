use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default log file location
pub fn default_log_path() -> PathBuf {
    if let Some(data_dir) = dirs::data_dir() {
        data_dir.join("naqla").join("naqla.log")
    } else {
        PathBuf::from("naqla.log")
    }
}

/// Log destination for `--log-file[=PATH]`: the default path when the flag is
/// given bare, `None` (stderr) when it is absent
pub fn resolve_log_file(flag: Option<Option<PathBuf>>) -> Option<PathBuf> {
    flag.map(|path| path.unwrap_or_else(default_log_path))
}

/// Filter used when RUST_LOG is not set
pub fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "naqla=debug,info"
    } else {
        "naqla=info,warn"
    }
}

/// Install the global tracing subscriber.
///
/// Logs go to stderr, or are appended to `log_file` when given so that stdout
/// stays clean for JSON output.
pub fn init_logging(verbose: bool, log_file: Option<&Path>) -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(verbose).into());

    match log_file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(path)?;

            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_ansi(false)
                        .with_writer(Mutex::new(file)),
                )
                .try_init()?;
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_target(false)
                        .with_writer(std::io::stderr),
                )
                .try_init()?;
        }
    }

    Ok(())
}
