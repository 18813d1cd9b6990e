use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use anyhow::Result;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// `RUST_LOG` if set, otherwise `default`.
fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// The TUI owns the terminal, so its logs go to a file instead.
pub fn init_file(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
        .with(env_filter("info"))
        .try_init()?;
    Ok(())
}

/// Used by the one-shot commands, which only print to stdout.
pub fn init_stderr() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(env_filter("warn"))
        .try_init()?;
    Ok(())
}
