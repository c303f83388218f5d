use anyhow::{Context, Result};
use chrono::Local;
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::PathBuf,
};
use tracing::{info, warn};

/// `2024-Oct-19-14:03:07`
pub const TIMESTAMP_FORMAT: &str = "%Y-%h-%d-%H:%M:%S";

/// Append-only progress log, one `<timestamp> : <message>` line per stage.
#[derive(Clone, Debug)]
pub struct ProgressLog {
    path: PathBuf,
}

impl ProgressLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Record `message`. A failed write is reported and otherwise ignored so
    /// that logging never aborts a run.
    pub fn log(&self, message: &str) {
        info!("{}", message);
        if let Err(e) = self.append(message) {
            warn!(path = %self.path.display(), "progress log write failed: {:#}", e);
        }
    }

    fn append(&self, message: &str) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating log directory {}", parent.display()))?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("opening {}", self.path.display()))?;
        let timestamp = Local::now().format(TIMESTAMP_FORMAT);
        writeln!(file, "{} : {}", timestamp, message)
            .with_context(|| format!("appending to {}", self.path.display()))?;
        Ok(())
    }
}
