//! Run-scoped context threaded through the pipeline.

use std::io;
use std::path::PathBuf;

use chrono::{DateTime, Utc};

use crate::config::HarvestConfig;

/// Everything a run has to agree on: one timestamp for record tagging and
/// filenames, plus the output directories, created up front. Constructed
/// once by the session owner and passed along explicitly.
#[derive(Debug, Clone)]
pub struct HarvestContext {
    pub started_at: DateTime<Utc>,
    pub data_dir: PathBuf,
    pub screenshots_dir: PathBuf,
}

impl HarvestContext {
    /// Create the output directories and stamp the run.
    pub fn prepare(config: &HarvestConfig) -> io::Result<Self> {
        std::fs::create_dir_all(&config.data_dir)?;
        std::fs::create_dir_all(&config.screenshots_dir)?;
        Ok(Self {
            started_at: Utc::now(),
            data_dir: config.data_dir.clone(),
            screenshots_dir: config.screenshots_dir.clone(),
        })
    }

    /// Filesystem-safe run label, e.g. `2026-08-05 03-12-09 PM`.
    pub fn run_label(&self) -> String {
        self.started_at.format("%Y-%m-%d %I-%M-%S %p").to_string()
    }

    /// Where a diagnostic snapshot of this run goes.
    pub fn snapshot_path(&self) -> PathBuf {
        self.screenshots_dir
            .join(format!("screenshot {}.png", self.run_label()))
    }
}
