use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Knobs of a job run. The defaults reproduce the plain behavior: every
/// task of a phase runs at once, nothing times out and a failing task does
/// not stop its siblings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobConfig {
    /// Upper bound on tasks running at the same time within a phase.
    pub max_concurrency: Option<usize>,
    /// Per-task deadline in milliseconds.
    pub task_timeout_ms: Option<u64>,
    /// Abort the other tasks of a phase as soon as one fails.
    pub cancel_on_failure: bool,
    /// Delete intermediate and output artifacts after a successful run.
    pub discard_artifacts: bool,
}

impl JobConfig {
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("invalid job config in {}", path.display()))
    }

    pub fn task_timeout(&self) -> Option<Duration> {
        self.task_timeout_ms.map(Duration::from_millis)
    }
}
