use std::fmt;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use glob::glob;

use crate::config::JobConfig;

pub mod engine;
pub mod scheduler;

pub use scheduler::Engine;

/// The two barriers of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Map,
    Reduce,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Map => f.write_str("map"),
            Phase::Reduce => f.write_str("reduce"),
        }
    }
}

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a job on this machine and print the aggregated result
    Submit {
        /// Glob spec for the input files; every match is one input unit
        #[arg(short, long)]
        input: String,

        /// Name of the workload
        #[arg(short, long)]
        workload: String,

        /// Work directory for intermediate and output artifacts
        #[arg(short, long)]
        output: PathBuf,

        /// JSON job config; flags below override its values
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Maximum number of tasks running at once per phase
        #[arg(long)]
        max_concurrency: Option<usize>,

        /// Per-task timeout in milliseconds
        #[arg(long)]
        timeout_ms: Option<u64>,

        /// Remove artifacts once the result is computed
        #[arg(long)]
        discard: bool,

        /// Auxiliary arguments to pass to the MapReduce application.
        #[clap(value_parser, last = true)]
        args: Vec<String>,
    },
}

#[derive(Debug, Clone)]
pub struct Job {
    pub input: String,
    pub workload: String,
    pub output: PathBuf,
    pub args: Vec<String>,
    pub config: JobConfig,
}

impl Job {
    /// Expands the input glob into unit identifiers, sorted for a stable
    /// aggregation order.
    pub fn units(&self) -> Result<Vec<String>> {
        let mut units = Vec::new();
        for path in glob(&self.input).with_context(|| format!("bad input glob `{}`", self.input))? {
            let path = path?;
            if !path.is_file() {
                continue;
            }
            match path.to_str() {
                Some(unit) => units.push(unit.to_string()),
                None => bail!("input path {} is not valid UTF-8", path.display()),
            }
        }
        if units.is_empty() {
            bail!("no input files match `{}`", self.input);
        }
        units.sort();
        Ok(units)
    }
}

impl TryFrom<Commands> for Job {
    type Error = anyhow::Error;

    fn try_from(command: Commands) -> Result<Self> {
        match command {
            Commands::Submit {
                input,
                workload,
                output,
                config,
                max_concurrency,
                timeout_ms,
                discard,
                args,
            } => {
                let mut config = match config {
                    Some(path) => JobConfig::from_json_file(path)?,
                    None => JobConfig::default(),
                };
                if max_concurrency.is_some() {
                    config.max_concurrency = max_concurrency;
                }
                if timeout_ms.is_some() {
                    config.task_timeout_ms = timeout_ms;
                }
                config.discard_artifacts |= discard;
                Ok(Job {
                    input,
                    workload,
                    output,
                    args,
                    config,
                })
            }
        }
    }
}
