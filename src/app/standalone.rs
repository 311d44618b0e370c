use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use mrlocal::input::FsReader;
use mrlocal::standalone::{Args, Engine, Job};
use mrlocal::store::FsStore;
use mrlocal::workload;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn parse_args() -> Result<Job> {
    let args = Args::parse();
    Job::try_from(args.command)
}

async fn run_standalone_mr_job(job: Job) -> Result<u64> {
    let app = workload::named(&job.workload, &job.args)?;
    let units = job.units()?;
    let store = FsStore::create(&job.output)
        .await
        .with_context(|| format!("cannot prepare work directory {}", job.output.display()))?;
    info!(
        workload = %job.workload,
        units = units.len(),
        output = %job.output.display(),
        "submitting job"
    );

    let engine = Engine::new(Arc::new(FsReader::new()), Arc::new(store)).with_config(job.config);
    let total = engine.run(&units, &app).await?;
    Ok(total)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let job = parse_args()?;
    let total = run_standalone_mr_job(job).await?;
    println!("{total}");
    Ok(())
}
