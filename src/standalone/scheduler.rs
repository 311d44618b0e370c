use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use super::engine::{perform_map, perform_reduce};
use super::Phase;
use crate::codec::decode_records;
use crate::config::JobConfig;
use crate::error::JobError;
use crate::input::ContentReader;
use crate::store::{ArtifactId, ArtifactStore};
use crate::workload::Workload;
use crate::{Mapper, Reducer};

/// Schedules map and reduce tasks over a set of input units.
///
/// The engine holds no per-job state, so one engine can run any number of
/// jobs as long as concurrent jobs do not share unit identifiers.
#[derive(Clone)]
pub struct Engine {
    reader: Arc<dyn ContentReader>,
    store: Arc<dyn ArtifactStore>,
    config: JobConfig,
}

impl Engine {
    pub fn new<R, S>(reader: Arc<R>, store: Arc<S>) -> Self
    where
        R: ContentReader + 'static,
        S: ArtifactStore + 'static,
    {
        Self {
            reader,
            store,
            config: JobConfig::default(),
        }
    }

    pub fn with_config(mut self, config: JobConfig) -> Self {
        self.config = config;
        self
    }

    /// Runs `workload` over `units`. See [`Engine::schedule_job`].
    pub async fn run(&self, units: &[String], workload: &Workload) -> Result<u64, JobError> {
        self.schedule_job(
            units,
            Arc::clone(&workload.mapper),
            Arc::clone(&workload.reducer),
        )
        .await
    }

    /// Runs one job and returns the sum of every reduced value, wrapping on
    /// overflow.
    ///
    /// Stale artifacts of `units` are removed first. The map tasks of all
    /// units run concurrently and must all finish before any reduce task
    /// starts; the reduce tasks likewise finish before aggregation. The first
    /// task failure of a phase fails the job.
    pub async fn schedule_job(
        &self,
        units: &[String],
        mapper: Arc<dyn Mapper>,
        reducer: Arc<dyn Reducer>,
    ) -> Result<u64, JobError> {
        let mut seen = HashSet::with_capacity(units.len());
        if let Some(dup) = units.iter().find(|unit| !seen.insert(unit.as_str())) {
            return Err(JobError::DuplicateUnit(dup.clone()));
        }

        info!(units = units.len(), "starting job");
        self.remove_artifacts(units).await?;

        let reader = Arc::clone(&self.reader);
        let store = Arc::clone(&self.store);
        self.run_phase(Phase::Map, units, move |unit| {
            let reader = Arc::clone(&reader);
            let store = Arc::clone(&store);
            let mapper = Arc::clone(&mapper);
            async move {
                perform_map(&unit, reader.as_ref(), store.as_ref(), mapper)
                    .await
                    .map(|_| ())
            }
        })
        .await?;

        let store = Arc::clone(&self.store);
        self.run_phase(Phase::Reduce, units, move |unit| {
            let store = Arc::clone(&store);
            let reducer = Arc::clone(&reducer);
            async move {
                perform_reduce(&unit, store.as_ref(), reducer)
                    .await
                    .map(|_| ())
            }
        })
        .await?;

        let total = self.aggregate(units).await?;
        if self.config.discard_artifacts {
            // The total is already known; a failed cleanup only leaves files behind.
            if let Err(err) = self.remove_artifacts(units).await {
                warn!(error = %err, "could not discard artifacts");
            }
        }
        info!(total, "job finished");
        Ok(total)
    }

    /// Spawns `task` once per unit and waits until every spawned task has
    /// finished. Returns the first error observed.
    async fn run_phase<F, Fut>(&self, phase: Phase, units: &[String], task: F) -> Result<(), JobError>
    where
        F: Fn(String) -> Fut,
        Fut: Future<Output = Result<(), JobError>> + Send + 'static,
    {
        let limiter = self
            .config
            .max_concurrency
            .map(|permits| Arc::new(Semaphore::new(permits.max(1))));
        let timeout = self.config.task_timeout();

        let mut tasks = JoinSet::new();
        for unit in units {
            let work = task(unit.clone());
            let limiter = limiter.clone();
            let unit = unit.clone();
            tasks.spawn(async move {
                // The semaphore is never closed, so acquiring only waits.
                let _permit = match limiter {
                    Some(limiter) => limiter.acquire_owned().await.ok(),
                    None => None,
                };
                match timeout {
                    Some(after) => match tokio::time::timeout(after, work).await {
                        Ok(outcome) => outcome,
                        Err(_) => Err(JobError::TimedOut { phase, unit, after }),
                    },
                    None => work.await,
                }
            });
        }
        debug!(%phase, tasks = tasks.len(), "phase started");

        let mut first_error = None;
        while let Some(joined) = tasks.join_next().await {
            let outcome = match joined {
                Ok(outcome) => outcome,
                Err(err) if err.is_cancelled() => continue,
                Err(source) => Err(JobError::TaskPanicked { phase, source }),
            };
            if let Err(err) = outcome {
                warn!(%phase, error = %err, "task failed");
                if first_error.is_none() {
                    if self.config.cancel_on_failure {
                        tasks.abort_all();
                    }
                    first_error = Some(err);
                }
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => {
                debug!(%phase, "phase complete");
                Ok(())
            }
        }
    }

    async fn aggregate(&self, units: &[String]) -> Result<u64, JobError> {
        let mut total = 0u64;
        for unit in units {
            let artifact = ArtifactId::output(unit);
            let buf = self
                .store
                .get(&artifact)
                .await
                .map_err(|err| JobError::Aggregation {
                    artifact: artifact.to_string(),
                    reason: err.to_string(),
                })?;
            let records = decode_records(&buf).map_err(|err| JobError::Aggregation {
                artifact: artifact.to_string(),
                reason: err.to_string(),
            })?;
            total = records.into_iter().fold(total, u64::wrapping_add);
        }
        Ok(total)
    }

    async fn remove_artifacts(&self, units: &[String]) -> Result<(), JobError> {
        for unit in units {
            for artifact in [ArtifactId::intermediate(unit), ArtifactId::output(unit)] {
                self.store
                    .remove(&artifact)
                    .await
                    .map_err(|source| JobError::Persistence {
                        artifact: artifact.to_string(),
                        source,
                    })?;
            }
        }
        Ok(())
    }
}
