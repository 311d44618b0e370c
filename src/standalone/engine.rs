use std::sync::Arc;

use itertools::Itertools;
use tracing::debug;

use super::Phase;
use crate::codec::{decode_pairs, encode_pairs, encode_records};
use crate::error::JobError;
use crate::input::ContentReader;
use crate::store::{ArtifactId, ArtifactStore};
use crate::{KeyValue, Mapper, Reducer};

/// Runs the map task of `unit`: reads its content, maps it once and stores
/// the encoded pairs as the unit's intermediate artifact.
///
/// The mapper runs on the blocking pool.
///
/// Returns the number of pairs written.
pub async fn perform_map(
    unit: &str,
    reader: &dyn ContentReader,
    store: &dyn ArtifactStore,
    mapper: Arc<dyn Mapper>,
) -> Result<usize, JobError> {
    let content = reader
        .read(unit)
        .await
        .map_err(|source| JobError::ContentUnavailable {
            unit: unit.to_string(),
            source,
        })?;

    let owned_unit = unit.to_string();
    let pairs = tokio::task::spawn_blocking(move || mapper.map(&owned_unit, &content))
        .await
        .map_err(|source| JobError::TaskPanicked {
            phase: Phase::Map,
            source,
        })?;
    let buf = encode_pairs(&pairs).map_err(|source| JobError::Encoding {
        unit: unit.to_string(),
        source,
    })?;

    let artifact = ArtifactId::intermediate(unit);
    store
        .put(&artifact, buf)
        .await
        .map_err(|source| JobError::Persistence {
            artifact: artifact.to_string(),
            source,
        })?;
    debug!(unit, pairs = pairs.len(), "map task done");
    Ok(pairs.len())
}

/// Runs the reduce task of `unit`: groups its intermediate pairs by key and
/// stores one record per key, in ascending key order, as the unit's output
/// artifact.
///
/// Returns the number of records written.
pub async fn perform_reduce(
    unit: &str,
    store: &dyn ArtifactStore,
    reducer: Arc<dyn Reducer>,
) -> Result<usize, JobError> {
    let input = ArtifactId::intermediate(unit);
    let buf = store
        .get(&input)
        .await
        .map_err(|source| JobError::ArtifactUnavailable {
            artifact: input.to_string(),
            source,
        })?;
    let pairs = decode_pairs(&buf).map_err(|source| JobError::Decoding {
        artifact: input.to_string(),
        source,
    })?;

    // Off the runtime threads, like the mapper.
    let records = tokio::task::spawn_blocking(move || reduce_pairs(pairs, reducer.as_ref()))
        .await
        .map_err(|source| JobError::TaskPanicked {
            phase: Phase::Reduce,
            source,
        })?;

    // All records go out in a single put so a failed task leaves no
    // readable partial output.
    let output = ArtifactId::output(unit);
    store
        .put(&output, encode_records(&records))
        .await
        .map_err(|source| JobError::Persistence {
            artifact: output.to_string(),
            source,
        })?;
    debug!(unit, records = records.len(), "reduce task done");
    Ok(records.len())
}

/// Sorts `pairs` by key and reduces every run of equal keys, yielding one
/// value per distinct key in ascending key order.
pub fn reduce_pairs(mut pairs: Vec<KeyValue>, reducer: &dyn Reducer) -> Vec<u64> {
    // Stable, so values of one key keep the order they were mapped in.
    pairs.sort_by(|a, b| a.key.cmp(&b.key));

    let mut records = Vec::new();
    let mut values = Vec::new();
    for (key, group) in &pairs.iter().chunk_by(|&kv| kv.key()) {
        values.clear();
        values.extend(group.map(KeyValue::value));
        records.push(reducer.reduce(key, &values));
    }
    records
}
