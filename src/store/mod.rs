//! Persistence for intermediate and output artifacts.
//!
//! A job only ever touches an artifact from the single task that owns the
//! artifact's unit, so stores do not coordinate access between tasks.

use std::fmt;
use std::io;

use async_trait::async_trait;
use bytes::Bytes;

pub mod fs;
pub mod memory;

pub use self::fs::FsStore;
pub use self::memory::MemoryStore;

const INTERMEDIATE_PREFIX: &str = "inter_";
const OUTPUT_PREFIX: &str = "out_";

/// Name of an artifact, derived from the unit that owns it.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ArtifactId(String);

impl ArtifactId {
    /// The artifact holding the mapped pairs of `unit`.
    pub fn intermediate(unit: &str) -> Self {
        Self(format!("{INTERMEDIATE_PREFIX}{unit}"))
    }

    /// The artifact holding the reduced records of `unit`.
    pub fn output(unit: &str) -> Self {
        Self(format!("{OUTPUT_PREFIX}{unit}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Byte-addressable artifact persistence.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Creates or fully replaces the artifact. Readers observe either the
    /// previous content or all of `bytes`, never a mix.
    async fn put(&self, id: &ArtifactId, bytes: Bytes) -> io::Result<()>;

    /// Appends `bytes`, creating the artifact when missing.
    async fn append(&self, id: &ArtifactId, bytes: Bytes) -> io::Result<()>;

    /// Reads the whole artifact.
    async fn get(&self, id: &ArtifactId) -> io::Result<Bytes>;

    /// Deletes the artifact. A missing artifact is not an error.
    async fn remove(&self, id: &ArtifactId) -> io::Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_distinct_per_unit_and_kind() {
        assert_eq!(ArtifactId::intermediate("in1").as_str(), "inter_in1");
        assert_eq!(ArtifactId::output("in1").to_string(), "out_in1");
        assert_ne!(ArtifactId::intermediate("in1"), ArtifactId::intermediate("in2"));
    }
}
