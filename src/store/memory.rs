use std::io;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use dashmap::DashMap;

use super::{ArtifactId, ArtifactStore};

/// Keeps artifacts in a concurrent map. Useful for tests and for jobs whose
/// intermediate data fits in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    artifacts: DashMap<ArtifactId, Bytes>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &ArtifactId) -> bool {
        self.artifacts.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }
}

#[async_trait]
impl ArtifactStore for MemoryStore {
    async fn put(&self, id: &ArtifactId, bytes: Bytes) -> io::Result<()> {
        self.artifacts.insert(id.clone(), bytes);
        Ok(())
    }

    async fn append(&self, id: &ArtifactId, bytes: Bytes) -> io::Result<()> {
        let mut entry = self.artifacts.entry(id.clone()).or_default();
        let mut buf = BytesMut::with_capacity(entry.len() + bytes.len());
        buf.extend_from_slice(&entry);
        buf.extend_from_slice(&bytes);
        *entry = buf.freeze();
        Ok(())
    }

    async fn get(&self, id: &ArtifactId) -> io::Result<Bytes> {
        self.artifacts
            .get(id)
            .map(|bytes| bytes.value().clone())
            .ok_or_else(|| {
                io::Error::new(io::ErrorKind::NotFound, format!("no artifact '{id}'"))
            })
    }

    async fn remove(&self, id: &ArtifactId) -> io::Result<()> {
        self.artifacts.remove(id);
        Ok(())
    }
}
