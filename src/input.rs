//! Resolving input units to their raw text.

use std::collections::HashMap;
use std::io;
use std::path::PathBuf;

use async_trait::async_trait;

/// Looks up the content of an input unit. Called once per unit per map task.
#[async_trait]
pub trait ContentReader: Send + Sync {
    async fn read(&self, unit: &str) -> io::Result<String>;
}

/// Treats unit identifiers as file paths, optionally relative to `base`.
#[derive(Debug, Clone, Default)]
pub struct FsReader {
    base: Option<PathBuf>,
}

impl FsReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rooted(base: impl Into<PathBuf>) -> Self {
        Self {
            base: Some(base.into()),
        }
    }

    fn path_for(&self, unit: &str) -> PathBuf {
        match &self.base {
            Some(base) => base.join(unit),
            None => PathBuf::from(unit),
        }
    }
}

#[async_trait]
impl ContentReader for FsReader {
    async fn read(&self, unit: &str) -> io::Result<String> {
        tokio::fs::read_to_string(self.path_for(unit)).await
    }
}

/// Serves unit contents from memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryReader {
    units: HashMap<String, String>,
}

impl MemoryReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, unit: impl Into<String>, content: impl Into<String>) {
        self.units.insert(unit.into(), content.into());
    }
}

impl<K, V> FromIterator<(K, V)> for MemoryReader
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            units: iter
                .into_iter()
                .map(|(unit, content)| (unit.into(), content.into()))
                .collect(),
        }
    }
}

#[async_trait]
impl ContentReader for MemoryReader {
    async fn read(&self, unit: &str) -> io::Result<String> {
        self.units.get(unit).cloned().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("no content for unit '{unit}'"))
        })
    }
}
