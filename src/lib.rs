//! A single-machine MapReduce (lite) engine.
//!
//! Users supply a [`Mapper`] and a [`Reducer`] and a set of named input
//! units. Every unit gets its own map task and its own reduce task, and the
//! tasks hand data to each other only through artifacts kept in an
//! [`store::ArtifactStore`]. The reduced values of every unit are summed into
//! one scalar.
//!
//! # Example
//!
//! ```
//! # use std::sync::Arc;
//! use mrlocal::input::MemoryReader;
//! use mrlocal::standalone::Engine;
//! use mrlocal::store::MemoryStore;
//! use mrlocal::workload;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> anyhow::Result<()> {
//! let reader: MemoryReader = [("in1", "a a b"), ("in2", "b c")].into_iter().collect();
//! let engine = Engine::new(Arc::new(reader), Arc::new(MemoryStore::new()));
//! let wc = workload::named("wc", &[])?;
//! let units = vec!["in1".to_string(), "in2".to_string()];
//! assert_eq!(engine.run(&units, &wc).await?, 5);
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod config;
pub mod error;
pub mod input;
pub mod standalone;
pub mod store;
pub mod utils;
pub mod workload;

pub use error::{CodecError, JobError};

/////////////////////////////////////////////////////////////////////////////
// MapReduce application types
/////////////////////////////////////////////////////////////////////////////

/// A map function turns the full content of one input unit into
/// key-value pairs.
///
/// Map tasks for different units run concurrently, so implementations are
/// called from several tasks at once and must not rely on exclusive access.
pub trait Mapper: Send + Sync {
    fn map(&self, unit: &str, content: &str) -> Vec<KeyValue>;
}

/// A reduce function folds every value mapped to one key into a single
/// value.
///
/// `values` holds the values in the order the key's pairs appear after the
/// stable key sort.
pub trait Reducer: Send + Sync {
    fn reduce(&self, key: &str, values: &[u64]) -> u64;
}

impl<F> Mapper for F
where
    F: Fn(&str, &str) -> Vec<KeyValue> + Send + Sync,
{
    fn map(&self, unit: &str, content: &str) -> Vec<KeyValue> {
        self(unit, content)
    }
}

impl<F> Reducer for F
where
    F: Fn(&str, &[u64]) -> u64 + Send + Sync,
{
    fn reduce(&self, key: &str, values: &[u64]) -> u64 {
        self(key, values)
    }
}

/////////////////////////////////////////////////////////////////////////////
// Key-value pairs
/////////////////////////////////////////////////////////////////////////////

/// A single key-value pair.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct KeyValue {
    /// The key.
    pub key: String,
    /// The value.
    pub value: u64,
}

impl KeyValue {
    /// Construct a new key-value pair from the given key and value.
    pub fn new(key: impl Into<String>, value: u64) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }

    /// Get the key of this key-value pair.
    #[inline]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Get the value of this key-value pair.
    #[inline]
    pub fn value(&self) -> u64 {
        self.value
    }
}
