use std::io;
use std::time::Duration;

use thiserror::Error;

use crate::standalone::Phase;

/// Failures of the pair and record codecs.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("key of {len} bytes does not fit the length prefix")]
    Encoding { len: usize },
    #[error("truncated buffer: needed {needed} more bytes, {remaining} left")]
    Truncated { needed: usize, remaining: usize },
    #[error("key is not valid UTF-8: {0}")]
    InvalidKey(#[from] std::string::FromUtf8Error),
    #[error("{0} trailing bytes after the last pair")]
    TrailingBytes(usize),
    #[error("record buffer of {0} bytes is not a multiple of 8")]
    Misaligned(usize),
}

/// Error type for a scheduled job. Any variant means the job failed and
/// produced no result.
#[derive(Debug, Error)]
pub enum JobError {
    #[error("content of unit '{unit}' is unavailable")]
    ContentUnavailable {
        unit: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to encode pairs of unit '{unit}'")]
    Encoding {
        unit: String,
        #[source]
        source: CodecError,
    },
    #[error("failed to decode artifact '{artifact}'")]
    Decoding {
        artifact: String,
        #[source]
        source: CodecError,
    },
    #[error("artifact '{artifact}' could not be read")]
    ArtifactUnavailable {
        artifact: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to persist artifact '{artifact}'")]
    Persistence {
        artifact: String,
        #[source]
        source: io::Error,
    },
    #[error("aggregation failed on '{artifact}': {reason}")]
    Aggregation { artifact: String, reason: String },
    #[error("unit '{0}' appears more than once in the job")]
    DuplicateUnit(String),
    #[error("{phase} task for unit '{unit}' timed out after {after:?}")]
    TimedOut {
        phase: Phase,
        unit: String,
        after: Duration,
    },
    #[error("{phase} task panicked")]
    TaskPanicked {
        phase: Phase,
        #[source]
        source: tokio::task::JoinError,
    },
}
