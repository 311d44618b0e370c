//! A MapReduce-compatible `grep` that counts matching lines.
//!

use anyhow::Result;
use clap::Parser;

use crate::utils::sum;
use crate::{KeyValue, Mapper, Reducer};

#[derive(Parser, Debug)]
#[clap(no_binary_name = true)]
struct Args {
    #[clap(short, long, value_parser)]
    term: String,
}

/// Emits `(unit, 1)` for every line of a unit that contains `term`, so the
/// reduced value of a unit is its number of matching lines.
#[derive(Debug, Clone)]
pub struct Grep {
    term: String,
}

impl Grep {
    pub fn new(term: impl Into<String>) -> Self {
        Self { term: term.into() }
    }

    /// Builds the application from its auxiliary arguments (`--term <TERM>`).
    pub fn from_args(args: &[String]) -> Result<Self> {
        let args = Args::try_parse_from(args)?;
        Ok(Self::new(args.term))
    }
}

impl Mapper for Grep {
    fn map(&self, unit: &str, content: &str) -> Vec<KeyValue> {
        content
            .lines()
            .filter(|line| line.contains(&self.term))
            .map(|_| KeyValue::new(unit, 1))
            .collect()
    }
}

impl Reducer for Grep {
    fn reduce(&self, _unit: &str, matches: &[u64]) -> u64 {
        sum(matches)
    }
}
