//! Converts MapReduce application names to actual application code.
//!
//! # Example
//!
//! ```
//! # use anyhow::Result;
//! use mrlocal::workload;
//! # fn main() -> Result<()> {
//! let wc = workload::named("wc", &[])?;
//! let grep = workload::named("grep", &["--term".to_string(), "fn".to_string()])?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use anyhow::{bail, Result};

use crate::{Mapper, Reducer};

pub mod grep;
pub mod wc;

/// A map reduce application.
#[derive(Clone)]
pub struct Workload {
    pub mapper: Arc<dyn Mapper>,
    pub reducer: Arc<dyn Reducer>,
}

impl Workload {
    pub fn new(mapper: impl Mapper + 'static, reducer: impl Reducer + 'static) -> Self {
        Self {
            mapper: Arc::new(mapper),
            reducer: Arc::new(reducer),
        }
    }
}

/// Gets the [`Workload`] named `name`, configured with `args`.
///
/// Returns [`None`] if no application with the given name was found, and
/// an error if the application rejects its arguments.
pub fn try_named(name: &str, args: &[String]) -> Result<Option<Workload>> {
    let workload = match name {
        "wc" => Workload::new(wc::WordCount, wc::WordCount),
        "grep" => {
            let grep = grep::Grep::from_args(args)?;
            Workload::new(grep.clone(), grep)
        }
        _ => return Ok(None),
    };
    Ok(Some(workload))
}

/// Gets the [`Workload`] named `name`, configured with `args`.
///
/// Returns an [`anyhow::Error`] if no application with the given name was found.
pub fn named(name: &str, args: &[String]) -> Result<Workload> {
    match try_named(name, args)? {
        Some(app) => Ok(app),
        None => bail!("No app named `{}` found.", name),
    }
}
