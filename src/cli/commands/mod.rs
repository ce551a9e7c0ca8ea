//! Command implementations.

pub mod changes;
pub mod completions;
pub mod fields;
pub mod resolve;
pub mod search;
pub mod version;

use std::path::Path;
use tokio::runtime::Runtime;

use crate::config::{load_config, TimelineConfig};
use crate::error::{Error, Result};
use crate::model::ResolvedValue;
use crate::query::QueryManager;
use crate::source::{create_source, BoxedSource};

/// Where configuration and issues come from.
#[derive(Debug, Clone, Copy, Default)]
pub struct SourceOptions<'a> {
    pub config: Option<&'a Path>,
    pub from_file: Option<&'a Path>,
}

/// Create the tokio runtime async sources run on.
fn runtime() -> Result<Runtime> {
    Runtime::new().map_err(|e| Error::Other(format!("Failed to create async runtime: {e}")))
}

/// Load configuration and connect a query manager to the selected source.
async fn connect(options: &SourceOptions<'_>) -> Result<(TimelineConfig, QueryManager<BoxedSource>)> {
    let config = load_config(options.config)?;
    let source = create_source(&config, options.from_file)?;
    let manager = QueryManager::connect(source, config.query.clone()).await?;
    Ok((config, manager))
}

/// Table/CSV rendering of an optional value.
fn display_value(value: Option<&ResolvedValue>) -> String {
    value.map_or_else(String::new, ToString::to_string)
}
