//! Issue source factory.
//!
//! Picks the backend for a command.

use std::path::Path;
use tracing::debug;

use crate::config::TimelineConfig;
use crate::error::Result;

use super::file::FileSource;
use super::issue_source::BoxedSource;
use super::jira::JiraClient;

/// Create an issue source.
///
/// Priority:
/// 1. Dump file, if `from_file` is given
/// 2. Tracker client built from the connection settings
///
/// # Errors
///
/// Returns an error if the dump cannot be loaded or no tracker URL is
/// configured.
pub fn create_source(config: &TimelineConfig, from_file: Option<&Path>) -> Result<BoxedSource> {
    if let Some(path) = from_file {
        debug!(path = %path.display(), "Using dump file source");
        return Ok(BoxedSource::new(FileSource::open(path)?));
    }

    let client = JiraClient::new(&config.connection)?;
    debug!(url = client.base_url(), "Using tracker source");
    Ok(BoxedSource::new(client))
}
