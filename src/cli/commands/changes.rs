//! Changes command implementation.
//!
//! Replays the changelog of every matching issue into snapshots, one row per
//! snapshot.

use colored::Colorize;
use serde::Serialize;

use crate::cli::ChangesArgs;
use crate::error::{Error, Result};
use crate::model::{IssueSnapshot, ResolvedValue};

use super::{connect, display_value, runtime, SourceOptions};

#[derive(Serialize)]
struct SnapshotRow<'a> {
    change: &'a str,
    key: &'a str,
    date: String,
    from: Option<&'a str>,
    to: Option<&'a ResolvedValue>,
}

impl<'a> From<&'a IssueSnapshot> for SnapshotRow<'a> {
    fn from(snapshot: &'a IssueSnapshot) -> Self {
        Self {
            change: snapshot.change(),
            key: snapshot.key(),
            date: snapshot.date_text(),
            from: snapshot.from_value(),
            to: snapshot.to_value(),
        }
    }
}

#[derive(Serialize)]
struct ChangesOutput<'a> {
    issues: usize,
    count: usize,
    snapshots: Vec<SnapshotRow<'a>>,
}

/// Execute the changes command.
///
/// Tracks `--field` names when given, otherwise the configured
/// `tracked_fields`.
///
/// # Errors
///
/// Returns an error if the manager cannot be built, the search fails, or a
/// tracked field is not in the field directory.
pub fn execute(args: &ChangesArgs, options: &SourceOptions<'_>, json: bool) -> Result<()> {
    let (config, manager, issues) = runtime()?.block_on(async {
        let (config, manager) = connect(options).await?;
        let issues = manager.find_issues(&args.query).await?;
        Ok::<_, Error>((config, manager, issues))
    })?;

    let fields = if args.fields.is_empty() {
        &config.tracked_fields
    } else {
        &args.fields
    };
    if fields.is_empty() {
        return Err(Error::InvalidArgument(
            "No fields to track: pass --field or set tracked_fields in config".to_string(),
        ));
    }

    let mut snapshots = Vec::new();
    for issue in &issues {
        snapshots.extend(manager.iter_changes(issue, fields)?);
    }

    let rows: Vec<SnapshotRow<'_>> = snapshots.iter().map(SnapshotRow::from).collect();

    if crate::is_csv() {
        println!("change,key,date,from,to");
        for row in &rows {
            println!(
                "{},{},{},{},{}",
                crate::csv_escape(row.change),
                crate::csv_escape(row.key),
                row.date,
                crate::csv_escape(row.from.unwrap_or("")),
                crate::csv_escape(&display_value(row.to))
            );
        }
    } else if json {
        let output = ChangesOutput {
            issues: issues.len(),
            count: rows.len(),
            snapshots: rows,
        };
        println!("{}", serde_json::to_string(&output)?);
    } else if rows.is_empty() {
        println!("No changes found.");
    } else {
        println!("Changes ({} snapshots across {} issues):", rows.len(), issues.len());
        let mut current_key = "";
        for row in &rows {
            if row.key != current_key {
                println!();
                println!("{}", row.key.bold());
                current_key = row.key;
            }
            let from = row.from.map_or_else(|| "∅".dimmed().to_string(), str::to_string);
            let to = row.to.map_or_else(|| "∅".dimmed().to_string(), ToString::to_string);
            println!("  {}  {:<12} {from} → {}", row.date.dimmed(), row.change, to.green());
        }
    }

    Ok(())
}
