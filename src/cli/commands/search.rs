//! Search command implementation.

use chrono::{DateTime, Utc};
use colored::Colorize;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::error::Result;
use crate::model::ResolvedValue;

use super::{connect, display_value, runtime, SourceOptions};

#[derive(Serialize)]
struct IssueRow {
    key: String,
    created: DateTime<Utc>,
    changes: usize,
    attributes: BTreeMap<String, Option<ResolvedValue>>,
}

#[derive(Serialize)]
struct SearchOutput {
    count: usize,
    issues: Vec<IssueRow>,
}

/// Execute the search command.
///
/// # Errors
///
/// Returns an error if the manager cannot be built or the search fails.
pub fn execute(query: &str, options: &SourceOptions<'_>, json: bool) -> Result<()> {
    runtime()?.block_on(async {
        let (_, manager) = connect(options).await?;
        let issues = manager.find_issues(query).await?;

        let rows: Vec<IssueRow> = issues
            .iter()
            .map(|issue| IssueRow {
                key: issue.key.clone(),
                created: issue.created,
                changes: issue.changelog.items().count(),
                attributes: manager
                    .directory()
                    .attributes()
                    .map(|(attribute, field_id)| {
                        (attribute.to_string(), manager.resolve_field_value(issue, field_id))
                    })
                    .collect(),
            })
            .collect();

        print_rows(rows, json)
    })
}

fn print_rows(rows: Vec<IssueRow>, json: bool) -> Result<()> {
    if crate::is_csv() {
        print_csv(&rows);
    } else if json {
        let output = SearchOutput {
            count: rows.len(),
            issues: rows,
        };
        println!("{}", serde_json::to_string(&output)?);
    } else if rows.is_empty() {
        println!("No issues found.");
    } else {
        println!("Issues ({} found):", rows.len());
        println!();
        for row in &rows {
            println!(
                "{} {} ({} changes)",
                row.key.bold(),
                row.created.format("%Y-%m-%d").to_string().dimmed(),
                row.changes
            );
            for (attribute, value) in &row.attributes {
                let value = value
                    .as_ref()
                    .map_or_else(|| "-".dimmed().to_string(), ToString::to_string);
                println!("    {attribute}: {value}");
            }
        }
    }

    Ok(())
}

fn print_csv(rows: &[IssueRow]) {
    let attributes: Vec<&String> = rows
        .first()
        .map(|r| r.attributes.keys().collect())
        .unwrap_or_default();

    let header: Vec<String> = ["key", "created", "changes"]
        .into_iter()
        .map(str::to_string)
        .chain(attributes.iter().map(|a| crate::csv_escape(a)))
        .collect();
    println!("{}", header.join(","));
    for row in rows {
        let mut line = vec![
            crate::csv_escape(&row.key),
            row.created.to_rfc3339(),
            row.changes.to_string(),
        ];
        line.extend(
            row.attributes
                .values()
                .map(|v| crate::csv_escape(&display_value(v.as_ref()))),
        );
        println!("{}", line.join(","));
    }
}
