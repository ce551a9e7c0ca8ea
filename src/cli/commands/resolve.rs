//! Resolve command implementation.

use colored::Colorize;
use serde::Serialize;

use crate::cli::ResolveArgs;
use crate::error::{Error, Result};
use crate::model::ResolvedValue;

use super::{connect, display_value, runtime, SourceOptions};

#[derive(Serialize)]
struct ValueRow {
    key: String,
    attribute: String,
    value: Option<ResolvedValue>,
}

#[derive(Serialize)]
struct ResolveOutput {
    count: usize,
    values: Vec<ValueRow>,
}

/// Execute the resolve command.
///
/// Resolves `--attribute` names when given, otherwise every configured
/// attribute.
///
/// # Errors
///
/// Returns an error if the manager cannot be built, the search fails, or an
/// attribute is not configured.
pub fn execute(args: &ResolveArgs, options: &SourceOptions<'_>, json: bool) -> Result<()> {
    let rows = runtime()?.block_on(async {
        let (_, manager) = connect(options).await?;

        let attributes: Vec<String> = if args.attributes.is_empty() {
            manager.directory().attributes().map(|(a, _)| a.to_string()).collect()
        } else {
            args.attributes.clone()
        };
        if attributes.is_empty() {
            return Err(Error::InvalidArgument(
                "No attributes to resolve: pass --attribute or configure query.attributes".to_string(),
            ));
        }

        let issues = manager.find_issues(&args.query).await?;

        let mut rows = Vec::with_capacity(issues.len() * attributes.len());
        for issue in &issues {
            for attribute in &attributes {
                rows.push(ValueRow {
                    key: issue.key.clone(),
                    attribute: attribute.clone(),
                    value: manager.resolve_attribute_value(issue, attribute)?,
                });
            }
        }
        Ok::<_, Error>(rows)
    })?;

    if crate::is_csv() {
        println!("key,attribute,value");
        for row in &rows {
            println!(
                "{},{},{}",
                crate::csv_escape(&row.key),
                crate::csv_escape(&row.attribute),
                crate::csv_escape(&display_value(row.value.as_ref()))
            );
        }
    } else if json {
        let output = ResolveOutput {
            count: rows.len(),
            values: rows,
        };
        println!("{}", serde_json::to_string(&output)?);
    } else if rows.is_empty() {
        println!("No issues found.");
    } else {
        for row in &rows {
            let value = row
                .value
                .as_ref()
                .map_or_else(|| "-".dimmed().to_string(), ToString::to_string);
            println!("{:<14} {:<20} {value}", row.key.bold(), row.attribute);
        }
    }

    Ok(())
}
