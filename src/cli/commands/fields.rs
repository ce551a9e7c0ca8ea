//! Fields command implementation.
//!
//! Lists the tracker's field directory with the configured attribute each
//! field backs, if any. Does not build the attribute directory, so it still
//! works when an attribute names a field the tracker lacks.

use colored::Colorize;
use serde::Serialize;

use crate::config::load_config;
use crate::error::Result;
use crate::model::FieldDescriptor;
use crate::source::{create_source, IssueSource};

use super::{runtime, SourceOptions};

#[derive(Serialize)]
struct FieldRow<'a> {
    id: &'a str,
    name: &'a str,
    custom: bool,
    attribute: Option<&'a str>,
}

#[derive(Serialize)]
struct FieldsOutput<'a> {
    count: usize,
    fields: Vec<FieldRow<'a>>,
}

/// Execute the fields command.
///
/// # Errors
///
/// Returns an error if configuration or the field directory cannot be loaded.
pub fn execute(options: &SourceOptions<'_>, json: bool) -> Result<()> {
    let config = load_config(options.config)?;
    let source = create_source(&config, options.from_file)?;

    let mut fields = runtime()?.block_on(source.fields())?;
    fields.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));

    let rows: Vec<FieldRow<'_>> = fields
        .iter()
        .map(|field| FieldRow {
            id: &field.id,
            name: &field.name,
            custom: field.custom,
            attribute: attribute_for(field, &config.query.attributes),
        })
        .collect();

    if crate::is_csv() {
        println!("id,name,custom,attribute");
        for row in &rows {
            println!(
                "{},{},{},{}",
                crate::csv_escape(row.id),
                crate::csv_escape(row.name),
                row.custom,
                crate::csv_escape(row.attribute.unwrap_or(""))
            );
        }
    } else if json {
        let output = FieldsOutput {
            count: rows.len(),
            fields: rows,
        };
        println!("{}", serde_json::to_string(&output)?);
    } else if rows.is_empty() {
        println!("No fields found.");
    } else {
        println!("Fields ({} found):", rows.len());
        println!();
        for row in &rows {
            let attribute = row
                .attribute
                .map(|a| format!(" → {}", a.cyan()))
                .unwrap_or_default();
            println!("  {:<32} {}{attribute}", row.name, row.id.dimmed());
        }
    }

    Ok(())
}

fn attribute_for<'a>(
    field: &FieldDescriptor,
    attributes: &'a std::collections::BTreeMap<String, String>,
) -> Option<&'a str> {
    attributes
        .iter()
        .find(|(_, name)| name.to_lowercase() == field.name.to_lowercase())
        .map(|(attribute, _)| attribute.as_str())
}
