//! Output formatting helpers for the CLI.

use std::io::IsTerminal;

use chrono::{DateTime, Utc};
use comfy_table::presets::NOTHING;
use comfy_table::{Attribute, Cell, ContentArrangement, Table};
use owo_colors::OwoColorize;
use userpass_core::Record;

/// Render a timestamp for display, falling back to the raw seconds.
pub fn format_timestamp(timestamp: i64) -> String {
    DateTime::<Utc>::from_timestamp(timestamp, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| timestamp.to_string())
}

/// Print a confirmation line, highlighted on a terminal.
pub fn print_success(message: &str) {
    if pretty() {
        println!("{}", message.green());
    } else {
        println!("{}", message);
    }
}

/// Convert a record to JSON for output, with a readable `written_at`.
pub fn record_json(record: &Record) -> serde_json::Result<serde_json::Value> {
    let mut value = serde_json::to_value(record)?;
    if let serde_json::Value::Object(fields) = &mut value {
        fields.insert(
            "written_at".to_string(),
            serde_json::Value::String(format_timestamp(record.timestamp)),
        );
    }
    Ok(value)
}

/// Convert multiple records to a JSON array for output.
pub fn records_json(records: &[Record]) -> serde_json::Result<serde_json::Value> {
    records
        .iter()
        .map(record_json)
        .collect::<serde_json::Result<Vec<_>>>()
        .map(serde_json::Value::Array)
}

/// Human-friendly output: stdout is a terminal and TERM is not dumb.
pub fn pretty() -> bool {
    std::io::stdout().is_terminal() && std::env::var("TERM").map_or(true, |t| t != "dumb")
}

/// Render records grouped by key.
///
/// Pretty mode: a borderless table with a dim header.
/// Plain mode: `key<TAB>username<TAB>password` per record, stable for scripts.
pub fn render_records(records: &[Record], with_time: bool) -> String {
    if !pretty() {
        return records
            .iter()
            .map(|r| {
                if with_time {
                    format!("{}\t{}\t{}\t{}", r.key, r.username, r.secret, r.timestamp)
                } else {
                    format!("{}\t{}\t{}", r.key, r.username, r.secret)
                }
            })
            .collect::<Vec<_>>()
            .join("\n");
    }

    let mut headers = vec!["KEY", "USERNAME", "PASSWORD"];
    if with_time {
        headers.push("WRITTEN");
    }

    let mut table = Table::new();
    table.load_preset(NOTHING);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(
        headers
            .iter()
            .map(|h| Cell::new(h).add_attribute(Attribute::Dim))
            .collect::<Vec<_>>(),
    );
    for record in records {
        let mut row = vec![
            Cell::new(&record.key).add_attribute(Attribute::Bold),
            Cell::new(&record.username),
            Cell::new(&record.secret),
        ];
        if with_time {
            row.push(Cell::new(format_timestamp(record.timestamp)));
        }
        table.add_row(row);
    }
    table.to_string()
}
