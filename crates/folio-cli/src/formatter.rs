//! Output formatters for command results.

use crate::commands::SchemaSummary;
use clap::ValueEnum;
use comfy_table::{Cell, Table};
use folio_core::{RunReport, StepRecord};

/// Output format for results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// ASCII table format
    Table,
    /// JSON format
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Trait for formatting output.
pub trait Formatter {
    /// Format the result of a migration run.
    fn format_run(&self, report: &RunReport) -> String;

    /// Format the recorded status of every step.
    fn format_status(&self, records: &[StepRecord]) -> String;

    /// Format the schema summary.
    fn format_schema(&self, summary: &SchemaSummary) -> String;

    /// Format an error message.
    fn format_error(&self, error: &str) -> String;

    /// Format a simple message.
    fn format_message(&self, message: &str) -> String;
}

/// Create a formatter for the given output format.
pub fn create_formatter(format: OutputFormat) -> Box<dyn Formatter> {
    match format {
        OutputFormat::Table => Box::new(TableFormatter),
        OutputFormat::Json => Box::new(JsonFormatter),
    }
}

/// Table formatter using comfy-table.
pub struct TableFormatter;

impl Formatter for TableFormatter {
    fn format_run(&self, report: &RunReport) -> String {
        let mut output = String::new();
        for step in &report.steps {
            output.push_str(&format!("{} [{}]\n", step.step_id, step.status));
            if !step.log.entries().is_empty() {
                output.push_str(&format!("{}\n", step.log));
            }
            if let Some(error) = &step.error {
                output.push_str(&format!("  error: {}\n", error));
            }
        }

        let mut table = Table::new();
        table.set_header(vec!["Step", "Status", "Created", "Updated", "Removed", "Skipped", "Failed"]);
        for step in &report.steps {
            let counts = step.log.counts();
            table.add_row(vec![
                Cell::new(&step.step_id),
                Cell::new(step.status),
                Cell::new(counts.created),
                Cell::new(counts.updated),
                Cell::new(counts.removed),
                Cell::new(counts.skipped),
                Cell::new(counts.failed),
            ]);
        }
        output.push_str(&table.to_string());
        output.push_str(if report.passed {
            "\nMigration run passed"
        } else {
            "\nMigration run failed"
        });
        output
    }

    fn format_status(&self, records: &[StepRecord]) -> String {
        let mut table = Table::new();
        table.set_header(vec!["Step", "Status", "Schema Version", "Duration (ms)", "Error"]);
        for record in records {
            table.add_row(vec![
                Cell::new(&record.step_id),
                Cell::new(record.status),
                Cell::new(record.schema_version),
                Cell::new(record.duration_ms().map(|d| d.to_string()).unwrap_or_default()),
                Cell::new(record.error.as_deref().unwrap_or("")),
            ]);
        }
        table.to_string()
    }

    fn format_schema(&self, summary: &SchemaSummary) -> String {
        let mut sections = Table::new();
        sections.set_header(vec!["Section", "Kind", "Max Levels", "Entry Types"]);
        for section in &summary.sections {
            sections.add_row(vec![
                Cell::new(&section.handle),
                Cell::new(&section.kind),
                Cell::new(section.max_levels.map(|m| m.to_string()).unwrap_or_default()),
                Cell::new(section.entry_types.join(", ")),
            ]);
        }

        let mut layouts = Table::new();
        layouts.set_header(vec!["Entry Type", "Tab", "Fields"]);
        for entry_type in &summary.entry_types {
            for (tab, fields) in &entry_type.tabs {
                layouts.add_row(vec![
                    Cell::new(&entry_type.handle),
                    Cell::new(tab),
                    Cell::new(fields.join(", ")),
                ]);
            }
        }

        format!("Schema version {}\n{}\n{}", summary.version, sections, layouts)
    }

    fn format_error(&self, error: &str) -> String {
        format!("Error: {}", error)
    }

    fn format_message(&self, message: &str) -> String {
        message.to_string()
    }
}

/// JSON formatter.
pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn format_run(&self, report: &RunReport) -> String {
        serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string())
    }

    fn format_status(&self, records: &[StepRecord]) -> String {
        serde_json::to_string_pretty(records).unwrap_or_else(|_| "[]".to_string())
    }

    fn format_schema(&self, summary: &SchemaSummary) -> String {
        serde_json::to_string_pretty(summary).unwrap_or_else(|_| "{}".to_string())
    }

    fn format_error(&self, error: &str) -> String {
        serde_json::json!({
            "error": error
        })
        .to_string()
    }

    fn format_message(&self, message: &str) -> String {
        serde_json::json!({
            "message": message
        })
        .to_string()
    }
}
