// Output formatting for CLI

use crate::cli::{CliError, CliResult};
use clap::ValueEnum;
use std::io::{self, Write};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON
    #[default]
    Pretty,
    /// Compact JSON, one document per line
    Json,
    /// Sorted `key: value` lines
    KeyValue,
    /// Aligned table
    Table,
}

/// Format and output reports
pub struct OutputFormatter {
    format: OutputFormat,
    pub quiet: bool,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat, quiet: bool) -> Self {
        Self { format, quiet }
    }

    /// Output one report (a JSON object)
    pub fn output_report(&self, report: &serde_json::Value, writer: &mut dyn Write) -> CliResult<()> {
        match self.format {
            OutputFormat::Pretty => {
                writeln!(writer, "{}", serde_json::to_string_pretty(report)?)?;
            }
            OutputFormat::Json => {
                writeln!(writer, "{}", serde_json::to_string(report)?)?;
            }
            OutputFormat::KeyValue => {
                self.output_key_value(report, "", writer)?;
            }
            OutputFormat::Table => {
                self.output_table(report, writer)?;
            }
        }
        Ok(())
    }

    /// Output as key-value pairs; nested objects become dotted keys
    fn output_key_value(&self, report: &serde_json::Value, prefix: &str, writer: &mut dyn Write) -> io::Result<()> {
        if let Some(obj) = report.as_object() {
            let mut items: Vec<_> = obj.iter().collect();
            items.sort_by(|a, b| a.0.cmp(b.0));

            for (key, value) in items {
                let key = if prefix.is_empty() { key.clone() } else { format!("{}.{}", prefix, key) };
                if value.is_object() {
                    self.output_key_value(value, &key, writer)?;
                } else {
                    writeln!(writer, "{}: {}", key, self.format_value(value))?;
                }
            }
        }
        Ok(())
    }

    /// Output as table, one section per nested object
    fn output_table(&self, report: &serde_json::Value, writer: &mut dyn Write) -> io::Result<()> {
        let Some(obj) = report.as_object() else {
            return Ok(());
        };
        let max_key_len = obj
            .values()
            .filter_map(|v| v.as_object())
            .flat_map(|inner| inner.keys())
            .chain(obj.keys())
            .map(|k| k.len())
            .max()
            .unwrap_or(0);

        writeln!(writer, "{}", "=".repeat(max_key_len + 30))?;
        for (key, value) in obj {
            match value.as_object() {
                Some(section) => {
                    writeln!(writer, "[{}]", key)?;
                    for (inner_key, inner_value) in section {
                        writeln!(
                            writer,
                            "  {:<width$}{}",
                            format!("{}:", inner_key),
                            self.format_value(inner_value),
                            width = max_key_len + 2
                        )?;
                    }
                }
                None => {
                    writeln!(
                        writer,
                        "{:<width$}{}",
                        format!("{}:", key),
                        self.format_value(value),
                        width = max_key_len + 4
                    )?;
                }
            }
        }
        writeln!(writer, "{}", "=".repeat(max_key_len + 30))?;
        Ok(())
    }

    /// Format a JSON value for display
    fn format_value(&self, value: &serde_json::Value) -> String {
        match value {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Null => "(none)".to_string(),
            serde_json::Value::Bool(b) => b.to_string(),
            serde_json::Value::Number(n) => n.to_string(),
            serde_json::Value::Array(arr) => arr
                .iter()
                .map(|v| self.format_value(v))
                .collect::<Vec<_>>()
                .join("; "),
            serde_json::Value::Object(obj) => format!("{{{} items}}", obj.len()),
        }
    }

    /// Print success message
    pub fn print_success(&self, message: &str) {
        if !self.quiet {
            println!("✓ {}", message);
        }
    }

    /// Print error message
    pub fn print_error(&self, message: &str) {
        eprintln!("✗ {}", message);
    }

    /// Print info message
    pub fn print_info(&self, message: &str) {
        if !self.quiet {
            println!("  {}", message);
        }
    }
}

/// Progress indicator for batch operations
pub struct ProgressBar {
    total: usize,
    current: usize,
    show: bool,
}

impl ProgressBar {
    pub fn new(total: usize, show: bool) -> Self {
        Self { total, current: 0, show }
    }

    pub fn increment(&mut self, label: &str) {
        self.current += 1;
        if self.show && self.total > 0 {
            let percent = (self.current * 100) / self.total;
            print!("\r[{}/{}] ({}%) {}", self.current, self.total, percent, label);
            if self.current == self.total {
                println!();
            }
            io::stdout().flush().ok();
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::ParseError(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn render(format: OutputFormat, report: &serde_json::Value) -> String {
        let mut out = Vec::new();
        OutputFormatter::new(format, true).output_report(report, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_key_value_flattens_and_sorts() {
        let report = json!({"file": "a.wv", "tags": {"TITLE": ["x"], "ARTIST": ["p", "q"]}});
        assert_eq!(
            render(OutputFormat::KeyValue, &report),
            "file: a.wv\ntags.ARTIST: p; q\ntags.TITLE: x\n"
        );
    }

    #[test]
    fn test_json_is_single_line() {
        let report = json!({"has_ape": true});
        assert_eq!(render(OutputFormat::Json, &report), "{\"has_ape\":true}\n");
    }

    #[test]
    fn test_table_has_sections() {
        let report = json!({"file": "a.wv", "tags": {"TITLE": ["x"]}});
        let table = render(OutputFormat::Table, &report);
        assert!(table.contains("[tags]"));
        assert!(table.contains("TITLE:"));
    }
}
