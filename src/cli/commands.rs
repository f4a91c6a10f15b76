// CLI command implementations
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::{json, Map, Value};
use wvtags::{ItemValue, PropertyMap, TagTypes, WavPackFile};

use crate::cli::config::{BatchOperation, Commands, Config};
use crate::cli::output::{OutputFormatter, ProgressBar};
use crate::cli::{CliError, CliResult};

/// Dispatch a parsed command line
pub fn run(config: &Config) -> CliResult<()> {
    let formatter = OutputFormatter::new(config.format, config.quiet);

    match &config.command {
        Commands::Read { files, output } => command_read(files, output.as_deref(), &formatter),
        Commands::Write { file, metadata, from_file } => {
            command_write(file, metadata.as_deref(), from_file.as_deref(), &formatter)
        }
        Commands::Strip { files, id3v1, ape } => command_strip(files, *id3v1, *ape, &formatter),
        Commands::Info { files, detailed } => command_info(files, *detailed, &formatter),
        Commands::Batch { directory, pattern, operation, metadata } => {
            command_batch(directory, pattern, *operation, metadata.as_deref(), &formatter)
        }
    }
}

fn open(path: &str, read_properties: bool) -> CliResult<WavPackFile<wvtags::FileStream>> {
    if !Path::new(path).exists() {
        return Err(CliError::FileNotFound(path.to_string()));
    }
    Ok(WavPackFile::open_path(path, read_properties)?)
}

/// Build the report printed by `read`
fn tag_report(path: &str, file: &WavPackFile<wvtags::FileStream>) -> Value {
    let mut binary = Map::new();
    if let Some(ape) = file.tag().ape_ref() {
        for item in ape.items() {
            match &item.value {
                ItemValue::Binary(data) => {
                    binary.insert(item.key.clone(), Value::String(STANDARD.encode(data)));
                }
                ItemValue::Locator(location) => {
                    binary.insert(item.key.clone(), Value::String(location.clone()));
                }
                ItemValue::Text(_) => {}
            }
        }
    }

    let mut report = json!({
        "file": path,
        "has_ape": file.has_ape_tag(),
        "has_id3v1": file.has_id3v1_tag(),
        "tags": file.properties(),
    });
    if !binary.is_empty() {
        report["binary_items"] = Value::Object(binary);
    }
    report
}

/// Parse a properties JSON object.
///
/// Values may be a string, an array of strings, or null (remove the key).
pub fn parse_properties(metadata_json: &str) -> CliResult<PropertyMap> {
    let value: Value = serde_json::from_str(metadata_json)
        .map_err(|e| CliError::ParseError(format!("Invalid JSON: {}", e)))?;
    let Value::Object(entries) = value else {
        return Err(CliError::ParseError("Properties must be a JSON object".to_string()));
    };

    let mut properties = PropertyMap::new();
    for (key, value) in entries {
        let values = match value {
            Value::Null => Vec::new(),
            Value::String(s) => vec![s],
            Value::Number(n) => vec![n.to_string()],
            Value::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::String(s) => Ok(s),
                    Value::Number(n) => Ok(n.to_string()),
                    other => Err(CliError::ParseError(format!("Unsupported value for {}: {}", key, other))),
                })
                .collect::<CliResult<Vec<_>>>()?,
            other => {
                return Err(CliError::ParseError(format!("Unsupported value for {}: {}", key, other)));
            }
        };
        properties.insert(key.to_uppercase(), values);
    }
    Ok(properties)
}

/// Merge `changes` into the file's current properties and save
fn apply_properties(path: &str, changes: &PropertyMap) -> CliResult<PropertyMap> {
    let mut file = open(path, false)?;

    let mut properties = file.properties();
    for (key, values) in changes {
        if values.is_empty() {
            properties.remove(key);
        } else {
            properties.insert(key.clone(), values.clone());
        }
    }

    let rejected = file.set_properties(&properties);
    if !file.save()? {
        return Err(CliError::ReadOnly(path.to_string()));
    }
    Ok(rejected)
}

/// Read tags from files
fn command_read(files: &[String], output: Option<&str>, formatter: &OutputFormatter) -> CliResult<()> {
    let mut writer: Box<dyn Write> = match output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(std::io::stdout()),
    };

    for file_path in files {
        match open(file_path, false) {
            Ok(file) => formatter.output_report(&tag_report(file_path, &file), &mut *writer)?,
            Err(e) => formatter.print_error(&format!("{}: {}", file_path, e)),
        }
    }
    writer.flush()?;

    Ok(())
}

/// Write properties to a file
fn command_write(
    file: &str,
    metadata: Option<&str>,
    from_file: Option<&str>,
    formatter: &OutputFormatter,
) -> CliResult<()> {
    let metadata_json = match (from_file, metadata) {
        (Some(path), _) => std::fs::read_to_string(path)?,
        (None, Some(json)) => json.to_string(),
        (None, None) => return Err(CliError::Other("No properties given".to_string())),
    };
    let changes = parse_properties(&metadata_json)?;

    let rejected = apply_properties(file, &changes)?;
    for key in rejected.keys() {
        formatter.print_error(&format!("{}: property {} could not be stored", file, key));
    }
    formatter.print_success(&format!("Updated tags for {}", file));

    Ok(())
}

/// Strip tags from files
fn command_strip(files: &[String], id3v1: bool, ape: bool, formatter: &OutputFormatter) -> CliResult<()> {
    let mut tags = TagTypes::NONE;
    if id3v1 {
        tags = tags | TagTypes::ID3V1;
    }
    if ape {
        tags = tags | TagTypes::APE;
    }
    if tags == TagTypes::NONE {
        tags = TagTypes::ALL;
    }

    for file_path in files {
        let result = open(file_path, false).and_then(|mut file| {
            file.strip(tags);
            if file.save()? {
                Ok(())
            } else {
                Err(CliError::ReadOnly(file_path.clone()))
            }
        });
        match result {
            Ok(()) => formatter.print_success(&format!("Stripped {}", file_path)),
            Err(e) => formatter.print_error(&format!("{}: {}", file_path, e)),
        }
    }

    Ok(())
}

/// Show detailed file information
fn command_info(files: &[String], detailed: bool, formatter: &OutputFormatter) -> CliResult<()> {
    let stdout = std::io::stdout();
    let mut writer = stdout.lock();

    for file_path in files {
        let file = match open(file_path, true) {
            Ok(file) => file,
            Err(e) => {
                formatter.print_error(&format!("{}: {}", file_path, e));
                continue;
            }
        };

        let metadata = std::fs::metadata(file_path)?;
        let modified = metadata
            .modified()
            .ok()
            .map(|mtime| chrono::DateTime::<chrono::Utc>::from(mtime).format("%Y-%m-%d %H:%M:%S UTC").to_string());

        let mut report = json!({
            "file": file_path,
            "size": metadata.len(),
            "modified": modified,
            "audio": file.audio_properties(),
            "has_ape": file.has_ape_tag(),
            "has_id3v1": file.has_id3v1_tag(),
        });
        if detailed {
            report["layout"] = json!({
                "ape": file.layout().ape(),
                "id3v1": file.layout().id3v1(),
            });
            if let Some(ape) = file.tag().ape_ref() {
                report["ape_items"] = json!(ape.items().len());
                report["ape_unsupported"] = json!(ape.unsupported_data());
            }
        }

        formatter.output_report(&report, &mut writer)?;
    }

    Ok(())
}

/// Batch process directory
fn command_batch(
    directory: &str,
    pattern: &str,
    operation: BatchOperation,
    metadata: Option<&str>,
    formatter: &OutputFormatter,
) -> CliResult<()> {
    use glob::glob;

    let changes = match operation {
        BatchOperation::Write => {
            let json = metadata.ok_or_else(|| {
                CliError::Other("Metadata JSON required for write operation".to_string())
            })?;
            Some(parse_properties(json)?)
        }
        BatchOperation::Read => None,
    };

    // Build glob pattern
    let glob_pattern = if pattern.contains('*') || pattern.contains('?') {
        format!("{}/{}", directory, pattern)
    } else {
        format!("{}/**/{}", directory, pattern)
    };

    let mut files: Vec<String> = Vec::new();
    for entry in glob(&glob_pattern).map_err(|e| CliError::Other(format!("Invalid glob pattern: {}", e)))? {
        match entry {
            Ok(path) if path.is_file() => {
                if let Some(path_str) = path.to_str() {
                    files.push(path_str.to_string());
                }
            }
            Ok(_) => {}
            Err(e) => formatter.print_error(&format!("Error reading path: {}", e)),
        }
    }

    if files.is_empty() {
        formatter.print_info("No files found matching pattern");
        return Ok(());
    }

    let show_progress = !formatter.quiet;
    let mut progress = ProgressBar::new(files.len(), show_progress);
    let mut reports = Vec::new();
    let mut error_count = 0;

    for file_path in &files {
        let result = match &changes {
            None => open(file_path, false).map(|file| reports.push(tag_report(file_path, &file))),
            Some(changes) => apply_properties(file_path, changes).map(|_| ()),
        };
        if let Err(e) = result {
            log::warn!("{}: {}", file_path, e);
            error_count += 1;
        }
        progress.increment(file_path);
    }

    let stdout = std::io::stdout();
    let mut writer = stdout.lock();
    for report in &reports {
        formatter.output_report(report, &mut writer)?;
    }

    formatter.print_info(&format!(
        "Completed {} on {} files: {} successful, {} errors",
        operation,
        files.len(),
        files.len() - error_count,
        error_count
    ));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_properties_value_shapes() {
        let properties =
            parse_properties(r#"{"title": "x", "Artist": ["a", "b"], "comment": null, "TRACKNUMBER": 3}"#).unwrap();
        assert_eq!(properties["TITLE"], vec!["x"]);
        assert_eq!(properties["ARTIST"], vec!["a", "b"]);
        assert!(properties["COMMENT"].is_empty());
        assert_eq!(properties["TRACKNUMBER"], vec!["3"]);
    }

    #[test]
    fn test_parse_properties_rejects_non_object() {
        assert!(matches!(parse_properties("[1, 2]"), Err(CliError::ParseError(_))));
        assert!(matches!(parse_properties(r#"{"A": {"b": 1}}"#), Err(CliError::ParseError(_))));
        assert!(parse_properties("not json").is_err());
    }
}
