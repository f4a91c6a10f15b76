// CLI configuration
use clap::{Parser, Subcommand, ValueEnum};

use crate::cli::output::OutputFormat;

/// wvtags - APE and ID3v1 tag tool for WavPack files
#[derive(Parser, Debug)]
#[command(name = "wvtags")]
#[command(about = "Read, write and strip trailing APE/ID3v1 tags in WavPack files", long_about = None)]
#[command(version)]
#[command(author = "xwsjjctz <xwsjjctz@icloud.com>")]
pub struct Config {
    /// Output format
    #[arg(short, long, value_enum, default_value = "pretty", global = true)]
    pub format: OutputFormat,

    /// Quiet mode (suppress progress messages)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// env_logger-style filter string (e.g. "wvtags=debug"); overrides RUST_LOG
    #[arg(long, global = true)]
    pub log_filter: Option<String>,

    /// Subcommand
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Read tags from WavPack file(s)
    Read {
        /// Audio file path(s)
        #[arg(value_name = "FILE", required = true)]
        files: Vec<String>,

        /// Output to file instead of stdout
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Write tag properties to a file
    Write {
        /// Audio file path
        #[arg(value_name = "FILE")]
        file: String,

        /// Properties as JSON, e.g. '{"TITLE": "x", "ARTIST": ["a", "b"], "COMMENT": null}'
        #[arg(short, long, required_unless_present = "from_file")]
        metadata: Option<String>,

        /// Read the properties JSON from a file
        #[arg(long)]
        from_file: Option<String>,
    },

    /// Remove tags from file(s)
    Strip {
        /// Audio file path(s)
        #[arg(value_name = "FILE", required = true)]
        files: Vec<String>,

        /// Remove the ID3v1 tag
        #[arg(long)]
        id3v1: bool,

        /// Remove the APE tag
        #[arg(long)]
        ape: bool,
    },

    /// Show file information
    Info {
        /// Audio file path(s)
        #[arg(value_name = "FILE", required = true)]
        files: Vec<String>,

        /// Show tag offsets and sizes
        #[arg(short, long)]
        detailed: bool,
    },

    /// Batch process multiple files
    Batch {
        /// Directory path
        #[arg(short, long)]
        directory: String,

        /// File pattern (e.g., "*.wv")
        #[arg(short, long, default_value = "*.wv")]
        pattern: String,

        /// Operation: read or write
        #[arg(value_enum)]
        operation: BatchOperation,

        /// Properties JSON to write (required for write operation)
        #[arg(long)]
        metadata: Option<String>,
    },
}

/// Batch operation type
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BatchOperation {
    Read,
    Write,
}

impl std::fmt::Display for BatchOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BatchOperation::Read => write!(f, "read"),
            BatchOperation::Write => write!(f, "write"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_strip() {
        let config = Config::parse_from(["wvtags", "strip", "a.wv", "--ape", "-q"]);
        assert!(config.quiet);
        match config.command {
            Commands::Strip { files, id3v1, ape } => {
                assert_eq!(files, vec!["a.wv"]);
                assert!(ape);
                assert!(!id3v1);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_write_requires_metadata() {
        assert!(Config::try_parse_from(["wvtags", "write", "a.wv"]).is_err());
        assert!(Config::try_parse_from(["wvtags", "write", "a.wv", "--from-file", "m.json"]).is_ok());
    }

    #[test]
    fn test_batch_defaults() {
        let config = Config::parse_from(["wvtags", "--format", "json", "batch", "-d", "music", "read"]);
        assert_eq!(config.format, OutputFormat::Json);
        match config.command {
            Commands::Batch { pattern, operation, .. } => {
                assert_eq!(pattern, "*.wv");
                assert_eq!(operation, BatchOperation::Read);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
