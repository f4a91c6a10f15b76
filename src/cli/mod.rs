// CLI module for wvtags
//
// Command-line front end over the library. Only compiled into the binary.

pub mod commands;
pub mod config;
pub mod output;

pub use config::Config;

// Error type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("File not found: {0}")]
    FileNotFound(String),
    #[error("File is read-only: {0}")]
    ReadOnly(String),
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Tag error: {0}")]
    TagError(#[from] wvtags::Error),
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("Error: {0}")]
    Other(String),
}
