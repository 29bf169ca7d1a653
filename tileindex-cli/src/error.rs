//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent
//! formatting and the exit-code contract of the tool: every fatal
//! condition exits 1.

use std::fmt;
use std::process;

use tileindex::IndexError;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Missing or inconsistent command-line arguments.
    Usage(String),
    /// Failed to initialize logging.
    Logging(String),
    /// The index build aborted.
    Index(IndexError),
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        // Print additional help for specific errors
        match self {
            CliError::Usage(_) => {
                eprintln!();
                eprintln!("Usage: tileindex [OPTIONS] <OUTPUT> <SRC_DATASET>...");
                eprintln!("For more information, try '--help'.");
            }
            CliError::Index(IndexError::DriverNotFound { available, .. }) => {
                eprintln!();
                eprintln!("The following vector drivers are available:");
                for name in available {
                    eprintln!("  -> `{}'", name);
                }
            }
            _ => {}
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{}", msg),
            CliError::Logging(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Index(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Index(e) => Some(e),
            _ => None,
        }
    }
}
