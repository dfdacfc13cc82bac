//! Global error handling for elixir
//!
//! Every fatal condition of a compile is represented here. Recoverable
//! problems (syntax warnings, bad asset ids) never become errors; they are
//! logged and collected in the compile report instead.

use std::io;
use thiserror::Error;

/// Global error type for elixir operations
#[derive(Error, Debug)]
pub enum ElixirError {
    /// File system errors
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Directory enumeration errors
    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),

    /// Malformed entity while decoding escaped text
    #[error("Escape error: {0}")]
    Escape(#[from] quick_xml::escape::EscapeError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// A classifier strategy that does not exist was requested
    #[error("Unknown processor: {0}")]
    UnknownStrategy(String),

    /// Path not found
    #[error("Path not found: {0}")]
    PathNotFound(String),

    /// Writer errors
    #[error("Writer error: {0}")]
    Writer(String),
}

/// Specialized Result type for elixir operations
pub type Result<T> = std::result::Result<T, ElixirError>;

/// Creates an ElixirError with a formatted message
#[macro_export]
macro_rules! error {
    ($error_type:ident, $($arg:tt)*) => {
        $crate::error::ElixirError::$error_type(format!($($arg)*))
    };
}

/// Returns an error result with a formatted message
#[macro_export]
macro_rules! bail {
    ($error_type:ident, $($arg:tt)*) => {
        return Err($crate::error!($error_type, $($arg)*))
    };
}

/// Ensures a condition is true, otherwise returns an error
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $error_type:ident, $($arg:tt)*) => {
        if !($cond) {
            $crate::bail!($error_type, $($arg)*)
        }
    };
}

// The binary reports errors through io::Result like the rest of main.
impl From<ElixirError> for io::Error {
    fn from(err: ElixirError) -> Self {
        match err {
            ElixirError::Io(e) => e,
            ElixirError::PathNotFound(_) => io::Error::new(io::ErrorKind::NotFound, err.to_string()),
            other => io::Error::new(io::ErrorKind::Other, other.to_string()),
        }
    }
}
