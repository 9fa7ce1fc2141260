//! # Error Types
//!
//! Custom error types for Bindkit using `thiserror`.

use thiserror::Error;

/// Main error type for Bindkit
#[derive(Debug, Error)]
pub enum BindkitError {
    /// Structurally invalid persistence documents
    #[error("persistence error: {0}")]
    Persistence(String),

    /// XML syntax errors
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for Bindkit
pub type Result<T> = std::result::Result<T, BindkitError>;
