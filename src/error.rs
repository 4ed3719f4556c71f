//! Error types and handling for the `Tripmeter` application

use thiserror::Error;

/// Main error type for the `Tripmeter` application
#[derive(Error, Debug)]
pub enum TripmeterError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// Tabular record errors
    #[error("Record error: {source}")]
    Record {
        #[from]
        source: csv::Error,
    },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// General application errors
    #[error("Application error: {message}")]
    General { message: String },
}

impl TripmeterError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new general error
    pub fn general<S: Into<String>>(message: S) -> Self {
        Self::General {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            TripmeterError::Config { .. } => {
                "Configuration error. Please check your config file and API key.".to_string()
            }
            TripmeterError::Validation { message } => {
                format!("Invalid input: {message}")
            }
            TripmeterError::Record { .. } => {
                "Failed to read or write trip records. Please check the input file format."
                    .to_string()
            }
            TripmeterError::Io { .. } => {
                "File operation failed. Please check file paths and permissions.".to_string()
            }
            TripmeterError::General { message } => message.clone(),
        }
    }
}
