/*!
 * Error types for the teialign application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

// Allow dead code - error types are for library consumers
#![allow(dead_code)]

use thiserror::Error;

/// Errors that can occur when talking to an aligner backend
#[derive(Error, Debug)]
pub enum AlignerError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Language code outside the supported set
    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    /// The aligner backend failed during processing
    #[error("Alignment failed: {0}")]
    AlignmentFailed(String),
}

/// Errors that can occur while parsing or rewriting TEI documents
#[derive(Error, Debug)]
pub enum TeiError {
    /// Input document is not well-formed XML
    #[error("Invalid TEI XML: {0}")]
    InvalidXml(String),

    /// Internal invariant violated while rewriting a document tree
    #[error("Projection error: {0}")]
    Projection(String),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from the aligner backend
    #[error("Aligner error: {0}")]
    Aligner(#[from] AlignerError),

    /// Error from TEI processing
    #[error("TEI error: {0}")]
    Tei(#[from] TeiError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl AppError {
    /// Whether this error is the caller's fault (bad input) rather than an
    /// internal failure. Client errors surface their message to the caller;
    /// server errors keep detail in the logs.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AppError::Tei(TeiError::InvalidXml(_))
                | AppError::Aligner(AlignerError::UnsupportedLanguage(_))
        )
    }
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
