/*!
 * Error types for the crossverse application.
 *
 * This module contains custom error types for different parts of the
 * application, using the thiserror crate for ergonomic error definitions.
 */

// Allow dead code - error types are for library consumers
#![allow(dead_code)]

use thiserror::Error;

/// Errors that can occur when working with corpus data
#[derive(Error, Debug)]
pub enum CorpusError {
    /// A canonical reference string did not have the `book.chapter.verse` shape
    #[error("Invalid canonical reference: {0}")]
    InvalidReference(String),

    /// A translation code was requested that is not part of the build
    #[error("Unknown translation code: {0}")]
    UnknownTranslation(String),
}

/// Fatal build conditions; everything else is logged and survived
#[derive(Error, Debug)]
pub enum BuildError {
    /// Every dataset failed to parse, there is nothing to align
    #[error("No translation could be parsed")]
    NoTranslations,

    /// The configured reference translation is not among the parsed ones
    #[error("Reference translation '{0}' failed to parse")]
    ReferenceUnavailable(String),

    /// The top-level build timeout elapsed
    #[error("Build timed out after {0} seconds")]
    Timeout(u64),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from corpus data handling
    #[error("Corpus error: {0}")]
    Corpus(#[from] CorpusError),

    /// Fatal build condition
    #[error("Build error: {0}")]
    Build(#[from] BuildError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
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
