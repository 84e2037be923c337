//! CLI error types with exit code handling
//!
//! This module provides a unified error type for CLI operations that
//! maps errors to appropriate exit codes.

use miette::Diagnostic;
use thiserror::Error;

use artalk_community_core::CoreError;
use artalk_community_remote::{BuildError, FetchError};

use crate::exit_codes;

/// CLI-specific error type that includes exit code information
#[derive(Error, Debug, Diagnostic, Clone)]
pub enum CliError {
    /// Entry lists are malformed or contain invalid entries
    #[error("Validation failed: {message}")]
    #[diagnostic(code(artalk_community::cli::validation))]
    Validation {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// The build could not produce a catalog
    #[error("Build failed: {message}")]
    #[diagnostic(code(artalk_community::cli::build))]
    Build {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// A remote service could not be reached or answered badly
    #[error("Network error: {message}")]
    #[diagnostic(code(artalk_community::cli::network))]
    Network { message: String },

    /// IO error (file not found, permissions, etc.)
    #[error("IO error: {message}")]
    #[diagnostic(code(artalk_community::cli::io))]
    Io { message: String },

    /// Internal error (runtime, unexpected failure)
    #[error("Internal error: {message}")]
    #[diagnostic(code(artalk_community::cli::internal))]
    Internal { message: String },
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Validation { .. } => exit_codes::VALIDATION_ERROR,
            CliError::Build { .. } => exit_codes::ERROR,
            CliError::Network { .. } => exit_codes::ERROR,
            CliError::Io { .. } => exit_codes::IO_ERROR,
            CliError::Internal { .. } => exit_codes::ERROR,
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Create a validation error with help text
    pub fn validation_with_help(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            help: Some(help.into()),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Io {
            message: err.to_string(),
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Io(e) => e.into(),
            CoreError::JsonParse(e) => CliError::Io {
                message: format!("unreadable catalog: {}", e),
            },
            other => CliError::validation_with_help(
                other.to_string(),
                "Entry lists must be YAML sequences of mappings",
            ),
        }
    }
}

impl From<FetchError> for CliError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::Io(e) => e.into(),
            other => CliError::Network {
                message: other.to_string(),
            },
        }
    }
}

impl From<BuildError> for CliError {
    fn from(err: BuildError) -> Self {
        match err {
            BuildError::MissingPeerDependency { .. } => CliError::Build {
                message: err.to_string(),
                help: Some(
                    "Declare `artalk` in the package's peerDependencies and publish a new version"
                        .to_string(),
                ),
            },
            BuildError::Core(e) => e.into(),
            BuildError::Fetch(e) => e.into(),
        }
    }
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
