//! CLI support for cql-builder
//!
//! Provides programmatic access to the `cqlb` commands so they can be driven
//! from other tools and from tests.

mod check;
mod docs;

pub use check::{execute_check, load_settings, CheckMode, CheckOptions, CheckResult};
pub use docs::{get_doc_topic, get_docs_overview, DocTopic};

use std::io;

use crate::{builder::BuilderError, parser::ParseError, settings::SettingsError};

/// Errors that can occur during CLI operations
#[derive(Debug)]
pub enum CliError {
    /// Parser error
    Parse(ParseError),
    /// Builder edit or population error
    Builder(BuilderError),
    /// Settings file error
    Settings(SettingsError),
    /// JSON rendering error
    Json(serde_json::Error),
    /// IO error
    Io(io::Error),
    /// No input provided
    NoInput,
    /// Unknown documentation topic
    UnknownTopic(String),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Parse(e) => write!(f, "Parse error: {}", e),
            CliError::Builder(e) => write!(f, "Builder error: {}", e),
            CliError::Settings(e) => write!(f, "{}", e),
            CliError::Json(e) => write!(f, "JSON error: {}", e),
            CliError::Io(e) => write!(f, "IO error: {}", e),
            CliError::NoInput => write!(f, "No query provided. Pass one as an argument or pipe it to stdin."),
            CliError::UnknownTopic(t) => {
                write!(f, "Unknown topic: '{}'\nRun 'cqlb docs' to see available topics.", t)
            }
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Parse(e) => Some(e),
            CliError::Builder(e) => Some(e),
            CliError::Settings(e) => Some(e),
            CliError::Json(e) => Some(e),
            CliError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ParseError> for CliError {
    fn from(e: ParseError) -> Self {
        CliError::Parse(e)
    }
}

impl From<BuilderError> for CliError {
    fn from(e: BuilderError) -> Self {
        match e {
            BuilderError::Parse(e) => CliError::Parse(e),
            other => CliError::Builder(other),
        }
    }
}

impl From<SettingsError> for CliError {
    fn from(e: SettingsError) -> Self {
        CliError::Settings(e)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Json(e)
    }
}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        CliError::Io(e)
    }
}
