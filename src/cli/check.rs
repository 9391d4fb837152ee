//! Parse, normalize and inspect CQL patterns

use std::path::{Path, PathBuf};

use crate::{
    builder::QueryBuilder,
    output::{render_tree, to_json, to_json_pretty},
    parser::parse_with_default_attribute,
    settings::BuilderSettings,
};
use super::CliError;

/// What to do with the pattern
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CheckMode {
    /// Only validate syntax
    #[default]
    Syntax,
    /// Print the parsed AST as JSON
    Ast,
    /// Round-trip through the builder and print canonical CQL
    Normalize,
    /// Print the builder tree
    Tree,
}

/// Options for the check command
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// The CQL pattern
    pub query: String,
    /// JSON builder settings; defaults apply when absent
    pub settings: Option<PathBuf>,
    /// Pretty-print JSON output
    pub pretty: bool,
    pub mode: CheckMode,
}

/// Result of a check operation
#[derive(Debug, Clone, PartialEq)]
pub enum CheckResult {
    /// Syntax validation passed
    SyntaxValid,
    /// The pattern was blank
    Empty,
    /// AST as JSON
    Ast(String),
    /// Canonical CQL
    Cql(String),
    /// Builder tree projection
    Tree(String),
}

/// Load settings from `path`, or the defaults when no path is given.
pub fn load_settings(path: Option<&Path>) -> Result<BuilderSettings, CliError> {
    match path {
        Some(path) => Ok(BuilderSettings::from_file(path)?),
        None => Ok(BuilderSettings::default()),
    }
}

/// Execute a check operation
pub fn execute_check(options: &CheckOptions) -> Result<CheckResult, CliError> {
    let settings = load_settings(options.settings.as_deref())?;

    match options.mode {
        CheckMode::Syntax | CheckMode::Ast => {
            let query = parse_with_default_attribute(&options.query, &settings.default_attribute)?;
            let Some(query) = query else {
                return Ok(CheckResult::Empty);
            };
            if options.mode == CheckMode::Syntax {
                return Ok(CheckResult::SyntaxValid);
            }
            let json = if options.pretty {
                to_json_pretty(&query)?
            } else {
                to_json(&query)?
            };
            Ok(CheckResult::Ast(json))
        }
        CheckMode::Normalize | CheckMode::Tree => {
            if options.query.trim().is_empty() {
                return Ok(CheckResult::Empty);
            }
            let mut builder = QueryBuilder::new(settings);
            builder.parse(Some(&options.query))?;

            if options.mode == CheckMode::Tree {
                return Ok(CheckResult::Tree(render_tree(&builder)?));
            }
            match builder.get_cql()? {
                Some(cql) => Ok(CheckResult::Cql(cql)),
                None => Ok(CheckResult::Empty),
            }
        }
    }
}
