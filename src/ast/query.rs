use serde::Serialize;

use crate::ast::Token;

/// Complete parsed pattern.
///
/// Represents every token slot of a query plus the optional `within` clause.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Query {
    /// Token slots, in reading order (never empty)
    pub tokens: Vec<Token>,

    /// Element name of the `within <name/>` clause
    pub within: Option<String>,
}
