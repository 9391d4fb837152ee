//! Output rendering for parsed queries and builder trees.
//!
//! - **JSON** via [`to_json()`] and [`to_json_pretty()`]: the AST as serialized
//!   by `serde_json`, with attribute and operator nodes tagged by `type`
//! - **Tree** via [`render_tree()`]: a read-only text projection of a
//!   [`QueryBuilder`], one node per line, the way a visual editor would lay it
//!   out
//!
//! # Examples
//!
//! ```
//! use cql_builder::builder::QueryBuilder;
//! use cql_builder::output::render_tree;
//!
//! let mut builder = QueryBuilder::default();
//! builder.parse(Some(r#"[word="cat" | word="dog"]"#)).unwrap();
//!
//! let tree = render_tree(&builder).unwrap();
//! assert!(tree.starts_with("token 1 [word = \"cat\" | word = \"dog\"]"));
//! ```

use std::fmt::Write;

use crate::{
    ast::Query,
    builder::{BuilderError, Node, NodeId, QueryBuilder},
};

/// Compact JSON for a parsed query.
pub fn to_json(query: &Query) -> Result<String, serde_json::Error> {
    serde_json::to_string(query)
}

/// Pretty-printed JSON for a parsed query, with 2-space indentation.
pub fn to_json_pretty(query: &Query) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(query)
}

pub struct TreePrinter<'a> {
    builder: &'a QueryBuilder,
}

impl<'a> TreePrinter<'a> {
    pub fn new(builder: &'a QueryBuilder) -> Self {
        TreePrinter { builder }
    }

    pub fn print(&self) -> Result<String, BuilderError> {
        let mut out = String::new();
        for index in 0..self.builder.tokens().len() {
            let token = self.builder.token(index)?;
            let _ = writeln!(out, "token {} {}", index + 1, self.builder.token_cql(index)?);

            let mut flags = Vec::new();
            if token.begin_of_sentence {
                flags.push("sentence start".to_string());
            }
            if token.end_of_sentence {
                flags.push("sentence end".to_string());
            }
            if token.optional {
                flags.push("optional".to_string());
            }
            let repeats = token.repeats();
            if repeats.min != 1 || repeats.max != Some(1) {
                let max = repeats.max.map_or("unbounded".to_string(), |max| max.to_string());
                flags.push(format!("repeats {}..{}", repeats.min, max));
            }
            if !flags.is_empty() {
                let _ = writeln!(out, "{}({})", self.indent(1), flags.join(", "));
            }

            self.print_node(&mut out, token.root(), 1)?;
        }

        if let Some(within) = self.builder.within() {
            let _ = writeln!(out, "within {}", within);
        }
        Ok(out)
    }

    fn print_node(&self, out: &mut String, id: NodeId, indent: usize) -> Result<(), BuilderError> {
        match self.builder.node(id)? {
            Node::Group(group) => {
                let kind = if group.is_root { "root" } else { "group" };
                let _ = writeln!(out, "{}{} {} {}", self.indent(indent), kind, group.operator_label, id);
                for child in group.children() {
                    self.print_node(out, *child, indent + 1)?;
                }
            }
            Node::Attribute(attribute) => {
                let case = if attribute.case_sensitive { " (case sensitive)" } else { "" };
                let _ = writeln!(
                    out,
                    "{}{} {} {:?}{} {}",
                    self.indent(indent),
                    attribute.attribute_type,
                    attribute.operator,
                    attribute.effective_values(),
                    case,
                    id
                );
            }
        }
        Ok(())
    }

    fn indent(&self, level: usize) -> String {
        "  ".repeat(level)
    }
}

/// Text projection of every token of `builder`.
pub fn render_tree(builder: &QueryBuilder) -> Result<String, BuilderError> {
    TreePrinter::new(builder).print()
}
