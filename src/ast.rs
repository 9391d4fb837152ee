//! # Corpus Query Language - Abstract Syntax Tree
//!
//! This module defines the Abstract Syntax Tree (AST) produced by the CQL
//! [parser](crate::parser). A parsed pattern is a sequence of token slots, each
//! slot constraining one word position of the corpus.
//!
//! ## Architecture Overview
//!
//! - **[query]** - The parse result: token slots plus an optional `within` clause
//! - **[token]** - One `[...]` slot with its anchors and repetition
//! - **[expressions]** - The boolean attribute-constraint tree inside a slot
//! - **[operators]** - Attribute comparisons (`=`, `!=`) and boolean operators (`&`, `|`)
//!
//! ## Quick Start
//!
//! ```text
//! <s> [lemma="run" & pos="V.*"] [word="(?-i)Fast"]{1,3} within <p/>
//! ```
//!
//! This pattern matches a sentence-initial form of "run" followed by one to three
//! case-sensitive occurrences of "Fast", inside a single paragraph.
//!
//! ## Core Concepts
//!
//! ### Attribute values are regexes
//!
//! The value of an attribute constraint is always a regex fragment. Case
//! sensitivity is not a separate field: it stays encoded as a `(?-i)` or `(?c)`
//! prefix of the value and is only decoded by the [codec](crate::codec).
//!
//! ### No operator precedence
//!
//! `&` and `|` bind equally. `a & b | c` parses as `(a & b) | c`; parentheses
//! are the only way to group mixed operators.
//!
//! ### Any word
//!
//! An empty slot `[]` has no expression and matches any word.
pub mod expressions;
pub mod operators;
pub mod query;
pub mod token;

pub use expressions::Expr;
pub use operators::{AttributeOperator, BoolOp};
pub use query::Query;
pub use token::{Repeats, Token, XmlTag};
