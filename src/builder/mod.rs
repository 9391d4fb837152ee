//! The mutable query-builder tree behind a visual CQL editor.
//!
//! A [`QueryBuilder`] holds a list of tokens. Each token owns a root
//! [`AttributeGroup`]; groups contain [`Attribute`]s and nested groups, and every
//! group joins its children with a single operator. All nodes live in one
//! [`Arena`] and are addressed by [`NodeId`], so rendering is a read-only walk
//! over the arena and edits never need to tear anything down.
//!
//! The builder is filled from parsed CQL with [`QueryBuilder::populate`] and
//! turned back into CQL with [`QueryBuilder::get_cql`]:
//!
//! ```
//! use cql_builder::ast::BoolOp;
//! use cql_builder::builder::{AttributeValue, QueryBuilder};
//!
//! let mut builder = QueryBuilder::default();
//! builder.parse(Some(r#"[lemma="run"]"#)).unwrap();
//!
//! let root = builder.token(0).unwrap().root();
//! let pos = builder.create_attribute(root, BoolOp::And, None).unwrap();
//! builder.set_type(pos, "pos").unwrap();
//! builder.set_value(pos, AttributeValue::Text("V.*".into())).unwrap();
//!
//! assert_eq!(
//!     builder.get_cql().unwrap().as_deref(),
//!     Some(r#"[lemma = "run" & pos = "V.*"]"#)
//! );
//! ```

mod node;
mod populate;
mod rebalance;
mod serialize;

pub use node::{Arena, Attribute, AttributeGroup, AttributeValue, Comparator, Node, NodeId};

use std::fmt;

use crate::{
    ast::{BoolOp, Repeats},
    parser::ParseError,
    settings::BuilderSettings,
};

/// Errors raised by builder edits and by populating the builder.
#[derive(Debug, Clone, PartialEq)]
pub enum BuilderError {
    /// The pattern could not be parsed
    Parse(ParseError),
    /// No live node has this id
    UnknownNode(NodeId),
    NotAGroup(NodeId),
    NotAnAttribute(NodeId),
    /// An insertion was positioned relative to a node outside the group
    NotAChild { group: NodeId, node: NodeId },
    /// Root groups live as long as their token
    RootRemoval(NodeId),
    UnknownToken(usize),
    /// Repetition with `min > max`
    InvalidRepeats { min: u32, max: u32 },
    UnknownComparator(String),
}

impl fmt::Display for BuilderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuilderError::Parse(e) => write!(f, "Parse error: {}", e),
            BuilderError::UnknownNode(id) => write!(f, "No builder node {}", id),
            BuilderError::NotAGroup(id) => write!(f, "Builder node {} is not an attribute group", id),
            BuilderError::NotAnAttribute(id) => write!(f, "Builder node {} is not an attribute", id),
            BuilderError::NotAChild { group, node } => {
                write!(f, "Builder node {} is not a child of group {}", node, group)
            }
            BuilderError::RootRemoval(id) => write!(f, "Cannot remove root group {}", id),
            BuilderError::UnknownToken(index) => write!(f, "No token at position {}", index),
            BuilderError::InvalidRepeats { min, max } => {
                write!(f, "Minimum repetition {} exceeds maximum {}", min, max)
            }
            BuilderError::UnknownComparator(c) => write!(f, "Unknown comparator '{}'", c),
        }
    }
}

impl std::error::Error for BuilderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BuilderError::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ParseError> for BuilderError {
    fn from(e: ParseError) -> Self {
        BuilderError::Parse(e)
    }
}

/// One token slot of the builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenBuilder {
    root: NodeId,
    repeats: Repeats,
    pub optional: bool,
    /// Emits a leading `<s>`
    pub begin_of_sentence: bool,
    /// Emits a trailing `</s>`
    pub end_of_sentence: bool,
}

impl TokenBuilder {
    fn new(root: NodeId) -> Self {
        TokenBuilder {
            root,
            repeats: Repeats::default(),
            optional: false,
            begin_of_sentence: false,
            end_of_sentence: false,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn repeats(&self) -> Repeats {
        self.repeats
    }
}

/// The visual editor's model of a whole CQL query.
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    settings: BuilderSettings,
    arena: Arena,
    tokens: Vec<TokenBuilder>,
    within: Option<String>,
}

impl Default for QueryBuilder {
    fn default() -> Self {
        QueryBuilder::new(BuilderSettings::default())
    }
}

impl QueryBuilder {
    /// A builder holding one token with one blank attribute.
    pub fn new(settings: BuilderSettings) -> Self {
        let mut builder = QueryBuilder::empty(settings);
        builder.create_token();
        builder
    }

    /// A builder without any tokens.
    pub(crate) fn empty(settings: BuilderSettings) -> Self {
        QueryBuilder {
            settings,
            arena: Arena::new(),
            tokens: Vec::new(),
            within: None,
        }
    }

    pub fn settings(&self) -> &BuilderSettings {
        &self.settings
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    /// Drop every token and start over with a single blank token.
    pub fn reset(&mut self) {
        self.arena = Arena::new();
        self.tokens.clear();
        self.within = None;
        self.create_token();
    }

    // ----------------------------------------------------------------------
    // Tokens
    // ----------------------------------------------------------------------

    /// Append a token whose root group holds one blank attribute.
    pub fn create_token(&mut self) -> usize {
        let blank = self.blank_attribute();
        let attribute = self.arena.insert(Node::Attribute(blank));
        self.push_token_with(vec![attribute])
    }

    /// Append a token with an empty root group.
    pub(crate) fn push_token(&mut self) -> usize {
        self.push_token_with(Vec::new())
    }

    /// Append a token whose root group owns the given, so far parentless, nodes.
    fn push_token_with(&mut self, children: Vec<NodeId>) -> usize {
        let operator = self.settings.root_operator;
        let label = self.settings.operator_label(operator);
        let mut group = AttributeGroup::new(operator, label, true);
        group.children = children.clone();

        let root = self.arena.insert(Node::Group(group));
        for child in children {
            self.arena.set_parent(child, Some(root));
        }
        self.tokens.push(TokenBuilder::new(root));
        self.tokens.len() - 1
    }

    pub fn remove_token(&mut self, index: usize) -> Result<(), BuilderError> {
        if index >= self.tokens.len() {
            return Err(BuilderError::UnknownToken(index));
        }
        let token = self.tokens.remove(index);
        self.arena.remove_subtree(token.root);
        Ok(())
    }

    /// Move the token at `from` so that it ends up at position `to`.
    pub fn move_token(&mut self, from: usize, to: usize) -> Result<(), BuilderError> {
        if from >= self.tokens.len() {
            return Err(BuilderError::UnknownToken(from));
        }
        if to >= self.tokens.len() {
            return Err(BuilderError::UnknownToken(to));
        }
        let token = self.tokens.remove(from);
        self.tokens.insert(to, token);
        Ok(())
    }

    pub fn tokens(&self) -> &[TokenBuilder] {
        &self.tokens
    }

    pub fn token(&self, index: usize) -> Result<&TokenBuilder, BuilderError> {
        self.tokens.get(index).ok_or(BuilderError::UnknownToken(index))
    }

    fn token_mut(&mut self, index: usize) -> Result<&mut TokenBuilder, BuilderError> {
        self.tokens.get_mut(index).ok_or(BuilderError::UnknownToken(index))
    }

    pub fn set_optional(&mut self, index: usize, optional: bool) -> Result<(), BuilderError> {
        self.token_mut(index)?.optional = optional;
        Ok(())
    }

    /// `max == None` means unbounded.
    pub fn set_repeats(&mut self, index: usize, min: u32, max: Option<u32>) -> Result<(), BuilderError> {
        if let Some(max) = max {
            if min > max {
                return Err(BuilderError::InvalidRepeats { min, max });
            }
        }
        self.token_mut(index)?.repeats = Repeats::new(min, max);
        Ok(())
    }

    pub fn set_begin_of_sentence(&mut self, index: usize, value: bool) -> Result<(), BuilderError> {
        self.token_mut(index)?.begin_of_sentence = value;
        Ok(())
    }

    pub fn set_end_of_sentence(&mut self, index: usize, value: bool) -> Result<(), BuilderError> {
        self.token_mut(index)?.end_of_sentence = value;
        Ok(())
    }

    pub fn within(&self) -> Option<&str> {
        self.within.as_deref()
    }

    /// Restrict matches to one element, e.g. `p`. `None` or an empty name
    /// searches the whole document.
    pub fn set_within(&mut self, within: Option<String>) {
        self.within = within.filter(|name| !name.is_empty());
    }

    // ----------------------------------------------------------------------
    // Nodes
    // ----------------------------------------------------------------------

    pub fn node(&self, id: NodeId) -> Result<&Node, BuilderError> {
        self.arena.get(id).ok_or(BuilderError::UnknownNode(id))
    }

    pub fn group(&self, id: NodeId) -> Result<&AttributeGroup, BuilderError> {
        match self.node(id)? {
            Node::Group(group) => Ok(group),
            Node::Attribute(_) => Err(BuilderError::NotAGroup(id)),
        }
    }

    pub fn attribute(&self, id: NodeId) -> Result<&Attribute, BuilderError> {
        match self.node(id)? {
            Node::Attribute(attribute) => Ok(attribute),
            Node::Group(_) => Err(BuilderError::NotAnAttribute(id)),
        }
    }

    pub fn children(&self, id: NodeId) -> Result<&[NodeId], BuilderError> {
        Ok(self.group(id)?.children())
    }

    /// Parent group of a node; `None` for root groups.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.arena.parent(id)
    }

    pub(crate) fn group_mut(&mut self, id: NodeId) -> Result<&mut AttributeGroup, BuilderError> {
        match self.arena.get_mut(id) {
            Some(Node::Group(group)) => Ok(group),
            Some(Node::Attribute(_)) => Err(BuilderError::NotAGroup(id)),
            None => Err(BuilderError::UnknownNode(id)),
        }
    }

    fn attribute_mut(&mut self, id: NodeId) -> Result<&mut Attribute, BuilderError> {
        match self.arena.get_mut(id) {
            Some(Node::Attribute(attribute)) => Ok(attribute),
            Some(Node::Group(_)) => Err(BuilderError::NotAnAttribute(id)),
            None => Err(BuilderError::UnknownNode(id)),
        }
    }

    pub fn set_value(&mut self, id: NodeId, value: AttributeValue) -> Result<(), BuilderError> {
        self.attribute_mut(id)?.value = value;
        Ok(())
    }

    /// Bulk values, one per line. `None` falls back to the regular value.
    pub fn set_uploaded_value(&mut self, id: NodeId, value: Option<String>) -> Result<(), BuilderError> {
        self.attribute_mut(id)?.uploaded_value = value;
        Ok(())
    }

    pub fn set_operator(&mut self, id: NodeId, operator: Comparator) -> Result<(), BuilderError> {
        self.attribute_mut(id)?.operator = operator;
        Ok(())
    }

    pub fn set_type(&mut self, id: NodeId, attribute_type: impl Into<String>) -> Result<(), BuilderError> {
        self.attribute_mut(id)?.attribute_type = attribute_type.into();
        Ok(())
    }

    pub fn set_case_sensitive(&mut self, id: NodeId, case_sensitive: bool) -> Result<(), BuilderError> {
        self.attribute_mut(id)?.case_sensitive = case_sensitive;
        Ok(())
    }

    /// Change a group's operator without touching the tree around it.
    pub(crate) fn retype_group(&mut self, id: NodeId, operator: BoolOp) -> Result<(), BuilderError> {
        let label = self.settings.operator_label(operator);
        let group = self.group_mut(id)?;
        group.operator = operator;
        group.operator_label = label;
        Ok(())
    }

    fn blank_attribute(&self) -> Attribute {
        Attribute::new(self.settings.default_attribute.clone())
    }

    /// Position of `node` among the children of `group`.
    fn child_index(&self, group: NodeId, node: NodeId) -> Result<usize, BuilderError> {
        self.group(group)?
            .children
            .iter()
            .position(|child| *child == node)
            .ok_or(BuilderError::NotAChild { group, node })
    }

    /// Insert `child` into `group` at `index`, taking it out of its previous
    /// parent first. Nothing moves unless both nodes exist and `group` is a
    /// group.
    fn attach(&mut self, group: NodeId, child: NodeId, index: usize) -> Result<(), BuilderError> {
        self.group(group)?;
        self.node(child)?;

        if let Some(previous) = self.arena.parent(child) {
            self.group_mut(previous)?.children.retain(|id| *id != child);
        }
        let target = self.group_mut(group)?;
        let index = index.min(target.children.len());
        target.children.insert(index, child);
        self.arena.set_parent(child, Some(group));
        Ok(())
    }

    fn append(&mut self, group: NodeId, child: NodeId) -> Result<(), BuilderError> {
        self.attach(group, child, usize::MAX)
    }
}
