use std::{fmt, str::FromStr};

use crate::{
    ast::{AttributeOperator, BoolOp},
    builder::BuilderError,
};

/// Handle of a node inside one [`QueryBuilder`](crate::builder::QueryBuilder).
///
/// Ids are slot indices of the builder's arena. Slots of removed nodes are never
/// reused, so a stale id is reported as unknown instead of silently addressing a
/// different node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Comparator offered by the builder.
///
/// `StartsWith` and `EndsWith` exist only in the builder: they serialize to `=`
/// with a `.*` suffix or prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparator {
    Equal,
    NotEqual,
    StartsWith,
    EndsWith,
}

impl Comparator {
    pub fn as_str(self) -> &'static str {
        match self {
            Comparator::Equal => "=",
            Comparator::NotEqual => "!=",
            Comparator::StartsWith => "starts with",
            Comparator::EndsWith => "ends with",
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Comparator {
    type Err = BuilderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "=" => Ok(Comparator::Equal),
            "!=" => Ok(Comparator::NotEqual),
            "starts with" => Ok(Comparator::StartsWith),
            "ends with" => Ok(Comparator::EndsWith),
            other => Err(BuilderError::UnknownComparator(other.to_string())),
        }
    }
}

impl From<AttributeOperator> for Comparator {
    fn from(operator: AttributeOperator) -> Self {
        match operator {
            AttributeOperator::Equal => Comparator::Equal,
            AttributeOperator::NotEqual => Comparator::NotEqual,
        }
    }
}

/// Value of a builder attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeValue {
    /// Never filled in; the attribute is left out of the query. An empty
    /// `Text` is a real constraint and is emitted as `""`.
    Unset,
    /// Free-text regex, emitted verbatim
    Text(String),
    /// Literal selections, escaped and OR-joined on output
    Multiple(Vec<String>),
}

impl Default for AttributeValue {
    fn default() -> Self {
        AttributeValue::Unset
    }
}

impl AttributeValue {
    pub fn is_unset(&self) -> bool {
        matches!(self, AttributeValue::Unset)
    }

    pub fn is_empty(&self) -> bool {
        match self {
            AttributeValue::Unset => true,
            AttributeValue::Text(text) => text.is_empty(),
            AttributeValue::Multiple(values) => values.iter().all(|v| v.is_empty()),
        }
    }
}

/// A single `name op "value"` constraint in the builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Attribute name, e.g. `lemma`
    pub attribute_type: String,
    pub operator: Comparator,
    pub case_sensitive: bool,
    pub value: AttributeValue,
    /// Newline-separated literal values loaded in bulk; replaces `value` when set
    pub uploaded_value: Option<String>,
}

impl Attribute {
    pub fn new(attribute_type: impl Into<String>) -> Self {
        Attribute {
            attribute_type: attribute_type.into(),
            operator: Comparator::Equal,
            case_sensitive: false,
            value: AttributeValue::default(),
            uploaded_value: None,
        }
    }
}

/// A parenthesized run of children joined by one operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeGroup {
    pub operator: BoolOp,
    pub operator_label: String,
    /// The root group of a token: unparenthesized and never dissolved
    pub is_root: bool,
    pub(crate) children: Vec<NodeId>,
}

impl AttributeGroup {
    pub fn new(operator: BoolOp, operator_label: impl Into<String>, is_root: bool) -> Self {
        AttributeGroup {
            operator,
            operator_label: operator_label.into(),
            is_root,
            children: Vec::new(),
        }
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Group(AttributeGroup),
    Attribute(Attribute),
}

#[derive(Debug, Clone)]
struct Slot {
    parent: Option<NodeId>,
    node: Node,
}

/// Owning storage for every node of a builder.
///
/// Parent and child links are ids into the arena; the arena itself keeps only
/// the parent link, children are listed by their group.
#[derive(Debug, Clone, Default)]
pub struct Arena {
    slots: Vec<Option<Slot>>,
}

impl Arena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, node: Node) -> NodeId {
        self.slots.push(Some(Slot { parent: None, node }));
        NodeId(self.slots.len() - 1)
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.slots.get(id.0)?.as_ref().map(|slot| &slot.node)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.slots.get_mut(id.0)?.as_mut().map(|slot| &mut slot.node)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.slots.get(id.0)?.as_ref()?.parent
    }

    pub(crate) fn set_parent(&mut self, id: NodeId, parent: Option<NodeId>) {
        if let Some(Some(slot)) = self.slots.get_mut(id.0) {
            slot.parent = parent;
        }
    }

    /// Free a single slot; children of a removed group are left in place.
    pub(crate) fn remove(&mut self, id: NodeId) -> Option<Node> {
        self.slots.get_mut(id.0)?.take().map(|slot| slot.node)
    }

    /// Free a node and everything below it.
    pub(crate) fn remove_subtree(&mut self, id: NodeId) {
        let mut pending = vec![id];
        while let Some(id) = pending.pop() {
            if let Some(Node::Group(group)) = self.remove(id) {
                pending.extend(group.children);
            }
        }
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
