use serde::Serialize;

use crate::ast::{AttributeOperator, BoolOp};

/// Boolean constraint tree of a single token slot.
///
/// Each node owns its children; the tree is rebuilt from scratch on every parse.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Expr {
    /// Constraint on one annotation of the word
    ///
    /// # Examples
    /// ```text
    /// word="cat"
    /// pos!="N.*"
    /// lemma="(?-i)Paris"
    /// ```
    Attribute {
        name: String,
        operator: AttributeOperator,
        /// Regex fragment, including any case-sensitivity prefix
        value: String,
    },

    /// Two constraints joined by `&` or `|`
    ///
    /// Chains are left-associative with no precedence between the operators:
    /// ```text
    /// a="1" & b="2" | c="3"    // BinaryOp(|, BinaryOp(&, a, b), c)
    /// ```
    BinaryOp {
        operator: BoolOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
}

impl Expr {
    pub fn attribute(name: impl Into<String>, operator: AttributeOperator, value: impl Into<String>) -> Self {
        Expr::Attribute {
            name: name.into(),
            operator,
            value: value.into(),
        }
    }

    pub fn binary(operator: BoolOp, left: Expr, right: Expr) -> Self {
        Expr::BinaryOp {
            operator,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Number of attribute leaves below (and including) this node.
    pub fn attribute_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(expr) = stack.pop() {
            match expr {
                Expr::Attribute { .. } => count += 1,
                Expr::BinaryOp { left, right, .. } => {
                    stack.push(left);
                    stack.push(right);
                }
            }
        }
        count
    }
}
