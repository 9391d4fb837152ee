use std::fmt;

use serde::{Deserialize, Serialize};

/// Boolean operator joining two attribute constraints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BoolOp {
    /// Logical AND (`&`)
    #[serde(rename = "&")]
    And,
    /// Logical OR (`|`)
    #[serde(rename = "|")]
    Or,
}

impl BoolOp {
    pub fn as_str(self) -> &'static str {
        match self {
            BoolOp::And => "&",
            BoolOp::Or => "|",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "&" => Some(BoolOp::And),
            "|" => Some(BoolOp::Or),
            _ => None,
        }
    }
}

impl fmt::Display for BoolOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Comparison between an attribute and its regex value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttributeOperator {
    /// Attribute matches the regex (`=`)
    #[serde(rename = "=")]
    Equal,
    /// Attribute does not match the regex (`!=`)
    #[serde(rename = "!=")]
    NotEqual,
}

impl AttributeOperator {
    pub fn as_str(self) -> &'static str {
        match self {
            AttributeOperator::Equal => "=",
            AttributeOperator::NotEqual => "!=",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "=" => Some(AttributeOperator::Equal),
            "!=" => Some(AttributeOperator::NotEqual),
            _ => None,
        }
    }
}

impl fmt::Display for AttributeOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
