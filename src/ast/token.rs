use serde::Serialize;

use crate::ast::Expr;

/// XML anchor around a token, such as `<s>` or `</s>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct XmlTag {
    /// Element name without brackets or slash
    pub name: String,
    pub is_closing_tag: bool,
}

/// Repetition bounds of a token, `{min,max}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Repeats {
    pub min: u32,
    /// `None` means unbounded, as in `{2,}`
    pub max: Option<u32>,
}

impl Repeats {
    pub fn new(min: u32, max: Option<u32>) -> Self {
        Repeats { min, max }
    }

    /// `min <= max` whenever `max` is finite.
    pub fn is_valid(&self) -> bool {
        self.max.is_none_or(|max| self.min <= max)
    }
}

impl Default for Repeats {
    fn default() -> Self {
        Repeats { min: 1, max: Some(1) }
    }
}

/// One `[...]` slot of a query.
///
/// # Examples
/// ```text
/// [word="cat"]
/// <s> [pos="N.*"]{1,2} </s>
/// "shorthand"
/// []?
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    pub leading_xml_tag: Option<XmlTag>,
    pub trailing_xml_tag: Option<XmlTag>,
    /// `None` matches any word (`[]`)
    pub expression: Option<Expr>,
    /// Set by a `?` suffix
    pub optional: bool,
    pub repeats: Option<Repeats>,
}
