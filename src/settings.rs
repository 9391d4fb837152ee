//! Query builder configuration.
//!
//! The corpus schema is external to the compiler: which attributes exist, which
//! of them offer a fixed list of values, how operators are labelled. A
//! [`BuilderSettings`] value carries that information and can be loaded from a
//! JSON document:
//!
//! ```json
//! {
//!   "defaultAttribute": "word",
//!   "attributes": [
//!     { "id": "word", "label": "word", "caseSensitive": true },
//!     { "id": "pos", "label": "Part of speech",
//!       "values": [{ "value": "NOU-C", "label": "noun" }] }
//!   ]
//! }
//! ```
//!
//! Missing fields fall back to [`BuilderSettings::default`].

use std::{fmt, fs, io, path::Path};

use serde::Deserialize;

use crate::ast::BoolOp;

/// One selectable value of an attribute with a closed value set.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ValueOption {
    pub value: String,
    #[serde(default)]
    pub label: Option<String>,
}

/// A searchable annotation, e.g. `word`, `lemma` or `pos`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeDef {
    pub id: String,
    #[serde(default)]
    pub label: Option<String>,
    /// Whether the builder offers a case-sensitivity switch
    #[serde(default)]
    pub case_sensitive: bool,
    /// Closed value set shown as a multi-select; `None` means free text
    #[serde(default)]
    pub values: Option<Vec<ValueOption>>,
}

impl AttributeDef {
    pub fn new(id: impl Into<String>, label: impl Into<String>, case_sensitive: bool) -> Self {
        AttributeDef {
            id: id.into(),
            label: Some(label.into()),
            case_sensitive,
            values: None,
        }
    }

    pub fn with_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.values = Some(
            values
                .into_iter()
                .map(|value| ValueOption {
                    value: value.into(),
                    label: None,
                })
                .collect(),
        );
        self
    }

    pub fn has_value_list(&self) -> bool {
        self.values.as_ref().is_some_and(|values| !values.is_empty())
    }

    /// The configured spelling of `value`, compared case-insensitively.
    pub fn canonical_value(&self, value: &str) -> Option<&str> {
        let lower = value.to_lowercase();
        self.values
            .iter()
            .flatten()
            .find(|option| option.value.to_lowercase() == lower)
            .map(|option| option.value.as_str())
    }
}

/// Display label of a boolean operator, e.g. `&` shown as "AND".
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OperatorLabel {
    pub operator: BoolOp,
    pub label: String,
}

/// An entry of the "within" selector; an empty value means the whole document.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WithinOption {
    pub value: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BuilderSettings {
    pub attributes: Vec<AttributeDef>,
    /// Attribute of newly created builder attributes and of bare quoted words
    pub default_attribute: String,
    /// Operator of a fresh token's root group
    pub root_operator: BoolOp,
    pub operators: Vec<OperatorLabel>,
    pub within_options: Vec<WithinOption>,
}

impl Default for BuilderSettings {
    fn default() -> Self {
        BuilderSettings {
            attributes: vec![
                AttributeDef::new("word", "word", true),
                AttributeDef::new("lemma", "lemma", true),
                AttributeDef::new("pos", "Part of speech", false),
            ],
            default_attribute: "word".to_string(),
            root_operator: BoolOp::And,
            operators: vec![
                OperatorLabel {
                    operator: BoolOp::And,
                    label: "AND".to_string(),
                },
                OperatorLabel {
                    operator: BoolOp::Or,
                    label: "OR".to_string(),
                },
            ],
            within_options: vec![
                WithinOption {
                    value: String::new(),
                    label: "document".to_string(),
                },
                WithinOption {
                    value: "p".to_string(),
                    label: "paragraph".to_string(),
                },
                WithinOption {
                    value: "s".to_string(),
                    label: "sentence".to_string(),
                },
            ],
        }
    }
}

/// Errors that can occur while loading settings.
#[derive(Debug)]
pub enum SettingsError {
    Io(io::Error),
    Json(serde_json::Error),
    /// `defaultAttribute` does not name a configured attribute
    UnknownDefaultAttribute(String),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::Io(e) => write!(f, "Cannot read settings: {}", e),
            SettingsError::Json(e) => write!(f, "Invalid settings: {}", e),
            SettingsError::UnknownDefaultAttribute(name) => {
                write!(f, "Default attribute '{}' is not a configured attribute", name)
            }
        }
    }
}

impl std::error::Error for SettingsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SettingsError::Io(e) => Some(e),
            SettingsError::Json(e) => Some(e),
            SettingsError::UnknownDefaultAttribute(_) => None,
        }
    }
}

impl From<io::Error> for SettingsError {
    fn from(e: io::Error) -> Self {
        SettingsError::Io(e)
    }
}

impl From<serde_json::Error> for SettingsError {
    fn from(e: serde_json::Error) -> Self {
        SettingsError::Json(e)
    }
}

impl BuilderSettings {
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: BuilderSettings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    fn validate(&self) -> Result<(), SettingsError> {
        if self.attribute(&self.default_attribute).is_none() {
            return Err(SettingsError::UnknownDefaultAttribute(
                self.default_attribute.clone(),
            ));
        }
        Ok(())
    }

    pub fn attribute(&self, id: &str) -> Option<&AttributeDef> {
        self.attributes.iter().find(|attribute| attribute.id == id)
    }

    pub fn has_attribute(&self, id: &str) -> bool {
        self.attribute(id).is_some()
    }

    /// Label of `operator`, or its symbol when none is configured.
    pub fn operator_label(&self, operator: BoolOp) -> String {
        self.operators
            .iter()
            .find(|label| label.operator == operator)
            .map(|label| label.label.clone())
            .unwrap_or_else(|| operator.as_str().to_string())
    }
}
