use tracing::{debug, instrument};

use crate::{
    ast::{AttributeOperator, Expr, Query, Token, XmlTag},
    builder::{Attribute, AttributeValue, BuilderError, Comparator, Node, NodeId, QueryBuilder},
    codec::{
        decode_case_flag, decode_comparator_shorthand, escape_multi_value, unescape_multi_value,
        unescape_quotes,
    },
    parser::parse_with_default_attribute,
};

/// Element name of the sentence anchors the builder can represent.
const SENTENCE_TAG: &str = "s";

impl QueryBuilder {
    /// Parse `pattern` and replace the builder's contents with it.
    ///
    /// `None` or blank input resets the builder to a single blank token. On a
    /// parse error the builder is left untouched.
    pub fn parse(&mut self, pattern: Option<&str>) -> Result<(), BuilderError> {
        let Some(pattern) = pattern.filter(|p| !p.trim().is_empty()) else {
            self.reset();
            return Ok(());
        };

        let query = parse_with_default_attribute(pattern, &self.settings.default_attribute)
            .inspect_err(|e| debug!(error = %e, "pattern rejected"))?;
        self.populate(query.as_ref())
    }

    /// Replace the builder's contents with the tokens of `query`.
    ///
    /// The new tree is built on the side and swapped in only once it is
    /// complete. `None` resets the builder.
    #[instrument(level = "debug", skip_all, fields(tokens = query.map(|q| q.tokens.len())))]
    pub fn populate(&mut self, query: Option<&Query>) -> Result<(), BuilderError> {
        let Some(query) = query else {
            self.reset();
            return Ok(());
        };

        let mut staged = QueryBuilder::empty(self.settings.clone());
        for token in &query.tokens {
            staged.populate_token(token)?;
        }
        staged.set_within(query.within.clone());

        *self = staged;
        Ok(())
    }

    fn populate_token(&mut self, token: &Token) -> Result<(), BuilderError> {
        let repeats = token.repeats.unwrap_or_default();
        if let Some(max) = repeats.max.filter(|_| !repeats.is_valid()) {
            return Err(BuilderError::InvalidRepeats {
                min: repeats.min,
                max,
            });
        }

        let index = self.push_token();
        let root = {
            let builder = &mut self.tokens[index];
            builder.optional = token.optional;
            builder.repeats = repeats;
            builder.begin_of_sentence = is_sentence_tag(token.leading_xml_tag.as_ref(), false);
            builder.end_of_sentence = is_sentence_tag(token.trailing_xml_tag.as_ref(), true);
            builder.root
        };

        let Some(expression) = &token.expression else {
            return Ok(());
        };

        // Right before left: every element is inserted at the front of its group
        let mut stack: Vec<(&Expr, NodeId, usize)> = vec![(expression, root, 0)];
        while let Some((expr, group, level)) = stack.pop() {
            match expr {
                Expr::BinaryOp {
                    operator,
                    left,
                    right,
                } => {
                    let target = if level == 0 {
                        self.retype_group(group, *operator)?;
                        group
                    } else if self.group(group)?.operator != *operator {
                        let subgroup = self.new_group(*operator);
                        self.attach(group, subgroup, 0)?;
                        subgroup
                    } else {
                        group
                    };
                    stack.push((left.as_ref(), target, level + 1));
                    stack.push((right.as_ref(), target, level + 1));
                }
                Expr::Attribute {
                    name,
                    operator,
                    value,
                } => {
                    if let Some(attribute) = self.decode_attribute(name, *operator, value) {
                        let id = self.arena.insert(Node::Attribute(attribute));
                        self.attach(group, id, 0)?;
                    }
                }
            }
        }

        Ok(())
    }

    /// Builder form of a parsed constraint, or `None` when the attribute is not
    /// configured.
    fn decode_attribute(&self, name: &str, operator: AttributeOperator, raw: &str) -> Option<Attribute> {
        let Some(definition) = self.settings.attribute(name) else {
            debug!(attribute = name, "skipping unknown attribute");
            return None;
        };

        let unquoted = unescape_quotes(raw);
        let (case_sensitive, rest) = decode_case_flag(&unquoted);
        let (comparator, rest) = decode_comparator_shorthand(Comparator::from(operator), rest);

        let value = if definition.has_value_list() {
            let pieces = unescape_multi_value(&rest);
            // Only literal alternations map onto the value list
            if escape_multi_value(&pieces) == rest {
                let pieces = pieces
                    .into_iter()
                    .map(|piece| match definition.canonical_value(&piece) {
                        Some(canonical) if !case_sensitive => canonical.to_string(),
                        _ => piece,
                    })
                    .collect();
                AttributeValue::Multiple(pieces)
            } else {
                AttributeValue::Text(rest)
            }
        } else {
            AttributeValue::Text(rest)
        };

        Some(Attribute {
            attribute_type: name.to_string(),
            operator: comparator,
            case_sensitive,
            value,
            uploaded_value: None,
        })
    }
}

fn is_sentence_tag(tag: Option<&XmlTag>, closing: bool) -> bool {
    match tag {
        Some(tag) if tag.name == SENTENCE_TAG && tag.is_closing_tag == closing => true,
        Some(tag) => {
            debug!(tag = %tag.name, closing = tag.is_closing_tag, "dropping unsupported xml tag");
            false
        }
        None => false,
    }
}
