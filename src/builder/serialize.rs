use crate::{
    ast::Repeats,
    builder::{
        Attribute, AttributeGroup, AttributeValue, BuilderError, Node, NodeId, QueryBuilder,
        TokenBuilder,
    },
    codec::{encode_case_flag, encode_comparator_shorthand, escape_quotes, escape_regex},
};

impl QueryBuilder {
    /// Canonical CQL for the whole builder, or `None` when it has no tokens.
    pub fn get_cql(&self) -> Result<Option<String>, BuilderError> {
        if self.tokens.is_empty() {
            return Ok(None);
        }

        let tokens = self
            .tokens
            .iter()
            .map(|token| self.token_to_cql(token))
            .collect::<Result<Vec<_>, _>>()?;

        let mut cql = tokens.join(" ");
        if let Some(within) = &self.within {
            cql.push_str(&format!(" within <{}/>", within));
        }
        Ok(Some(cql))
    }

    /// CQL of the token at `index`, e.g. `<s> [word = "the"]? </s>`.
    pub fn token_cql(&self, index: usize) -> Result<String, BuilderError> {
        self.token_to_cql(self.token(index)?)
    }

    /// CQL of a single node: the attribute itself, or a group's children.
    pub fn node_cql(&self, id: NodeId) -> Result<String, BuilderError> {
        match self.node(id)? {
            Node::Attribute(attribute) => Ok(attribute.get_cql()),
            Node::Group(group) => self.group_cql(group),
        }
    }

    fn token_to_cql(&self, token: &TokenBuilder) -> Result<String, BuilderError> {
        let mut cql = String::new();
        if token.begin_of_sentence {
            cql.push_str("<s> ");
        }

        cql.push('[');
        cql.push_str(&self.node_cql(token.root)?);
        cql.push(']');
        cql.push_str(&repetition_suffix(token.repeats));

        // `{0,n}` already makes the token optional
        if token.optional && token.repeats.min != 0 {
            cql.push('?');
        }

        if token.end_of_sentence {
            cql.push_str(" </s>");
        }
        Ok(cql)
    }

    fn group_cql(&self, group: &AttributeGroup) -> Result<String, BuilderError> {
        let mut parts = Vec::with_capacity(group.children.len());
        for child in &group.children {
            let cql = self.node_cql(*child)?;
            if !cql.is_empty() {
                parts.push(cql);
            }
        }

        let joined = parts.join(&format!(" {} ", group.operator));
        if group.is_root || parts.len() < 2 {
            Ok(joined)
        } else {
            Ok(format!("({})", joined))
        }
    }
}

impl Attribute {
    /// Values this attribute matches, before comparator and case encoding.
    ///
    /// Uploaded lines and multi-select values are literals and get escaped;
    /// free text is already a regex. An unset attribute has no values.
    pub fn effective_values(&self) -> Vec<String> {
        if let Some(uploaded) = &self.uploaded_value {
            return uploaded
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(escape_regex)
                .collect();
        }

        match &self.value {
            AttributeValue::Unset => Vec::new(),
            AttributeValue::Text(text) => vec![text.clone()],
            AttributeValue::Multiple(values) => values.iter().map(|value| escape_regex(value)).collect(),
        }
    }

    /// Whether the attribute was never given a value.
    pub fn is_blank(&self) -> bool {
        self.uploaded_value.is_none() && self.value.is_unset()
    }

    /// `name op "value"`, or an empty string for a blank attribute.
    ///
    /// An explicitly empty value still constrains the token: `word != ""`.
    pub fn get_cql(&self) -> String {
        if self.is_blank() {
            return String::new();
        }

        let mut values = self.effective_values();
        if values.is_empty() {
            values.push(String::new());
        }

        let mut operator = self.operator;
        let mut encoded = Vec::with_capacity(values.len());
        for value in &values {
            let (op, value) = encode_comparator_shorthand(self.operator, value);
            operator = op;
            encoded.push(value);
        }

        let value = encode_case_flag(self.case_sensitive, &encoded.join("|"));
        format!(
            "{} {} \"{}\"",
            self.attribute_type,
            operator,
            escape_quotes(&value)
        )
    }
}

fn repetition_suffix(repeats: Repeats) -> String {
    match (repeats.min, repeats.max) {
        (1, Some(1)) => String::new(),
        (0, Some(1)) => "?".to_string(),
        (0, None) => "*".to_string(),
        (1, None) => "+".to_string(),
        (min, None) => format!("{{{},}}", min),
        (min, Some(max)) if min == max => format!("{{{}}}", min),
        (min, Some(max)) => format!("{{{},{}}}", min, max),
    }
}
