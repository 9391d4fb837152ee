//! Property-based tests for the codec and the builder round trip.
//!
//! Run with: `cargo test --test proptest_properties`

use proptest::prelude::*;

use cql_builder::ast::{AttributeOperator, BoolOp, Expr};
use cql_builder::builder::{Attribute, AttributeValue, Comparator, Node, NodeId, QueryBuilder};
use cql_builder::codec::*;

// =============================================================================
// Strategies
// =============================================================================

fn comparator_strategy() -> impl Strategy<Value = Comparator> {
    prop_oneof![
        Just(Comparator::Equal),
        Just(Comparator::NotEqual),
        Just(Comparator::StartsWith),
        Just(Comparator::EndsWith),
    ]
}

fn bool_op_strategy() -> impl Strategy<Value = BoolOp> {
    prop_oneof![Just(BoolOp::And), Just(BoolOp::Or)]
}

/// Free-text regexes with quotes, alternation and escape pairs. A backslash
/// always escapes something, as in any valid regex.
fn text_value_strategy() -> impl Strategy<Value = String> {
    "([a-z.*|\"]|\\\\[.*|\"\\\\]){0,6}"
}

fn value_strategy() -> impl Strategy<Value = AttributeValue> {
    prop_oneof![
        3 => text_value_strategy().prop_map(AttributeValue::Text),
        1 => Just(AttributeValue::Text(String::new())),
        2 => prop::collection::vec("[a-zA-Z0-9 .*?|\"\\\\()\\[\\]{}^$+-]{0,5}", 0..4)
            .prop_map(AttributeValue::Multiple),
    ]
}

/// One user edit. Indices pick among the nodes or tokens that exist when the
/// edit is applied.
#[derive(Debug, Clone)]
enum Edit {
    AddAttribute {
        group: usize,
        operator: BoolOp,
        origin: Option<usize>,
        value: String,
    },
    Remove(usize),
    SetComparator(usize, Comparator),
    SetCase(usize, bool),
    SetType(usize, &'static str),
    SetValue(usize, AttributeValue),
    Upload(usize, Option<String>),
    AddToken(String),
    RemoveToken(usize),
    MoveToken(usize, usize),
    Repeats(usize, u32, Option<u32>, bool),
    Anchors(usize, bool, bool),
    Within(Option<&'static str>),
}

fn edit_strategy() -> impl Strategy<Value = Edit> {
    prop_oneof![
        4 => (any::<usize>(), bool_op_strategy(), prop::option::of(any::<usize>()), "[a-z]{1,6}")
            .prop_map(|(group, operator, origin, value)| Edit::AddAttribute {
                group,
                operator,
                origin,
                value,
            }),
        2 => any::<usize>().prop_map(Edit::Remove),
        1 => (any::<usize>(), comparator_strategy()).prop_map(|(n, c)| Edit::SetComparator(n, c)),
        1 => (any::<usize>(), any::<bool>()).prop_map(|(n, c)| Edit::SetCase(n, c)),
        1 => (any::<usize>(), prop_oneof![Just("word"), Just("lemma"), Just("pos")])
            .prop_map(|(n, t)| Edit::SetType(n, t)),
        2 => (any::<usize>(), value_strategy()).prop_map(|(n, v)| Edit::SetValue(n, v)),
        1 => (any::<usize>(), prop::option::of("[a-z\"|\\\\ \n]{0,12}"))
            .prop_map(|(n, u)| Edit::Upload(n, u)),
        1 => "[a-z]{1,6}".prop_map(Edit::AddToken),
        1 => any::<usize>().prop_map(Edit::RemoveToken),
        1 => (any::<usize>(), any::<usize>()).prop_map(|(a, b)| Edit::MoveToken(a, b)),
        1 => (any::<usize>(), 0u32..4, prop::option::of(0u32..4), any::<bool>())
            .prop_map(|(t, min, extra, optional)| Edit::Repeats(t, min, extra.map(|e| min + e), optional)),
        1 => (any::<usize>(), any::<bool>(), any::<bool>()).prop_map(|(t, b, e)| Edit::Anchors(t, b, e)),
        1 => prop::option::of(prop_oneof![Just("p"), Just("s")]).prop_map(Edit::Within),
    ]
}

// =============================================================================
// Helpers
// =============================================================================

fn collect_nodes(builder: &QueryBuilder) -> (Vec<NodeId>, Vec<NodeId>) {
    let mut groups = Vec::new();
    let mut attributes = Vec::new();
    let mut pending: Vec<NodeId> = builder.tokens().iter().map(|t| t.root()).collect();

    while let Some(id) = pending.pop() {
        match builder.node(id).unwrap() {
            Node::Group(group) => {
                groups.push(id);
                pending.extend(group.children().iter().copied());
            }
            Node::Attribute(_) => attributes.push(id),
        }
    }
    groups.sort();
    attributes.sort();
    (groups, attributes)
}

fn pick(ids: &[NodeId], index: usize) -> Option<NodeId> {
    if ids.is_empty() {
        None
    } else {
        Some(ids[index % ids.len()])
    }
}

fn apply(builder: &mut QueryBuilder, edit: Edit) {
    let (groups, attributes) = collect_nodes(builder);
    let token_count = builder.tokens().len();

    match edit {
        Edit::AddAttribute {
            group,
            operator,
            origin,
            value,
        } => {
            let Some(group) = pick(&groups, group) else { return };
            let children = builder.children(group).unwrap().to_vec();
            let origin = origin.and_then(|origin| pick(&children, origin));
            let id = builder.create_attribute(group, operator, origin).unwrap();
            builder.set_value(id, AttributeValue::Text(value)).unwrap();
        }
        Edit::Remove(index) => {
            if let Some(id) = pick(&attributes, index) {
                builder.remove_node(id).unwrap();
            }
        }
        Edit::SetComparator(index, comparator) => {
            if let Some(id) = pick(&attributes, index) {
                builder.set_operator(id, comparator).unwrap();
            }
        }
        Edit::SetCase(index, case_sensitive) => {
            if let Some(id) = pick(&attributes, index) {
                builder.set_case_sensitive(id, case_sensitive).unwrap();
            }
        }
        Edit::SetType(index, attribute_type) => {
            if let Some(id) = pick(&attributes, index) {
                builder.set_type(id, attribute_type).unwrap();
            }
        }
        Edit::SetValue(index, value) => {
            if let Some(id) = pick(&attributes, index) {
                builder.set_value(id, value).unwrap();
            }
        }
        Edit::Upload(index, uploaded) => {
            if let Some(id) = pick(&attributes, index) {
                builder.set_uploaded_value(id, uploaded).unwrap();
            }
        }
        Edit::AddToken(value) => {
            let index = builder.create_token();
            let root = builder.token(index).unwrap().root();
            let blank = builder.children(root).unwrap()[0];
            builder.set_value(blank, AttributeValue::Text(value)).unwrap();
        }
        Edit::RemoveToken(index) => {
            if token_count > 1 {
                builder.remove_token(index % token_count).unwrap();
            }
        }
        Edit::MoveToken(from, to) => {
            builder.move_token(from % token_count, to % token_count).unwrap();
        }
        Edit::Repeats(index, min, max, optional) => {
            builder.set_repeats(index % token_count, min, max).unwrap();
            builder.set_optional(index % token_count, optional).unwrap();
        }
        Edit::Anchors(index, begin, end) => {
            builder.set_begin_of_sentence(index % token_count, begin).unwrap();
            builder.set_end_of_sentence(index % token_count, end).unwrap();
        }
        Edit::Within(within) => builder.set_within(within.map(str::to_string)),
    }
}

/// Attributes of one token that show up in its CQL.
fn token_attributes(builder: &QueryBuilder, index: usize) -> Vec<Attribute> {
    let mut attributes = Vec::new();
    let mut pending = vec![builder.token(index).unwrap().root()];
    while let Some(id) = pending.pop() {
        match builder.node(id).unwrap() {
            Node::Group(group) => pending.extend(group.children().iter().copied()),
            Node::Attribute(attribute) if !attribute.is_blank() => attributes.push(attribute.clone()),
            Node::Attribute(_) => {}
        }
    }
    attributes
}

/// `(name, negated, case sensitive)` of every attribute in an expression.
fn expr_constraints(expr: Option<&Expr>) -> Vec<(String, bool, bool)> {
    let mut constraints = Vec::new();
    let mut pending: Vec<&Expr> = expr.into_iter().collect();
    while let Some(expr) = pending.pop() {
        match expr {
            Expr::Attribute {
                name,
                operator,
                value,
            } => constraints.push((
                name.clone(),
                *operator == AttributeOperator::NotEqual,
                decode_case_flag(value).0,
            )),
            Expr::BinaryOp { left, right, .. } => {
                pending.push(left.as_ref());
                pending.push(right.as_ref());
            }
        }
    }
    constraints.sort();
    constraints
}

fn builder_constraints(builder: &QueryBuilder, index: usize) -> Vec<(String, bool, bool)> {
    let mut constraints: Vec<_> = token_attributes(builder, index)
        .into_iter()
        .map(|a| (a.attribute_type, a.operator == Comparator::NotEqual, a.case_sensitive))
        .collect();
    constraints.sort();
    constraints
}

// =============================================================================
// Codec properties
// =============================================================================

proptest! {
    /// Shorthand comparators survive an encode/decode cycle
    #[test]
    fn prop_comparator_shorthand_inverse(
        comparator in comparator_strategy(),
        value in "[a-zA-Z0-9]{1,10}",
    ) {
        let (operator, encoded) = encode_comparator_shorthand(comparator, &value);
        prop_assert_eq!(decode_comparator_shorthand(operator, &encoded), (comparator, value));
    }

    /// Escaped value lists split back into the same values
    #[test]
    fn prop_multi_value_inverse(
        values in prop::collection::vec("[a-zA-Z0-9 .*?|\\\\()\\[\\]{}^$+-]{0,6}", 1..5),
    ) {
        prop_assert_eq!(unescape_multi_value(&escape_multi_value(&values)), values);
    }

    /// Wildcard patterns survive the trip through regex syntax
    #[test]
    fn prop_wildcard_inverse(text in "[a-zA-Z0-9 .*?\\\\()\\[\\]{}^$+-]{0,12}") {
        prop_assert_eq!(make_regex_wildcard(&make_wildcard_regex(&text)), text);
    }

    /// Case flags are stripped exactly once
    #[test]
    fn prop_case_flag_inverse(case_sensitive in any::<bool>(), value in "[a-z.*]{0,8}") {
        let encoded = encode_case_flag(case_sensitive, &value);
        prop_assert_eq!(decode_case_flag(&encoded), (case_sensitive, value.as_str()));
    }
}

// =============================================================================
// Builder round trip
// =============================================================================

proptest! {
    /// Serializing a builder, parsing the text and populating a fresh builder
    /// gives back the same CQL
    #[test]
    fn prop_builder_round_trip(
        first in "[a-z]{1,6}",
        edits in prop::collection::vec(edit_strategy(), 0..25),
    ) {
        let mut builder = QueryBuilder::default();
        let root = builder.token(0).unwrap().root();
        let blank = builder.children(root).unwrap()[0];
        builder.set_value(blank, AttributeValue::Text(first)).unwrap();

        for edit in edits {
            apply(&mut builder, edit);
        }

        let cql = builder.get_cql().unwrap().unwrap();

        // Every constraint the builder shows is in the query text
        let query = cql_builder::parser::parse(&cql).unwrap().unwrap();
        prop_assert_eq!(query.tokens.len(), builder.tokens().len());
        prop_assert_eq!(query.within.as_deref(), builder.within());
        for (index, token) in query.tokens.iter().enumerate() {
            prop_assert_eq!(
                expr_constraints(token.expression.as_ref()),
                builder_constraints(&builder, index)
            );
        }

        let mut reparsed = QueryBuilder::default();
        reparsed.parse(Some(&cql)).unwrap();
        for index in 0..builder.tokens().len() {
            prop_assert_eq!(
                builder_constraints(&reparsed, index),
                builder_constraints(&builder, index)
            );
        }
        prop_assert_eq!(reparsed.get_cql().unwrap(), Some(cql));
    }

    /// Parsing never panics, whatever the input
    #[test]
    fn prop_parse_never_panics(input in "[\\[\\]()\"=!&|<>/{},?*+ a-z0-9]{0,40}") {
        let _ = cql_builder::parser::parse(&input);
    }
}
