// tests/parser_tests.rs

use cql_builder::ast::{AttributeOperator, BoolOp, Expr, Query, Repeats, XmlTag};
use cql_builder::parser::{parse, parse_with_default_attribute, ParseError, MAX_NESTING};

fn parse_ok(input: &str) -> Query {
    parse(input)
        .unwrap_or_else(|e| panic!("failed to parse {:?}: {}", input, e))
        .unwrap_or_else(|| panic!("{:?} parsed to no query", input))
}

fn attribute(name: &str, value: &str) -> Expr {
    Expr::attribute(name, AttributeOperator::Equal, value)
}

// ============================================================================
// Tokens
// ============================================================================

#[test]
fn test_single_attribute() {
    let query = parse_ok(r#"[word="cat"]"#);

    assert_eq!(query.tokens.len(), 1);
    let token = &query.tokens[0];
    assert_eq!(token.expression, Some(attribute("word", "cat")));
    assert_eq!(token.repeats, None);
    assert!(!token.optional);
    assert_eq!(token.leading_xml_tag, None);
    assert_eq!(token.trailing_xml_tag, None);
    assert_eq!(query.within, None);
}

#[test]
fn test_any_word_token() {
    let query = parse_ok("[]");
    assert_eq!(query.tokens[0].expression, None);
}

#[test]
fn test_bare_quoted_word() {
    let query = parse_ok(r#""the" "house""#);
    assert_eq!(query.tokens.len(), 2);
    assert_eq!(query.tokens[0].expression, Some(attribute("word", "the")));
    assert_eq!(query.tokens[1].expression, Some(attribute("word", "house")));
}

#[test]
fn test_bare_quoted_word_custom_default() {
    let query = parse_with_default_attribute(r#""run""#, "lemma").unwrap().unwrap();
    assert_eq!(query.tokens[0].expression, Some(attribute("lemma", "run")));
}

#[test]
fn test_sequence_of_tokens() {
    let query = parse_ok(r#"[word="the"] [] [pos="N.*"]"#);
    assert_eq!(query.tokens.len(), 3);
    assert_eq!(query.tokens[1].expression, None);
}

#[test]
fn test_blank_input_is_no_query() {
    assert_eq!(parse(""), Ok(None));
    assert_eq!(parse("  \n\t "), Ok(None));
}

// ============================================================================
// Attributes
// ============================================================================

#[test]
fn test_not_equal() {
    let query = parse_ok(r#"[pos != "V.*"]"#);
    assert_eq!(
        query.tokens[0].expression,
        Some(Expr::attribute("pos", AttributeOperator::NotEqual, "V.*"))
    );
}

#[test]
fn test_value_keeps_inner_whitespace() {
    let query = parse_ok(r#"[word=" a b "]"#);
    assert_eq!(query.tokens[0].expression, Some(attribute("word", " a b ")));
}

#[test]
fn test_value_with_escaped_quote() {
    let query = parse_ok(r#"[word="say \"hi\""]"#);
    assert_eq!(query.tokens[0].expression, Some(attribute("word", r#"say \"hi\""#)));
}

#[test]
fn test_case_flag_stays_in_value() {
    let query = parse_ok(r#"[word="(?-i)Paris"]"#);
    assert_eq!(query.tokens[0].expression, Some(attribute("word", "(?-i)Paris")));
}

// ============================================================================
// Boolean expressions
// ============================================================================

#[test]
fn test_and_expression() {
    let query = parse_ok(r#"[lemma="run" & pos="V.*"]"#);
    assert_eq!(
        query.tokens[0].expression,
        Some(Expr::binary(
            BoolOp::And,
            attribute("lemma", "run"),
            attribute("pos", "V.*")
        ))
    );
}

#[test]
fn test_mixed_operators_are_left_associative() {
    let query = parse_ok(r#"[a="1" & b="2" | c="3"]"#);

    // (a & b) | c
    match query.tokens[0].expression.as_ref() {
        Some(Expr::BinaryOp {
            operator: BoolOp::Or,
            left,
            right,
        }) => {
            assert!(matches!(**left, Expr::BinaryOp { operator: BoolOp::And, .. }));
            assert_eq!(**right, attribute("c", "3"));
        }
        other => panic!("Expected | at the top, got {:?}", other),
    }
}

#[test]
fn test_parentheses_group() {
    let query = parse_ok(r#"[a="1" & (b="2" | c="3")]"#);
    assert_eq!(
        query.tokens[0].expression,
        Some(Expr::binary(
            BoolOp::And,
            attribute("a", "1"),
            Expr::binary(BoolOp::Or, attribute("b", "2"), attribute("c", "3"))
        ))
    );
}

#[test]
fn test_whitespace_around_operators() {
    let compact = parse_ok(r#"[a="1"&b="2"]"#);
    let spaced = parse_ok("[ a = \"1\"\n & \tb = \"2\" ]");
    assert_eq!(compact, spaced);
}

#[test]
fn test_attribute_count() {
    let query = parse_ok(r#"[a="1" & (b="2" | c="3") & d="4"]"#);
    assert_eq!(query.tokens[0].expression.as_ref().map(Expr::attribute_count), Some(4));
}

// ============================================================================
// Repetition
// ============================================================================

#[test]
fn test_repetition_range() {
    let query = parse_ok(r#"[word="cat"]{2,4}"#);
    assert_eq!(query.tokens[0].repeats, Some(Repeats::new(2, Some(4))));
}

#[test]
fn test_repetition_forms() {
    let cases = [
        ("[]{3}", Some(Repeats::new(3, Some(3))), false),
        ("[]{2,}", Some(Repeats::new(2, None)), false),
        ("[]*", Some(Repeats::new(0, None)), false),
        ("[]+", Some(Repeats::new(1, None)), false),
        ("[]?", None, true),
        ("[]{1,3}?", Some(Repeats::new(1, Some(3))), true),
        ("[]+?", Some(Repeats::new(1, None)), true),
    ];

    for (input, repeats, optional) in cases {
        let query = parse_ok(input);
        assert_eq!(query.tokens[0].repeats, repeats, "repeats of {}", input);
        assert_eq!(query.tokens[0].optional, optional, "optional of {}", input);
    }
}

#[test]
fn test_repetition_min_above_max() {
    let err = parse("[]{4,2}").unwrap_err();
    assert!(matches!(err, ParseError::InvalidRepeats { min: 4, max: 2, position: 2 }));
}

#[test]
fn test_repetition_not_a_number() {
    assert!(matches!(
        parse("[]{x}"),
        Err(ParseError::InvalidNumber { ref text, position: 3 }) if text == "x"
    ));
}

// ============================================================================
// Tags and within
// ============================================================================

#[test]
fn test_sentence_tags() {
    let query = parse_ok(r#"<s> [pos="N.*"] </s>"#);
    let token = &query.tokens[0];
    assert_eq!(
        token.leading_xml_tag,
        Some(XmlTag {
            name: "s".into(),
            is_closing_tag: false
        })
    );
    assert_eq!(
        token.trailing_xml_tag,
        Some(XmlTag {
            name: "s".into(),
            is_closing_tag: true
        })
    );
}

#[test]
fn test_opening_tag_belongs_to_next_token() {
    let query = parse_ok(r#"[word="end"] <s> [word="start"]"#);
    assert_eq!(query.tokens.len(), 2);
    assert_eq!(query.tokens[0].trailing_xml_tag, None);
    assert_eq!(
        query.tokens[1].leading_xml_tag.as_ref().map(|tag| tag.name.as_str()),
        Some("s")
    );
}

#[test]
fn test_within_clause() {
    let query = parse_ok("[] within <p/>");
    assert_eq!(query.tokens.len(), 1);
    assert_eq!(query.tokens[0].expression, None);
    assert_eq!(query.within.as_deref(), Some("p"));
}

#[test]
fn test_within_without_token_fails() {
    assert!(parse("within <p/>").is_err());
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_unknown_operator() {
    let err = parse(r#"[word=="cat"]"#).unwrap_err();
    assert!(matches!(err, ParseError::UnknownOperator { ref operator, .. } if operator == "=="));
}

#[test]
fn test_missing_attribute_name() {
    let err = parse(r#"[="cat"]"#).unwrap_err();
    assert!(matches!(err, ParseError::InvalidAttributeName { position: 1, .. }));
}

#[test]
fn test_unterminated_token() {
    let err = parse(r#"[word="cat""#).unwrap_err();
    assert!(matches!(err, ParseError::UnexpectedEnd { position: 11, .. }));
}

#[test]
fn test_unterminated_value() {
    assert!(matches!(
        parse(r#"[word="cat]"#),
        Err(ParseError::UnexpectedEnd { .. })
    ));
}

#[test]
fn test_garbage_after_token() {
    let err = parse(r#"[word="cat"] x"#).unwrap_err();
    match err {
        ParseError::Expected { found, position, .. } => {
            assert_eq!(found, 'x');
            assert_eq!(position, 13);
        }
        other => panic!("Expected 'Expected' error, got {:?}", other),
    }
    assert!(parse(r#"[word="cat"] x"#).unwrap_err().to_string().ends_with("at 13"));
}

#[test]
fn test_unbalanced_parenthesis() {
    assert!(parse(r#"[(a="1" & b="2"]"#).is_err());
}

#[test]
fn test_deep_nesting_is_rejected() {
    let input = format!("[{}word=\"a\"{}]", "(".repeat(20000), ")".repeat(20000));
    let err = parse(&input).unwrap_err();
    assert_eq!(
        err,
        ParseError::TooDeeplyNested {
            limit: MAX_NESTING,
            position: MAX_NESTING + 1,
        }
    );
}

#[test]
fn test_nesting_up_to_limit_parses() {
    let input = format!(
        "[{}word=\"a\"{}]",
        "(".repeat(MAX_NESTING),
        ")".repeat(MAX_NESTING)
    );
    let query = parse_ok(&input);
    assert_eq!(query.tokens[0].expression, Some(attribute("word", "a")));
}
