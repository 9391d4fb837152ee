use std::fmt;

use tracing::trace;

use crate::{
    ast::{AttributeOperator, BoolOp, Expr, Query, Repeats, Token, XmlTag},
    scanner::{Scanner, WHITESPACE},
};

/// Attribute used for bare quoted words such as `"cat"`.
pub const DEFAULT_ATTRIBUTE: &str = "word";

/// Deepest parenthesis nesting accepted inside one token.
pub const MAX_NESTING: usize = 256;

/// Errors raised while parsing a CQL pattern.
///
/// Every variant carries the character offset at which parsing stopped. The
/// parser never recovers: one malformed token invalidates the whole pattern.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    /// None of the expected symbols was found
    Expected {
        expected: Vec<String>,
        found: char,
        position: usize,
    },

    /// Input ended while one of the expected symbols was still missing
    UnexpectedEnd { expected: Vec<String>, position: usize },

    /// Comparison other than `=` or `!=`
    UnknownOperator { operator: String, position: usize },

    /// Empty attribute name, or one containing structural characters
    InvalidAttributeName { name: String, position: usize },

    /// Repetition bound that is not a non-negative integer
    InvalidNumber { text: String, position: usize },

    /// `{min,max}` with `min > max`
    InvalidRepeats { min: u32, max: u32, position: usize },

    /// Parentheses nested deeper than [`MAX_NESTING`]
    TooDeeplyNested { limit: usize, position: usize },
}

impl ParseError {
    pub fn position(&self) -> usize {
        match self {
            ParseError::Expected { position, .. }
            | ParseError::UnexpectedEnd { position, .. }
            | ParseError::UnknownOperator { position, .. }
            | ParseError::InvalidAttributeName { position, .. }
            | ParseError::InvalidNumber { position, .. }
            | ParseError::InvalidRepeats { position, .. }
            | ParseError::TooDeeplyNested { position, .. } => *position,
        }
    }
}

fn describe(symbols: &[String]) -> String {
    symbols
        .iter()
        .map(|s| match s.as_str() {
            " " => "space".to_string(),
            "\t" => "tab".to_string(),
            "\n" | "\r" => "newline".to_string(),
            other => format!("'{}'", other),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Expected {
                expected,
                found,
                position,
            } => write!(
                f,
                "expected one of [{}] but found '{}' at {}",
                describe(expected),
                found,
                position
            ),
            ParseError::UnexpectedEnd { expected, position } => write!(
                f,
                "unexpected end of input, expected one of [{}] at {}",
                describe(expected),
                position
            ),
            ParseError::UnknownOperator { operator, position } => {
                write!(f, "unknown operator '{}' at {}", operator, position)
            }
            ParseError::InvalidAttributeName { name, position } => {
                write!(f, "invalid attribute name '{}' at {}", name, position)
            }
            ParseError::InvalidNumber { text, position } => {
                write!(f, "'{}' is not a valid repetition count at {}", text, position)
            }
            ParseError::InvalidRepeats { min, max, position } => write!(
                f,
                "minimum repetition {} exceeds maximum {} at {}",
                min, max, position
            ),
            ParseError::TooDeeplyNested { limit, position } => write!(
                f,
                "parentheses nested deeper than {} levels at {}",
                limit, position
            ),
        }
    }
}

impl std::error::Error for ParseError {}

/// Recursive-descent parser over a [`Scanner`].
///
/// The grammar, informally:
///
/// ```text
/// query      := token (token | within)*
/// token      := xmltag? ( '[' expression? ']' | '"' word '"' ) repetition? closingtag?
/// repetition := '{' n '}' | '{' min ',' max? '}' '?'? | '*' '?'? | '+' '?'? | '?'
/// expression := predicate (('&' | '|') predicate)*
/// predicate  := '(' expression ')' | name ('=' | '!=') '"' value '"'
/// within     := 'within' '<' name '/>'
/// ```
pub struct Parser {
    scanner: Scanner,
    default_attribute: String,
    depth: usize,
}

impl Parser {
    pub fn new(scanner: Scanner) -> Self {
        Parser {
            scanner,
            default_attribute: DEFAULT_ATTRIBUTE.to_string(),
            depth: 0,
        }
    }

    /// Use `name` instead of `word` for bare quoted words.
    pub fn with_default_attribute(mut self, name: impl Into<String>) -> Self {
        self.default_attribute = name.into();
        self
    }

    /// Parse a complete pattern.
    ///
    /// Blank input is not an error: it yields `Ok(None)`, meaning "no query".
    pub fn parse(&mut self) -> Result<Option<Query>, ParseError> {
        self.scanner.skip_whitespace();
        if self.scanner.is_at_end() {
            return Ok(None);
        }

        // A query always starts with a token
        let mut tokens = vec![self.parse_token()?];
        let mut within = None;

        loop {
            self.scanner.skip_whitespace();
            if self.scanner.is_at_end() {
                break;
            }

            if self.scanner.test("within") {
                within = Some(self.parse_within()?);
            } else {
                tokens.push(self.parse_token()?);
            }
        }

        trace!(tokens = tokens.len(), ?within, "parsed cql pattern");
        Ok(Some(Query { tokens, within }))
    }

    fn parse_token(&mut self) -> Result<Token, ParseError> {
        let mut token = Token::default();

        self.scanner.skip_whitespace();
        if self.scanner.test("<") {
            token.leading_xml_tag = Some(self.parse_xml_tag()?);
        }

        if self.scanner.accept(&["["], false).is_some() {
            if self.scanner.accept(&["]"], false).is_none() {
                token.expression = Some(self.parse_expression()?);
                self.scanner.expect(&["]"], false)?;
            }
        } else {
            // Shorthand: "cat" means [word="cat"]
            self.scanner.expect(&["\""], true)?;
            let word = self.scanner.until_unescaped('"')?;
            self.scanner.expect(&["\""], false)?;

            token.expression = Some(Expr::attribute(
                self.default_attribute.clone(),
                AttributeOperator::Equal,
                word,
            ));
        }

        self.parse_repetition(&mut token)?;

        // An opening tag here belongs to the next token
        self.scanner.skip_whitespace();
        if self.scanner.test("</") {
            token.trailing_xml_tag = Some(self.parse_xml_tag()?);
        }

        Ok(token)
    }

    fn parse_repetition(&mut self, token: &mut Token) -> Result<(), ParseError> {
        let position = self.scanner.position();

        if self.scanner.accept(&["{"], false).is_some() {
            let min_position = self.scanner.position();
            let min_text = self.scanner.until(&[",", "}"])?;
            let min = parse_count(&min_text, min_position)?;

            let max = if self.scanner.accept(&[","], false).is_some() {
                let max_position = self.scanner.position();
                let max_text = self.scanner.until(&["}"])?;
                // {n,} is unbounded
                if max_text.trim().is_empty() {
                    None
                } else {
                    Some(parse_count(&max_text, max_position)?)
                }
            } else {
                Some(min)
            };
            self.scanner.expect(&["}"], false)?;

            if let Some(max) = max {
                if min > max {
                    return Err(ParseError::InvalidRepeats { min, max, position });
                }
            }
            token.repeats = Some(Repeats::new(min, max));
        } else if self.scanner.accept(&["*"], false).is_some() {
            token.repeats = Some(Repeats::new(0, None));
        } else if self.scanner.accept(&["+"], false).is_some() {
            token.repeats = Some(Repeats::new(1, None));
        }

        if self.scanner.accept(&["?"], false).is_some() {
            token.optional = true;
        }

        Ok(())
    }

    fn parse_xml_tag(&mut self) -> Result<XmlTag, ParseError> {
        self.scanner.expect(&["<"], false)?;
        let is_closing_tag = self.scanner.accept(&["/"], false).is_some();

        // Whitespace is not allowed inside the tag name
        let mut stops = WHITESPACE.to_vec();
        stops.push(">");
        let name = self.scanner.until(&stops)?;
        self.scanner.expect(&[">"], false)?;

        Ok(XmlTag {
            name,
            is_closing_tag,
        })
    }

    fn parse_attribute(&mut self) -> Result<Expr, ParseError> {
        self.scanner.skip_whitespace();
        let name_position = self.scanner.position();
        let name = self.scanner.until(&["=", "!"])?.trim().to_string();
        if !is_valid_name(&name) {
            return Err(ParseError::InvalidAttributeName {
                name,
                position: name_position,
            });
        }

        let operator_position = self.scanner.position();
        let operator_text = self.scanner.until(&["\""])?.trim().to_string();
        let operator = AttributeOperator::from_symbol(&operator_text).ok_or(
            ParseError::UnknownOperator {
                operator: operator_text,
                position: operator_position,
            },
        )?;

        // Whitespace inside the quotes is part of the value
        self.scanner.expect(&["\""], true)?;
        let value = self.scanner.until_unescaped('"')?;
        self.scanner.expect(&["\""], true)?;

        Ok(Expr::Attribute {
            name,
            operator,
            value,
        })
    }

    fn parse_predicate(&mut self) -> Result<Expr, ParseError> {
        self.scanner.skip_whitespace();
        let position = self.scanner.position();
        if self.scanner.accept(&["("], false).is_some() {
            if self.depth >= MAX_NESTING {
                return Err(ParseError::TooDeeplyNested {
                    limit: MAX_NESTING,
                    position,
                });
            }
            self.depth += 1;
            let expr = self.parse_expression()?;
            self.scanner.expect(&[")"], false)?;
            self.depth -= 1;
            Ok(expr)
        } else {
            self.parse_attribute()
        }
    }

    /// `&` and `|` share one precedence level and associate to the left.
    fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_predicate()?;

        while let Some(symbol) = self.scanner.accept(&["&", "|"], false) {
            let operator = if symbol == "&" { BoolOp::And } else { BoolOp::Or };
            let right = self.parse_predicate()?;
            left = Expr::binary(operator, left, right);
        }

        Ok(left)
    }

    fn parse_within(&mut self) -> Result<String, ParseError> {
        self.scanner.expect(&["within"], false)?;
        self.scanner.expect(&["<"], false)?;

        let mut stops = WHITESPACE.to_vec();
        stops.push("/");
        let element_name = self.scanner.until(&stops)?;

        // Self-closing tag: <name/>
        self.scanner.expect(&["/"], false)?;
        self.scanner.expect(&[">"], false)?;
        Ok(element_name)
    }
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && !name
            .chars()
            .any(|ch| ch.is_whitespace() || "\"[]()&|<>{}".contains(ch))
}

fn parse_count(text: &str, position: usize) -> Result<u32, ParseError> {
    text.trim().parse::<u32>().map_err(|_| ParseError::InvalidNumber {
        text: text.trim().to_string(),
        position,
    })
}

/// Parse a CQL pattern, reading bare quoted words as `word="..."`.
pub fn parse(input: &str) -> Result<Option<Query>, ParseError> {
    Parser::new(Scanner::new(input)).parse()
}

/// Parse a CQL pattern, reading bare quoted words as `<attribute>="..."`.
pub fn parse_with_default_attribute(input: &str, attribute: &str) -> Result<Option<Query>, ParseError> {
    Parser::new(Scanner::new(input))
        .with_default_attribute(attribute)
        .parse()
}
