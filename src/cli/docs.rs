//! Documentation content for the cqlb CLI

use super::CliError;

/// Available documentation topics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocTopic {
    Syntax,
    Attributes,
    Operators,
    Repetition,
    Structure,
    Values,
    Builder,
}

impl DocTopic {
    /// Parse topic name from string
    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "syntax" | "tokens" => Some(Self::Syntax),
            "attributes" | "attribute" | "attrs" => Some(Self::Attributes),
            "operators" | "ops" | "boolean" => Some(Self::Operators),
            "repetition" | "repeats" | "quantifiers" => Some(Self::Repetition),
            "structure" | "within" | "tags" => Some(Self::Structure),
            "values" | "regex" | "wildcards" => Some(Self::Values),
            "builder" | "normalize" => Some(Self::Builder),
            _ => None,
        }
    }
}

/// Get the docs overview (topic listing)
pub fn get_docs_overview() -> &'static str {
    r#"CQL DOCUMENTATION

CQL (Corpus Query Language) describes sequences of words in an annotated
corpus. Every token slot is written in square brackets and constrains the
annotations of one word.

DOCUMENTATION TOPICS

  syntax            Token slots, the any-word token and bare quoted words
  attributes        name = "value" constraints and their comparators
  operators         Combining constraints with & and |
  repetition        {n}, {min,max}, ?, * and + suffixes
  structure         Sentence anchors and the within clause
  values            Regex values, wildcards, case sensitivity
  builder           How the query builder normalizes patterns

QUICK REFERENCE

  [word="cat"]               One word equal to "cat"
  "cat"                      Same, using the default attribute
  []                         Any word
  [lemma="run" & pos="V.*"]  Both constraints
  [word="a|the"]             Alternation inside a value
  []{2,4}                    Two to four arbitrary words
  <s> [] </s>                Sentence start / end
  [] within <p/>             Restrict matches to a paragraph

Run 'cqlb docs <topic>' for detailed documentation.
"#
}

/// Get documentation for a specific topic
pub fn get_doc_topic(name: &str) -> Result<&'static str, CliError> {
    match DocTopic::from_name(name) {
        Some(DocTopic::Syntax) => Ok(SYNTAX_DOC),
        Some(DocTopic::Attributes) => Ok(ATTRIBUTES_DOC),
        Some(DocTopic::Operators) => Ok(OPERATORS_DOC),
        Some(DocTopic::Repetition) => Ok(REPETITION_DOC),
        Some(DocTopic::Structure) => Ok(STRUCTURE_DOC),
        Some(DocTopic::Values) => Ok(VALUES_DOC),
        Some(DocTopic::Builder) => Ok(BUILDER_DOC),
        None => Err(CliError::UnknownTopic(name.to_string())),
    }
}

const SYNTAX_DOC: &str = r#"SYNTAX - Token Slots

TOKEN
  [ constraints ]
    One word of the corpus. The constraints inside the brackets must all
    hold for the word to match.

    Example:
      [word="house"]

ANY WORD
  []
    A token without constraints matches any single word.

    Example:
      [word="the"] [] [word="house"]

BARE WORDS
  "value"
    Shorthand for [word="value"]. The attribute used can be changed with the
    defaultAttribute setting.

    Example:
      "the" "house"

SEQUENCES
  Tokens are separated by whitespace and match consecutive words.
"#;

const ATTRIBUTES_DOC: &str = r#"ATTRIBUTES - Constraints on Annotations

FORM
  name = "value"
  name != "value"
    The name is an annotation such as word, lemma or pos. The value is a
    regular expression matched against the whole annotation.

    Whitespace inside the quotes is part of the value. A double quote inside
    the value is written as \".

BUILDER COMPARATORS
  The query builder also offers:
    starts with "ca"    written as  word = "ca.*"
    ends with "ing"     written as  word = ".*ing"

  A value is only shown as "starts with"/"ends with" when it has no top-level
  alternation and is not just ".*".
"#;

const OPERATORS_DOC: &str = r#"OPERATORS - Combining Constraints

AND
  a="1" & b="2"
    Both constraints must hold.

OR
  a="1" | b="2"
    Either constraint may hold.

GROUPING
  ( ... )
    Parentheses group constraints.

    Example:
      [lemma="run" & (pos="V.*" | pos="N.*")]

PRECEDENCE
  & and | have the same precedence and are read left to right:

    [a="1" & b="2" | c="3"]    means    [(a="1" & b="2") | c="3"]

  Use parentheses whenever operators are mixed.
"#;

const REPETITION_DOC: &str = r#"REPETITION - Quantifiers

  [...]{n}          exactly n times
  [...]{min,max}    between min and max times
  [...]{min,}       at least min times
  [...]?            optional (zero or one)
  [...]*            zero or more
  [...]+            one or more

  A ? after a {..}, * or + suffix also marks the token optional.

  The minimum may not exceed the maximum: {4,2} is rejected.

  Example:
    [pos="ADJ"]{1,3} [pos="NOU.*"]
"#;

const STRUCTURE_DOC: &str = r#"STRUCTURE - Tags and Within

SENTENCE ANCHORS
  <s> [...]         token at the start of a sentence
  [...] </s>        token at the end of a sentence

WITHIN
  pattern within <name/>
    Only report matches that lie inside one element, for example a
    paragraph or sentence.

    Example:
      [lemma="run"] [] [pos="N.*"] within <s/>
"#;

const VALUES_DOC: &str = r#"VALUES - Regular Expressions

REGEX
  Values are regular expressions: "walk.*" matches walk, walks, walked.

CASE SENSITIVITY
  Matching ignores case and diacritics by default. Prefix the value with
  (?-i) or (?c) to match exactly:

    [word="(?-i)Paris"]

WILDCARDS
  Wildcards are a friendlier form of a small regex subset:
    *    any run of characters      (.*)
    ?    one character              (.)

  cqlb wildcard 'walk*'    prints    walk.*
  cqlb regex 'walk.*'      prints    walk*

MULTIPLE VALUES
  Values picked from a list are escaped and joined with |:
    [pos="NOU\-C|ADJ"]
"#;

const BUILDER_DOC: &str = r#"BUILDER - Normalized Patterns

  cqlb normalize '<pattern>'
    Loads the pattern into the query builder and prints it back. The output
    is canonical: spaces around operators, redundant parentheses removed,
    shorthand comparators and case flags re-encoded.

  cqlb tree '<pattern>'
    Shows the builder tree: one root group per token, nested groups for
    mixed operators.

  Attributes that are not configured are dropped, and XML tags other than
  <s> and </s> are ignored. Pass --settings FILE to configure attributes.

SETTINGS FILE
  {
    "defaultAttribute": "word",
    "attributes": [
      { "id": "word", "caseSensitive": true },
      { "id": "pos", "values": [{ "value": "NOU-C" }] }
    ]
  }
"#;
