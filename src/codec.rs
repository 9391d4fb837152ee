//! Value encoding helpers shared by the parser-facing and builder-facing sides.
//!
//! Attribute values in CQL are regex fragments. The builder shows friendlier
//! forms (wildcards, a case checkbox, "starts with"/"ends with" comparators,
//! multi-select lists) and these functions convert between the two. All of them
//! are pure.

use std::sync::LazyLock;

use regex::Regex;

use crate::builder::Comparator;

/// Prefix marking a case- and diacritics-sensitive value.
pub const CASE_SENSITIVE_FLAG: &str = "(?-i)";

/// Alternative spelling of [`CASE_SENSITIVE_FLAG`] accepted on input.
pub const CASE_SENSITIVE_FLAG_SHORT: &str = "(?c)";

const ANY: &str = ".*";

/// Regex metacharacters escaped by [`make_wildcard_regex`].
static WILDCARD_METACHARACTERS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([\^$\-\\.(){}\[\]+])").expect("valid metacharacter pattern"));

/// Metacharacters escaped for exact literal matching, including the wildcard
/// characters and the alternation bar.
static LITERAL_METACHARACTERS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([\^$\-\\.(){}\[\]+*?|])").expect("valid metacharacter pattern"));

const UNESCAPED_IN_WILDCARDS: &str = "^$-\\.(){}[]+";

/// Split a leading case flag off a value.
///
/// The flag is always the outermost prefix, so this must run before
/// [`decode_comparator_shorthand`].
///
/// # Examples
/// ```
/// use cql_builder::codec::decode_case_flag;
///
/// assert_eq!(decode_case_flag("(?-i)Paris"), (true, "Paris"));
/// assert_eq!(decode_case_flag("(?c)Paris"), (true, "Paris"));
/// assert_eq!(decode_case_flag("paris"), (false, "paris"));
/// ```
pub fn decode_case_flag(value: &str) -> (bool, &str) {
    if let Some(rest) = value.strip_prefix(CASE_SENSITIVE_FLAG) {
        (true, rest)
    } else if let Some(rest) = value.strip_prefix(CASE_SENSITIVE_FLAG_SHORT) {
        (true, rest)
    } else {
        (false, value)
    }
}

pub fn encode_case_flag(case_sensitive: bool, value: &str) -> String {
    if case_sensitive {
        format!("{}{}", CASE_SENSITIVE_FLAG, value)
    } else {
        value.to_string()
    }
}

/// Whether the character at `index` is preceded by an odd number of backslashes.
fn is_escaped(chars: &[char], index: usize) -> bool {
    chars[..index]
        .iter()
        .rev()
        .take_while(|ch| **ch == '\\')
        .count()
        % 2
        == 1
}

/// Whether `value` contains a `|` that is a regex alternation.
pub fn has_unescaped_pipe(value: &str) -> bool {
    let chars: Vec<char> = value.chars().collect();
    chars
        .iter()
        .enumerate()
        .any(|(index, ch)| *ch == '|' && !is_escaped(&chars, index))
}

/// Rewrite `="x.*"` as "starts with x" and `=".*x"` as "ends with x".
///
/// Only plain `=` comparisons of at least two characters without alternation
/// are rewritten, and a bare `.*` is left alone. A trailing `\.*` is a
/// repeated literal dot, not a shorthand.
pub fn decode_comparator_shorthand(operator: Comparator, value: &str) -> (Comparator, String) {
    if operator != Comparator::Equal
        || value.chars().count() < 2
        || value == ANY
        || has_unescaped_pipe(value)
    {
        return (operator, value.to_string());
    }

    if let Some(rest) = value.strip_prefix(ANY) {
        return (Comparator::EndsWith, rest.to_string());
    }

    if let Some(rest) = value.strip_suffix(ANY) {
        let chars: Vec<char> = value.chars().collect();
        if !is_escaped(&chars, chars.len() - 2) {
            return (Comparator::StartsWith, rest.to_string());
        }
    }

    (operator, value.to_string())
}

/// Inverse of [`decode_comparator_shorthand`].
pub fn encode_comparator_shorthand(operator: Comparator, value: &str) -> (Comparator, String) {
    match operator {
        Comparator::StartsWith => (Comparator::Equal, format!("{}{}", value, ANY)),
        Comparator::EndsWith => (Comparator::Equal, format!("{}{}", ANY, value)),
        other => (other, value.to_string()),
    }
}

/// Convert a wildcard pattern (`*`, `?`) into a regex.
///
/// # Examples
/// ```
/// use cql_builder::codec::make_wildcard_regex;
///
/// assert_eq!(make_wildcard_regex("walk*"), "walk.*");
/// assert_eq!(make_wildcard_regex("c?t"), "c.t");
/// assert_eq!(make_wildcard_regex("e.g."), r"e\.g\.");
/// ```
pub fn make_wildcard_regex(original: &str) -> String {
    WILDCARD_METACHARACTERS
        .replace_all(original, r"\$1")
        .replace('*', ".*")
        .replace('?', ".")
}

/// Convert a regex produced by [`make_wildcard_regex`] back into wildcards.
///
/// This is not a general regex-to-wildcard translation; arbitrary regexes come
/// back only approximately.
pub fn make_regex_wildcard(original: &str) -> String {
    let chars: Vec<char> = original.chars().collect();
    let mut result = String::with_capacity(original.len());
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '\\' if chars
                .get(i + 1)
                .is_some_and(|next| UNESCAPED_IN_WILDCARDS.contains(*next)) =>
            {
                result.push(chars[i + 1]);
                i += 2;
            }
            '.' if chars.get(i + 1) == Some(&'*') => {
                result.push('*');
                i += 2;
            }
            '.' => {
                result.push('?');
                i += 1;
            }
            ch => {
                result.push(ch);
                i += 1;
            }
        }
    }

    result
}

/// Escape a literal so that it matches only itself as a regex.
pub fn escape_regex(original: &str) -> String {
    LITERAL_METACHARACTERS
        .replace_all(original, r"\$1")
        .into_owned()
}

/// Escape each value and join them into a single regex alternation.
///
/// # Examples
/// ```
/// use cql_builder::codec::escape_multi_value;
///
/// assert_eq!(escape_multi_value(&["NOU-C", "ADJ"]), r"NOU\-C|ADJ");
/// ```
pub fn escape_multi_value<S: AsRef<str>>(values: &[S]) -> String {
    values
        .iter()
        .map(|v| escape_regex(v.as_ref()))
        .collect::<Vec<_>>()
        .join("|")
}

/// Split an alternation back into its literal values.
///
/// The split only happens on a `|` that is not itself escaped; escaping
/// backslashes are removed from each piece afterwards.
pub fn unescape_multi_value(value: &str) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut escaped = false;

    for ch in value.chars() {
        if escaped {
            current.push(ch);
            escaped = false;
        } else if ch == '\\' {
            current.push(ch);
            escaped = true;
        } else if ch == '|' {
            pieces.push(std::mem::take(&mut current));
        } else {
            current.push(ch);
        }
    }
    pieces.push(current);

    pieces.iter().map(|piece| unescape_backslashes(piece)).collect()
}

fn unescape_backslashes(piece: &str) -> String {
    let mut result = String::with_capacity(piece.len());
    let mut chars = piece.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            if let Some(next) = chars.next() {
                result.push(next);
            }
        } else {
            result.push(ch);
        }
    }
    result
}

/// Escape double quotes for use inside a quoted CQL value.
pub fn escape_quotes(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    let mut result = String::with_capacity(value.len());
    for (index, ch) in chars.iter().enumerate() {
        if *ch == '"' && !is_escaped(&chars, index) {
            result.push('\\');
        }
        result.push(*ch);
    }
    result
}

/// Inverse of [`escape_quotes`].
pub fn unescape_quotes(value: &str) -> String {
    value.replace("\\\"", "\"")
}
