use crate::parser::ParseError;

/// Characters skipped between symbols, except inside quoted values.
pub const WHITESPACE: &[&str] = &[" ", "\t", "\n", "\r"];

fn is_whitespace(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\n' | '\r')
}

/// Character cursor over a CQL pattern.
///
/// There is no separate token stream: the parser drives the scanner directly
/// with the three primitives [`accept`](Scanner::accept),
/// [`expect`](Scanner::expect) and [`until`](Scanner::until). Positions are
/// character offsets into the original input.
pub struct Scanner {
    input: Vec<char>,
    position: usize,
}

impl Scanner {
    pub fn new(input: &str) -> Self {
        Scanner {
            input: input.chars().collect(),
            position: 0,
        }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    pub fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    pub fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char() {
            if is_whitespace(ch) {
                self.advance();
            } else {
                break;
            }
        }
    }

    /// Whether `symbol` occurs literally at the current position.
    pub fn test(&self, symbol: &str) -> bool {
        symbol
            .chars()
            .enumerate()
            .all(|(offset, ch)| self.input.get(self.position + offset) == Some(&ch))
    }

    fn test_any<'s>(&self, symbols: &[&'s str]) -> Option<&'s str> {
        symbols.iter().copied().find(|symbol| self.test(symbol))
    }

    /// Consume the first of `symbols` found at the current position.
    ///
    /// Whitespace before and after the symbol is skipped unless
    /// `keep_whitespace` is set. On failure the position is left untouched.
    pub fn accept<'s>(&mut self, symbols: &[&'s str], keep_whitespace: bool) -> Option<&'s str> {
        let original = self.position;

        if !keep_whitespace {
            self.skip_whitespace();
        }

        match self.test_any(symbols) {
            Some(symbol) => {
                self.position += symbol.chars().count();
                if !keep_whitespace {
                    self.skip_whitespace();
                }
                Some(symbol)
            }
            None => {
                self.position = original;
                None
            }
        }
    }

    /// Like [`accept`](Scanner::accept), but a missing symbol is an error.
    pub fn expect<'s>(&mut self, symbols: &[&'s str], keep_whitespace: bool) -> Result<&'s str, ParseError> {
        if let Some(symbol) = self.accept(symbols, keep_whitespace) {
            return Ok(symbol);
        }

        let mut position = self.position;
        if !keep_whitespace {
            while self
                .input
                .get(position)
                .is_some_and(|ch| is_whitespace(*ch))
            {
                position += 1;
            }
        }

        let expected = symbols.iter().map(|s| s.to_string()).collect();
        match self.input.get(position) {
            Some(found) => Err(ParseError::Expected {
                expected,
                found: *found,
                position,
            }),
            None => Err(ParseError::UnexpectedEnd { expected, position }),
        }
    }

    /// Scan forward to the first of `stops`, returning everything before it.
    ///
    /// The stop symbol itself is not consumed. Running out of input first is an
    /// error.
    pub fn until(&mut self, stops: &[&str]) -> Result<String, ParseError> {
        let start = self.position;
        while !self.is_at_end() {
            if self.test_any(stops).is_some() {
                return Ok(self.input[start..self.position].iter().collect());
            }
            self.advance();
        }

        Err(ParseError::UnexpectedEnd {
            expected: stops.iter().map(|s| s.to_string()).collect(),
            position: self.position,
        })
    }

    /// [`until`](Scanner::until) for quoted values: backslash-escaped
    /// characters never terminate the scan.
    pub fn until_unescaped(&mut self, stop: char) -> Result<String, ParseError> {
        let start = self.position;
        while let Some(ch) = self.current_char() {
            if ch == stop {
                return Ok(self.input[start..self.position].iter().collect());
            }
            if ch == '\\' {
                self.advance();
            }
            self.advance();
        }

        self.position = self.input.len();
        Err(ParseError::UnexpectedEnd {
            expected: vec![stop.to_string()],
            position: self.position,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accept_restores_position() {
        let mut scanner = Scanner::new("  [word");
        assert_eq!(scanner.accept(&["("], false), None);
        assert_eq!(scanner.position(), 0);
        assert_eq!(scanner.accept(&["(", "["], false), Some("["));
        assert_eq!(scanner.position(), 3);
    }

    #[test]
    fn test_accept_keep_whitespace() {
        let mut scanner = Scanner::new("\" cat \"");
        assert_eq!(scanner.accept(&["\""], true), Some("\""));
        assert_eq!(scanner.until(&["\""]).unwrap(), " cat ");
    }

    #[test]
    fn test_expect_reports_offset() {
        let mut scanner = Scanner::new("   x");
        let err = scanner.expect(&["["], false).unwrap_err();
        assert_eq!(err.position(), 3);
        assert!(err.to_string().contains("at 3"));
    }

    #[test]
    fn test_until_unterminated() {
        let mut scanner = Scanner::new("word");
        assert!(matches!(
            scanner.until(&["="]),
            Err(ParseError::UnexpectedEnd { position: 4, .. })
        ));
    }

    #[test]
    fn test_until_unescaped_skips_escaped_quote() {
        let mut scanner = Scanner::new(r#"a\"b" rest"#);
        assert_eq!(scanner.until_unescaped('"').unwrap(), r#"a\"b"#);
        assert!(scanner.test("\""));
    }
}
