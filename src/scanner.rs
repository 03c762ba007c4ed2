use crate::error::{LoxideError, ScanError};
use crate::token::{Span, Token, TokenType};

pub struct Source<'a> {
    source: &'a str,
    start: usize,
}

impl<'a> Source<'a> {
    pub fn new(source: &'a str) -> Self {
        Source { source, start: 0 }
    }

    /// Scan only the tail of an accumulated buffer, starting at `start`.
    /// Spans and line numbers stay relative to the whole buffer, which keeps
    /// diagnostics from earlier REPL turns valid.
    pub fn continued(source: &'a str, start: usize) -> Self {
        Source { source, start }
    }

    /// Scans the whole input, partitioning tokens and errors. Scan errors are
    /// not fatal; scanning resumes after the offending bytes. The token list
    /// always ends with `Eof` carrying the final line number.
    pub fn scan_all(&self) -> (Vec<Token>, Vec<LoxideError>) {
        let mut tokens = Vec::new();
        let mut errors = Vec::new();

        let mut scanner = Scanner::new(self.source, self.start);
        for result in &mut scanner {
            match result {
                Ok(token) => tokens.push(token),
                Err(error) => errors.push(error),
            }
        }
        tokens.push(Token::new(
            TokenType::Eof,
            Span::new(self.source.len(), 0),
            scanner.line,
        ));

        (tokens, errors)
    }
}

pub struct Scanner<'a> {
    source: &'a str,
    start: usize,
    current: usize,
    line: usize,
}

impl Iterator for Scanner<'_> {
    type Item = Result<Token, LoxideError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.is_at_end() {
                return None;
            }
            self.start = self.current;
            let token = self.scan_token();
            if token.is_some() {
                return token;
            }
        }
    }
}

impl<'a> Scanner<'a> {
    pub(crate) fn new(source: &'a str, start: usize) -> Self {
        let line = source.as_bytes()[..start]
            .iter()
            .filter(|b| **b == b'\n')
            .count()
            + 1;
        Self {
            source,
            start,
            current: start,
            line,
        }
    }

    fn scan_token(&mut self) -> Option<Result<Token, LoxideError>> {
        let token = match self.advance() {
            b'(' => self.create_token(TokenType::LeftParen),
            b')' => self.create_token(TokenType::RightParen),
            b'{' => self.create_token(TokenType::LeftBrace),
            b'}' => self.create_token(TokenType::RightBrace),
            b',' => self.create_token(TokenType::Comma),
            b'.' => self.create_token(TokenType::Dot),
            b'-' => self.create_token(TokenType::Minus),
            b'+' => self.create_token(TokenType::Plus),
            b';' => self.create_token(TokenType::Semicolon),
            b'*' => self.create_token(TokenType::Star),
            b'!' => {
                let token_type = if self.next_matches(b'=') {
                    TokenType::BangEqual
                } else {
                    TokenType::Bang
                };
                self.create_token(token_type)
            }
            b'=' => {
                let token_type = if self.next_matches(b'=') {
                    TokenType::EqualEqual
                } else {
                    TokenType::Equal
                };
                self.create_token(token_type)
            }
            b'<' => {
                let token_type = if self.next_matches(b'=') {
                    TokenType::LessEqual
                } else {
                    TokenType::Less
                };
                self.create_token(token_type)
            }
            b'>' => {
                let token_type = if self.next_matches(b'=') {
                    TokenType::GreaterEqual
                } else {
                    TokenType::Greater
                };
                self.create_token(token_type)
            }
            b'/' => {
                if self.next_matches(b'/') {
                    // comment runs up to, not including, the newline
                    while self.peek() != b'\n' && !self.is_at_end() {
                        self.advance();
                    }
                    return None;
                } else {
                    self.create_token(TokenType::Slash)
                }
            }
            b' ' | b'\r' | b'\t' => return None,
            b'\n' => {
                self.line += 1;
                return None;
            }
            b'"' => return Some(self.string()),
            c if c.is_ascii_digit() => return Some(self.number()),
            c if c.is_ascii_alphabetic() || c == b'_' => self.identifier(),
            _ => return Some(Err(ScanError::unexpected_character(self.token_span()))),
        };

        Some(Ok(token))
    }

    fn identifier(&mut self) -> Token {
        while self.peek().is_ascii_alphanumeric() || self.peek() == b'_' {
            self.advance();
        }

        let text = &self.source[self.start..self.current];
        let token_type = Self::keyword(text).unwrap_or(TokenType::Identifier);

        self.create_token(token_type)
    }

    fn number(&mut self) -> Result<Token, LoxideError> {
        while self.peek().is_ascii_digit() {
            self.advance();
        }
        // a trailing `.` without digits is not part of the literal
        if self.peek() == b'.' && self.peek_next().is_ascii_digit() {
            self.advance();

            while self.peek().is_ascii_digit() {
                self.advance();
            }
        }

        let number = &self.source[self.start..self.current];
        if number.parse::<f64>().is_err() {
            return Err(ScanError::invalid_number(self.token_span()));
        }
        Ok(self.create_token(TokenType::Number))
    }

    fn string(&mut self) -> Result<Token, LoxideError> {
        while self.peek() != b'"' && !self.is_at_end() {
            if self.peek() == b'\n' {
                self.line += 1;
            }
            self.advance();
        }

        if self.is_at_end() {
            return Err(ScanError::unterminated_string(self.token_span()));
        }

        self.advance(); // the closing "

        Ok(self.create_token(TokenType::String))
    }

    fn peek(&self) -> u8 {
        if self.is_at_end() {
            b'\0'
        } else {
            self.source.as_bytes()[self.current]
        }
    }

    fn peek_next(&self) -> u8 {
        if self.current + 1 >= self.source.len() {
            b'\0'
        } else {
            self.source.as_bytes()[self.current + 1]
        }
    }

    fn advance(&mut self) -> u8 {
        let byte = self.source.as_bytes()[self.current];
        self.current += 1;
        byte
    }

    fn next_matches(&mut self, expected: u8) -> bool {
        if self.is_at_end() {
            return false;
        }
        if self.source.as_bytes()[self.current] != expected {
            return false;
        }

        self.current += 1;
        true
    }

    fn create_token(&mut self, token_type: TokenType) -> Token {
        Token::new(token_type, self.token_span(), self.line)
    }

    fn token_span(&self) -> Span {
        Span::new(self.start, self.current - self.start)
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }

    fn keyword(text: &str) -> Option<TokenType> {
        let token_type = match text {
            "and" => TokenType::And,
            "class" => TokenType::Class,
            "else" => TokenType::Else,
            "false" => TokenType::False,
            "for" => TokenType::For,
            "fun" => TokenType::Fun,
            "if" => TokenType::If,
            "nil" => TokenType::Nil,
            "or" => TokenType::Or,
            "print" => TokenType::Print,
            "return" => TokenType::Return,
            "super" => TokenType::Super,
            "this" => TokenType::This,
            "true" => TokenType::True,
            "var" => TokenType::Var,
            "while" => TokenType::While,
            _ => return None,
        };
        Some(token_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use TokenType::*;

    fn scan(source: &str) -> (Vec<Token>, Vec<LoxideError>) {
        Source::new(source).scan_all()
    }

    fn types(source: &str) -> Vec<TokenType> {
        let (tokens, errors) = scan(source);
        assert!(errors.is_empty(), "unexpected scan errors: {errors:?}");
        tokens.into_iter().map(|token| token.tpe).collect()
    }

    #[test]
    fn test_punctuation() {
        assert_eq!(
            types("(){},.-+;/*"),
            vec![
                LeftParen, RightParen, LeftBrace, RightBrace, Comma, Dot, Minus, Plus, Semicolon,
                Slash, Star, Eof
            ]
        );
    }

    #[test]
    fn test_one_or_two_char_operators() {
        assert_eq!(
            types("! != = == > >= < <="),
            vec![
                Bang, BangEqual, Equal, EqualEqual, Greater, GreaterEqual, Less, LessEqual, Eof
            ]
        );
    }

    #[test]
    fn test_keywords_and_identifiers() {
        assert_eq!(
            types("and class orchid _under score42"),
            vec![And, Class, Identifier, Identifier, Identifier, Eof]
        );
    }

    #[test]
    fn test_number_with_trailing_dot() {
        // `123.` is a number followed by a lone dot
        assert_eq!(types("123."), vec![Number, Dot, Eof]);
        assert_eq!(types("123.45"), vec![Number, Eof]);
    }

    #[test]
    fn test_string_spans_trim_nothing() {
        let (tokens, errors) = scan(r#""hi there""#);
        assert!(errors.is_empty());
        assert_eq!(tokens[0].tpe, String);
        assert_eq!(tokens[0].span, Span::new(0, 10));
    }

    #[test]
    fn test_string_with_newline_counts_lines() {
        let (tokens, errors) = scan("\"a\nb\" x");
        assert!(errors.is_empty());
        assert_eq!(tokens[0].line, 2);
        assert_eq!(tokens[1].line, 2);
    }

    #[test]
    fn test_unterminated_string() {
        let (tokens, errors) = scan("\"oops");
        assert_eq!(tokens.len(), 1); // just Eof
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].render("\"oops"), "[line 1] Error: Unterminated string.");
    }

    #[test]
    fn test_unexpected_character() {
        let (tokens, errors) = scan("1 # 2");
        assert_eq!(
            tokens.iter().map(|t| t.tpe).collect::<Vec<_>>(),
            vec![Number, Number, Eof]
        );
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].render("1 # 2"), "[line 1] Error: Unexpected character.");
    }

    #[test]
    fn test_comment_runs_to_end_of_line() {
        assert_eq!(types("1 // two three\n4"), vec![Number, Number, Eof]);
    }

    #[test]
    fn test_continued_keeps_absolute_positions() {
        let buffer = "var a = 1;\nprint a;";
        let start = "var a = 1;\n".len();
        let (tokens, errors) = Source::continued(buffer, start).scan_all();
        assert!(errors.is_empty());
        assert_eq!(tokens[0].tpe, Print);
        assert_eq!(tokens[0].span.offset, start);
        assert_eq!(tokens[0].line, 2);
    }

    #[test]
    fn test_eof_carries_final_line() {
        let (tokens, _) = scan("1\n2\n");
        assert_eq!(tokens.last().map(|t| t.line), Some(3));
    }
}
