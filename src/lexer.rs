//! Token stream for the Glich language
//!
//! Pulls one token at a time from the source text. The stream tracks a
//! 1-based line counter that advances on every newline, including those
//! inside block comments and quoted strings, so that captured function
//! bodies report correct line numbers when re-lexed later.

use crate::field::Field;
use crate::token::{lookup_word, Token, TokenKind};

/// Lexing context: controls the default type of a bare integer literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Context {
    /// Bare integers are plain numbers.
    Glich,
    /// Bare integers are calendar fields.
    Hics,
}

/// Lex errors beyond this count abort the top-level run.
pub const MAX_LEX_ERRORS: usize = 5;

/// The token stream state
#[derive(Debug, Clone)]
pub struct TokenStream {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    current: Token,
    context: Context,
    errors: Vec<String>,
    error_total: usize,
}

impl TokenStream {
    /// Create a stream over source text, starting at line 1.
    pub fn new(source: &str) -> Self {
        Self::new_at(source, 1)
    }

    /// Create a stream over stored body text, anchored at the line the
    /// body occupied in its defining script.
    pub fn new_at(source: &str, line: usize) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            line,
            current: Token::end(line),
            context: Context::Glich,
            errors: Vec::new(),
            error_total: 0,
        }
    }

    pub fn current(&self) -> &Token {
        &self.current
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn context(&self) -> Context {
        self.context
    }

    pub fn set_context(&mut self, context: Context) {
        self.context = context;
    }

    /// True when the whole source has been consumed, distinguishing a
    /// genuine end of input from the error-recovery end token.
    pub fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    /// Total lex errors raised on this stream.
    pub fn error_total(&self) -> usize {
        self.error_total
    }

    /// Drain pending lex diagnostics.
    pub fn take_errors(&mut self) -> Vec<String> {
        std::mem::take(&mut self.errors)
    }

    fn report(&mut self, msg: impl Into<String>) {
        self.errors.push(format!("line {}: {}", self.line, msg.into()));
        self.error_total += 1;
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += 1;
        if ch == '\n' {
            self.line += 1;
        }
        Some(ch)
    }

    /// Pull the next token from the stream.
    pub fn next(&mut self) -> &Token {
        self.skip_whitespace_and_comments();
        let line = self.line;

        let Some(ch) = self.peek() else {
            self.current = Token::end(line);
            return &self.current;
        };

        let kind = match ch {
            '(' => { self.advance(); TokenKind::LParen }
            ')' => { self.advance(); TokenKind::RParen }
            '{' => { self.advance(); TokenKind::LBrace }
            '}' => { self.advance(); TokenKind::RBrace }
            '[' => { self.advance(); TokenKind::LBracket }
            ']' => { self.advance(); TokenKind::RBracket }
            ',' => { self.advance(); TokenKind::Comma }
            ';' => { self.advance(); TokenKind::Semicolon }
            '+' => { self.advance(); TokenKind::Plus }
            '-' => { self.advance(); TokenKind::Minus }
            '*' => { self.advance(); TokenKind::Star }
            '/' => { self.advance(); TokenKind::Slash }
            '|' => { self.advance(); TokenKind::Vline }
            '&' => { self.advance(); TokenKind::Ampersand }
            '\\' => { self.advance(); TokenKind::Backslash }
            '^' => { self.advance(); TokenKind::Caret }
            '~' => { self.advance(); TokenKind::Tilde }
            '@' => { self.advance(); TokenKind::At }
            '=' => { self.advance(); TokenKind::Equal }

            '.' => {
                self.advance();
                if self.peek() == Some('.') {
                    self.advance();
                    TokenKind::DotDot
                } else {
                    TokenKind::Dot
                }
            }
            '<' => {
                self.advance();
                if self.peek() == Some('>') {
                    self.advance();
                    TokenKind::NotEqual
                } else if self.peek() == Some('=') {
                    self.advance();
                    TokenKind::LessEq
                } else {
                    TokenKind::Less
                }
            }
            '>' => {
                self.advance();
                if self.peek() == Some('=') {
                    self.advance();
                    TokenKind::GreaterEq
                } else {
                    TokenKind::Greater
                }
            }

            '"' => self.scan_string(),

            c if c.is_ascii_digit() => self.scan_number(),

            // Identifiers are ASCII only; a signature like "g:dmy" lexes
            // as a single name.
            c if c.is_ascii_alphabetic() || c == '_' || c == ':' => self.scan_identifier(),

            _ => {
                self.advance();
                self.report(format!("unrecognized character '{}'", ch));
                self.current = Token::end(line);
                return &self.current;
            }
        };

        self.current = Token::new(kind, line);
        &self.current
    }

    /// Skip whitespace, `//` line comments and `/*...*/` block comments.
    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.advance();
                }
                Some('/') if self.peek_at(1) == Some('/') => {
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                Some('/') if self.peek_at(1) == Some('*') => {
                    self.advance();
                    self.advance();
                    loop {
                        match self.peek() {
                            Some('*') if self.peek_at(1) == Some('/') => {
                                self.advance();
                                self.advance();
                                break;
                            }
                            Some(_) => {
                                self.advance();
                            }
                            None => break,
                        }
                    }
                }
                _ => break,
            }
        }
    }

    /// Scan a double-quoted string; `""` is an escaped embedded quote.
    /// Newlines inside the string are preserved verbatim.
    fn scan_string(&mut self) -> TokenKind {
        self.advance(); // opening quote
        let mut value = String::new();
        loop {
            match self.peek() {
                Some('"') => {
                    self.advance();
                    if self.peek() == Some('"') {
                        self.advance();
                        value.push('"');
                    } else {
                        return TokenKind::Str(value);
                    }
                }
                Some(c) => {
                    self.advance();
                    value.push(c);
                }
                None => {
                    self.report("unterminated string");
                    return TokenKind::Str(value);
                }
            }
        }
    }

    /// Scan a numeric literal: a digit run, optionally suffixed `f` for
    /// a field, or followed by `.digits` for a float. A bare run takes
    /// its type from the parsing context. `1..2` is a range, not a
    /// float, so a second dot stops float detection.
    fn scan_number(&mut self) -> TokenKind {
        let mut text = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                text.push(c);
                self.advance();
            } else {
                break;
            }
        }

        if self.peek() == Some('f') {
            let after = self.peek_at(1);
            if !after.map_or(false, |c| c.is_ascii_alphanumeric() || c == '_') {
                self.advance();
                return TokenKind::Field(self.parse_int(&text));
            }
        }

        if self.peek() == Some('.')
            && self.peek_at(1) != Some('.')
            && self.peek_at(1).map_or(false, |c| c.is_ascii_digit())
        {
            text.push('.');
            self.advance();
            while let Some(c) = self.peek() {
                if c.is_ascii_digit() {
                    text.push(c);
                    self.advance();
                } else {
                    break;
                }
            }
            return match text.parse::<f64>() {
                Ok(x) => TokenKind::Float(x),
                Err(_) => {
                    self.report(format!("invalid number '{}'", text));
                    TokenKind::Float(0.0)
                }
            };
        }

        let n = self.parse_int(&text);
        match self.context {
            Context::Glich => TokenKind::Number(n),
            Context::Hics => TokenKind::Field(n),
        }
    }

    fn parse_int(&mut self, text: &str) -> Field {
        match text.parse::<i64>() {
            Ok(n) => n,
            Err(_) => {
                self.report(format!("invalid number '{}'", text));
                0
            }
        }
    }

    fn scan_identifier(&mut self) -> TokenKind {
        let mut text = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '_' || c == ':' {
                text.push(c);
                self.advance();
            } else {
                break;
            }
        }
        match lookup_word(&text) {
            Some(kind) => kind,
            None => TokenKind::Name(text),
        }
    }

    /// Scan raw characters up to the matching terminator, honoring
    /// nesting via the escalator, and return them as a single string.
    /// Quoted strings and comments are copied verbatim without being
    /// searched for the terminator, and newlines keep the line counter
    /// in sync so the captured body re-lexes with correct lines.
    ///
    /// Word terminators ("loop", "do") match on identifier boundaries;
    /// single-character terminators ("}", "{") match directly.
    pub fn read_until(&mut self, terminator: &str, escalator: &str) -> Option<String> {
        let mut depth = 1usize;
        let mut out = String::new();

        loop {
            let Some(ch) = self.peek() else {
                self.report(format!("'{}' expected before end of input", terminator));
                return None;
            };

            if ch == '"' {
                out.push('"');
                self.advance();
                loop {
                    match self.advance() {
                        Some('"') => {
                            out.push('"');
                            if self.peek() == Some('"') {
                                self.advance();
                                out.push('"');
                                continue;
                            }
                            break;
                        }
                        Some(c) => out.push(c),
                        None => {
                            self.report("unterminated string");
                            return None;
                        }
                    }
                }
                continue;
            }

            if ch == '/' && self.peek_at(1) == Some('/') {
                while let Some(c) = self.peek() {
                    out.push(c);
                    self.advance();
                    if c == '\n' {
                        break;
                    }
                }
                continue;
            }

            if ch == '/' && self.peek_at(1) == Some('*') {
                out.push_str("/*");
                self.advance();
                self.advance();
                loop {
                    match self.advance() {
                        Some('*') if self.peek() == Some('/') => {
                            self.advance();
                            out.push_str("*/");
                            break;
                        }
                        Some(c) => out.push(c),
                        None => {
                            self.report("unterminated comment");
                            return None;
                        }
                    }
                }
                continue;
            }

            if ch.is_ascii_alphabetic() || ch == '_' {
                let mut word = String::new();
                while let Some(c) = self.peek() {
                    if c.is_ascii_alphanumeric() || c == '_' || c == ':' {
                        word.push(c);
                        self.advance();
                    } else {
                        break;
                    }
                }
                if word == terminator {
                    depth -= 1;
                    if depth == 0 {
                        return Some(out);
                    }
                } else if word == escalator {
                    depth += 1;
                }
                out.push_str(&word);
                continue;
            }

            self.advance();
            let s = ch.to_string();
            if s == terminator {
                depth -= 1;
                if depth == 0 {
                    return Some(out);
                }
            } else if s == escalator {
                depth += 1;
            }
            out.push(ch);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        let mut ts = TokenStream::new(source);
        let mut out = Vec::new();
        loop {
            let t = ts.next().clone();
            if t.kind == TokenKind::End {
                break;
            }
            out.push(t.kind);
        }
        out
    }

    #[test]
    fn test_literal_suffixes() {
        assert_eq!(
            kinds("10 10f 1.5 1..5"),
            vec![
                TokenKind::Number(10),
                TokenKind::Field(10),
                TokenKind::Float(1.5),
                TokenKind::Number(1),
                TokenKind::DotDot,
                TokenKind::Number(5),
            ]
        );
    }

    #[test]
    fn test_field_context_default() {
        let mut ts = TokenStream::new("10");
        ts.set_context(Context::Hics);
        assert_eq!(ts.next().kind, TokenKind::Field(10));
    }

    #[test]
    fn test_f_followed_by_alpha_is_name() {
        // "10fx" is the number 10 then the name "fx", not a field.
        assert_eq!(
            kinds("10fx"),
            vec![TokenKind::Number(10), TokenKind::Name("fx".to_string())]
        );
    }

    #[test]
    fn test_two_char_operators() {
        assert_eq!(
            kinds("<> >= <= .."),
            vec![
                TokenKind::NotEqual,
                TokenKind::GreaterEq,
                TokenKind::LessEq,
                TokenKind::DotDot,
            ]
        );
    }

    #[test]
    fn test_reserved_words() {
        assert_eq!(
            kinds("or and not div mod error orchid"),
            vec![
                TokenKind::Or,
                TokenKind::And,
                TokenKind::Not,
                TokenKind::Div,
                TokenKind::Mod,
                TokenKind::ErrorCast,
                TokenKind::Name("orchid".to_string()),
            ]
        );
    }

    #[test]
    fn test_signature_name() {
        assert_eq!(kinds("g:dmy"), vec![TokenKind::Name("g:dmy".to_string())]);
    }

    #[test]
    fn test_escaped_quote() {
        assert_eq!(
            kinds(r#""say ""hi"" now""#),
            vec![TokenKind::Str("say \"hi\" now".to_string())]
        );
    }

    #[test]
    fn test_line_counting_in_strings_and_comments() {
        let mut ts = TokenStream::new("\"a\nb\" /* c\nd */ x");
        ts.next(); // the string
        let t = ts.next().clone();
        assert_eq!(t.kind, TokenKind::Name("x".to_string()));
        assert_eq!(t.line, 3);
    }

    #[test]
    fn test_read_until_nested_braces() {
        let mut ts = TokenStream::new("a = 1; if x { y } endif } tail");
        let body = ts.read_until("}", "{").unwrap();
        assert_eq!(body, "a = 1; if x { y } endif ");
        assert_eq!(ts.next().kind, TokenKind::Name("tail".to_string()));
    }

    #[test]
    fn test_read_until_word_terminator() {
        let mut ts = TokenStream::new("write 1; do write 2; loop loop x");
        let body = ts.read_until("loop", "do").unwrap();
        assert_eq!(body, "write 1; do write 2; loop ");
        assert_eq!(ts.next().kind, TokenKind::Name("x".to_string()));
    }

    #[test]
    fn test_read_until_ignores_quotes_and_comments() {
        let mut ts = TokenStream::new("s = \"}\"; // }\n t = 1; } x");
        let body = ts.read_until("}", "{").unwrap();
        assert_eq!(body, "s = \"}\"; // }\n t = 1; ");
    }

    #[test]
    fn test_unrecognized_character() {
        let mut ts = TokenStream::new("$");
        assert_eq!(ts.next().kind, TokenKind::End);
        assert_eq!(ts.error_total(), 1);
    }
}
