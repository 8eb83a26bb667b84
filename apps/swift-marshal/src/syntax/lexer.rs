//! Token-level scanner for Swift source.
//!
//! The lexer only needs enough fidelity to find declaration boundaries:
//! comments and whitespace are skipped (they become trivia by virtue of
//! lying between tokens), string literals are consumed whole so that braces
//! inside them never count, and every other character is a word or a single
//! punctuation token.

use crate::error::ParseError;
use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Identifier, keyword, number, or backticked identifier.
    Word,
    /// `#name` (compiler directive or freestanding macro).
    Pound,
    /// Any string literal, including raw and multi-line forms.
    Str,
    /// A single punctuation character.
    Punct(char),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Range<usize>,
    /// 1-based line of the token's first byte.
    pub line: usize,
    /// First token on its line.
    pub line_start: bool,
}

impl Token {
    pub fn text<'a>(&self, src: &'a str) -> &'a str {
        &src[self.span.clone()]
    }

    pub fn is_punct(&self, c: char) -> bool {
        self.kind == TokenKind::Punct(c)
    }
}

pub fn tokenize(src: &str) -> Result<Vec<Token>, ParseError> {
    Lexer::new(src).run()
}

struct Lexer<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
    line: usize,
    at_line_start: bool,
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            bytes: src.as_bytes(),
            pos: 0,
            line: 1,
            at_line_start: true,
            tokens: Vec::new(),
        }
    }

    fn run(mut self) -> Result<Vec<Token>, ParseError> {
        while self.pos < self.bytes.len() {
            let b = self.bytes[self.pos];
            match b {
                b'\n' => {
                    self.line += 1;
                    self.at_line_start = true;
                    self.pos += 1;
                }
                b' ' | b'\t' | b'\r' | 0x0c => self.pos += 1,
                b'/' if self.peek(1) == Some(b'/') => self.skip_line_comment(),
                b'/' if self.peek(1) == Some(b'*') => self.skip_block_comment()?,
                b'"' => {
                    let start = self.pos;
                    let line = self.line;
                    self.pos = self.scan_string(start, 0)?;
                    self.push(TokenKind::Str, start, line);
                }
                b'#' => self.lex_pound()?,
                b'`' => self.lex_backticked()?,
                _ if is_word_byte(b) => {
                    let start = self.pos;
                    self.consume_word();
                    self.push(TokenKind::Word, start, self.line);
                }
                _ => {
                    let start = self.pos;
                    let ch = self.src[start..].chars().next().unwrap_or('\u{fffd}');
                    self.pos += ch.len_utf8();
                    self.push(TokenKind::Punct(ch), start, self.line);
                }
            }
        }
        Ok(self.tokens)
    }

    fn push(&mut self, kind: TokenKind, start: usize, line: usize) {
        self.tokens.push(Token {
            kind,
            span: start..self.pos,
            line,
            line_start: self.at_line_start,
        });
        self.at_line_start = false;
    }

    fn peek(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn consume_word(&mut self) {
        while self.pos < self.bytes.len() && is_word_byte(self.bytes[self.pos]) {
            self.pos += 1;
        }
    }

    fn skip_line_comment(&mut self) {
        while self.pos < self.bytes.len() && self.bytes[self.pos] != b'\n' {
            self.pos += 1;
        }
    }

    /// Block comments nest in Swift.
    fn skip_block_comment(&mut self) -> Result<(), ParseError> {
        let start_line = self.line;
        let mut depth = 0usize;
        while self.pos < self.bytes.len() {
            match (self.bytes[self.pos], self.peek(1)) {
                (b'/', Some(b'*')) => {
                    depth += 1;
                    self.pos += 2;
                }
                (b'*', Some(b'/')) => {
                    depth -= 1;
                    self.pos += 2;
                    if depth == 0 {
                        return Ok(());
                    }
                }
                (b'\n', _) => {
                    self.line += 1;
                    self.at_line_start = true;
                    self.pos += 1;
                }
                _ => self.pos += 1,
            }
        }
        Err(ParseError::new(start_line, "unterminated block comment"))
    }

    fn lex_pound(&mut self) -> Result<(), ParseError> {
        let start = self.pos;
        let line = self.line;
        let mut hashes = 0;
        while self.peek(hashes) == Some(b'#') {
            hashes += 1;
        }
        if self.peek(hashes) == Some(b'"') {
            // Raw string: #"..."#, ##"..."##, #"""..."""#
            self.pos = self.scan_string(start + hashes, hashes)?;
            self.push(TokenKind::Str, start, line);
            return Ok(());
        }
        self.pos += 1;
        if hashes == 1 && self.peek(0).is_some_and(is_word_byte) {
            self.consume_word();
            self.push(TokenKind::Pound, start, line);
        } else {
            self.push(TokenKind::Punct('#'), start, line);
        }
        Ok(())
    }

    fn lex_backticked(&mut self) -> Result<(), ParseError> {
        let start = self.pos;
        self.pos += 1;
        while self.pos < self.bytes.len() && self.bytes[self.pos] != b'`' {
            if self.bytes[self.pos] == b'\n' {
                return Err(ParseError::new(self.line, "unterminated backticked identifier"));
            }
            self.pos += 1;
        }
        if self.pos >= self.bytes.len() {
            return Err(ParseError::new(self.line, "unterminated backticked identifier"));
        }
        self.pos += 1;
        self.push(TokenKind::Word, start, self.line);
        Ok(())
    }

    /// Scans a string literal whose opening quote is at `quote`, preceded by
    /// `hashes` raw-string delimiters. Returns the byte after the literal.
    fn scan_string(&mut self, quote: usize, hashes: usize) -> Result<usize, ParseError> {
        let start_line = self.line;
        let multiline = self.src[quote..].starts_with("\"\"\"");
        let mut i = quote + if multiline { 3 } else { 1 };
        let closing = if multiline { "\"\"\"" } else { "\"" };
        loop {
            let Some(&b) = self.bytes.get(i) else {
                return Err(ParseError::new(start_line, "unterminated string literal"));
            };
            match b {
                b'\n' => {
                    if !multiline {
                        return Err(ParseError::new(start_line, "unterminated string literal"));
                    }
                    self.line += 1;
                    i += 1;
                }
                b'\\' if self.hash_run(i + 1) >= hashes => {
                    let after = i + 1 + hashes;
                    if self.bytes.get(after) == Some(&b'(') {
                        i = self.scan_interpolation(after)?;
                    } else {
                        // Escaped character; never let it close the literal.
                        i = after + 1;
                        if self.bytes.get(after) == Some(&b'\n') {
                            self.line += 1;
                        }
                    }
                }
                b'"' if self.src[i..].starts_with(closing)
                    && self.hash_run(i + closing.len()) >= hashes =>
                {
                    return Ok(i + closing.len() + hashes);
                }
                _ => i += 1,
            }
        }
    }

    /// Consumes `( ... )` of a string interpolation starting at `open`,
    /// including nested parentheses and string literals.
    fn scan_interpolation(&mut self, open: usize) -> Result<usize, ParseError> {
        let start_line = self.line;
        let mut depth = 0usize;
        let mut i = open;
        while let Some(&b) = self.bytes.get(i) {
            match b {
                b'(' => {
                    depth += 1;
                    i += 1;
                }
                b')' => {
                    depth -= 1;
                    i += 1;
                    if depth == 0 {
                        return Ok(i);
                    }
                }
                b'"' => i = self.scan_string(i, 0)?,
                b'#' if self.bytes.get(i + self.hash_run(i)) == Some(&b'"') => {
                    let hashes = self.hash_run(i);
                    i = self.scan_string(i + hashes, hashes)?;
                }
                b'\n' => {
                    self.line += 1;
                    i += 1;
                }
                _ => i += 1,
            }
        }
        Err(ParseError::new(start_line, "unterminated string interpolation"))
    }

    fn hash_run(&self, from: usize) -> usize {
        self.bytes[from.min(self.bytes.len())..]
            .iter()
            .take_while(|&&b| b == b'#')
            .count()
    }
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$' || b >= 0x80
}
