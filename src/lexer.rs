use std::iter::Peekable;
use std::str::CharIndices;

use crate::limits::CompilerLimits;

// Token types

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    // Keywords
    Fn,
    Return,
    Var,
    Struct,

    // Built-in type names
    IntType,      // Int
    IntArrayType, // IntArray
    StringType,   // String

    // Identifiers and Literals
    Identifier,
    Integer,
    String,

    // Punctuation
    Dot,      // .
    Colon,    // :
    Equals,   // =
    Comma,    // ,
    LParen,   // (
    RParen,   // )
    LBrace,   // {
    RBrace,   // }
    LBracket, // [
    RBracket, // ]

    // Operators
    Plus,  // +
    Minus, // -
    Star,  // *
    Slash, // /

    // Special
    Newline,
    Eof,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String, // Matched source text; string literals keep their quotes
    pub line: usize,   // 1-indexed
    pub column: usize, // 1-indexed
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            line,
            column,
        }
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self.kind {
            TokenKind::Newline => write!(f, "{}:{} {:?}", self.line, self.column, self.kind),
            _ => write!(
                f,
                "{}:{} {:?} {:?}",
                self.line, self.column, self.kind, self.text
            ),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LexError {
    pub message: String,
    pub line: usize,
    pub column: usize,
    pub pos: usize,
}

impl std::fmt::Display for LexError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "Lexical error at {}:{}: {}",
            self.line, self.column, self.message
        )
    }
}

impl std::error::Error for LexError {}

// Lexer

pub struct Lexer<'a> {
    source: &'a str,
    chars: Peekable<CharIndices<'a>>,
    pos: usize,
    line: usize,
    column: usize,
    limits: &'a CompilerLimits,
    token_count: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str, limits: &'a CompilerLimits) -> Result<Self, LexError> {
        if source.len() > limits.max_input_size {
            return Err(LexError {
                message: format!(
                    "Input too large: {} bytes (max: {} bytes)",
                    source.len(),
                    limits.max_input_size
                ),
                line: 1,
                column: 1,
                pos: 0,
            });
        }

        Ok(Self {
            source,
            chars: source.char_indices().peekable(),
            pos: 0,
            line: 1,
            column: 1,
            limits,
            token_count: 0,
        })
    }

    // Character navigation methods

    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, c)| *c)
    }

    fn peek_char2(&mut self) -> Option<char> {
        let mut iter = self.chars.clone();
        iter.next();
        iter.peek().map(|(_, c)| *c)
    }

    fn consume_char(&mut self) -> Option<char> {
        let (pos, ch) = self.chars.next()?;
        self.pos = pos + ch.len_utf8();

        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }

        Some(ch)
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek_char() {
            if c == ' ' || c == '\t' || c == '\r' {
                self.consume_char();
            } else {
                break;
            }
        }
    }

    fn skip_comment(&mut self) -> Result<(), LexError> {
        let comment_start = self.pos;
        while let Some(c) = self.peek_char() {
            // Leave the line break for the parser
            if c == '\n' {
                break;
            }
            self.consume_char();

            let comment_len = self.pos - comment_start;
            if comment_len > self.limits.max_comment_length {
                return Err(self.error(format!(
                    "Comment too long: {} bytes (max: {} bytes)",
                    comment_len, self.limits.max_comment_length
                )));
            }
        }
        Ok(())
    }

    fn error(&self, message: String) -> LexError {
        LexError {
            message,
            line: self.line,
            column: self.column,
            pos: self.pos,
        }
    }

    // Main tokenization method

    pub fn next_token(&mut self) -> Result<Token, LexError> {
        if self.token_count >= self.limits.max_token_count {
            return Err(self.error(format!(
                "Token limit exceeded: {} tokens (max: {})",
                self.token_count, self.limits.max_token_count
            )));
        }

        loop {
            self.skip_whitespace();
            if self.peek_char() == Some('/') && self.peek_char2() == Some('/') {
                self.skip_comment()?;
            } else {
                break;
            }
        }

        let start_line = self.line;
        let start_column = self.column;
        let start = self.pos;

        let kind = match self.peek_char() {
            None => TokenKind::Eof,
            Some(c) if c.is_ascii_digit() => {
                self.consume_while(|c| c.is_ascii_digit());
                TokenKind::Integer
            }
            Some(c) if is_ident_start(c) => self.lex_ident_or_keyword()?,
            Some('"') => self.lex_string()?,
            Some(c) => {
                self.consume_char();
                match c {
                    '\n' => TokenKind::Newline,
                    '.' => TokenKind::Dot,
                    ':' => TokenKind::Colon,
                    '=' => TokenKind::Equals,
                    ',' => TokenKind::Comma,
                    '(' => TokenKind::LParen,
                    ')' => TokenKind::RParen,
                    '{' => TokenKind::LBrace,
                    '}' => TokenKind::RBrace,
                    '[' => TokenKind::LBracket,
                    ']' => TokenKind::RBracket,
                    '+' => TokenKind::Plus,
                    '-' => TokenKind::Minus,
                    '*' => TokenKind::Star,
                    '/' => TokenKind::Slash,
                    _ => {
                        return Err(LexError {
                            message: format!("Unexpected character: '{}'", c),
                            line: start_line,
                            column: start_column,
                            pos: start,
                        });
                    }
                }
            }
        };

        self.token_count += 1;

        Ok(Token::new(
            kind,
            &self.source[start..self.pos],
            start_line,
            start_column,
        ))
    }

    fn consume_while<F>(&mut self, predicate: F) -> bool
    where
        F: Fn(char) -> bool,
    {
        let mut consumed = false;
        while let Some(c) = self.peek_char() {
            if predicate(c) {
                self.consume_char();
                consumed = true;
            } else {
                break;
            }
        }
        consumed
    }

    // Identifier and keyword lexing

    fn lex_ident_or_keyword(&mut self) -> Result<TokenKind, LexError> {
        let start = self.pos;
        self.consume_while(is_ident_continue);
        let text = &self.source[start..self.pos];

        if text.len() > self.limits.max_identifier_length {
            return Err(self.error(format!(
                "Identifier too long: {} bytes (max: {} bytes)",
                text.len(),
                self.limits.max_identifier_length
            )));
        }

        let kind = match text {
            "fn" => TokenKind::Fn,
            "return" => TokenKind::Return,
            "var" => TokenKind::Var,
            "struct" => TokenKind::Struct,
            "Int" => TokenKind::IntType,
            "IntArray" => TokenKind::IntArrayType,
            "String" => TokenKind::StringType,
            _ => TokenKind::Identifier,
        };
        Ok(kind)
    }

    // String lexing

    fn lex_string(&mut self) -> Result<TokenKind, LexError> {
        let string_start = self.pos;
        self.consume_char(); // opening quote

        loop {
            match self.peek_char() {
                None => {
                    return Err(self.error("Unterminated string literal".into()));
                }
                Some('\n') => {
                    return Err(self.error("Newline in string literal".into()));
                }
                Some('\\') => {
                    // Escapes are passed through to C untouched
                    self.consume_char();
                    match self.peek_char() {
                        None | Some('\n') => {
                            return Err(self.error("Unterminated escape sequence".into()));
                        }
                        Some(_) => {
                            self.consume_char();
                        }
                    }
                }
                Some('"') => {
                    self.consume_char();
                    break;
                }
                Some(_) => {
                    self.consume_char();
                }
            }

            let string_len = self.pos - string_start;
            if string_len > self.limits.max_string_length {
                return Err(self.error(format!(
                    "String literal too long: {} bytes (max: {} bytes)",
                    string_len, self.limits.max_string_length
                )));
            }
        }

        Ok(TokenKind::String)
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

// Public API

pub fn lex(source: &str) -> Result<Vec<Token>, LexError> {
    lex_with_limits(source, &CompilerLimits::default())
}

pub fn lex_with_limits(source: &str, limits: &CompilerLimits) -> Result<Vec<Token>, LexError> {
    let mut lexer = Lexer::new(source, limits)?;
    let mut tokens = Vec::new();

    loop {
        let token = lexer.next_token()?;
        let is_eof = token.kind == TokenKind::Eof;
        tokens.push(token);
        if is_eof {
            break;
        }
    }

    Ok(tokens)
}
