//! Lexical analysis for the `.tpl` source language.

use crate::error::{LexerError, SourceLocation};
use unicode_segmentation::UnicodeSegmentation;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenType {
    LParen,
    RParen,
    LBrace,
    RBrace,
    Comma,
    Semicolon,

    Assign, // :=
    Plus,
    Minus,
    Star,

    EqEq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,

    And,     // ^
    Or,      // v
    Not,     // !
    Implies, // =>

    Int(i64),
    Ident(String),
    Bool(bool),

    KwInt,
    KwBool,
    KwFunction,
    KwDeclare,
    KwReturn,
    KwWhile,
    KwIf,
    KwElse,
    KwAssume,
    KwNop,

    AnnotPre,
    AnnotPost,
    AnnotLoop,

    Eof,
}

impl std::fmt::Display for TokenType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

#[derive(Debug, Clone)]
pub struct Token {
    pub token_type: TokenType,
    pub location: SourceLocation,
}

impl Token {
    pub fn new(token_type: TokenType, location: SourceLocation) -> Self {
        Self { token_type, location }
    }
}

pub struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
    file: String,
}

impl Lexer {
    pub fn new(source: &str, file: String) -> Self {
        Self {
            chars: source.graphemes(true).flat_map(|g| g.chars()).collect(),
            pos: 0,
            line: 1,
            column: 1,
            file,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn loc(&self) -> SourceLocation {
        SourceLocation::new(self.file.clone(), self.line, self.column)
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

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
                _ => break,
            }
        }
    }

    /// Tokenize the whole source, ending with a single [`TokenType::Eof`].
    pub fn tokenize(mut self) -> Result<Vec<Token>, LexerError> {
        let mut tokens = Vec::new();
        loop {
            self.skip_whitespace_and_comments();
            let loc = self.loc();
            let Some(c) = self.peek() else {
                tokens.push(Token::new(TokenType::Eof, loc));
                break;
            };

            let token_type = match c {
                '(' => { self.advance(); TokenType::LParen }
                ')' => { self.advance(); TokenType::RParen }
                '{' => { self.advance(); TokenType::LBrace }
                '}' => { self.advance(); TokenType::RBrace }
                ',' => { self.advance(); TokenType::Comma }
                ';' => { self.advance(); TokenType::Semicolon }
                '+' => { self.advance(); TokenType::Plus }
                '-' => { self.advance(); TokenType::Minus }
                '*' => { self.advance(); TokenType::Star }
                '^' => { self.advance(); TokenType::And }
                '!' => { self.advance(); TokenType::Not }
                ':' => {
                    self.advance();
                    if self.peek() == Some('=') {
                        self.advance();
                        TokenType::Assign
                    } else {
                        return Err(LexerError::UnexpectedCharacter { character: ':', location: loc });
                    }
                }
                '=' => {
                    self.advance();
                    match self.peek() {
                        Some('=') => { self.advance(); TokenType::EqEq }
                        Some('>') => { self.advance(); TokenType::Implies }
                        _ => return Err(LexerError::UnexpectedCharacter { character: '=', location: loc }),
                    }
                }
                '<' => {
                    self.advance();
                    if self.peek() == Some('=') { self.advance(); TokenType::Le } else { TokenType::Lt }
                }
                '>' => {
                    self.advance();
                    if self.peek() == Some('=') { self.advance(); TokenType::Ge } else { TokenType::Gt }
                }
                '@' => {
                    self.advance();
                    let ident = self.consume_word();
                    match ident.as_str() {
                        "PRE" => TokenType::AnnotPre,
                        "POST" => TokenType::AnnotPost,
                        "LOOP" => TokenType::AnnotLoop,
                        other => {
                            return Err(LexerError::UnexpectedCharacter {
                                character: other.chars().next().unwrap_or('@'),
                                location: loc,
                            })
                        }
                    }
                }
                c if c.is_ascii_digit() => self.consume_number(&loc)?,
                c if c == '_' || c.is_alphabetic() => self.consume_ident_or_keyword(),
                other => {
                    self.advance();
                    return Err(LexerError::UnexpectedCharacter { character: other, location: loc });
                }
            };

            // `!=` needs the lookahead consumed above when we saw `!`; handle separately.
            let token_type = if matches!(token_type, TokenType::Not) && self.peek() == Some('=') {
                self.advance();
                TokenType::NotEq
            } else {
                token_type
            };

            tokens.push(Token::new(token_type, loc));
        }
        Ok(tokens)
    }

    fn consume_word(&mut self) -> String {
        let mut s = String::new();
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' {
                s.push(c);
                self.advance();
            } else {
                break;
            }
        }
        s
    }

    fn consume_ident_or_keyword(&mut self) -> TokenType {
        let word = self.consume_word();
        match word.as_str() {
            "INT" => TokenType::KwInt,
            "BOOL" => TokenType::KwBool,
            "FUNCTION" => TokenType::KwFunction,
            "DECLARE" => TokenType::KwDeclare,
            "RETURN" => TokenType::KwReturn,
            "WHILE" => TokenType::KwWhile,
            "IF" => TokenType::KwIf,
            "ELSE" => TokenType::KwElse,
            "ASSUME" => TokenType::KwAssume,
            "NOP" => TokenType::KwNop,
            "TRUE" => TokenType::Bool(true),
            "FALSE" => TokenType::Bool(false),
            "v" => TokenType::Or,
            _ => TokenType::Ident(word),
        }
    }

    fn consume_number(&mut self, loc: &SourceLocation) -> Result<TokenType, LexerError> {
        let mut s = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                s.push(c);
                self.advance();
            } else {
                break;
            }
        }
        s.parse::<i64>()
            .map(TokenType::Int)
            .map_err(|_| LexerError::InvalidNumber { value: s, location: loc.clone() })
    }
}
