//! Tokenizer for the expression language

use crate::error::{ParseError, Result};
use std::fmt;

/// Token kinds produced by the lexer
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Number(f64),
    String(String),
    Identifier(String),

    // Keywords
    True,
    False,
    Null,
    And,
    Or,
    Not,
    In,

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Caret,
    EqEq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,
    Bang,
    AmpAmp,
    PipePipe,
    QuestionQuestion,
    Question,
    Colon,

    // Punctuation
    Dot,
    DotDot,
    Comma,
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Hash,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            TokenKind::Number(n) => return write!(f, "{}", n),
            TokenKind::String(s) => return write!(f, "'{}'", s),
            TokenKind::Identifier(name) => return write!(f, "{}", name),
            TokenKind::True => "true",
            TokenKind::False => "false",
            TokenKind::Null => "null",
            TokenKind::And => "and",
            TokenKind::Or => "or",
            TokenKind::Not => "not",
            TokenKind::In => "in",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Percent => "%",
            TokenKind::Caret => "^",
            TokenKind::EqEq => "==",
            TokenKind::NotEq => "!=",
            TokenKind::Lt => "<",
            TokenKind::Le => "<=",
            TokenKind::Gt => ">",
            TokenKind::Ge => ">=",
            TokenKind::Bang => "!",
            TokenKind::AmpAmp => "&&",
            TokenKind::PipePipe => "||",
            TokenKind::QuestionQuestion => "??",
            TokenKind::Question => "?",
            TokenKind::Colon => ":",
            TokenKind::Dot => ".",
            TokenKind::DotDot => "..",
            TokenKind::Comma => ",",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::Hash => "#",
        };
        f.write_str(text)
    }
}

/// A token and the byte offset it starts at
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub position: usize,
}

/// Expression lexer
pub struct Lexer<'a> {
    source: &'a str,
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.char_indices().peekable(),
        }
    }

    /// Tokenize the whole source
    pub fn tokenize(source: &'a str) -> Result<Vec<Token>> {
        let mut lexer = Lexer::new(source);
        let mut tokens = Vec::new();
        while let Some(token) = lexer.next_token()? {
            tokens.push(token);
        }
        Ok(tokens)
    }

    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, c)| *c)
    }

    fn peek_second(&self) -> Option<char> {
        let mut lookahead = self.chars.clone();
        lookahead.next();
        lookahead.next().map(|(_, c)| c)
    }

    fn next_if_char(&mut self, expected: char) -> bool {
        if self.peek_char() == Some(expected) {
            self.chars.next();
            true
        } else {
            false
        }
    }

    fn next_token(&mut self) -> Result<Option<Token>> {
        while let Some(c) = self.peek_char() {
            if c.is_whitespace() {
                self.chars.next();
            } else {
                break;
            }
        }

        let Some((position, c)) = self.chars.next() else {
            return Ok(None);
        };

        let kind = match c {
            '0'..='9' => self.number(position)?,
            '\'' | '"' => self.string(position, c)?,
            c if c.is_alphabetic() || c == '_' || c == '$' => self.word(position),
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '%' => TokenKind::Percent,
            '^' => TokenKind::Caret,
            '#' => TokenKind::Hash,
            ',' => TokenKind::Comma,
            ':' => TokenKind::Colon,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            '.' => {
                if self.next_if_char('.') {
                    TokenKind::DotDot
                } else {
                    TokenKind::Dot
                }
            }
            '=' if self.next_if_char('=') => TokenKind::EqEq,
            '!' => {
                if self.next_if_char('=') {
                    TokenKind::NotEq
                } else {
                    TokenKind::Bang
                }
            }
            '<' => {
                if self.next_if_char('=') {
                    TokenKind::Le
                } else {
                    TokenKind::Lt
                }
            }
            '>' => {
                if self.next_if_char('=') {
                    TokenKind::Ge
                } else {
                    TokenKind::Gt
                }
            }
            '&' if self.next_if_char('&') => TokenKind::AmpAmp,
            '|' if self.next_if_char('|') => TokenKind::PipePipe,
            '?' => {
                if self.next_if_char('?') {
                    TokenKind::QuestionQuestion
                } else {
                    TokenKind::Question
                }
            }
            other => {
                return Err(ParseError::UnexpectedCharacter {
                    character: other,
                    position,
                })
            }
        };

        Ok(Some(Token { kind, position }))
    }

    fn number(&mut self, start: usize) -> Result<TokenKind> {
        let mut end = start + 1;
        let mut seen_dot = false;
        let mut seen_exponent = false;

        while let Some(c) = self.peek_char() {
            match c {
                '0'..='9' | '_' => {}
                // `1..5` is a range, not a decimal point
                '.' if !seen_dot && !seen_exponent && self.peek_second() != Some('.') => {
                    seen_dot = true;
                }
                'e' | 'E' if !seen_exponent => {
                    seen_exponent = true;
                    self.chars.next();
                    end += 1;
                    if let Some(sign @ ('+' | '-')) = self.peek_char() {
                        self.chars.next();
                        end += sign.len_utf8();
                    }
                    continue;
                }
                _ => break,
            }
            self.chars.next();
            end += c.len_utf8();
        }

        let text = &self.source[start..end];
        text.replace('_', "")
            .parse::<f64>()
            .map(TokenKind::Number)
            .map_err(|_| ParseError::InvalidNumber {
                text: text.to_string(),
                position: start,
            })
    }

    fn string(&mut self, start: usize, quote: char) -> Result<TokenKind> {
        let mut value = String::new();
        while let Some((_, c)) = self.chars.next() {
            match c {
                c if c == quote => return Ok(TokenKind::String(value)),
                '\\' => match self.chars.next() {
                    Some((_, 'n')) => value.push('\n'),
                    Some((_, 't')) => value.push('\t'),
                    Some((_, 'r')) => value.push('\r'),
                    Some((_, escaped)) => value.push(escaped),
                    None => break,
                },
                c => value.push(c),
            }
        }
        Err(ParseError::UnterminatedString { position: start })
    }

    fn word(&mut self, start: usize) -> TokenKind {
        let mut end = start + self.source[start..].chars().next().map_or(1, char::len_utf8);
        while let Some(c) = self.peek_char() {
            if c.is_alphanumeric() || c == '_' || c == '$' {
                self.chars.next();
                end += c.len_utf8();
            } else {
                break;
            }
        }

        match &self.source[start..end] {
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            "null" => TokenKind::Null,
            "and" => TokenKind::And,
            "or" => TokenKind::Or,
            "not" => TokenKind::Not,
            "in" => TokenKind::In,
            name => TokenKind::Identifier(name.to_string()),
        }
    }
}
