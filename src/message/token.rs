//! Token definitions for inbound messages
//!
//! Tokens are produced by the logos lexer in [`crate::message::lexing`]. The
//! kind set is closed: words, integers, floats and delimiters. Integers and
//! floats share the `Number` category, which only exists on the matching side
//! (see [`TokenClass`]).
use logos::Logos;
use serde::Serialize;
use std::fmt;

/// All possible tokens of a message
#[derive(Logos, Debug, PartialEq, Clone, Serialize)]
#[logos(skip r"[ \t\r\n\f]+")]
#[serde(tag = "kind", content = "value")]
pub enum Token {
    /// One or more ASCII letters
    #[regex(r"[A-Za-z]+", |lex| lex.slice().to_owned())]
    Word(String),

    /// Optionally negative whole number. Overflowing literals fail to lex.
    #[regex(r"-?[0-9]+", |lex| lex.slice().parse::<i64>().ok())]
    Integer(i64),

    /// Signed decimal literal; longer than any integer match at the same position
    #[regex(r"[-+]?[0-9]+\.[0-9]+", |lex| lex.slice().parse::<f64>().ok())]
    Float(f64),

    #[regex(r"[,;]", |lex| lex.slice().chars().next())]
    Delimiter(char),
}

/// Payload-free tag of a [`Token`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenKind {
    Word,
    Integer,
    Float,
    Delimiter,
}

impl TokenKind {
    /// One-letter code used in the printable token form
    pub fn code(self) -> char {
        match self {
            TokenKind::Word => 'W',
            TokenKind::Integer => 'I',
            TokenKind::Float => 'F',
            TokenKind::Delimiter => 'D',
        }
    }
}

/// Categories a matcher can ask for.
///
/// `Number` covers both `Integer` and `Float`; `Any` covers every kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenClass {
    Word,
    Integer,
    Float,
    Number,
    Delimiter,
    Any,
}

impl TokenClass {
    /// Check if a token of `kind` belongs to this class
    pub fn accepts(self, kind: TokenKind) -> bool {
        match self {
            TokenClass::Word => kind == TokenKind::Word,
            TokenClass::Integer => kind == TokenKind::Integer,
            TokenClass::Float => kind == TokenKind::Float,
            TokenClass::Number => matches!(kind, TokenKind::Integer | TokenKind::Float),
            TokenClass::Delimiter => kind == TokenKind::Delimiter,
            TokenClass::Any => true,
        }
    }

    /// Name of the class as written in grammar notation
    pub fn name(self) -> &'static str {
        match self {
            TokenClass::Word => "Word",
            TokenClass::Integer => "Integer",
            TokenClass::Float => "Float",
            TokenClass::Number => "Number",
            TokenClass::Delimiter => "Delimiter",
            TokenClass::Any => "Any",
        }
    }

    /// Resolve a class from its notation name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Word" => Some(TokenClass::Word),
            "Integer" => Some(TokenClass::Integer),
            "Float" => Some(TokenClass::Float),
            "Number" => Some(TokenClass::Number),
            "Delimiter" => Some(TokenClass::Delimiter),
            "Any" => Some(TokenClass::Any),
            _ => None,
        }
    }
}

impl Token {
    pub fn kind(&self) -> TokenKind {
        match self {
            Token::Word(_) => TokenKind::Word,
            Token::Integer(_) => TokenKind::Integer,
            Token::Float(_) => TokenKind::Float,
            Token::Delimiter(_) => TokenKind::Delimiter,
        }
    }

    /// Check if this token is an integer or a float
    pub fn is_number(&self) -> bool {
        TokenClass::Number.accepts(self.kind())
    }

    pub fn is_delimiter(&self) -> bool {
        matches!(self, Token::Delimiter(_))
    }

    /// Textual payload of words
    pub fn as_word(&self) -> Option<&str> {
        match self {
            Token::Word(word) => Some(word),
            _ => None,
        }
    }

    /// Numeric payload of integers and floats, widened to `f64`
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Token::Integer(value) => Some(*value as f64),
            Token::Float(value) => Some(*value),
            _ => None,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = self.kind().code();
        match self {
            Token::Word(word) => write!(f, "'{}' ({})", word, code),
            Token::Integer(value) => write!(f, "{} ({})", value, code),
            // Debug formatting keeps the fractional part: -16.0, not -16
            Token::Float(value) => write!(f, "{:?} ({})", value, code),
            Token::Delimiter(delimiter) => write!(f, "'{}' ({})", delimiter, code),
        }
    }
}
