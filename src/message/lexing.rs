//! Tokenization of raw message text
//!
//! The actual tokenization is handled entirely by logos (see
//! [`Token`](crate::message::token::Token) for the rules). Whitespace is
//! skipped, and the longest match wins at every position, so `-16.0` becomes a
//! single float rather than an integer followed by junk.
//!
//! Unlike a document lexer, nothing here is recoverable: a fragment that
//! matches no rule aborts the whole message with a [`LexError`].

use crate::message::token::Token;
use logos::Logos;
use std::fmt;
use std::ops::Range;

/// A position in the input that no lexical rule accepts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    /// Byte range of the rejected fragment
    pub span: Range<usize>,
    /// The rejected fragment itself
    pub fragment: String,
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Unrecognized input {:?} at byte {}",
            self.fragment, self.span.start
        )
    }
}

impl std::error::Error for LexError {}

/// Tokenize a message and collect all tokens
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    Ok(tokenize_with_spans(source)?
        .into_iter()
        .map(|(token, _)| token)
        .collect())
}

/// Tokenize a message and keep the byte span of every token
pub fn tokenize_with_spans(source: &str) -> Result<Vec<(Token, Range<usize>)>, LexError> {
    let mut lexer = Token::lexer(source);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        match result {
            Ok(token) => tokens.push((token, lexer.span())),
            Err(()) => {
                return Err(LexError {
                    span: lexer.span(),
                    fragment: lexer.slice().to_string(),
                })
            }
        }
    }

    Ok(tokens)
}
