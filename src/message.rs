//! Field extraction from short, loosely structured messages
//!
//! A message goes through two stages:
//!
//! 1. [`lexing`] turns the text into typed [`token`]s (words, integers, floats
//!    and delimiters). Unrecognized input is fatal.
//! 2. [`parsing`] runs a [`matching::Grammar`] over the tokens and returns one
//!    of three outcomes: a clean match, the most informative missing field, or
//!    no match at all.
//!
//! Grammars are built from the combinators in [`matching`], compiled from text
//! with [`notation`], or taken ready-made from [`grammars`].

pub mod grammars;
pub mod lexing;
pub mod matching;
pub mod notation;
pub mod parsing;
pub mod token;

pub use lexing::{tokenize, tokenize_with_spans, LexError};
pub use matching::{Grammar, Item};
pub use notation::{compile, GrammarError};
pub use parsing::{explain, parse, process, Diagnostic, Outcome};
pub use token::{Token, TokenClass, TokenKind};

use std::fmt;

/// Anything that stops a message from reaching the parse engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageError {
    Lex(LexError),
    Grammar(GrammarError),
}

impl fmt::Display for MessageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageError::Lex(error) => write!(f, "{}", error),
            MessageError::Grammar(error) => write!(f, "{}", error),
        }
    }
}

impl std::error::Error for MessageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MessageError::Lex(error) => Some(error),
            MessageError::Grammar(error) => Some(error),
        }
    }
}

impl From<LexError> for MessageError {
    fn from(error: LexError) -> Self {
        MessageError::Lex(error)
    }
}

impl From<GrammarError> for MessageError {
    fn from(error: GrammarError) -> Self {
        MessageError::Grammar(error)
    }
}

/// Compile `notation` and run it over `source`
pub fn process_with_notation(notation: &str, source: &str) -> Result<Outcome, MessageError> {
    let grammar = compile(notation)?;
    Ok(process(&grammar, source)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_with_notation() {
        let outcome = process_with_notation("Word[1:] & Delimiter & Number", "Ann, 7").unwrap();
        assert_eq!(
            outcome,
            Outcome::Match(vec![
                Item::token(Token::Word("Ann".to_string())),
                Item::token(Token::Integer(7)),
            ])
        );
    }

    #[test]
    fn test_errors_are_distinguished() {
        assert!(matches!(
            process_with_notation("Words", "Ann"),
            Err(MessageError::Grammar(_))
        ));
        assert!(matches!(
            process_with_notation("Word", "Ann!"),
            Err(MessageError::Lex(_))
        ));
    }
}
