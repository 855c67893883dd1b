//! Parse engine: full-coverage selection and deepest-diagnostic fallback
//!
//! A grammar may derive many result sequences for one message. The engine
//! only looks at derivations that consume every token:
//!
//! 1. The first full-coverage derivation without diagnostics is the match.
//! 2. Otherwise, each full-coverage derivation is represented by its first
//!    diagnostic (where matching first broke down), and the one sitting at the
//!    greatest index wins. More of the message was understood before that gap,
//!    so its label is the best guess at what the sender left out. Equal
//!    indices keep the derivation enumerated first.
//! 3. If nothing covers the whole message, the outcome is [`Outcome::NoMatch`].
//!
//! Derivations are enumerated lazily, so a clean match stops the search.

use crate::message::lexing::{tokenize, LexError};
use crate::message::matching::{Derivation, Grammar, Item};
use crate::message::token::Token;
use serde::Serialize;
use std::fmt;

/// A field the sender most likely left out or got wrong
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    label: String,
    position: usize,
}

impl Diagnostic {
    pub fn new(label: impl Into<String>, position: usize) -> Self {
        Self {
            label: label.into(),
            position,
        }
    }

    /// The caller-supplied name of the field
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Index of the diagnostic within its result sequence
    pub fn position(&self) -> usize {
        self.position
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "missing '{}' at {}", self.label, self.position)
    }
}

/// Result of running a grammar over a whole message
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", content = "result", rename_all = "snake_case")]
pub enum Outcome {
    /// A diagnostic-free interpretation of every token
    Match(Vec<Item>),
    /// The message had a recognizable shape with a labeled gap
    Diagnostic(Diagnostic),
    /// No interpretation covered the whole message
    NoMatch,
}

impl Outcome {
    pub fn is_match(&self) -> bool {
        matches!(self, Outcome::Match(_))
    }

    /// The matched items, if any
    pub fn items(&self) -> Option<&[Item]> {
        match self {
            Outcome::Match(items) => Some(items),
            _ => None,
        }
    }

    pub fn diagnostic(&self) -> Option<&Diagnostic> {
        match self {
            Outcome::Diagnostic(diagnostic) => Some(diagnostic),
            _ => None,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Match(items) => {
                write!(f, "[")?;
                for (index, item) in items.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Outcome::Diagnostic(diagnostic) => write!(f, "{}", diagnostic),
            Outcome::NoMatch => write!(f, "no match"),
        }
    }
}

/// Match a complete token sequence with `grammar`
pub fn parse(grammar: &Grammar, tokens: &[Token]) -> Outcome {
    let mut deepest: Option<Diagnostic> = None;

    for derivation in complete(grammar, tokens) {
        let Some(index) = derivation.first_diagnostic() else {
            return Outcome::Match(derivation.items);
        };
        // Ties keep the derivation enumerated first
        if deepest.as_ref().is_some_and(|d| index <= d.position) {
            continue;
        }
        if let Item::Diagnostic { label } = &derivation.items[index] {
            deepest = Some(Diagnostic::new(label.clone(), index));
        }
    }

    deepest.map_or(Outcome::NoMatch, Outcome::Diagnostic)
}

/// Every full-coverage derivation, in enumeration order
pub fn explain(grammar: &Grammar, tokens: &[Token]) -> Vec<Derivation> {
    complete(grammar, tokens).collect()
}

/// Tokenize `source` and parse the result
pub fn process(grammar: &Grammar, source: &str) -> Result<Outcome, LexError> {
    let tokens = tokenize(source)?;
    Ok(parse(grammar, &tokens))
}

fn complete<'a>(
    grammar: &'a Grammar,
    tokens: &'a [Token],
) -> impl Iterator<Item = Derivation> + 'a {
    grammar
        .derivations(tokens)
        .filter(move |derivation| derivation.end == tokens.len())
}
