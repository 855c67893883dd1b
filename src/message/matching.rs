//! Matcher primitives and grammar combinators
//!
//! A [`Grammar`] is an immutable tree that enumerates every way it can match a
//! prefix of a token sequence. Unlike a first-match parser, nothing here
//! commits to an interpretation: alternatives, optional parts and repetitions
//! all contribute derivations, and the engine in
//! [`parsing`](crate::message::parsing) picks among the complete ones.
//!
//! Derivations are produced lazily and in a fixed order, which is what the
//! engine's tie-breaks are defined against:
//!
//! - sequences are explored depth-first, left to right;
//! - alternation yields its alternatives in declaration order;
//! - repetition and `optional` are greedy (more repetitions first);
//! - `missing` consumes as much as it can first, then less, down to nothing.
//!
//! Grammars combine with operators that read like the grammar notation:
//!
//! ```text
//! word().repeat(1..) % missing("name")
//!     & optional(delimiter() & number() % missing("age") & word() % missing("sex"))
//! ```
//!
//! `%` is a priority choice: the right side is only tried if the left side
//! produces nothing. Rust's precedence (`%` before `&` before `|`) matches
//! the notation's.

use crate::message::token::{Token, TokenClass};
use serde::Serialize;
use std::fmt;
use std::iter;
use std::ops::{BitAnd, BitOr, Bound, RangeBounds, Rem};

/// One element of a result sequence
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "item", rename_all = "snake_case")]
pub enum Item {
    /// A matched token, kept as is
    Token { token: Token },
    /// Tokens grouped under a field name by [`Grammar::tag`]
    Field { name: String, tokens: Vec<Token> },
    /// Placeholder for a field that could not be matched here
    Diagnostic { label: String },
}

impl Item {
    pub fn token(token: Token) -> Self {
        Item::Token { token }
    }

    pub fn diagnostic(label: impl Into<String>) -> Self {
        Item::Diagnostic {
            label: label.into(),
        }
    }

    pub fn is_diagnostic(&self) -> bool {
        matches!(self, Item::Diagnostic { .. })
    }

    pub fn as_token(&self) -> Option<&Token> {
        match self {
            Item::Token { token } => Some(token),
            _ => None,
        }
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Item::Token { token } => write!(f, "{}", token),
            Item::Field { name, tokens } => {
                write!(f, "{}=[", name)?;
                for (index, token) in tokens.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", token)?;
                }
                write!(f, "]")
            }
            Item::Diagnostic { label } => write!(f, "<missing '{}'>", label),
        }
    }
}

/// A result sequence paired with how many tokens it consumed
#[derive(Debug, Clone, PartialEq)]
pub struct Derivation {
    pub items: Vec<Item>,
    /// Index of the first unconsumed token
    pub end: usize,
}

impl Derivation {
    fn empty(end: usize) -> Self {
        Self {
            items: Vec::new(),
            end,
        }
    }

    fn single(item: Item, end: usize) -> Self {
        Self {
            items: vec![item],
            end,
        }
    }

    /// Append a derivation that starts where this one ends
    fn extended(&self, next: Derivation) -> Derivation {
        let mut items = Vec::with_capacity(self.items.len() + next.items.len());
        items.extend(self.items.iter().cloned());
        items.extend(next.items);
        Derivation {
            items,
            end: next.end,
        }
    }

    /// Index of the first diagnostic in the result sequence
    pub fn first_diagnostic(&self) -> Option<usize> {
        self.items.iter().position(Item::is_diagnostic)
    }
}

/// Lazy stream of derivations borrowed from a grammar and its input
pub type Derivations<'a> = Box<dyn Iterator<Item = Derivation> + 'a>;

/// A composable grammar over tokens
#[derive(Debug, Clone, PartialEq)]
pub enum Grammar {
    /// Exactly one token of the given class
    Token(TokenClass),
    /// Matches like the inner grammar but contributes no items
    Drop(Box<Grammar>),
    /// Every part in order
    Seq(Vec<Grammar>),
    /// Every alternative, in declaration order
    Alt(Vec<Grammar>),
    /// Only the first alternative that produces any derivation
    First(Vec<Grammar>),
    /// Greedy repetition; `max` of `None` is unbounded
    Repeat {
        inner: Box<Grammar>,
        min: usize,
        max: Option<usize>,
    },
    /// Any number of tokens, standing in for a labeled diagnostic
    Missing(String),
    /// Groups the inner grammar's tokens under a field name
    Tag { name: String, inner: Box<Grammar> },
}

pub fn word() -> Grammar {
    Grammar::Token(TokenClass::Word)
}

pub fn integer() -> Grammar {
    Grammar::Token(TokenClass::Integer)
}

pub fn float() -> Grammar {
    Grammar::Token(TokenClass::Float)
}

/// An integer or a float
pub fn number() -> Grammar {
    Grammar::Token(TokenClass::Number)
}

pub fn any() -> Grammar {
    Grammar::Token(TokenClass::Any)
}

/// A comma or semicolon. Always dropped from the result.
pub fn delimiter() -> Grammar {
    drop(Grammar::Token(TokenClass::Delimiter))
}

pub fn drop(inner: Grammar) -> Grammar {
    Grammar::Drop(Box::new(inner))
}

/// Feedback for a field that could not be matched.
///
/// Swallows whatever tokens are left at this point (longest first) and
/// yields one diagnostic item. Usually applied through `%`.
pub fn missing(label: impl Into<String>) -> Grammar {
    Grammar::Missing(label.into())
}

/// Zero or one occurrence, preferring one
pub fn optional(inner: Grammar) -> Grammar {
    inner.repeat(0..=1)
}

pub fn seq(parts: impl IntoIterator<Item = Grammar>) -> Grammar {
    Grammar::Seq(parts.into_iter().collect())
}

pub fn alt(alternatives: impl IntoIterator<Item = Grammar>) -> Grammar {
    Grammar::Alt(alternatives.into_iter().collect())
}

pub fn first(alternatives: impl IntoIterator<Item = Grammar>) -> Grammar {
    Grammar::First(alternatives.into_iter().collect())
}

impl Grammar {
    /// Repeat greedily within `range` (`1..` is one or more, `..=1` at most one)
    pub fn repeat(self, range: impl RangeBounds<usize>) -> Grammar {
        let min = match range.start_bound() {
            Bound::Included(&n) => n,
            Bound::Excluded(&n) => n + 1,
            Bound::Unbounded => 0,
        };
        let max = match range.end_bound() {
            Bound::Included(&n) => Some(n),
            Bound::Excluded(&n) => Some(n.saturating_sub(1)),
            Bound::Unbounded => None,
        };
        Grammar::Repeat {
            inner: Box::new(self),
            min,
            max,
        }
    }

    /// Exactly `count` repetitions
    pub fn times(self, count: usize) -> Grammar {
        self.repeat(count..=count)
    }

    /// Fall back to a labeled diagnostic when this grammar matches nothing
    pub fn or_missing(self, label: impl Into<String>) -> Grammar {
        self % missing(label)
    }

    /// Group the tokens this grammar produces under `name`
    pub fn tag(self, name: impl Into<String>) -> Grammar {
        Grammar::Tag {
            name: name.into(),
            inner: Box::new(self),
        }
    }

    /// Every derivation of this grammar over a prefix of `tokens`
    pub fn derivations<'a>(&'a self, tokens: &'a [Token]) -> Derivations<'a> {
        self.derive(tokens, 0)
    }

    fn derive<'a>(&'a self, tokens: &'a [Token], pos: usize) -> Derivations<'a> {
        match self {
            Grammar::Token(class) => match tokens.get(pos) {
                Some(token) if class.accepts(token.kind()) => Box::new(iter::once(
                    Derivation::single(Item::token(token.clone()), pos + 1),
                )),
                _ => Box::new(iter::empty()),
            },
            Grammar::Drop(inner) => {
                Box::new(inner.derive(tokens, pos).map(|d| Derivation::empty(d.end)))
            }
            Grammar::Seq(parts) => derive_sequence(parts, tokens, pos),
            Grammar::Alt(alternatives) => Box::new(
                alternatives
                    .iter()
                    .flat_map(move |alternative| alternative.derive(tokens, pos)),
            ),
            Grammar::First(alternatives) => {
                for alternative in alternatives {
                    let mut derivations = alternative.derive(tokens, pos).peekable();
                    if derivations.peek().is_some() {
                        return Box::new(derivations);
                    }
                }
                Box::new(iter::empty())
            }
            Grammar::Repeat { inner, min, max } => {
                Box::new(RepeatDerivations::new(inner, *min, *max, tokens, pos))
            }
            Grammar::Missing(label) => Box::new(
                (pos..=tokens.len())
                    .rev()
                    .map(move |end| Derivation::single(Item::diagnostic(label.clone()), end)),
            ),
            Grammar::Tag { name, inner } => {
                Box::new(inner.derive(tokens, pos).map(move |d| tag_derivation(name, d)))
            }
        }
    }
}

fn derive_sequence<'a>(parts: &'a [Grammar], tokens: &'a [Token], pos: usize) -> Derivations<'a> {
    match parts.split_first() {
        None => Box::new(iter::once(Derivation::empty(pos))),
        Some((head, rest)) => Box::new(head.derive(tokens, pos).flat_map(move |prefix| {
            let end = prefix.end;
            derive_sequence(rest, tokens, end).map(move |suffix| prefix.extended(suffix))
        })),
    }
}

/// One level of a repetition in progress
struct RepeatFrame<'a> {
    count: usize,
    pos: usize,
    /// The iteration that led to this level; `None` at the bottom
    step: Option<Derivation>,
    /// Remaining derivations of the next iteration, `None` once exhausted
    steps: Option<Derivations<'a>>,
}

/// Greedy repetition driven by an explicit stack of frames, one per
/// iteration, so stack depth does not grow with the input. Every longer
/// repetition through a step is yielded before stopping at that step's level.
struct RepeatDerivations<'a> {
    inner: &'a Grammar,
    min: usize,
    max: Option<usize>,
    tokens: &'a [Token],
    frames: Vec<RepeatFrame<'a>>,
}

impl<'a> RepeatDerivations<'a> {
    fn new(
        inner: &'a Grammar,
        min: usize,
        max: Option<usize>,
        tokens: &'a [Token],
        pos: usize,
    ) -> Self {
        let mut repeat = Self {
            inner,
            min,
            max,
            tokens,
            frames: Vec::new(),
        };
        repeat.push(0, pos, None);
        repeat
    }

    fn push(&mut self, count: usize, pos: usize, step: Option<Derivation>) {
        let steps = if self.max.is_some_and(|max| count >= max) {
            None
        } else {
            Some(self.inner.derive(self.tokens, pos))
        };
        self.frames.push(RepeatFrame {
            count,
            pos,
            step,
            steps,
        });
    }

    /// Concatenate the steps of the frames below `top` and of `top` itself
    fn finish(&self, top: RepeatFrame<'a>) -> Derivation {
        let mut items = Vec::new();
        for frame in &self.frames {
            if let Some(step) = &frame.step {
                items.extend(step.items.iter().cloned());
            }
        }
        if let Some(step) = top.step {
            items.extend(step.items);
        }
        Derivation {
            items,
            end: top.pos,
        }
    }
}

impl<'a> Iterator for RepeatDerivations<'a> {
    type Item = Derivation;

    fn next(&mut self) -> Option<Derivation> {
        loop {
            let top = self.frames.last_mut()?;
            if let Some(steps) = top.steps.as_mut() {
                match steps.next() {
                    // An iteration that consumes nothing can repeat forever;
                    // once the minimum is met it ends the repetition instead.
                    Some(step) if step.end == top.pos && top.count >= self.min => continue,
                    Some(step) => {
                        let (count, pos) = (top.count + 1, step.end);
                        self.push(count, pos, Some(step));
                        continue;
                    }
                    None => top.steps = None,
                }
            }

            let frame = self.frames.pop()?;
            if frame.count >= self.min {
                return Some(self.finish(frame));
            }
        }
    }
}

fn tag_derivation(name: &str, derivation: Derivation) -> Derivation {
    if derivation.items.iter().any(Item::is_diagnostic) {
        return derivation;
    }
    let tokens = derivation
        .items
        .into_iter()
        .flat_map(|item| match item {
            Item::Token { token } => vec![token],
            Item::Field { tokens, .. } => tokens,
            Item::Diagnostic { .. } => Vec::new(),
        })
        .collect();
    Derivation::single(
        Item::Field {
            name: name.to_string(),
            tokens,
        },
        derivation.end,
    )
}

impl BitAnd for Grammar {
    type Output = Grammar;

    fn bitand(self, rhs: Grammar) -> Grammar {
        let mut parts = match self {
            Grammar::Seq(parts) => parts,
            other => vec![other],
        };
        match rhs {
            Grammar::Seq(more) => parts.extend(more),
            other => parts.push(other),
        }
        Grammar::Seq(parts)
    }
}

impl BitOr for Grammar {
    type Output = Grammar;

    fn bitor(self, rhs: Grammar) -> Grammar {
        let mut alternatives = match self {
            Grammar::Alt(alternatives) => alternatives,
            other => vec![other],
        };
        match rhs {
            Grammar::Alt(more) => alternatives.extend(more),
            other => alternatives.push(other),
        }
        Grammar::Alt(alternatives)
    }
}

impl Rem for Grammar {
    type Output = Grammar;

    fn rem(self, rhs: Grammar) -> Grammar {
        let mut alternatives = match self {
            Grammar::First(alternatives) => alternatives,
            other => vec![other],
        };
        match rhs {
            Grammar::First(more) => alternatives.extend(more),
            other => alternatives.push(other),
        }
        Grammar::First(alternatives)
    }
}

impl fmt::Display for Grammar {
    /// Renders the grammar in notation form, fully parenthesized where needed
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn join(f: &mut fmt::Formatter<'_>, parts: &[Grammar], op: &str) -> fmt::Result {
            write!(f, "(")?;
            for (index, part) in parts.iter().enumerate() {
                if index > 0 {
                    write!(f, " {} ", op)?;
                }
                write!(f, "{}", part)?;
            }
            write!(f, ")")
        }

        match self {
            Grammar::Token(class) => write!(f, "{}", class.name()),
            Grammar::Drop(inner) => match inner.as_ref() {
                Grammar::Token(TokenClass::Delimiter) => write!(f, "Delimiter"),
                inner => write!(f, "Drop({})", inner),
            },
            Grammar::Seq(parts) => join(f, parts, "&"),
            Grammar::Alt(parts) => join(f, parts, "|"),
            Grammar::First(parts) => join(f, parts, "%"),
            Grammar::Repeat {
                inner,
                min: 0,
                max: Some(1),
            } => write!(f, "Optional({})", inner),
            Grammar::Repeat { inner, min, max } => match max {
                Some(max) if max == min => write!(f, "{}[{}]", inner, min),
                // Notation upper bounds are exclusive
                Some(max) => write!(f, "{}[{}:{}]", inner, min, max + 1),
                None => write!(f, "{}[{}:]", inner, min),
            },
            Grammar::Missing(label) => write!(f, "missing({:?})", label),
            Grammar::Tag { name, inner } => write!(f, "Tag({:?}, {})", name, inner),
        }
    }
}
