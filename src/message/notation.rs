//! Textual grammar notation
//!
//! Grammars can be written as text, in the same operator notation the
//! combinators use. This is how configured grammars reach the engine.
//!
//! ```text
//! Word[1:] % missing("name") & Optional(Delimiter & Number % missing("age") & Word % missing("sex"))
//! ```
//!
//! Precedence, tightest first: repetition bounds, `%` (priority choice), `&`
//! (sequence), `|` (alternation). Bounds are half-open: `[1:]` is one or more,
//! `[0:2]` at most one, `[:]` any number, `[2]` exactly two.
//!
//! Matchers: `Word`, `Integer`, `Float`, `Number`, `Delimiter` (always
//! dropped), `Any`. Modifiers: `missing("label")`, `Optional(..)`, `Drop(..)`,
//! `Tag("name", ..)`.
//!
//! Compilation happens in two passes. Chumsky turns the text into a syntax
//! tree, then names and bounds are resolved. Every failure, including an
//! unknown matcher name, is reported here, before any message is parsed.

use chumsky::prelude::*;
use std::fmt;
use std::ops::Range;

use crate::message::matching::{delimiter, drop, missing, optional, Grammar};
use crate::message::token::TokenClass;

/// Why a grammar could not be built from its notation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrammarError {
    /// The text is not well-formed notation
    Syntax { span: Range<usize>, message: String },
    /// A name that is neither a matcher nor a modifier
    UnknownMatcher { name: String, span: Range<usize> },
    /// Repetition bounds that admit no count, such as `[]` or `[3:1]`
    InvalidBounds { span: Range<usize> },
}

impl fmt::Display for GrammarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GrammarError::Syntax { span, message } => {
                write!(f, "Invalid grammar at {}..{}: {}", span.start, span.end, message)
            }
            GrammarError::UnknownMatcher { name, span } => {
                write!(f, "Unknown matcher `{}` at {}..{}", name, span.start, span.end)
            }
            GrammarError::InvalidBounds { span } => {
                write!(f, "Empty repetition bounds at {}..{}", span.start, span.end)
            }
        }
    }
}

impl std::error::Error for GrammarError {}

/// Repetition bounds as written, before validation
#[derive(Debug, Clone, PartialEq)]
struct Bounds {
    low: Option<usize>,
    /// `None` for `[n]`, `Some(None)` for an open upper bound
    high: Option<Option<usize>>,
    span: Range<usize>,
}

/// Syntax tree of the notation
#[derive(Debug, Clone, PartialEq)]
enum Node {
    Name(String, Range<usize>),
    Missing(String),
    Optional(Box<Node>),
    Drop(Box<Node>),
    Tag(String, Box<Node>),
    Repeat(Box<Node>, Bounds),
    Seq(Vec<Node>),
    Alt(Vec<Node>),
    First(Vec<Node>),
}

/// Compile notation text into a grammar
pub fn compile(source: &str) -> Result<Grammar, GrammarError> {
    let node = notation().parse(source).map_err(|errors| {
        let error = errors.into_iter().next();
        GrammarError::Syntax {
            span: error.as_ref().map_or(0..0, |e| e.span()),
            message: error.map_or_else(|| "empty grammar".to_string(), |e| e.to_string()),
        }
    })?;
    resolve(node)
}

fn notation() -> impl Parser<char, Node, Error = Simple<char>> {
    let expr = recursive(|expr| {
        let string = just('"')
            .ignore_then(
                filter(|c: &char| *c != '"' && *c != '\\')
                    .or(just('\\').ignore_then(one_of("\"\\")))
                    .repeated(),
            )
            .then_ignore(just('"'))
            .collect::<String>()
            .padded();

        let open = just('(').padded();
        let close = just(')').padded();

        let call = expr
            .clone()
            .delimited_by(open.clone(), close.clone())
            .map(Box::new);

        let missing = text::keyword("missing")
            .ignore_then(string.clone().delimited_by(open.clone(), close.clone()))
            .map(Node::Missing);

        let optional = text::keyword("Optional")
            .ignore_then(call.clone())
            .map(Node::Optional);

        let dropped = text::keyword("Drop").ignore_then(call).map(Node::Drop);

        let tag = text::keyword("Tag")
            .ignore_then(open.clone())
            .ignore_then(string)
            .then_ignore(just(',').padded())
            .then(expr.clone())
            .then_ignore(close.clone())
            .map(|(name, node)| Node::Tag(name, Box::new(node)));

        let name = text::ident().map_with_span(Node::Name);

        let group = expr.delimited_by(open, close);

        let atom = choice((missing, optional, dropped, tag, name, group)).padded();

        let count = text::int(10).try_map(|digits: String, span| {
            digits
                .parse::<usize>()
                .map_err(|e| Simple::custom(span, e.to_string()))
        });

        let bounds = count
            .clone()
            .padded()
            .or_not()
            .then(just(':').padded().ignore_then(count.padded().or_not()).or_not())
            .delimited_by(just('['), just(']'))
            .map_with_span(|(low, high), span| Bounds { low, high, span })
            .padded();

        let postfix = atom
            .then(bounds.or_not())
            .map(|(node, bounds)| match bounds {
                Some(bounds) => Node::Repeat(Box::new(node), bounds),
                None => node,
            });

        let first = postfix
            .clone()
            .then(just('%').padded().ignore_then(postfix).repeated())
            .map(|(head, tail)| flatten(head, tail, Node::First));

        let seq = first
            .clone()
            .then(just('&').padded().ignore_then(first).repeated())
            .map(|(head, tail)| flatten(head, tail, Node::Seq));

        seq.clone()
            .then(just('|').padded().ignore_then(seq).repeated())
            .map(|(head, tail)| flatten(head, tail, Node::Alt))
    });

    expr.padded().then_ignore(end())
}

fn flatten(head: Node, tail: Vec<Node>, build: fn(Vec<Node>) -> Node) -> Node {
    if tail.is_empty() {
        return head;
    }
    let mut nodes = Vec::with_capacity(tail.len() + 1);
    nodes.push(head);
    nodes.extend(tail);
    build(nodes)
}

fn resolve(node: Node) -> Result<Grammar, GrammarError> {
    let grammar = match node {
        Node::Name(name, span) => match TokenClass::from_name(&name) {
            Some(TokenClass::Delimiter) => delimiter(),
            Some(class) => Grammar::Token(class),
            None => return Err(GrammarError::UnknownMatcher { name, span }),
        },
        Node::Missing(label) => missing(label),
        Node::Optional(inner) => optional(resolve(*inner)?),
        Node::Drop(inner) => drop(resolve(*inner)?),
        Node::Tag(name, inner) => resolve(*inner)?.tag(name),
        Node::Repeat(inner, bounds) => {
            let inner = resolve(*inner)?;
            match (bounds.low, bounds.high) {
                (Some(count), None) => inner.times(count),
                (None, None) => return Err(GrammarError::InvalidBounds { span: bounds.span }),
                (low, Some(None)) => inner.repeat(low.unwrap_or(0)..),
                (low, Some(Some(high))) => {
                    let low = low.unwrap_or(0);
                    if high <= low {
                        return Err(GrammarError::InvalidBounds { span: bounds.span });
                    }
                    inner.repeat(low..high)
                }
            }
        }
        Node::Seq(nodes) => Grammar::Seq(resolve_all(nodes)?),
        Node::Alt(nodes) => Grammar::Alt(resolve_all(nodes)?),
        Node::First(nodes) => Grammar::First(resolve_all(nodes)?),
    };
    Ok(grammar)
}

fn resolve_all(nodes: Vec<Node>) -> Result<Vec<Grammar>, GrammarError> {
    nodes.into_iter().map(resolve).collect()
}
