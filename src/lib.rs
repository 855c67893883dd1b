//! # wametuelewa
//!
//! Recovers structured fields (name, age, sex and the like) from short free-text
//! messages, and when a message is incomplete, tells which field is missing.
//!
//! File Layout
//!
//! src/message
//!   ├── token       Token model (words, integers, floats, delimiters)
//!   ├── lexing      logos-based tokenizer
//!   ├── matching    Matcher primitives and grammar combinators
//!   ├── parsing     Full-coverage selection and deepest-diagnostic fallback
//!   ├── notation    Grammars written as text
//!   └── grammars    Built-in field grammars
//!
//! The command line front end lives in src/bin, configuration in the
//! `wametuelewa-config` crate.

pub mod message;
