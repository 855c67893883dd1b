//! Built-in field grammars
//!
//! The grammars below are built once per process and shared; a [`Grammar`] is
//! immutable, so concurrent parses can use them without locking.

use crate::message::matching::{delimiter, missing, number, optional, word, Grammar};
use once_cell::sync::Lazy;

/// Two words, a delimiter, a number and a word: `John Smith, 16 M`
pub static SIMPLE: Lazy<Grammar> =
    Lazy::new(|| word().times(2) & delimiter() & number() & word());

/// Names, optionally followed by age and sex
pub static OPTIONAL_TAIL: Lazy<Grammar> =
    Lazy::new(|| word().repeat(1..) & optional(delimiter() & number() & word()));

/// Reports age and sex together when the tail is malformed
pub static COARSE: Lazy<Grammar> = Lazy::new(|| {
    word().repeat(1..) & optional(delimiter() & (number() & word()) % missing("age and sex"))
});

/// Name, age and sex, each with its own feedback
pub static DEMOGRAPHICS: Lazy<Grammar> = Lazy::new(|| {
    word().repeat(1..) % missing("name")
        & optional(delimiter() & number() % missing("age") & word() % missing("sex"))
});

/// Like [`DEMOGRAPHICS`], but a trailing clause may carry the age alone
pub static DEMOGRAPHICS_MULTIPATH: Lazy<Grammar> = Lazy::new(|| {
    word().repeat(1..) % missing("name")
        & optional(delimiter() & number() % missing("age") & word() % missing("sex"))
        & optional(delimiter() & number() % missing("age"))
});

/// [`DEMOGRAPHICS`] with the recovered tokens grouped into named fields
pub static TAGGED_DEMOGRAPHICS: Lazy<Grammar> = Lazy::new(|| {
    word().repeat(1..).tag("name") % missing("name")
        & optional(
            delimiter()
                & number().tag("age") % missing("age")
                & word().tag("sex") % missing("sex"),
        )
});

/// Names of the built-in grammars, in documentation order
pub const NAMES: [&str; 6] = [
    "simple",
    "optional-tail",
    "coarse",
    "demographics",
    "demographics-multipath",
    "tagged-demographics",
];

/// Look up a built-in grammar by name
pub fn by_name(name: &str) -> Option<&'static Grammar> {
    let grammar: &'static Lazy<Grammar> = match name {
        "simple" => &SIMPLE,
        "optional-tail" => &OPTIONAL_TAIL,
        "coarse" => &COARSE,
        "demographics" => &DEMOGRAPHICS,
        "demographics-multipath" => &DEMOGRAPHICS_MULTIPATH,
        "tagged-demographics" => &TAGGED_DEMOGRAPHICS,
        _ => return None,
    };
    Some(Lazy::force(grammar))
}
