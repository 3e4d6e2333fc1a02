//! Derivation of algebra variables from the position of a value in the query.
//!
//! Every nesting level appends the key of the entry to the variable of its parent, separated by
//! [SEPARATOR]. The separator is not allowed in SPARQL variable names, hence derived names never
//! clash with names written by hand.

use jsonld_query_model::Variable;

pub const SEPARATOR: char = '.';

/// The variable of the document root.
pub fn root_variable() -> Variable {
    Variable::new_unchecked("root")
}

/// Derives the variable for the entry `key` of the node bound to `parent`.
///
/// Only the longest suffix of `key` that is a legal variable name is used, or `_` if there is
/// none. Keys that share this suffix derive the same variable.
pub fn child_variable(parent: &Variable, key: &str) -> Variable {
    Variable::new_unchecked(format!("{}{SEPARATOR}{}", parent.as_str(), sanitize(key)))
}

fn sanitize(key: &str) -> &str {
    let start = key
        .char_indices()
        .rev()
        .take_while(|(_, c)| is_name_char(*c))
        .last()
        .map_or(key.len(), |(position, _)| position);
    let suffix = key[start..].trim_start_matches(|c: char| !is_name_start_char(c));
    if suffix.is_empty() {
        "_"
    } else {
        suffix
    }
}

fn is_name_start_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn is_name_char(c: char) -> bool {
    is_name_start_char(c)
        || c == '\u{B7}'
        || ('\u{300}'..='\u{36F}').contains(&c)
        || ('\u{203F}'..='\u{2040}').contains(&c)
}
