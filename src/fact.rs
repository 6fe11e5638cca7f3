//! Fact extraction and argument splitting
//!
//! Facts arrive as flat strings of the form `name(arg1,arg2,...)`. There is no
//! nesting and no escaping: arguments are raw tokens separated by commas.

use thiserror::Error;

/// Errors raised while reading a single fact
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FactError {
    /// The argument list was opened but never closed
    #[error("malformed fact \"{fact}\": argument list is not closed by ')'")]
    Malformed { fact: String },
}

/// Predicate name of a fact: the text before the first `(`.
///
/// A fact without an argument list is its own predicate name.
pub fn predicate_name(fact: &str) -> &str {
    fact.split_once('(').map_or(fact, |(name, _)| name)
}

/// Return every fact invoked with `atom_name`, in original order.
///
/// The predicate name has to match exactly, so `p` never matches `pq(..)`.
pub fn extract_facts_by_atom_name<'a>(facts: &'a [String], atom_name: &str) -> Vec<&'a str> {
    facts
        .iter()
        .map(String::as_str)
        .filter(|fact| predicate_name(fact) == atom_name)
        .collect()
}

/// Split a fact's argument list on commas.
///
/// `flag` and `flag()` both have zero arguments.
pub fn arguments(fact: &str) -> Result<Vec<&str>, FactError> {
    let Some((_, rest)) = fact.split_once('(') else {
        return Ok(Vec::new());
    };

    let inner = rest.strip_suffix(')').ok_or_else(|| FactError::Malformed {
        fact: fact.to_string(),
    })?;

    if inner.is_empty() {
        return Ok(Vec::new());
    }
    Ok(inner.split(',').collect())
}

/// Byte range of the argument list inside a fact, used for error reports.
pub(crate) fn arguments_span(fact: &str) -> std::ops::Range<usize> {
    match fact.find('(') {
        Some(open) => {
            let end = if fact.ends_with(')') {
                fact.len() - 1
            } else {
                fact.len()
            };
            (open + 1)..end.max(open + 1)
        }
        None => 0..fact.len(),
    }
}
