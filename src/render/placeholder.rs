//! `{{identifier}}` substitution.

use std::collections::BTreeSet;

use lazy_static::lazy_static;
use regex::{Captures, Regex};

use crate::variables::Variables;

lazy_static! {
    static ref PLACEHOLDER: Regex = Regex::new(r"\{\{([A-Za-z0-9_]+)\}\}").unwrap();
}

/// Substituted text plus the identifiers that had no value.
#[derive(Debug, Clone, PartialEq)]
pub struct Substitution {
    pub text: String,
    pub unresolved: Vec<String>,
}

/// Replaces every known placeholder with the string form of its value.
/// Unknown placeholders stay in the text as literal tokens.
pub fn substitute(text: &str, vars: &Variables) -> Substitution {
    let mut unresolved = Vec::new();
    let replaced = PLACEHOLDER.replace_all(text, |caps: &Captures| match vars.get(&caps[1]) {
        Some(value) => value.to_string(),
        None => {
            unresolved.push(caps[1].to_string());
            caps[0].to_string()
        }
    });
    Substitution {
        text: replaced.into_owned(),
        unresolved,
    }
}

/// Distinct identifiers referenced by `text`, sorted.
pub fn identifiers(text: &str) -> Vec<String> {
    PLACEHOLDER
        .captures_iter(text)
        .map(|caps| caps[1].to_string())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
