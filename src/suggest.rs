use crate::catalog::Catalog;
use std::collections::HashSet;

/// Operator symbols offered alongside catalog names, in display order.
pub const OPERATORS: [&str; 7] = ["+", "-", "*", "/", "^", "(", ")"];

/// One autocomplete entry for a partially typed token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestOption {
    pub value: String,
    pub label: String,
    pub key: String,
}

/// Builds the option list for `input`.
///
/// Catalog names containing `input` (ignoring case) come first, then the
/// operator symbols containing it. A value is never offered twice.
pub fn options(input: &str, catalog: &Catalog) -> Vec<SuggestOption> {
    let needle = input.to_lowercase();
    let mut seen = HashSet::new();

    let names = catalog
        .iter()
        .filter(|suggestion| suggestion.name.to_lowercase().contains(&needle))
        .filter(|suggestion| seen.insert(suggestion.name.clone()))
        .map(|suggestion| SuggestOption {
            value: suggestion.name.clone(),
            label: suggestion.name.clone(),
            key: format!("suggestion-{}", suggestion.id),
        })
        .collect::<Vec<_>>();

    let operators = OPERATORS
        .iter()
        .filter(|op| op.contains(input))
        .filter(|op| seen.insert(op.to_string()))
        .enumerate()
        .map(|(idx, op)| SuggestOption {
            value: op.to_string(),
            label: op.to_string(),
            key: format!("op-{}-{}", op, idx),
        });

    names.into_iter().chain(operators).collect()
}
