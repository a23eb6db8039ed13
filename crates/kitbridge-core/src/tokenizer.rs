//! # Tokenizer
//!
//! Shared by content indexing and search so both sides agree on tokens.
//!
//! - Split on every non-alphanumeric character
//! - Case-fold to lowercase
//! - Discard tokens shorter than `MIN_TOKEN_LENGTH`

use crate::primitives::MIN_TOKEN_LENGTH;
use std::collections::BTreeSet;

/// Tokenize text into a deduplicated, ordered set of tokens.
pub fn tokenize(text: &str) -> BTreeSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|raw| raw.chars().count() >= MIN_TOKEN_LENGTH)
        .map(|raw| raw.to_lowercase())
        .collect()
}
