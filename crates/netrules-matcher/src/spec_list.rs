//! Parser for the bracketed spec-list cell of an account file, e.g.
//! `['10.0.0.0/24', "192.168.1.0-192.168.1.255"]`.

use crate::errors::MatcherResult;
use crate::network_spec::NetworkSpec;

const TOKEN_SEPARATOR: char = ',';

/// Split a spec-list cell into its raw tokens.
///
/// Brackets and quotes are optional. Empty tokens are dropped, so `[]` yields
/// no tokens.
pub fn split_spec_tokens(field: &str) -> Vec<&str> {
    let inner = field
        .trim()
        .trim_start_matches('[')
        .trim_end_matches(']');

    inner
        .split(TOKEN_SEPARATOR)
        .map(|token| token.trim().trim_matches(|c| c == '\'' || c == '"').trim())
        .filter(|token| !token.is_empty())
        .collect()
}

/// Parse every token of a spec-list cell, stopping at the first bad one
pub fn parse_spec_list(field: &str) -> MatcherResult<Vec<NetworkSpec>> {
    split_spec_tokens(field)
        .into_iter()
        .map(|token| token.parse::<NetworkSpec>())
        .collect()
}
