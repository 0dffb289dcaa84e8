/*!
# Address Matching

Matches candidate addresses against an ordered list of account entries and
accumulates per-account tallies.

## Matching rules

- Entries are scanned in source order.
- Within an entry the first spec that contains the address records the
  account, and the remaining specs of that entry are skipped.
- Entries of the same account are not merged: an account listed twice with
  overlapping specs is reported (and tallied) twice for one address.
*/

use crate::errors::{MatcherResult, ParseError};
use crate::network_spec::NetworkSpec;
use crate::spec_list::split_spec_tokens;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use tracing::{debug, warn};

/// Match outcome per input address, in first-seen input order
pub type MatchReport = IndexMap<String, MatchResult>;

/// Match count per account, in first-match order
pub type AccountTally = IndexMap<String, u64>;

/// What to do with a spec token that does not parse
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InvalidSpecPolicy {
    /// Abort with the offending token and row
    #[default]
    FailFast,

    /// Drop the token, log a warning, keep the rest of the entry
    SkipAndLog,
}

// ================================================================================================
// Account Entries
// ================================================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountEntry {
    pub account: String,
    pub specs: Vec<NetworkSpec>,
}

impl AccountEntry {
    pub fn new(account: impl Into<String>, specs: Vec<NetworkSpec>) -> Self {
        Self {
            account: account.into(),
            specs,
        }
    }

    /// Build an entry from a raw spec-list cell read at `source_row`
    pub fn parse(
        account: &str,
        spec_field: &str,
        source_row: usize,
        policy: InvalidSpecPolicy,
    ) -> MatcherResult<Self> {
        let mut specs = Vec::new();

        for token in split_spec_tokens(spec_field) {
            match token.parse::<NetworkSpec>() {
                Ok(spec) => specs.push(spec),
                Err(err) => {
                    let err = err.with_row(source_row);
                    match policy {
                        InvalidSpecPolicy::FailFast => return Err(err),
                        InvalidSpecPolicy::SkipAndLog => {
                            warn!(account, token, row = source_row, "Skipping {}", err);
                        }
                    }
                }
            }
        }

        Ok(Self::new(account.trim(), specs))
    }

    /// First spec of this entry containing `addr`
    pub fn first_match(&self, addr: &IpAddr) -> Option<&NetworkSpec> {
        self.specs.iter().find(|spec| spec.contains(addr))
    }
}

// ================================================================================================
// Match Results
// ================================================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchResult {
    /// Matching accounts in entry order (never empty)
    Matched(Vec<String>),
    NoMatch,
}

impl MatchResult {
    pub fn is_match(&self) -> bool {
        matches!(self, MatchResult::Matched(_))
    }

    pub fn accounts(&self) -> &[String] {
        match self {
            MatchResult::Matched(accounts) => accounts,
            MatchResult::NoMatch => &[],
        }
    }
}

/// Parse a raw address token
pub fn parse_address(address: &str) -> MatcherResult<IpAddr> {
    address
        .trim()
        .parse()
        .map_err(|_| ParseError::address(address))
}

/// Match one raw address against all entries
pub fn match_address(address: &str, entries: &[AccountEntry]) -> MatcherResult<MatchResult> {
    let addr = parse_address(address)?;
    Ok(match_ip(&addr, entries))
}

/// Match an already parsed address against all entries
pub fn match_ip(addr: &IpAddr, entries: &[AccountEntry]) -> MatchResult {
    let matched: Vec<String> = entries
        .iter()
        .filter_map(|entry| {
            entry.first_match(addr).map(|spec| {
                debug!("{} matched account {} via {}", addr, entry.account, spec);
                entry.account.clone()
            })
        })
        .collect();

    if matched.is_empty() {
        MatchResult::NoMatch
    } else {
        MatchResult::Matched(matched)
    }
}

// ================================================================================================
// Tallies
// ================================================================================================

/// Count every account occurrence across all results
pub fn tally<'a, I>(results: I) -> AccountTally
where
    I: IntoIterator<Item = &'a MatchResult>,
{
    let mut counts = AccountTally::new();
    for result in results {
        count_into(&mut counts, result);
    }
    counts
}

fn count_into(counts: &mut AccountTally, result: &MatchResult) {
    for account in result.accounts() {
        *counts.entry(account.clone()).or_insert(0) += 1;
    }
}

/// Accumulated output of a matching run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchRun {
    pub report: MatchReport,
    pub tally: AccountTally,
}

impl MatchRun {
    /// Record the result for one input address.
    ///
    /// A repeated address keeps its first position in the report and is
    /// counted once, so the tally always equals `tally(report.values())`.
    pub fn record(&mut self, address: &str, result: MatchResult) {
        let address = address.trim();
        if self.report.contains_key(address) {
            debug!("Address {} already recorded, not counted again", address);
            return;
        }
        count_into(&mut self.tally, &result);
        self.report.insert(address.to_string(), result);
    }

    pub fn matched(&self) -> impl Iterator<Item = (&String, &[String])> {
        self.report
            .iter()
            .filter(|(_, result)| result.is_match())
            .map(|(address, result)| (address, result.accounts()))
    }

    pub fn not_matched(&self) -> impl Iterator<Item = &String> {
        self.report
            .iter()
            .filter(|(_, result)| !result.is_match())
            .map(|(address, _)| address)
    }
}

/// Match every address in order.
///
/// A malformed address fails the run; its error row is the 1-based position
/// in `addresses`.
pub fn match_addresses<S: AsRef<str>>(
    addresses: &[S],
    entries: &[AccountEntry],
) -> MatcherResult<MatchRun> {
    let mut run = MatchRun::default();

    for (position, address) in addresses.iter().enumerate() {
        let address = address.as_ref();
        let result = match_address(address, entries).map_err(|e| e.with_row(position + 1))?;
        run.record(address, result);
    }

    Ok(run)
}
