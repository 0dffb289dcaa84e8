/*!
# netrules Matcher

Decides which accounts own a given IP address.

Each account is described by an ordered list of network specs, either CIDR
blocks (`10.0.0.0/24`) or inclusive ranges (`192.168.1.0-192.168.1.255`).
Matching a batch of addresses yields two values: an ordered report of the
accounts each address matched, and a per-account tally.

## Usage

```rust
use netrules_matcher::{match_addresses, AccountEntry, InvalidSpecPolicy, MatcherResult};

fn example() -> MatcherResult<()> {
    let entries = vec![AccountEntry::parse(
        "111111111111",
        "['10.0.0.0/24', '192.168.1.0-192.168.1.255']",
        1,
        InvalidSpecPolicy::FailFast,
    )?];

    let run = match_addresses(&["10.0.0.5", "8.8.8.8"], &entries)?;
    assert_eq!(run.tally["111111111111"], 1);
    assert_eq!(run.not_matched().count(), 1);
    Ok(())
}
# example().unwrap();
```
*/

pub mod errors;
pub mod es_range;
pub mod matcher;
pub mod network_spec;
pub mod spec_list;

pub use errors::{MatcherResult, ParseError};
pub use es_range::{EsBounds, DEFAULT_ES_FIELD};
pub use matcher::{
    match_address, match_addresses, match_ip, parse_address, tally, AccountEntry, AccountTally,
    InvalidSpecPolicy, MatchReport, MatchResult, MatchRun,
};
pub use network_spec::NetworkSpec;
pub use spec_list::{parse_spec_list, split_spec_tokens};
