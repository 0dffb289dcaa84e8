mod errors;
mod es_query;
mod ip_match;
mod sg_rules;

pub use errors::{SdkError, SdkResult};
pub use es_query::*;
pub use ip_match::*;
pub use sg_rules::*;

// Re-export the matcher types callers handle directly
pub use netrules_csvs::HeaderMode;
pub use netrules_matcher::{
    AccountTally, InvalidSpecPolicy, MatchReport, MatchResult, MatchRun, DEFAULT_ES_FIELD,
};
