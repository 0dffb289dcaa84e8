/*!
# IP Match Run

Reads the address and account CIDR files, matches every address and writes
the three pipe-delimited reports.

## Key Responsibilities
- Build account entries once from the account file (spec tokens pre-parsed)
- Match addresses in file order, attaching source rows to parse errors
- Write matched / not-matched / summary reports, attempting all three even
  when one fails
*/

use crate::errors::{SdkError, SdkResult};
use netrules_csvs::{
    read_account_cidrs_csv, read_address_csv, write_account_summary_csv, write_matched_csv,
    write_not_matched_csv, AccountCidrsRow, AccountSummaryRow, AddressRow, CsvResult, HeaderMode,
    MatchedIpRow, NotMatchedIpRow,
};
use netrules_matcher::{match_address, AccountEntry, InvalidSpecPolicy, MatchRun};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// Separator between account ids in the matched report
const ACCOUNT_JOIN: &str = ",";

/// Options shared by both input files of a match run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchOptions {
    pub header_mode: HeaderMode,
    pub invalid_spec_policy: InvalidSpecPolicy,
}

/// Destinations of the three match reports
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPaths {
    pub matched: PathBuf,
    pub not_matched: PathBuf,
    pub summary: PathBuf,
}

/// Read both inputs and match every address
pub fn run_ip_match(
    ips_csv: &Path,
    account_cidrs_csv: &Path,
    options: MatchOptions,
) -> SdkResult<MatchRun> {
    let addresses = read_address_csv(ips_csv, options.header_mode)?;
    let account_rows = read_account_cidrs_csv(account_cidrs_csv, options.header_mode)?;
    info!(
        "Loaded {} address(es) and {} account entr(ies)",
        addresses.len(),
        account_rows.len()
    );

    if addresses.is_empty() {
        warn!("Address file {} has no rows", ips_csv.display());
    }

    let entries = build_account_entries(&account_rows, options.invalid_spec_policy)?;
    let run = match_address_rows(&addresses, &entries)?;

    info!(
        "Matched {} of {} distinct address(es) across {} account(s)",
        run.matched().count(),
        run.report.len(),
        run.tally.len()
    );

    Ok(run)
}

/// Parse the spec list of every account row
pub fn build_account_entries(
    rows: &[AccountCidrsRow],
    policy: InvalidSpecPolicy,
) -> SdkResult<Vec<AccountEntry>> {
    rows.iter()
        .map(|row| {
            AccountEntry::parse(&row.account, &row.cidrs, row.row, policy).map_err(SdkError::from)
        })
        .collect()
}

/// Match address rows in order; a malformed address fails with its source row
pub fn match_address_rows(rows: &[AddressRow], entries: &[AccountEntry]) -> SdkResult<MatchRun> {
    let mut run = MatchRun::default();

    for row in rows {
        let result = match_address(&row.ip, entries).map_err(|e| e.with_row(row.row))?;
        run.record(&row.ip, result);
    }

    Ok(run)
}

// ================================================================================================
// Report Rows
// ================================================================================================

pub fn matched_rows(run: &MatchRun) -> Vec<MatchedIpRow> {
    run.matched()
        .map(|(ip, accounts)| MatchedIpRow {
            ip: ip.clone(),
            account_numbers: accounts.join(ACCOUNT_JOIN),
        })
        .collect()
}

pub fn not_matched_rows(run: &MatchRun) -> Vec<NotMatchedIpRow> {
    run.not_matched()
        .map(|ip| NotMatchedIpRow { ip: ip.clone() })
        .collect()
}

pub fn summary_rows(run: &MatchRun) -> Vec<AccountSummaryRow> {
    run.tally
        .iter()
        .map(|(account, matches)| AccountSummaryRow {
            account: account.clone(),
            matches: *matches,
        })
        .collect()
}

/// Write all three reports.
///
/// Every report is attempted; failures are collected into a single
/// [`SdkError::OutputWrite`] naming each output that could not be written.
pub fn write_match_reports(run: &MatchRun, paths: &ReportPaths) -> SdkResult<()> {
    let outcomes = [
        (
            "matched",
            &paths.matched,
            write_matched_csv(&paths.matched, &matched_rows(run)),
        ),
        (
            "not matched",
            &paths.not_matched,
            write_not_matched_csv(&paths.not_matched, &not_matched_rows(run)),
        ),
        (
            "account summary",
            &paths.summary,
            write_account_summary_csv(&paths.summary, &summary_rows(run)),
        ),
    ];

    let failures = collect_failures(outcomes);
    if failures.is_empty() {
        Ok(())
    } else {
        Err(SdkError::OutputWrite { failures })
    }
}

fn collect_failures<'a, I>(outcomes: I) -> Vec<String>
where
    I: IntoIterator<Item = (&'a str, &'a PathBuf, CsvResult<()>)>,
{
    let mut failures = Vec::new();

    for (label, path, outcome) in outcomes {
        match outcome {
            Ok(()) => info!("Wrote {} report to {}", label, path.display()),
            Err(e) => {
                error!("Failed to write {} report to {}: {}", label, path.display(), e);
                failures.push(format!("{} ({}): {}", label, path.display(), e));
            }
        }
    }

    failures
}

#[cfg(test)]
mod tests {
    use super::*;
    use netrules_matcher::{MatchResult, ParseError};

    fn address_rows(ips: &[&str]) -> Vec<AddressRow> {
        ips.iter()
            .enumerate()
            .map(|(i, ip)| AddressRow {
                row: i + 2,
                ip: ip.to_string(),
            })
            .collect()
    }

    fn account_row(row: usize, account: &str, cidrs: &str) -> AccountCidrsRow {
        AccountCidrsRow {
            row,
            account: account.to_string(),
            cidrs: cidrs.to_string(),
        }
    }

    #[test]
    fn test_malformed_address_reports_source_row() {
        let entries = build_account_entries(
            &[account_row(2, "acct", "['10.0.0.0/24']")],
            InvalidSpecPolicy::FailFast,
        )
        .unwrap();

        let err = match_address_rows(&address_rows(&["10.0.0.1", "bogus"]), &entries).unwrap_err();
        match err {
            SdkError::Parse(ParseError::InvalidAddress { token, row }) => {
                assert_eq!(token, "bogus");
                assert_eq!(row, Some(3));
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_bad_spec_fails_fast_with_row() {
        let rows = vec![
            account_row(2, "a", "['10.0.0.0/24']"),
            account_row(3, "b", "['not-an-ip']"),
        ];
        let err = build_account_entries(&rows, InvalidSpecPolicy::FailFast).unwrap_err();
        assert!(err
            .to_string()
            .contains("Invalid network spec 'not-an-ip' (row 3)"));
    }

    #[test]
    fn test_bad_spec_skipped_in_skip_mode() {
        let rows = vec![account_row(3, "b", "['not-an-ip', '10.0.0.0/24']")];
        let entries = build_account_entries(&rows, InvalidSpecPolicy::SkipAndLog).unwrap();
        assert_eq!(entries[0].specs.len(), 1);
    }

    #[test]
    fn test_report_rows() {
        let entries = build_account_entries(
            &[
                account_row(2, "111", "['10.0.0.0/24']"),
                account_row(3, "222", "['10.0.0.0-10.0.0.10']"),
            ],
            InvalidSpecPolicy::FailFast,
        )
        .unwrap();
        let run = match_address_rows(&address_rows(&["10.0.0.5", "8.8.8.8"]), &entries).unwrap();

        assert_eq!(
            run.report["10.0.0.5"],
            MatchResult::Matched(vec!["111".to_string(), "222".to_string()])
        );
        assert_eq!(
            matched_rows(&run),
            vec![MatchedIpRow {
                ip: "10.0.0.5".to_string(),
                account_numbers: "111,222".to_string(),
            }]
        );
        assert_eq!(
            not_matched_rows(&run),
            vec![NotMatchedIpRow {
                ip: "8.8.8.8".to_string()
            }]
        );
        assert_eq!(summary_rows(&run).len(), 2);
    }
}
