/*!
# netrules CSV Schema Definitions

This crate is the **single source of truth** for the delimited files netrules
reads and writes.

## Input Files

### Address file (`ips.csv`)
Comma-delimited, one address per row. A header row is optional and detected
automatically (see [`HeaderMode`]).

### Account CIDR file (`account_cidrs.csv`)
Pipe-delimited `account|spec-list` rows, e.g.
`111111111111|['10.0.0.0/24', '192.168.1.0-192.168.1.255']`.
The Elasticsearch export reads the same file by its `CIDRS` column.

### Security-group rule export
Pipe-delimited with a header naming at least `Env`, `GroupName`, `Type`,
`Protocol`, `fromPort`, `toPort` and `Description`.

## Reports

- `result_ips_matched.csv`: `IP|AccountNumbers`
- `result_ips_not_matched.csv`: `IP`
- `result_account_summary.csv`: `Account|Matches`

## Usage

```rust,no_run
use netrules_csvs::{read_account_cidrs_csv, read_address_csv, CsvResult, HeaderMode};

fn example() -> CsvResult<()> {
    let addresses = read_address_csv("ips.csv", HeaderMode::Auto)?;
    let accounts = read_account_cidrs_csv("account_cidrs.csv", HeaderMode::Auto)?;
    println!("{} addresses, {} accounts", addresses.len(), accounts.len());
    Ok(())
}
```
*/

pub mod errors;
pub mod schemas;
pub mod validation;

// Re-export main types for convenience
pub use errors::{CsvError, CsvResult};
pub use schemas::{
    AccountCidrsRow, AccountSummaryRow, AddressRow, CidrsCell, HeaderMode, MatchedIpRow,
    NotMatchedIpRow, SgRuleRow, CIDRS_COLUMN,
};
pub use validation::{
    read_account_cidrs_csv, read_account_cidrs_records, read_address_csv, read_address_records,
    read_cidrs_column_csv, read_cidrs_column_records, read_sg_rules_csv, read_sg_rules_records,
    write_account_summary_csv, write_matched_csv, write_not_matched_csv,
};
