/*!
# CSV Schema Definitions

This module defines the delimited file layouts read and written by netrules.

## Inputs

- **Address file** (comma-delimited): one address per row, optional header.
- **Account CIDR file** (pipe-delimited): `account|spec-list`, optional header.
  The same file may carry a `CIDRS` column read by the Elasticsearch export.
- **Security-group rule export** (pipe-delimited, header required).

## Outputs

All reports are pipe-delimited and always start with a header row, even when
they carry no data.
*/

use crate::errors::CsvError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub const ADDRESS_DELIMITER: u8 = b',';
pub const ACCOUNT_CIDRS_DELIMITER: u8 = b'|';
pub const REPORT_DELIMITER: u8 = b'|';
pub const SG_RULES_DELIMITER: u8 = b'|';

// ================================================================================================
// Header Detection
// ================================================================================================

/// How to treat the first row of a headerless-by-default input
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HeaderMode {
    /// Guess from the content of the first row.
    ///
    /// Address file: a header has no digits and does not parse as an address.
    /// Account file: a header has no digits in any field, so a headerless
    /// file whose first row is digit-free (e.g. `acct|[]`) loses that row;
    /// use [`HeaderMode::Absent`] for such files.
    #[default]
    Auto,
    /// First row is always a header
    Present,
    /// First row is always data
    Absent,
}

impl FromStr for HeaderMode {
    type Err = CsvError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(HeaderMode::Auto),
            "present" => Ok(HeaderMode::Present),
            "absent" => Ok(HeaderMode::Absent),
            other => Err(CsvError::InvalidFormat(format!(
                "header mode '{}' (expected auto, present or absent)",
                other
            ))),
        }
    }
}

// ================================================================================================
// Input Rows
// ================================================================================================

/// One address read from the address file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressRow {
    /// 1-based line in the source file
    pub row: usize,
    pub ip: String,
}

/// One account entry read from the account CIDR file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountCidrsRow {
    /// 1-based line in the source file
    pub row: usize,
    pub account: String,
    /// Raw spec-list cell, e.g. `['10.0.0.0/24', '10.1.0.0-10.1.0.9']`
    pub cidrs: String,
}

/// Column holding CIDRs for the Elasticsearch export
pub const CIDRS_COLUMN: &str = "CIDRS";

/// Non-empty `CIDRS` cell read for the Elasticsearch export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CidrsCell {
    /// 1-based line in the source file
    pub row: usize,
    pub cidrs: String,
}

/// Columns that must be present in a security-group rule export
pub const SG_RULES_REQUIRED_HEADERS: &[&str] = &[
    "Env",
    "GroupName",
    "Type",
    "Protocol",
    "fromPort",
    "toPort",
    "Description",
];

/// Row of a security-group rule export
///
/// `cidr-range` and `sg-reference` are optional columns; a rule usually
/// carries one or the other.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SgRuleRow {
    #[serde(rename = "Env")]
    pub env: String,

    #[serde(rename = "GroupName")]
    pub group_name: String,

    #[serde(rename = "Type")]
    pub rule_type: String,

    #[serde(rename = "Protocol")]
    pub protocol: String,

    #[serde(rename = "fromPort")]
    pub from_port: String,

    #[serde(rename = "toPort")]
    pub to_port: String,

    #[serde(rename = "cidr-range", default)]
    pub cidr_range: String,

    #[serde(rename = "sg-reference", default)]
    pub sg_reference: String,

    #[serde(rename = "Description")]
    pub description: String,
}

// ================================================================================================
// Report Rows
// ================================================================================================

pub const MATCHED_CSV_HEADERS: &[&str] = &["IP", "AccountNumbers"];
pub const NOT_MATCHED_CSV_HEADERS: &[&str] = &["IP"];
pub const ACCOUNT_SUMMARY_CSV_HEADERS: &[&str] = &["Account", "Matches"];

/// Address that matched at least one account
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatchedIpRow {
    #[serde(rename = "IP")]
    pub ip: String,

    /// Matching accounts joined with `,`
    #[serde(rename = "AccountNumbers")]
    pub account_numbers: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NotMatchedIpRow {
    #[serde(rename = "IP")]
    pub ip: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccountSummaryRow {
    #[serde(rename = "Account")]
    pub account: String,

    #[serde(rename = "Matches")]
    pub matches: u64,
}
